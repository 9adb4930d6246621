use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Attendance, CompanyId, Gender, MedicationId, ParticipantId, ParticipantSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParticipantRecord {
    #[serde(rename = "nombres")]
    pub name: String,
    #[serde(rename = "sexo")]
    pub gender: Gender,
    #[serde(rename = "estaca")]
    pub stake: String,
    #[serde(rename = "barrio")]
    pub ward: String,
    #[serde(rename = "compañia")]
    pub company_id: CompanyId,
    #[serde(rename = "habitacion")]
    pub room_label: String,
    #[serde(rename = "asistio")]
    pub attendance: Attendance,
}

impl From<ParticipantRecord> for ParticipantSnapshot {
    fn from(value: ParticipantRecord) -> Self {
        Self {
            name: value.name,
            gender: value.gender,
            stake: value.stake,
            ward: value.ward,
            company_id: value.company_id,
            room_label: value.room_label,
            present: value.attendance.is_present(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantView {
    /// Position inside the company group, starting at 1. Display only.
    pub id: usize,
    pub name: String,
    pub gender: Gender,
    pub present: bool,
    pub stake: String,
    pub ward: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub present: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub participants: Vec<ParticipantView>,
}

impl Company {
    pub fn total(&self) -> usize {
        self.participants.len()
    }

    pub fn present(&self) -> usize {
        self.participants.iter().filter(|p| p.present).count()
    }

    pub fn tally(&self) -> Tally {
        Tally {
            present: self.present(),
            total: self.total(),
        }
    }

    pub fn gender_tally(&self, gender: &Gender) -> Tally {
        self.participants
            .iter()
            .filter(|p| &p.gender == gender)
            .fold(Tally::default(), |mut acc, p| {
                acc.total += 1;
                if p.present {
                    acc.present += 1;
                }
                acc
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_companies: usize,
    pub total_participants: usize,
    pub male_participants: usize,
    pub female_participants: usize,
    pub present_participants: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub companies: Vec<Company>,
    pub summary: Summary,
    pub highlighted: Vec<CompanyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum BoardEvent {
    CompaniesUpdated {
        snapshot: BoardSnapshot,
        changed: Vec<CompanyId>,
    },
    HighlightCleared,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ChannelFrame {
    Subscribe {
        channel: String,
    },
    Unsubscribe {
        channel: String,
    },
    Message {
        channel: String,
        data: serde_json::Value,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub id: ParticipantId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDetail {
    pub id: ParticipantId,
    pub company: String,
    pub first_names: String,
    pub last_names: String,
    pub room: String,
    pub age: i64,
    pub stake: String,
    pub ward: String,
    pub attendance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantProfile {
    #[serde(flatten)]
    pub detail: ParticipantDetail,
    pub phone: String,
    pub birth_date: String,
    pub shirt_size: String,
    pub kind: String,
    pub gender: String,
    pub email: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub blood_type: String,
    pub member: String,
    pub chronic_condition: String,
    pub medical_treatment: String,
    pub insurance: String,
    pub medication_allergy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    #[serde(rename = "id_inventario_salud")]
    pub id: MedicationId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    pub stock: i64,
    #[serde(rename = "dosis", default)]
    pub dose: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationInput {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    pub stock: i64,
    #[serde(rename = "dosis")]
    pub dose: Option<String>,
}
