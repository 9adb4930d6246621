use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use shared::{
    domain::{CompanyId, MedicationId, ParticipantId},
    protocol::{Medication, MedicationInput, ParticipantDetail, ParticipantProfile, ParticipantSummary},
};
use tracing::warn;

pub mod channel;
pub mod error;

pub use channel::{channel_ws_url, ChannelSubscription};
pub use error::ClientError;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

const UNASSIGNED_COMPANY: &str = "No asignada";
const UNASSIGNED_ROOM: &str = "Sin asignar";
const NOT_ATTENDED: &str = "No";

/// Participant row as the backend returns it. Every column may be missing or null.
#[derive(Debug, Deserialize)]
struct ParticipantRow {
    id: ParticipantId,
    #[serde(default)]
    comp: Option<Value>,
    #[serde(default)]
    nombre: Option<Value>,
    #[serde(default)]
    apellido: Option<Value>,
    #[serde(default)]
    habitacion: Option<Value>,
    #[serde(default)]
    edad: Option<Value>,
    #[serde(default)]
    estaca: Option<Value>,
    #[serde(default)]
    barrio: Option<Value>,
    #[serde(default)]
    asistio: Option<Value>,
    #[serde(default)]
    telefono: Option<Value>,
    #[serde(default)]
    nacimiento: Option<Value>,
    #[serde(default)]
    talla: Option<Value>,
    #[serde(default)]
    tipo: Option<Value>,
    #[serde(default)]
    sexo: Option<Value>,
    #[serde(default)]
    correo: Option<Value>,
    #[serde(default)]
    nom_c1: Option<Value>,
    #[serde(default)]
    telef_c1: Option<Value>,
    #[serde(default)]
    grupo_sang: Option<Value>,
    #[serde(default)]
    miembro: Option<Value>,
    #[serde(default)]
    enf_cronica: Option<Value>,
    #[serde(default)]
    trat_med: Option<Value>,
    #[serde(default)]
    seguro: Option<Value>,
    #[serde(default)]
    alergia_med: Option<Value>,
}

/// Missing, null, empty, zero and false columns fall back to `default`.
fn text_or(value: &Option<Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => default.to_string(),
    }
}

impl ParticipantRow {
    fn detail(&self) -> ParticipantDetail {
        ParticipantDetail {
            id: self.id,
            company: text_or(&self.comp, UNASSIGNED_COMPANY),
            first_names: text_or(&self.nombre, ""),
            last_names: text_or(&self.apellido, ""),
            room: text_or(&self.habitacion, UNASSIGNED_ROOM),
            age: self.edad.as_ref().and_then(Value::as_i64).unwrap_or(0),
            stake: text_or(&self.estaca, ""),
            ward: text_or(&self.barrio, ""),
            attendance: text_or(&self.asistio, NOT_ATTENDED),
        }
    }

    fn profile(&self) -> ParticipantProfile {
        ParticipantProfile {
            detail: self.detail(),
            phone: text_or(&self.telefono, ""),
            birth_date: text_or(&self.nacimiento, ""),
            shirt_size: text_or(&self.talla, ""),
            kind: text_or(&self.tipo, ""),
            gender: text_or(&self.sexo, ""),
            email: text_or(&self.correo, ""),
            emergency_contact_name: text_or(&self.nom_c1, ""),
            emergency_contact_phone: text_or(&self.telef_c1, ""),
            blood_type: text_or(&self.grupo_sang, ""),
            member: text_or(&self.miembro, ""),
            chronic_condition: text_or(&self.enf_cronica, ""),
            medical_treatment: text_or(&self.trat_med, ""),
            insurance: text_or(&self.seguro, ""),
            medication_allergy: text_or(&self.alergia_med, ""),
        }
    }
}

#[derive(Clone)]
pub struct CampClient {
    http: Client,
    base_url: String,
}

impl CampClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let res = self
            .http
            .get(self.url(path))
            .send()
            .await
            .and_then(Response::error_for_status)
            .inspect_err(|err| warn!(path, %err, "GET request failed"))?;
        res.json()
            .await
            .with_context(|| format!("invalid JSON body from GET {path}"))
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value> {
        let mut req = self.http.request(method.clone(), self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = req
            .send()
            .await
            .and_then(Response::error_for_status)
            .inspect_err(|err| warn!(%method, path, %err, "request failed"))?;
        read_json_value(res)
            .await
            .with_context(|| format!("invalid JSON body from {method} {path}"))
    }

    pub async fn list_participants(&self) -> Result<Vec<ParticipantSummary>> {
        self.get("/part").await
    }

    pub async fn register_participant(&self, data: &Value) -> Result<Value> {
        self.send_json(reqwest::Method::POST, "/part/", Some(data))
            .await
    }

    pub async fn health_participants(&self) -> Result<Value> {
        self.get("/salud").await
    }

    pub async fn company_members(&self, company_id: CompanyId) -> Result<Value> {
        self.get(&format!("/stats/{company_id}")).await
    }

    async fn participant_row(&self, path: &str, id: ParticipantId) -> Result<ParticipantRow> {
        let rows: Vec<ParticipantRow> = self.get(path).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ClientError::ParticipantNotFound(id).into())
    }

    pub async fn find_participant(&self, id: ParticipantId) -> Result<ParticipantDetail> {
        let row = self.participant_row(&format!("/part/{id}"), id).await?;
        Ok(row.detail())
    }

    pub async fn find_participant_profile(&self, id: ParticipantId) -> Result<ParticipantProfile> {
        let row = self.participant_row(&format!("/part/full/{id}"), id).await?;
        Ok(row.profile())
    }

    pub async fn confirm_attendance(&self, id: ParticipantId) -> Result<Value> {
        self.send_json::<Value>(reqwest::Method::PUT, &format!("/part/{id}"), None)
            .await
    }

    /// Full participant snapshot, in the same shape the channel publishes.
    pub async fn stats(&self) -> Result<Value> {
        self.get("/stats").await
    }

    pub async fn list_medications(&self) -> Result<Vec<Medication>> {
        self.get("/salud/inv/").await
    }

    pub async fn add_medication(&self, input: &MedicationInput) -> Result<Value> {
        self.send_json(reqwest::Method::POST, "/salud/inv/", Some(input))
            .await
    }

    pub async fn update_medication(&self, id: MedicationId, input: &MedicationInput) -> Result<Value> {
        self.send_json(reqwest::Method::PUT, &format!("/salud/inv/{id}"), Some(input))
            .await
    }

    pub async fn delete_medication(&self, id: MedicationId) -> Result<Value> {
        self.send_json::<Value>(reqwest::Method::DELETE, &format!("/salud/inv/{id}"), None)
            .await
    }

    pub async fn register_attention(&self, data: &Value) -> Result<Value> {
        self.send_json(reqwest::Method::POST, "/salud/atencion/", Some(data))
            .await
    }

    pub async fn attention_history(&self) -> Result<Value> {
        self.get("/salud/atencion/").await
    }

    pub async fn attentions_for(&self, participant: ParticipantId) -> Result<Value> {
        self.get(&format!("/salud/atencion/part/{participant}"))
            .await
    }
}

async fn read_json_value(res: Response) -> Result<Value> {
    let body = res.text().await?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
