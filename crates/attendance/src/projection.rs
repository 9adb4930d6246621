use std::collections::BTreeMap;

use shared::{
    domain::{CompanyId, Gender, ParticipantSnapshot},
    protocol::{Company, ParticipantView, Summary},
};

pub fn company_name(id: CompanyId) -> String {
    format!("Compañía {id}")
}

/// Groups records by company, ascending by id. Input order is kept inside a group.
pub fn project(records: &[ParticipantSnapshot]) -> Vec<Company> {
    let mut grouped: BTreeMap<CompanyId, Vec<&ParticipantSnapshot>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.company_id).or_default().push(record);
    }

    grouped
        .into_iter()
        .map(|(id, members)| Company {
            id,
            name: company_name(id),
            participants: members
                .into_iter()
                .enumerate()
                .map(|(index, p)| ParticipantView {
                    id: index + 1,
                    name: p.name.clone(),
                    gender: p.gender.clone(),
                    present: p.present,
                    stake: p.stake.clone(),
                    ward: p.ward.clone(),
                    location: p.room_label.clone(),
                })
                .collect(),
        })
        .collect()
}

pub fn summarize(companies: &[Company]) -> Summary {
    companies.iter().fold(
        Summary {
            total_companies: companies.len(),
            ..Summary::default()
        },
        |mut acc, company| {
            acc.total_participants += company.total();
            acc.male_participants += company.gender_tally(&Gender::Male).total;
            acc.female_participants += company.gender_tally(&Gender::Female).total;
            acc.present_participants += company.present();
            acc
        },
    )
}

#[cfg(test)]
#[path = "tests/projection_tests.rs"]
mod tests;
