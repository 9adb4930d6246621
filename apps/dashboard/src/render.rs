use std::fmt::Write;

use shared::{
    domain::Gender,
    protocol::{BoardSnapshot, Company, Summary, Tally},
};

use crate::menu::{Menu, MenuOption, MenuView};

fn tally(t: Tally) -> String {
    format!("{}/{}", t.present, t.total)
}

pub fn render_summary(summary: &Summary) -> String {
    format!(
        "Compañías: {} | Participantes: {} | Presentes: {} | Hombres: {} | Mujeres: {}",
        summary.total_companies,
        summary.total_participants,
        summary.present_participants,
        summary.male_participants,
        summary.female_participants,
    )
}

/// One line per company. Highlighted companies carry a leading `*`.
pub fn render_board(snapshot: &BoardSnapshot) -> String {
    let mut out = render_summary(&snapshot.summary);
    out.push('\n');
    if snapshot.companies.is_empty() {
        out.push_str("  (sin participantes)\n");
        return out;
    }
    for company in &snapshot.companies {
        let marker = if snapshot.highlighted.contains(&company.id) {
            '*'
        } else {
            ' '
        };
        let _ = writeln!(
            out,
            "{marker} {:<14} Total: {:>7}  Hombres: {:>7}  Mujeres: {:>7}",
            company.name,
            tally(company.tally()),
            tally(company.gender_tally(&Gender::Male)),
            tally(company.gender_tally(&Gender::Female)),
        );
    }
    out
}

pub fn render_company(company: &Company) -> String {
    let mut out = format!("{} ({})\n", company.name, tally(company.tally()));
    for participant in &company.participants {
        let mark = if participant.present { 'x' } else { ' ' };
        let _ = writeln!(
            out,
            "  {:>3}. [{mark}] {} - {} / {} - {}",
            participant.id,
            participant.name,
            participant.stake,
            participant.ward,
            participant.location,
        );
    }
    out
}

/// Case-insensitive name search across every company.
pub fn render_person_matches(companies: &[Company], query: &str) -> String {
    let needle = query.to_lowercase();
    let mut out = String::new();
    for company in companies {
        for participant in &company.participants {
            if participant.name.to_lowercase().contains(&needle) {
                let state = if participant.present {
                    "presente"
                } else {
                    "ausente"
                };
                let _ = writeln!(
                    out,
                    "{} - {} ({state}, {})",
                    participant.name, company.name, participant.location
                );
            }
        }
    }
    if out.is_empty() {
        let _ = writeln!(out, "Sin coincidencias para \"{query}\"");
    }
    out
}

pub fn render_menu(menu: &Menu) -> String {
    if menu.input().is_some() {
        return "Nombre de la persona (vacío para cancelar):".to_string();
    }
    match menu.view() {
        MenuView::Root { active } => MenuOption::ALL
            .iter()
            .map(|option| {
                let label = option.label();
                if active == Some(*option) {
                    format!("[{label}]")
                } else {
                    label.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("  "),
        MenuView::Groups => {
            let mut out = String::from("Grupos:");
            for (index, group) in menu.groups().iter().enumerate() {
                let _ = write!(out, "  {}) {}", index + 1, group.label);
            }
            out
        }
        MenuView::Companies { .. } => {
            let mut out = String::from("Compañías:");
            let companies = menu
                .current_group()
                .map(|group| group.companies.as_slice())
                .unwrap_or_default();
            for (index, id) in companies.iter().enumerate() {
                let _ = write!(out, "  {}) {id}", index + 1);
            }
            let _ = write!(out, "  {}) volver", companies.len() + 1);
            out
        }
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
