use super::*;

fn snapshot(name: &str, gender: &str, company: i64, present: bool) -> ParticipantSnapshot {
    ParticipantSnapshot {
        name: name.to_string(),
        gender: Gender::from(gender.to_string()),
        stake: "S1".to_string(),
        ward: "B1".to_string(),
        company_id: CompanyId(company),
        room_label: format!("R{company}"),
        present,
    }
}

#[test]
fn groups_by_company_in_ascending_order() {
    let records = vec![
        snapshot("A", "H", 7, true),
        snapshot("B", "M", 3, false),
        snapshot("C", "H", 7, false),
        snapshot("D", "M", 1, true),
    ];
    let companies = project(&records);

    let ids: Vec<_> = companies.iter().map(|c| c.id).collect();
    assert_eq!(ids, [CompanyId(1), CompanyId(3), CompanyId(7)]);
    assert_eq!(companies[2].name, "Compañía 7");

    let seventh: Vec<_> = companies[2]
        .participants
        .iter()
        .map(|p| (p.id, p.name.as_str(), p.location.as_str()))
        .collect();
    assert_eq!(seventh, [(1, "A", "R7"), (2, "C", "R7")]);
}

#[test]
fn grouping_ignores_order_across_companies() {
    let forward = vec![
        snapshot("A", "H", 2, true),
        snapshot("B", "M", 1, true),
        snapshot("C", "H", 2, false),
    ];
    let shuffled = vec![forward[1].clone(), forward[0].clone(), forward[2].clone()];

    assert_eq!(project(&forward), project(&shuffled));
}

#[test]
fn projection_is_idempotent() {
    let records = vec![snapshot("A", "H", 5, true), snapshot("B", "M", 5, false)];
    assert_eq!(project(&records), project(&records));
}

#[test]
fn empty_records_project_to_no_companies() {
    assert!(project(&[]).is_empty());
    assert_eq!(summarize(&[]), Summary::default());
}

#[test]
fn per_company_and_overall_figures() {
    let records = vec![
        snapshot("A", "H", 1, true),
        snapshot("B", "H", 1, false),
        snapshot("C", "M", 1, true),
        snapshot("D", "M", 2, false),
        snapshot("E", "X", 2, true),
    ];
    let companies = project(&records);

    let first = &companies[0];
    assert_eq!(first.total(), 3);
    assert_eq!(first.present(), 2);
    let male = first.gender_tally(&Gender::Male);
    assert_eq!((male.present, male.total), (1, 2));
    let female = first.gender_tally(&Gender::Female);
    assert_eq!((female.present, female.total), (1, 1));

    let summary = summarize(&companies);
    assert_eq!(summary.total_companies, 2);
    assert_eq!(summary.total_participants, 5);
    assert_eq!(summary.male_participants, 2);
    assert_eq!(summary.female_participants, 2);
    assert_eq!(summary.present_participants, 3);
}
