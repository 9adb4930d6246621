use super::*;
use crate::highlight::HIGHLIGHT_WINDOW;
use serde_json::json;
use shared::domain::{Gender, ParticipantSnapshot};

fn wire(name: &str, company: i64, asistio: &str) -> Value {
    json!({
        "nombres": name,
        "sexo": "H",
        "estaca": "S1",
        "barrio": "B1",
        "compañia": company,
        "habitacion": "R1",
        "asistio": asistio,
    })
}

fn member(company: i64, present: bool) -> ParticipantSnapshot {
    ParticipantSnapshot {
        name: format!("P{company}"),
        gender: Gender::Male,
        stake: "S".to_string(),
        ward: "W".to_string(),
        company_id: CompanyId(company),
        room_label: "R".to_string(),
        present,
    }
}

#[test]
fn reduce_flags_only_moved_companies() {
    let mut first = vec![member(7, true), member(7, true)];
    first.extend((0..4).map(|_| member(3, true)));
    let previous = PresenceCounters::tally(&first);

    let mut second = vec![member(7, true), member(7, true), member(7, false)];
    second.extend((0..5).map(|_| member(3, true)));
    let batch = ValidatedBatch {
        records: second,
        rejected: 0,
    };

    let reduction = reduce(&previous, &batch);
    assert_eq!(reduction.changed, BTreeSet::from([CompanyId(3)]));
    assert_eq!(reduction.counters.get(CompanyId(3)), 5);
    assert_eq!(reduction.companies.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn presence_flip_highlights_company_then_clears() {
    let board = AttendanceBoard::new(HIGHLIGHT_WINDOW);
    let mut events = board.subscribe();

    let first = board
        .ingest(Value::String(json!([wire("A", 1, "Si")]).to_string()))
        .await
        .expect("first batch");
    assert_eq!(first.accepted, 1);
    let companies = board.companies().await;
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].id, CompanyId(1));
    assert_eq!(companies[0].present(), 1);

    tokio::time::sleep(HIGHLIGHT_WINDOW + Duration::from_millis(1)).await;

    let second = board
        .ingest(json!([wire("A", 1, "No")]))
        .await
        .expect("second batch");
    assert_eq!(second.changed, vec![CompanyId(1)]);
    assert_eq!(board.company(CompanyId(1)).await.expect("company").present(), 0);
    assert_eq!(board.highlighted(), BTreeSet::from([CompanyId(1)]));

    tokio::time::sleep(HIGHLIGHT_WINDOW + Duration::from_millis(1)).await;
    assert!(board.highlighted().is_empty());

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(matches!(
        seen.as_slice(),
        [
            BoardEvent::CompaniesUpdated { .. },
            BoardEvent::HighlightCleared,
            BoardEvent::CompaniesUpdated { .. },
            BoardEvent::HighlightCleared,
        ]
    ));
    if let BoardEvent::CompaniesUpdated { snapshot, changed } = &seen[2] {
        assert_eq!(changed, &vec![CompanyId(1)]);
        assert_eq!(snapshot.highlighted, vec![CompanyId(1)]);
        assert_eq!(snapshot.summary.present_participants, 0);
    }
}

#[tokio::test]
async fn undecodable_payload_keeps_previous_view() {
    let board = AttendanceBoard::new(HIGHLIGHT_WINDOW);
    board
        .ingest(json!([wire("A", 2, "Si")]))
        .await
        .expect("seed");

    let err = board.ingest_text("{not json").await.expect_err("decode failure");
    assert!(matches!(err, IntakeError::Decode(_)));

    let companies = board.companies().await;
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].id, CompanyId(2));
}

#[tokio::test]
async fn empty_or_fully_invalid_batch_clears_the_view() {
    let board = AttendanceBoard::new(HIGHLIGHT_WINDOW);
    board
        .ingest(json!([wire("A", 2, "Si")]))
        .await
        .expect("seed");

    let outcome = board
        .ingest(json!([{ "nombres": 1 }, null]))
        .await
        .expect("invalid batch");
    assert_eq!(outcome.accepted, 0);
    assert_eq!(outcome.rejected, 2);
    assert!(board.companies().await.is_empty());
    assert_eq!(board.summary().await, Summary::default());

    board.ingest_text("[]").await.expect("empty batch");
    assert!(board.companies().await.is_empty());
}

#[tokio::test]
async fn later_batch_does_not_inherit_earlier_records() {
    let board = AttendanceBoard::new(HIGHLIGHT_WINDOW);
    board
        .ingest(json!([wire("A", 1, "Si"), wire("B", 2, "No")]))
        .await
        .expect("first");
    board
        .ingest(json!([wire("C", 3, "No")]))
        .await
        .expect("second");

    let companies = board.companies().await;
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].id, CompanyId(3));
    assert_eq!(companies[0].participants[0].name, "C");
    assert!(board.company(CompanyId(1)).await.is_none());
}

#[tokio::test]
async fn boards_keep_independent_presence_history() {
    let left = AttendanceBoard::new(HIGHLIGHT_WINDOW);
    let right = AttendanceBoard::new(HIGHLIGHT_WINDOW);

    left.ingest(json!([wire("A", 1, "Si")])).await.expect("left");
    let outcome = right.ingest(json!([wire("A", 1, "Si")])).await.expect("right");

    assert_eq!(outcome.changed, vec![CompanyId(1)]);
}

#[tokio::test]
async fn snapshot_reports_acceptance_time() {
    let board = AttendanceBoard::new(HIGHLIGHT_WINDOW);
    assert!(board.snapshot().await.accepted_at.is_none());

    board.ingest(json!([wire("A", 1, "No")])).await.expect("batch");
    let snapshot = board.snapshot().await;
    assert!(snapshot.accepted_at.is_some());
    assert_eq!(snapshot.summary.total_participants, 1);
    assert!(snapshot.highlighted.is_empty());
}

#[tokio::test]
async fn undecodable_payload_keeps_previous_counters() {
    let board = AttendanceBoard::new(HIGHLIGHT_WINDOW);
    board
        .ingest(json!([wire("A", 1, "Si")]))
        .await
        .expect("first batch");

    board.ingest_text("{bad").await.expect_err("decode failure");

    let outcome = board
        .ingest(json!([wire("A", 1, "Si")]))
        .await
        .expect("same batch again");
    assert!(outcome.changed.is_empty());
}

#[tokio::test]
async fn counters_are_replaced_so_a_returning_company_is_flagged() {
    let board = AttendanceBoard::new(HIGHLIGHT_WINDOW);
    board
        .ingest(json!([wire("A", 1, "Si")]))
        .await
        .expect("first batch");
    board
        .ingest(json!([wire("B", 2, "Si")]))
        .await
        .expect("company 1 missing");

    let outcome = board
        .ingest(json!([wire("A", 1, "Si"), wire("B", 2, "Si")]))
        .await
        .expect("company 1 back");
    assert_eq!(outcome.changed, vec![CompanyId(1)]);
}
