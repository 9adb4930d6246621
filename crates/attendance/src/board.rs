use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::{
    domain::CompanyId,
    protocol::{BoardEvent, BoardSnapshot, Company, Summary},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    changes::PresenceCounters,
    highlight::HighlightWindow,
    intake::{self, IntakeError, ValidatedBatch},
    projection::{project, summarize},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    pub companies: Vec<Company>,
    pub counters: PresenceCounters,
    pub changed: BTreeSet<CompanyId>,
}

/// The view depends only on `batch`; `previous` is read solely for change detection.
pub fn reduce(previous: &PresenceCounters, batch: &ValidatedBatch) -> Reduction {
    let companies = project(&batch.records);
    let counters = PresenceCounters::tally(&batch.records);
    let changed = counters.changed_since(previous);
    Reduction {
        companies,
        counters,
        changed,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub accepted: usize,
    pub rejected: usize,
    pub changed: Vec<CompanyId>,
}

#[derive(Default)]
struct BoardState {
    companies: Vec<Company>,
    counters: PresenceCounters,
    accepted_at: Option<DateTime<Utc>>,
}

pub struct AttendanceBoard {
    inner: Mutex<BoardState>,
    highlight: HighlightWindow,
    events: broadcast::Sender<BoardEvent>,
}

impl AttendanceBoard {
    pub fn new(highlight_window: Duration) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            inner: Mutex::new(BoardState::default()),
            highlight: HighlightWindow::new(highlight_window, events.clone()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    /// Applies one channel payload. A payload that fails to decode is logged
    /// and returned as an error; the current view is kept as is.
    pub async fn ingest(&self, payload: Value) -> Result<IngestOutcome, IntakeError> {
        match intake::intake(payload) {
            Ok(batch) => Ok(self.apply(batch).await),
            Err(error) => {
                warn!(%error, "discarding undecodable participant snapshot");
                Err(error)
            }
        }
    }

    pub async fn ingest_text(&self, raw: &str) -> Result<IngestOutcome, IntakeError> {
        self.ingest(Value::String(raw.to_string())).await
    }

    pub async fn apply(&self, batch: ValidatedBatch) -> IngestOutcome {
        if batch.is_empty() {
            info!(rejected = batch.rejected, "no valid participant records; clearing view");
        }
        let mut state = self.inner.lock().await;
        let Reduction {
            companies,
            counters,
            changed,
        } = reduce(&state.counters, &batch);

        state.companies = companies;
        state.counters = counters;
        state.accepted_at = Some(Utc::now());

        debug!(
            accepted = batch.records.len(),
            rejected = batch.rejected,
            companies = state.companies.len(),
            changed = ?changed,
            "accepted participant snapshot"
        );

        let changed_ids: Vec<CompanyId> = changed.iter().copied().collect();
        self.highlight.arm(changed);

        let snapshot = self.snapshot_of(&state);
        let _ = self.events.send(BoardEvent::CompaniesUpdated {
            snapshot,
            changed: changed_ids.clone(),
        });

        IngestOutcome {
            accepted: batch.records.len(),
            rejected: batch.rejected,
            changed: changed_ids,
        }
    }

    pub async fn companies(&self) -> Vec<Company> {
        self.inner.lock().await.companies.clone()
    }

    pub async fn company(&self, company_id: CompanyId) -> Option<Company> {
        self.inner
            .lock()
            .await
            .companies
            .iter()
            .find(|c| c.id == company_id)
            .cloned()
    }

    pub async fn summary(&self) -> Summary {
        summarize(&self.inner.lock().await.companies)
    }

    pub fn highlighted(&self) -> BTreeSet<CompanyId> {
        self.highlight.highlighted()
    }

    pub async fn snapshot(&self) -> BoardSnapshot {
        let state = self.inner.lock().await;
        self.snapshot_of(&state)
    }

    fn snapshot_of(&self, state: &BoardState) -> BoardSnapshot {
        BoardSnapshot {
            companies: state.companies.clone(),
            summary: summarize(&state.companies),
            highlighted: self.highlight.highlighted().into_iter().collect(),
            accepted_at: state.accepted_at,
        }
    }
}

#[cfg(test)]
#[path = "tests/board_tests.rs"]
mod tests;
