use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use shared::{domain::CompanyId, protocol::BoardEvent};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::debug;

pub const HIGHLIGHT_WINDOW: Duration = Duration::from_millis(2000);

#[derive(Default)]
struct HighlightState {
    ids: BTreeSet<CompanyId>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

// One expiry timer at most. Arming again aborts it and restarts the window.
pub struct HighlightWindow {
    duration: Duration,
    state: Arc<Mutex<HighlightState>>,
    events: broadcast::Sender<BoardEvent>,
}

fn lock(state: &Mutex<HighlightState>) -> MutexGuard<'_, HighlightState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HighlightWindow {
    pub fn new(duration: Duration, events: broadcast::Sender<BoardEvent>) -> Self {
        Self {
            duration,
            state: Arc::new(Mutex::new(HighlightState::default())),
            events,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Must be called from within a tokio runtime. An empty set leaves the current window alone.
    pub fn arm(&self, ids: BTreeSet<CompanyId>) {
        if ids.is_empty() {
            return;
        }

        let mut state = lock(&self.state);
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        state.ids = ids;

        let generation = state.generation;
        let duration = self.duration;
        let weak = Arc::downgrade(&self.state);
        let events = self.events.clone();
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let Some(state) = weak.upgrade() else {
                return;
            };
            {
                let mut guard = lock(&state);
                if guard.generation != generation {
                    return;
                }
                guard.ids.clear();
                guard.timer = None;
            }
            debug!(generation, "highlight window expired");
            let _ = events.send(BoardEvent::HighlightCleared);
        }));
    }

    pub fn highlighted(&self) -> BTreeSet<CompanyId> {
        lock(&self.state).ids.clone()
    }
}

impl Drop for HighlightWindow {
    fn drop(&mut self) {
        if let Some(timer) = lock(&self.state).timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/highlight_tests.rs"]
mod tests;
