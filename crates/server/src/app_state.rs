use std::sync::Arc;

use attendance::AttendanceBoard;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) board: Arc<AttendanceBoard>,
}
