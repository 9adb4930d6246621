pub mod board;
pub mod changes;
pub mod highlight;
pub mod intake;
pub mod projection;

pub use board::{reduce, AttendanceBoard, IngestOutcome, Reduction};
pub use changes::PresenceCounters;
pub use highlight::{HighlightWindow, HIGHLIGHT_WINDOW};
pub use intake::{IntakeError, ValidatedBatch};
pub use projection::{project, summarize};
