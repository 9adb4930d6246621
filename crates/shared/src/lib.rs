pub mod domain;
pub mod error;
pub mod protocol;

pub const PARTICIPANT_CHANNEL: &str = "participantes-ordenados";
