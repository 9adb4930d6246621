use shared::domain::ParticipantId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("participant {0} not found")]
    ParticipantNotFound(ParticipantId),
    #[error("channel url must use ws, wss, http or https: {0}")]
    InvalidChannelUrl(String),
}
