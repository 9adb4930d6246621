use serde_json::Value;
use shared::{domain::ParticipantSnapshot, protocol::ParticipantRecord};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("payload is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedBatch {
    pub records: Vec<ParticipantSnapshot>,
    pub rejected: usize,
}

impl ValidatedBatch {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn decode(payload: Value) -> Result<Value, IntakeError> {
    match payload {
        Value::String(raw) => Ok(serde_json::from_str(&raw)?),
        other => Ok(other),
    }
}

pub fn normalize(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        single => vec![single],
    }
}

/// Keeps only candidates that match the record shape exactly. No partial acceptance.
pub fn validate(candidates: Vec<Value>) -> ValidatedBatch {
    let mut batch = ValidatedBatch::default();
    for (index, candidate) in candidates.into_iter().enumerate() {
        match serde_json::from_value::<ParticipantRecord>(candidate) {
            Ok(record) => batch.records.push(record.into()),
            Err(error) => {
                debug!(index, %error, "dropping malformed participant record");
                batch.rejected += 1;
            }
        }
    }
    batch
}

pub fn intake(payload: Value) -> Result<ValidatedBatch, IntakeError> {
    let decoded = decode(payload)?;
    Ok(validate(normalize(decoded)))
}

pub fn intake_text(raw: &str) -> Result<ValidatedBatch, IntakeError> {
    intake(Value::String(raw.to_string()))
}

#[cfg(test)]
#[path = "tests/intake_tests.rs"]
mod tests;
