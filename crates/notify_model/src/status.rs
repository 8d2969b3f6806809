use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CONDITION_READY: &str = "Ready";

/// Observed condition of a declarative object, written through the store's
/// status subresource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: bool,
    pub reason: String,
    pub message: String,
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    pub fn ready(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: CONDITION_READY.into(),
            status: true,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: Utc::now(),
        }
    }
}
