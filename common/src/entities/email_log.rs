use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Success,
    Failed,
    Simulated,
}

/// One record per send attempt. Logs are an append-only audit trail:
/// never mutated, deletable individually or wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailLogEntry {
    #[serde(default)]
    pub id: String,
    pub recipient: String,
    pub status: EmailStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}
