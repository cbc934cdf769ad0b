use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Upstream-assigned identifier. Kept in whatever shape upstream emitted it
/// so an edited record goes back exactly as it came.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(Number),
}

/// Inbound body for create and update. Anything that does not carry both
/// `nombre` and `email` as strings is rejected before reaching upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub nombre: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Wraps a plain-text delete confirmation.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}
