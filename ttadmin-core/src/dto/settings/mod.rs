//! Settings, credential upload and snapshot link DTOs

use serde::{Deserialize, Serialize};

/// Error body the backend returns alongside a failing status code
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// `error_message`, falling back to `message`
    pub fn message(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .or(self.message.as_deref())
            .filter(|m| !m.is_empty())
    }

    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// Reply to `GET snapshot?snapshot_type=<type>`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LastSnapshotResponse {
    /// Empty when no snapshot of that type exists
    #[serde(default)]
    pub url: Option<String>,
}
