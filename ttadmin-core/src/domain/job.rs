//! Job domain types

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::snapshot::{SnapshotType, StorageComponent};

/// Fallback message for an `error` status that carries none
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Action that starts a long-running backend job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobAction {
    /// Build a new snapshot of some part of the system
    MakeNew,
    /// Cleanse a storage component
    Dell,
    /// Re-scan the source site and refresh the timetable
    UpdateTimetable,
}

impl JobAction {
    /// Wire name of the action, as sent in the `action` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            JobAction::MakeNew => "make_new",
            JobAction::Dell => "dell",
            JobAction::UpdateTimetable => "update_timetable",
        }
    }

    /// Endpoint this action is submitted to
    pub fn kind(&self) -> JobKind {
        match self {
            JobAction::MakeNew => JobKind::Snapshot,
            JobAction::Dell => JobKind::ManageStorage,
            JobAction::UpdateTimetable => JobKind::UpdateTimetable,
        }
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobAction {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "make_new" => Ok(JobAction::MakeNew),
            "dell" => Ok(JobAction::Dell),
            "update_timetable" => Ok(JobAction::UpdateTimetable),
            other => Err(RequestError::UnknownAction(other.to_string())),
        }
    }
}

/// Backend endpoint a job is submitted to and polled on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Snapshot,
    ManageStorage,
    UpdateTimetable,
}

impl JobKind {
    /// Path relative to the admin base path
    pub fn path(&self) -> &'static str {
        match self {
            JobKind::Snapshot => "snapshot",
            JobKind::ManageStorage => "manage_storage",
            JobKind::UpdateTimetable => "update_timetable",
        }
    }

    /// Human-readable name used in progress output
    pub fn label(&self) -> &'static str {
        match self {
            JobKind::Snapshot => "snapshot",
            JobKind::ManageStorage => "storage cleansing",
            JobKind::UpdateTimetable => "timetable update",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Errors raised while building or validating a [`JobRequest`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("unknown job action '{0}'")]
    UnknownAction(String),

    #[error("action '{action}' requires parameter '{param}'")]
    MissingParam {
        action: JobAction,
        param: &'static str,
    },

    #[error("action '{action}' does not accept parameter '{param}'")]
    UnexpectedParam { action: JobAction, param: String },

    #[error("invalid value '{value}' for parameter '{param}'")]
    InvalidParam { param: &'static str, value: String },
}

/// Request to start a job: an action plus its form parameters
///
/// Parameters are kept in a `BTreeMap`, so keys are unique and the form
/// body is stable regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    action: JobAction,
    params: BTreeMap<String, String>,
}

impl JobRequest {
    /// Request a new snapshot of the given type
    pub fn snapshot(snapshot: SnapshotType) -> Self {
        let mut params = BTreeMap::new();
        params.insert("snapshot".to_string(), snapshot.as_str().to_string());
        Self {
            action: JobAction::MakeNew,
            params,
        }
    }

    /// Request cleansing of a storage component
    pub fn cleanse(component: StorageComponent) -> Self {
        let mut params = BTreeMap::new();
        params.insert("component".to_string(), component.as_str().to_string());
        Self {
            action: JobAction::Dell,
            params,
        }
    }

    /// Request a timetable refresh
    pub fn update_timetable() -> Self {
        Self {
            action: JobAction::UpdateTimetable,
            params: BTreeMap::new(),
        }
    }

    /// Build a request from raw parts, validating the parameters
    pub fn new(action: JobAction, params: BTreeMap<String, String>) -> Result<Self, RequestError> {
        let request = Self { action, params };
        request.validate()?;
        Ok(request)
    }

    /// Check the parameters against what the action expects
    ///
    /// `make_new` needs a `snapshot` from the known snapshot types,
    /// `dell` needs a `component` from the known storage components, and
    /// `update_timetable` takes nothing.
    pub fn validate(&self) -> Result<(), RequestError> {
        let required = match self.action {
            JobAction::MakeNew => Some("snapshot"),
            JobAction::Dell => Some("component"),
            JobAction::UpdateTimetable => None,
        };

        if let Some(unexpected) = self.params.keys().find(|k| Some(k.as_str()) != required) {
            return Err(RequestError::UnexpectedParam {
                action: self.action,
                param: unexpected.clone(),
            });
        }

        let Some(param) = required else {
            return Ok(());
        };

        let value = self
            .params
            .get(param)
            .ok_or(RequestError::MissingParam {
                action: self.action,
                param,
            })?;

        match self.action {
            JobAction::MakeNew => value.parse::<SnapshotType>().map(|_| ()),
            JobAction::Dell => value.parse::<StorageComponent>().map(|_| ()),
            JobAction::UpdateTimetable => Ok(()),
        }
    }

    pub fn action(&self) -> JobAction {
        self.action
    }

    pub fn kind(&self) -> JobKind {
        self.action.kind()
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Look up a single parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Form fields in submission order: `action` first, then the parameters
    pub fn form_fields(&self) -> Vec<(&str, &str)> {
        let mut fields = Vec::with_capacity(self.params.len() + 1);
        fields.push(("action", self.action.as_str()));
        fields.extend(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        fields
    }
}

/// Opaque identifier of a backend job
///
/// The backend hands out integer ids, but nothing on the client side
/// depends on that: integers and strings are both accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for JobHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Signed(i64),
            Unsigned(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Signed(id) => JobHandle(id.to_string()),
            RawId::Unsigned(id) => JobHandle(id.to_string()),
            RawId::Text(id) => JobHandle(id),
        })
    }
}

/// Observed status of a job
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    /// Still running (or not yet known)
    Running,
    /// Finished successfully, optionally with a result payload
    Success { result: Option<serde_json::Value> },
    /// Finished with an error
    Error {
        message: String,
        detail: Option<serde_json::Value>,
    },
}

impl JobStatus {
    /// `success` and `error` end polling
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Running)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Success { .. })
    }

    /// Download link carried by a successful snapshot job
    pub fn download_url(&self) -> Option<&str> {
        match self {
            JobStatus::Success { result: Some(result) } => result
                .get("url")
                .and_then(serde_json::Value::as_str)
                .filter(|url| !url.is_empty()),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            JobStatus::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Running => f.write_str("running"),
            JobStatus::Success { .. } => f.write_str("success"),
            JobStatus::Error { message, .. } => write!(f, "error: {}", message),
        }
    }
}
