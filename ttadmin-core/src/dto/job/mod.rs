//! Job DTOs exchanged with the admin backend

use serde::{Deserialize, Serialize};

use crate::domain::job::{JobHandle, JobStatus, UNKNOWN_ERROR};

/// Reply to a job submission (`{"status": "running", "id": 17}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitJobResponse {
    #[serde(default)]
    pub id: Option<JobHandle>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Status string as reported by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireStatus {
    Running,
    Success,
    Error,
    /// Anything else; read as still running
    #[default]
    #[serde(other)]
    Unknown,
}

/// Reply to a status query (`GET <endpoint>?process_id=<id>`)
///
/// Snapshot and cleansing jobs put their error message inside `result`,
/// timetable updates put it at the top level. Both shapes are read here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStatusResponse {
    #[serde(default)]
    pub status: WireStatus,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl JobStatusResponse {
    fn message(&self) -> String {
        self.result
            .as_ref()
            .and_then(|r| r.get("error_message"))
            .and_then(serde_json::Value::as_str)
            .filter(|m| !m.is_empty())
            .or(self.error_message.as_deref().filter(|m| !m.is_empty()))
            .unwrap_or(UNKNOWN_ERROR)
            .to_string()
    }
}

impl From<JobStatusResponse> for JobStatus {
    fn from(reply: JobStatusResponse) -> Self {
        match reply.status {
            WireStatus::Success => JobStatus::Success {
                result: reply.result,
            },
            WireStatus::Error => JobStatus::Error {
                message: reply.message(),
                detail: reply.result,
            },
            WireStatus::Running | WireStatus::Unknown => JobStatus::Running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(value: serde_json::Value) -> JobStatus {
        serde_json::from_value::<JobStatusResponse>(value)
            .unwrap()
            .into()
    }

    #[test]
    fn test_snapshot_success_carries_url() {
        let s = status(json!({
            "status": "success",
            "result": { "url": "snapshots/full.zip" },
            "error_message": null
        }));
        assert_eq!(s.download_url(), Some("snapshots/full.zip"));
    }

    #[test]
    fn test_error_message_from_result() {
        let s = status(json!({
            "status": "error",
            "result": { "error_message": "disk full" }
        }));
        assert_eq!(s.error_message(), Some("disk full"));
    }

    #[test]
    fn test_error_message_from_top_level_keeps_detail() {
        let s = status(json!({
            "status": "error",
            "error_message": "site unreachable",
            "result": { "step": "download" }
        }));
        match s {
            JobStatus::Error { message, detail } => {
                assert_eq!(message, "site unreachable");
                assert_eq!(detail, Some(json!({ "step": "download" })));
            }
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[test]
    fn test_error_without_message() {
        let s = status(json!({ "status": "error", "result": null }));
        assert_eq!(s.error_message(), Some(UNKNOWN_ERROR));
    }

    #[test]
    fn test_empty_result_message_falls_back_to_top_level() {
        let s = status(json!({
            "status": "error",
            "error_message": "parser crashed",
            "result": { "error_message": "" }
        }));
        assert_eq!(s.error_message(), Some("parser crashed"));

        let s = status(json!({
            "status": "error",
            "error_message": "",
            "result": { "error_message": "" }
        }));
        assert_eq!(s.error_message(), Some(UNKNOWN_ERROR));
    }

    #[test]
    fn test_unknown_or_missing_status_is_running() {
        assert_eq!(status(json!({ "status": "queued" })), JobStatus::Running);
        assert_eq!(status(json!({})), JobStatus::Running);
        assert_eq!(status(json!({ "status": "running" })), JobStatus::Running);
    }

    #[test]
    fn test_submit_reply_without_id() {
        let reply: SubmitJobResponse =
            serde_json::from_value(json!({ "status": "running" })).unwrap();
        assert!(reply.id.is_none());

        let reply: SubmitJobResponse =
            serde_json::from_value(json!({ "status": "running", "id": 17 })).unwrap();
        assert_eq!(reply.id, Some(JobHandle::new("17")));
    }
}
