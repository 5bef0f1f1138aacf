//! System settings and the edit-tracking state around them

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by client-side settings checks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("time_update must be a positive number of minutes, got '{0}'")]
    InvalidTimeUpdate(String),

    #[error("analyze_url must not be empty")]
    EmptyAnalyzeUrl,

    #[error("no settings changed")]
    NothingChanged,
}

/// Settings accepted by `set_system_params`
///
/// Every field is optional; absent fields are left untouched by the backend
/// and are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemParams {
    /// Timetable refresh period in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_update: Option<String>,

    /// Root url of the site the timetable is scraped from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyze_url: Option<String>,

    /// Storage downloaded files go to (`google drive`, `local`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_storage: Option<String>,
}

impl SystemParams {
    pub fn is_empty(&self) -> bool {
        self.time_update.is_none() && self.analyze_url.is_none() && self.download_storage.is_none()
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.is_empty() {
            return Err(SettingsError::NothingChanged);
        }

        if let Some(minutes) = &self.time_update {
            match minutes.trim().parse::<u32>() {
                Ok(m) if m > 0 => {}
                _ => return Err(SettingsError::InvalidTimeUpdate(minutes.clone())),
            }
        }

        if matches!(&self.analyze_url, Some(url) if url.trim().is_empty()) {
            return Err(SettingsError::EmptyAnalyzeUrl);
        }

        Ok(())
    }
}

/// Edited settings compared against the values last saved
///
/// Replaces the page-global "initial values" of the web console: the
/// baseline is what the backend is known to hold, `current` is what the
/// operator has typed since.
#[derive(Debug, Clone, Default)]
pub struct SettingsDraft {
    baseline: SystemParams,
    current: SystemParams,
}

impl SettingsDraft {
    pub fn new(baseline: SystemParams) -> Self {
        Self {
            current: baseline.clone(),
            baseline,
        }
    }

    pub fn set_time_update(&mut self, minutes: impl Into<String>) {
        self.current.time_update = Some(minutes.into());
    }

    /// Surrounding whitespace is dropped
    pub fn set_analyze_url(&mut self, url: impl AsRef<str>) {
        self.current.analyze_url = Some(url.as_ref().trim().to_string());
    }

    pub fn set_download_storage(&mut self, storage: impl Into<String>) {
        self.current.download_storage = Some(storage.into());
    }

    /// Only the fields that differ from the baseline
    pub fn changes(&self) -> SystemParams {
        fn changed(current: &Option<String>, baseline: &Option<String>) -> Option<String> {
            if current != baseline {
                current.clone()
            } else {
                None
            }
        }

        SystemParams {
            time_update: changed(&self.current.time_update, &self.baseline.time_update),
            analyze_url: changed(&self.current.analyze_url, &self.baseline.analyze_url),
            download_storage: changed(
                &self.current.download_storage,
                &self.baseline.download_storage,
            ),
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes().is_empty()
    }

    /// Mark the current values as saved
    pub fn commit(&mut self) {
        self.baseline = self.current.clone();
    }

    pub fn current(&self) -> &SystemParams {
        &self.current
    }

    pub fn baseline(&self) -> &SystemParams {
        &self.baseline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved() -> SystemParams {
        SystemParams {
            time_update: Some("180".to_string()),
            analyze_url: Some("https://example.edu/timetable".to_string()),
            download_storage: Some("local".to_string()),
        }
    }

    #[test]
    fn test_fresh_draft_is_clean() {
        let draft = SettingsDraft::new(saved());
        assert!(!draft.is_dirty());
        assert!(draft.changes().is_empty());
    }

    #[test]
    fn test_changes_only_include_edited_fields() {
        let mut draft = SettingsDraft::new(saved());
        draft.set_time_update("60");
        draft.set_download_storage("local");

        let changes = draft.changes();
        assert_eq!(changes.time_update.as_deref(), Some("60"));
        assert_eq!(changes.analyze_url, None);
        assert_eq!(changes.download_storage, None);
        assert!(draft.is_dirty());
    }

    #[test]
    fn test_commit_resets_dirty_state() {
        let mut draft = SettingsDraft::new(saved());
        draft.set_analyze_url("  https://example.edu/new  ");
        assert_eq!(
            draft.changes().analyze_url.as_deref(),
            Some("https://example.edu/new")
        );

        draft.commit();
        assert!(!draft.is_dirty());
        assert_eq!(
            draft.baseline().analyze_url.as_deref(),
            Some("https://example.edu/new")
        );
    }

    #[test]
    fn test_serialization_skips_absent_fields() {
        let params = SystemParams {
            time_update: Some("30".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({ "time_update": "30" }));
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            SystemParams::default().validate(),
            Err(SettingsError::NothingChanged)
        );

        let bad_minutes = SystemParams {
            time_update: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bad_minutes.validate(),
            Err(SettingsError::InvalidTimeUpdate(_))
        ));

        let zero = SystemParams {
            time_update: Some("0".to_string()),
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let blank_url = SystemParams {
            analyze_url: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank_url.validate(), Err(SettingsError::EmptyAnalyzeUrl));

        assert!(saved().validate().is_ok());
    }
}
