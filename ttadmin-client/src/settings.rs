//! System settings and credential upload endpoints

use reqwest::multipart::{Form, Part};
use std::path::Path;
use tracing::info;
use ttadmin_core::domain::job::UNKNOWN_ERROR;
use ttadmin_core::domain::settings::SystemParams;
use ttadmin_core::dto::settings::ErrorBody;

use crate::AdminClient;
use crate::error::{ClientError, Result};

/// Multipart field the credential file is sent in
const AUTH_FILE_FIELD: &str = "authFile";

impl AdminClient {
    // =============================================================================
    // System Settings
    // =============================================================================

    /// Save system settings
    ///
    /// Only the fields present in `params` are sent. An empty change set is
    /// refused before anything goes over the wire.
    pub async fn set_system_params(&self, params: &SystemParams) -> Result<()> {
        params.validate()?;

        let url = self.admin_url("set_system_params/");
        let response = self
            .authorize(self.client.post(&url), true)
            .json(params)
            .send()
            .await?;

        self.handle_empty_response(response).await?;

        info!("System settings saved");
        Ok(())
    }

    // =============================================================================
    // Credentials
    // =============================================================================

    /// Upload the Google Drive credentials file
    ///
    /// # Arguments
    /// * `path` - Path to a `.json` credentials file
    ///
    /// # Errors
    /// `InvalidRequest` if the file name does not end in `.json`; `ApiError`
    /// when the backend does not answer `{"status": "success"}`.
    pub async fn upload_auth_file(&self, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| name.ends_with(".json"))
            .ok_or_else(|| {
                ClientError::InvalidRequest(format!(
                    "credentials file must be a .json file: {}",
                    path.display()
                ))
            })?
            .to_string();

        let bytes = tokio::fs::read(path).await?;
        let part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str("application/json")?;
        let form = Form::new().part(AUTH_FILE_FIELD, part);

        let url = self.admin_url("put_google_auth_file/");
        let response = self
            .authorize(self.client.post(&url), true)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body: ErrorBody = serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                ClientError::ParseError(format!("Failed to parse upload reply: {}", e))
            } else {
                ClientError::api_error(status.as_u16(), text.clone())
            }
        })?;

        if status.is_success() && body.is_success() {
            info!("Uploaded credentials file {}", file_name);
            return Ok(());
        }

        Err(ClientError::api_error(
            status.as_u16(),
            body.message().unwrap_or(UNKNOWN_ERROR),
        ))
    }
}
