//! ttadmin HTTP Client
//!
//! A type-safe client for the admin surface of the timetable service, plus
//! the job submission and polling machinery built on top of it.
//!
//! The backend runs maintenance work (snapshots, storage cleansing,
//! timetable refresh) as long-running jobs. This crate submits them,
//! polls them to a terminal state and reports back.
//!
//! # Example
//!
//! ```no_run
//! use ttadmin_client::AdminClient;
//! use ttadmin_client::poller::{JobPoller, PollOptions, CancelSignal};
//! use ttadmin_client::runner::{run_job, JobRun, NoopObserver};
//! use ttadmin_core::domain::job::JobRequest;
//! use ttadmin_core::domain::snapshot::SnapshotType;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = AdminClient::new("http://localhost:8000")
//!         .with_csrf_token("token")
//!         .with_cookie("sessionid=abc; csrftoken=token");
//!
//!     let poller = JobPoller::new(Arc::new(client), PollOptions::default());
//!     let request = JobRequest::snapshot(SnapshotType::Database);
//!
//!     match run_job(&poller, &request, &CancelSignal::never(), &mut NoopObserver).await {
//!         JobRun::Rejected => println!("job was not accepted"),
//!         JobRun::Completed { handle, outcome } => println!("job {}: {:?}", handle, outcome),
//!     }
//! }
//! ```

pub mod cookies;
pub mod error;
mod jobs;
pub mod poller;
pub mod runner;
mod settings;
mod snapshots;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use poller::{CancelHandle, CancelSignal, JobBackend, JobPoller, PollOptions, PollOutcome};

use reqwest::{Client, RequestBuilder, header};
use serde::de::DeserializeOwned;
use ttadmin_core::dto::settings::ErrorBody;

/// Header Django reads the anti-forgery token from
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// HTTP client for the timetable admin API
///
/// Endpoints are grouped into:
/// - Job submission and status (snapshot, manage_storage, update_timetable)
/// - System settings and the credential file upload
/// - Snapshot links and downloads
#[derive(Debug, Clone)]
pub struct AdminClient {
    /// Base URL of the service (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Value for the `X-CSRFToken` header
    csrf_token: Option<String>,
    /// Raw `Cookie` header carrying the session
    cookie: Option<String>,
}

impl AdminClient {
    /// Create a new admin client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the service (e.g., "http://localhost:8000")
    ///
    /// # Example
    /// ```
    /// use ttadmin_client::AdminClient;
    ///
    /// let client = AdminClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new admin client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use ttadmin_client::AdminClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = AdminClient::with_client("http://localhost:8000", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            csrf_token: None,
            cookie: None,
        }
    }

    /// Set the CSRF token sent with mutating requests
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Set the `Cookie` header sent with every request
    ///
    /// When no CSRF token was set explicitly, the `csrftoken` entry of the
    /// cookie is used.
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        let cookie = cookie.into();
        if self.csrf_token.is_none() {
            self.csrf_token = cookies::cookie_value(&cookie, cookies::CSRF_COOKIE);
        }
        self.cookie = Some(cookie);
        self
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// URL of an endpoint under the admin base path
    pub fn admin_url(&self, endpoint: &str) -> String {
        format!("{}/admin/{}", self.base_url, endpoint)
    }

    /// URL of a file under the static root
    pub fn static_url(&self, path: &str) -> String {
        format!("{}/static/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach the session cookie and, for mutating requests, the CSRF header
    fn authorize(&self, builder: RequestBuilder, mutating: bool) -> RequestBuilder {
        let mut builder = builder;
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if mutating {
            if let Some(token) = &self.csrf_token {
                builder = builder.header(CSRF_HEADER, token);
            }
        }
        builder
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            return Err(Self::error_from(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is not needed
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(())
    }

    /// Build an `ApiError`, preferring the backend's `error_message`
    async fn error_from(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message().map(str::to_string))
            .unwrap_or(text);

        ClientError::api_error(status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = AdminClient::new("http://localhost:8000");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert!(client.csrf_token().is_none());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = AdminClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.admin_url("set_system_params/"),
            "http://localhost:8000/admin/set_system_params/"
        );
    }

    #[test]
    fn test_static_url() {
        let client = AdminClient::new("http://localhost:8000");
        assert_eq!(
            client.static_url("/snapshots/db.zip"),
            "http://localhost:8000/static/snapshots/db.zip"
        );
    }

    #[test]
    fn test_csrf_token_taken_from_cookie() {
        let client = AdminClient::new("http://localhost:8000")
            .with_cookie("sessionid=s3ss; csrftoken=abc%3D%3D");
        assert_eq!(client.csrf_token(), Some("abc=="));
    }

    #[test]
    fn test_explicit_csrf_token_wins() {
        let client = AdminClient::new("http://localhost:8000")
            .with_csrf_token("explicit")
            .with_cookie("csrftoken=from-cookie");
        assert_eq!(client.csrf_token(), Some("explicit"));
    }
}
