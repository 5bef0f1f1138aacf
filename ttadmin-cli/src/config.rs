//! Configuration module
//!
//! Connection settings for the admin backend: where it lives and which
//! session to act as.

use anyhow::{Result, bail};
use ttadmin_client::AdminClient;
use ttadmin_client::cookies::{CSRF_COOKIE, SESSION_COOKIE, cookie_header};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the timetable service
    pub base_url: String,

    /// Explicit CSRF token
    pub csrf_token: Option<String>,

    /// Session id used to build the Cookie header
    pub session_id: Option<String>,

    /// Raw Cookie header; takes precedence over `session_id`
    pub cookie: Option<String>,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            bail!("base_url cannot be empty");
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            bail!("base_url must start with http:// or https://");
        }

        Ok(())
    }

    /// Cookie header to send, if any
    ///
    /// Built from the session id and CSRF token unless a raw header was given.
    pub fn cookie_header(&self) -> Option<String> {
        if let Some(raw) = &self.cookie {
            return Some(raw.clone());
        }

        let mut pairs = Vec::new();
        if let Some(session) = &self.session_id {
            pairs.push((SESSION_COOKIE, session.as_str()));
        }
        if let Some(token) = &self.csrf_token {
            pairs.push((CSRF_COOKIE, token.as_str()));
        }

        if pairs.is_empty() {
            None
        } else {
            Some(cookie_header(pairs))
        }
    }

    /// Admin client for this configuration
    pub fn client(&self) -> AdminClient {
        let mut client = AdminClient::new(self.base_url.clone());
        if let Some(token) = &self.csrf_token {
            client = client.with_csrf_token(token.clone());
        }
        if let Some(cookie) = self.cookie_header() {
            client = client.with_cookie(cookie);
        }
        client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            base_url: "http://localhost:8000".to_string(),
            csrf_token: None,
            session_id: None,
            cookie: None,
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = config();
        assert!(config.validate().is_ok());

        config.base_url = "localhost:8000".to_string();
        assert!(config.validate().is_err());

        config.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cookie_built_from_session_and_token() {
        let config = Config {
            session_id: Some("s3ss".to_string()),
            csrf_token: Some("tok".to_string()),
            ..config()
        };
        assert_eq!(
            config.cookie_header().as_deref(),
            Some("sessionid=s3ss; csrftoken=tok")
        );
        assert_eq!(config.client().csrf_token(), Some("tok"));
    }

    #[test]
    fn test_raw_cookie_wins_and_supplies_token() {
        let config = Config {
            session_id: Some("ignored".to_string()),
            cookie: Some("sessionid=raw; csrftoken=from-cookie".to_string()),
            ..config()
        };
        assert_eq!(
            config.cookie_header().as_deref(),
            Some("sessionid=raw; csrftoken=from-cookie")
        );
        assert_eq!(config.client().csrf_token(), Some("from-cookie"));
    }

    #[test]
    fn test_no_cookie_without_credentials() {
        assert!(config().cookie_header().is_none());
        assert!(config().client().csrf_token().is_none());
    }
}
