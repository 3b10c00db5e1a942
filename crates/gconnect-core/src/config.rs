//! Portal endpoints and transport settings.
//!
//! Every URL the SSO handshake and the data calls touch is derived from
//! `portal_url` and `sso_url`, so pointing both at a local server is enough
//! to exercise the whole client.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::query::QuerySpec;

/// Production web portal
const DEFAULT_PORTAL_URL: &str = "https://connect.garmin.com";

/// Production SSO host
const DEFAULT_SSO_URL: &str = "https://sso.garmin.com";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// The portal only serves the login form to browser-looking clients
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Client id the SSO service associates with the web portal
const SSO_CLIENT_ID: &str = "GarminConnect";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub portal_url: String,
    pub sso_url: String,
    /// Directory holding session cookie files; the platform temp dir if unset
    pub session_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            portal_url: DEFAULT_PORTAL_URL.to_string(),
            sso_url: DEFAULT_SSO_URL.to_string(),
            session_dir: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl PortalConfig {
    /// Config with both the portal and the SSO host at `base_url`
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            portal_url: base.clone(),
            sso_url: base,
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_dir(&self) -> PathBuf {
        self.session_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Absolute URL for a path on the portal
    pub fn portal(&self, path: &str) -> String {
        format!("{}{}", self.portal_url.trim_end_matches('/'), path)
    }

    pub fn sso_login_url(&self) -> String {
        format!("{}/sso/login", self.sso_url.trim_end_matches('/'))
    }

    /// Landing page of the modern web app; SSO tickets are redeemed here
    pub fn modern_url(&self) -> String {
        self.portal("/modern/")
    }

    /// Fixed parameters identifying the portal to the SSO service
    pub fn sso_params(&self) -> QuerySpec {
        let mut params = QuerySpec::new();
        params
            .set_eq("service", self.modern_url())
            .set_eq("webhost", self.portal_url.trim_end_matches('/'))
            .set_eq("source", self.portal("/en-US/signin"))
            .set_eq("clientId", SSO_CLIENT_ID)
            .set_eq(
                "gauthHost",
                format!("{}/sso", self.sso_url.trim_end_matches('/')),
            )
            .set_eq("consumeServiceTicket", "false");
        params
    }
}
