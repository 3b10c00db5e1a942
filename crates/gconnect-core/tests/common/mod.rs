#![allow(dead_code)]

use gconnect_core::PortalConfig;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "runner@example.com";
pub const PASSWORD: &str = "secret";
pub const CSRF_TOKEN: &str = "csrf-token-1";
pub const TICKET: &str = "ST-0423-xyz-cas";
pub const SESSION_COOKIE: &str = "SESSIONID=abc123";

pub const USER_INFO_PATH: &str = "/modern/currentuser-service/user/info";
pub const SSO_LOGIN_PATH: &str = "/sso/login";

/// Mock portal plus a private directory for session files
pub struct Portal {
    pub server: MockServer,
    pub dir: TempDir,
}

impl Portal {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            dir: tempfile::tempdir().expect("Failed to create session dir"),
        }
    }

    pub fn config(&self) -> PortalConfig {
        let mut config = PortalConfig::with_base_url(&self.server.uri());
        config.session_dir = Some(self.dir.path().to_path_buf());
        config.request_timeout_secs = 5;
        config
    }

    pub fn login_page() -> String {
        format!(
            r#"<html><body><form method="post">
<input type="hidden" name="_csrf" value="{}" />
<input name="username" /><input name="password" type="password" />
</form></body></html>"#,
            CSRF_TOKEN
        )
    }

    pub fn ticket_page(&self) -> String {
        format!(
            r#"<html><script>var response_url = "{}/modern/?ticket={}";</script></html>"#,
            self.server.uri(),
            TICKET
        )
    }

    /// Probe answers with a username: the stored session is valid
    pub async fn mount_valid_session(&self) {
        Mock::given(method("GET"))
            .and(path(USER_INFO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "username": "runner42",
                "displayName": "Runner"
            })))
            .mount(&self.server)
            .await;
    }

    /// Probe is rejected: the stored session is stale
    pub async fn mount_stale_session(&self) {
        Mock::given(method("GET"))
            .and(path(USER_INFO_PATH))
            .respond_with(ResponseTemplate::new(401))
            .with_priority(10)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_prestart(&self, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path(SSO_LOGIN_PATH))
            .and(query_param("clientId", "GarminConnect"))
            .and(query_param("consumeServiceTicket", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_string(Self::login_page()))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_login(&self, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(SSO_LOGIN_PATH))
            .and(body_string_contains(format!("_csrf={}", CSRF_TOKEN)))
            .respond_with(ResponseTemplate::new(200).set_body_string(self.ticket_page()))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_redemption(&self, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/modern/"))
            .and(query_param("ticket", TICKET))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", "/modern/welcome")
                    .insert_header("set-cookie", format!("{}; Path=/", SESSION_COOKIE)),
            )
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_redirect_completion(&self, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/modern/welcome"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>Welcome</html>"))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Every SSO step answers the way the real portal does for a good login
    pub async fn mount_sso_success(&self) {
        self.mount_prestart(1).await;
        self.mount_login(1).await;
        self.mount_redemption(1).await;
        self.mount_redirect_completion(1).await;
    }
}
