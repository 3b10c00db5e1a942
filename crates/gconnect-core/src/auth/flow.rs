//! SSO login handshake.
//!
//! The portal has no login API, so `AuthFlow` replays what a browser does:
//!
//! 1. probe the "current user" endpoint with the stored cookies
//! 2. load the SSO login page and scrape its CSRF token
//! 3. post the credentials and scrape the service ticket from the reply
//! 4. redeem the ticket on the portal, which answers with a redirect
//! 5. follow that redirect so the portal sets its session cookies
//! 6. reopen the session on the cookie file
//!
//! Steps run strictly in order and nothing is retried; the first failure
//! aborts the login.

use tracing::{debug, info, warn};

use crate::config::PortalConfig;
use crate::error::{ConnectError, Result};
use crate::http::HttpSession;
use crate::models::UserInfo;
use crate::query::{AuthForm, QuerySpec};

use super::scrape::{extract_token, CSRF_PATTERN, LOCKED_PATTERN, TICKET_PATTERN};

/// "Who am I" endpoint, used as the session probe
pub(crate) const USER_INFO_PATH: &str = "/modern/currentuser-service/user/info";

const BAD_CREDENTIALS_MESSAGE: &str = "Authentication failed - please check your credentials";

const LOCKED_MESSAGE: &str = "Authentication failed, and it looks like your account has been \
                              locked. Please access the portal in a browser to unlock it";

/// Runs the login handshake on a borrowed session.
///
/// Holding the session mutably for the whole flow keeps two logins from
/// interleaving on the same cookie jar.
pub struct AuthFlow<'a> {
    session: &'a mut HttpSession,
    config: &'a PortalConfig,
}

impl<'a> AuthFlow<'a> {
    pub fn new(session: &'a mut HttpSession, config: &'a PortalConfig) -> Self {
        Self { session, config }
    }

    /// Check whether the stored cookies still authenticate us.
    ///
    /// Returns `true` when the portal answers with a username. Any other
    /// answer marks the session stale: its cookies are dropped and the
    /// session reopened, ready for `login`. Transport errors are returned
    /// as-is.
    pub async fn probe(&mut self) -> Result<bool> {
        let url = self.config.portal(USER_INFO_PATH);
        let response = self.session.get(&url, None, true).await?;

        if response.meta.status == 200 {
            match serde_json::from_str::<UserInfo>(&response.body) {
                Ok(info) if info.has_username() => {
                    debug!("Stored session is still valid");
                    return Ok(true);
                }
                Ok(_) => debug!("Probe returned no username"),
                Err(e) => debug!(error = %e, "Probe returned an unparseable body"),
            }
        } else {
            debug!(status = response.meta.status, "Probe rejected");
        }

        info!("Stored session is stale, starting over");
        self.session.clear_session()?;
        self.session.refresh()?;
        Ok(false)
    }

    /// Run the SSO handshake with the given credentials
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        info!("Signing in through SSO");

        let login_url = self.config.sso_login_url();
        let params = self.config.sso_params();

        let csrf = self.prestart(&login_url, &params).await?;

        let form = AuthForm::new()
            .username(username)
            .password(password)
            .csrf(&csrf);
        let ticket = self.submit_credentials(&login_url, &params, &form).await?;

        let target = self.redeem_ticket(&ticket).await?;
        self.complete_redirect(&target).await?;

        self.session.refresh()?;
        info!("SSO sign-in complete");
        Ok(())
    }

    async fn prestart(&mut self, login_url: &str, params: &QuerySpec) -> Result<String> {
        let response = self.session.get(login_url, Some(params), true).await?;
        if response.meta.status != 200 {
            return Err(ConnectError::Authentication(format!(
                "SSO prestart error (code: {}, message: {})",
                response.meta.status,
                ConnectError::truncate_body(&response.body)
            )));
        }

        extract_token(&response.body, &CSRF_PATTERN).ok_or_else(|| {
            ConnectError::Authentication("Unable to find CSRF input in login form".to_string())
        })
    }

    async fn submit_credentials(
        &mut self,
        login_url: &str,
        params: &QuerySpec,
        form: &AuthForm,
    ) -> Result<String> {
        let referer = format!("{}?{}", login_url, params.build());
        let response = self
            .session
            .post(login_url, Some(params), Some(form.as_ref()), false, Some(&referer))
            .await?;

        if let Some(ticket) = extract_token(&response.body, &TICKET_PATTERN) {
            debug!("Received SSO ticket");
            return Ok(ticket);
        }

        let message = if LOCKED_PATTERN.is_match(&response.body) {
            LOCKED_MESSAGE
        } else {
            BAD_CREDENTIALS_MESSAGE
        };
        warn!(status = response.meta.status, "SSO login returned no ticket");

        if let Err(e) = self.session.close() {
            warn!(error = %e, "Failed to clean up session after rejected login");
        }
        Err(ConnectError::Authentication(message.to_string()))
    }

    /// Returns the redirect target the portal hands out for the ticket
    async fn redeem_ticket(&mut self, ticket: &str) -> Result<String> {
        let mut params = QuerySpec::new();
        params.set_eq("ticket", ticket);

        let url = self.config.modern_url();
        let response = self
            .session
            .post(&url, Some(&params), None, false, None)
            .await?;

        if response.meta.status != 302 {
            return Err(ConnectError::unexpected_status(
                response.meta.status,
                &response.body,
            ));
        }

        response.meta.redirect_target.ok_or_else(|| {
            ConnectError::InvalidResponse(
                "Ticket redemption redirect carries no Location".to_string(),
            )
        })
    }

    async fn complete_redirect(&mut self, target: &str) -> Result<()> {
        let response = self.session.get(target, None, true).await?;
        match response.meta.status {
            200 | 302 => Ok(()),
            status => Err(ConnectError::unexpected_status(status, &response.body)),
        }
    }
}
