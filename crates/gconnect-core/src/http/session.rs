//! Browser-style HTTP session backed by a persisted cookie jar.
//!
//! `HttpSession` is the only component that talks to the network. It keeps
//! one cookie jar per identity, writes it back to disk after every call and
//! remembers the status and redirect target of the most recent response.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, redirect, Client, RequestBuilder};
use reqwest_cookie_store::CookieStoreMutex;
use tracing::debug;

use crate::auth::Identity;
use crate::config::PortalConfig;
use crate::error::{ConnectError, Result};
use crate::query::QuerySpec;

use super::cookie_jar::CookieJarFile;

/// Status and redirect target of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    /// `Location` of a 3xx response, resolved against the request URL
    pub redirect_target: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub body: String,
    pub meta: ResponseMeta,
}

/// Two clients over the same jar, since reqwest fixes the redirect policy
/// per client.
struct Transport {
    following: Client,
    direct: Client,
}

pub struct HttpSession {
    jar: CookieJarFile,
    cookies: Arc<CookieStoreMutex>,
    transport: Option<Transport>,
    timeout: Duration,
    user_agent: String,
    last: Option<ResponseMeta>,
}

impl HttpSession {
    /// Open the session of `identity`, reusing its cookie file if one exists.
    ///
    /// Not safe to share a session directory between processes using the
    /// same identity: the jar is rewritten after every request, without
    /// any file locking.
    pub fn open(identity: &Identity, config: &PortalConfig) -> Result<Self> {
        let jar = CookieJarFile::new(identity.session_path(&config.session_dir()));
        let cookies = Arc::new(CookieStoreMutex::new(jar.load()?));

        let mut session = Self {
            jar,
            cookies,
            transport: None,
            timeout: config.request_timeout(),
            user_agent: config.user_agent.clone(),
            last: None,
        };
        session.transport = Some(session.connect()?);
        Ok(session)
    }

    fn connect(&self) -> Result<Transport> {
        let build = |policy: redirect::Policy| {
            Client::builder()
                .cookie_provider(Arc::clone(&self.cookies))
                .redirect(policy)
                .timeout(self.timeout)
                .user_agent(self.user_agent.as_str())
                .build()
        };

        Ok(Transport {
            following: build(redirect::Policy::default())?,
            direct: build(redirect::Policy::none())?,
        })
    }

    pub fn session_path(&self) -> &Path {
        self.jar.path()
    }

    /// Status of the most recent response, `-1` before the first call
    pub fn last_status(&self) -> i32 {
        self.last.as_ref().map(|m| i32::from(m.status)).unwrap_or(-1)
    }

    pub fn last_redirect_target(&self) -> Option<&str> {
        self.last.as_ref().and_then(|m| m.redirect_target.as_deref())
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    pub async fn get(
        &mut self,
        url: &str,
        query: Option<&QuerySpec>,
        follow_redirects: bool,
    ) -> Result<HttpResponse> {
        let full_url = with_query(url, query);
        let request = self.client(follow_redirects)?.get(&full_url);
        self.execute("GET", &full_url, request).await
    }

    pub async fn post(
        &mut self,
        url: &str,
        query: Option<&QuerySpec>,
        form: Option<&QuerySpec>,
        follow_redirects: bool,
        referer: Option<&str>,
    ) -> Result<HttpResponse> {
        let full_url = with_query(url, query);
        let mut request = self.client(follow_redirects)?.post(&full_url);
        if let Some(form) = form {
            request = request
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(form.build());
        }
        if let Some(referer) = referer {
            request = request.header(header::REFERER, referer);
        }
        self.execute("POST", &full_url, request).await
    }

    /// Drop the current connections and reopen them on the cookie file.
    ///
    /// Cookies set during the SSO redirects are only reliably sent once
    /// they have gone through the jar file and a fresh connection.
    pub fn refresh(&mut self) -> Result<()> {
        self.transport = None;
        let store = self.jar.load()?;
        self.cookies = Arc::new(CookieStoreMutex::new(store));
        self.transport = Some(self.connect()?);
        debug!(path = %self.jar.path().display(), "Session refreshed");
        Ok(())
    }

    /// Forget all cookies, on disk and in memory
    pub fn clear_session(&mut self) -> Result<()> {
        self.jar.remove()?;
        self.lock_cookies()?.clear();
        debug!(path = %self.jar.path().display(), "Session cleared");
        Ok(())
    }

    /// Release the connections, then clear the session.
    ///
    /// Requests fail with `SessionClosed` until `refresh` is called.
    pub fn close(&mut self) -> Result<()> {
        self.transport = None;
        self.clear_session()
    }

    fn client(&self, follow_redirects: bool) -> Result<&Client> {
        let transport = self.transport.as_ref().ok_or(ConnectError::SessionClosed)?;
        Ok(if follow_redirects {
            &transport.following
        } else {
            &transport.direct
        })
    }

    fn lock_cookies(&self) -> Result<std::sync::MutexGuard<'_, cookie_store::CookieStore>> {
        self.cookies
            .lock()
            .map_err(|_| ConnectError::SessionStore("Cookie store lock poisoned".to_string()))
    }

    async fn execute(
        &mut self,
        method: &str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<HttpResponse> {
        let response = request.send().await?;

        let status = response.status();
        let redirect_target = if status.is_redirection() {
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|location| response.url().join(location).ok())
                .map(String::from)
        } else {
            None
        };
        debug!(
            method = method,
            url = strip_query(url),
            status = status.as_u16(),
            redirect = redirect_target.is_some(),
            "Portal request"
        );

        let body = response.text().await?;

        {
            let store = self.lock_cookies()?;
            self.jar.save(&store)?;
        }

        let meta = ResponseMeta {
            status: status.as_u16(),
            redirect_target,
        };
        self.last = Some(meta.clone());
        Ok(HttpResponse { body, meta })
    }
}

fn with_query(url: &str, query: Option<&QuerySpec>) -> String {
    match query {
        Some(query) if !query.is_empty() => {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{}{}{}", url, separator, query.build())
        }
        _ => url.to_string(),
    }
}

/// Query strings can carry tickets; keep them out of the logs
fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_in(dir: &Path) -> HttpSession {
        let config = PortalConfig {
            session_dir: Some(dir.to_path_buf()),
            ..PortalConfig::default()
        };
        let identity = Identity::from_username("runner@example.com").unwrap();
        HttpSession::open(&identity, &config).unwrap()
    }

    #[test]
    fn test_with_query() {
        let mut query = QuerySpec::new();
        assert_eq!(with_query("https://x/a", Some(&query)), "https://x/a");
        assert_eq!(with_query("https://x/a", None), "https://x/a");

        query.set_eq("ticket", "ST-1");
        assert_eq!(with_query("https://x/a", Some(&query)), "https://x/a?ticket=ST-1");
        assert_eq!(
            with_query("https://x/a?max=1", Some(&query)),
            "https://x/a?max=1&ticket=ST-1"
        );
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("https://x/modern/?ticket=ST-1"), "https://x/modern/");
        assert_eq!(strip_query("https://x/modern/"), "https://x/modern/");
    }

    #[test]
    fn test_new_session_has_no_status() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_in(dir.path());
        assert_eq!(session.last_status(), -1);
        assert!(session.last_redirect_target().is_none());
        assert!(session.session_path().starts_with(dir.path()));
    }

    #[test]
    fn test_close_then_refresh_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_in(dir.path());
        session.close().unwrap();
        assert!(session.is_closed());
        assert!(matches!(session.client(true), Err(ConnectError::SessionClosed)));

        session.refresh().unwrap();
        assert!(!session.is_closed());
    }

    #[test]
    fn test_clear_session_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_in(dir.path());
        session.clear_session().unwrap();
        session.clear_session().unwrap();
        assert!(!session.session_path().exists());
    }
}
