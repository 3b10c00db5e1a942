//! Portal client for the Garmin Connect web app.
//!
//! `PortalClient` resolves authentication when it is created and then
//! exposes the portal's internal JSON endpoints. Every data call is a
//! single GET on the shared cookie session that must answer 200.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::flow::USER_INFO_PATH;
use crate::auth::{AuthFlow, Credentials, Identity};
use crate::config::PortalConfig;
use crate::error::{ConnectError, Result};
use crate::http::HttpSession;
use crate::models::{DataFormat, UserInfo};
use crate::query::{ActivityFilter, QuerySpec};

use super::throttle::Throttle;

// ============================================================================
// Constants
// ============================================================================

/// Page size used when fetching the complete activity list
const ACTIVITY_PAGE_SIZE: i64 = 100;

/// Chart and polyline resolution requested for activity details
const DETAILS_MAX_SIZE: i64 = 100;

const ACTIVITY_TYPES_PATH: &str = "/proxy/activity-service/activity/activityTypes";
const GEAR_LIST_PATH: &str = "/proxy/userstats-service/gears/all";
const GEAR_PATH: &str = "/proxy/gear-service/gear";
const ACTIVITY_GEAR_PATH: &str = "/proxy/gear-service/gear/filterGear";
const ACTIVITY_COUNT_PATH: &str = "/proxy/activitylist-service/activities/count";
const ACTIVITY_SEARCH_PATH: &str = "/proxy/activitylist-service/activities/search/activities";
const ACTIVITY_PATH: &str = "/proxy/activity-service/activity";
const EXPORT_PATH: &str = "/proxy/download-service/export";
const WELLNESS_SUMMARY_PATH: &str = "/proxy/wellness-service/wellness/dailySummary";

/// Authenticated client for one portal account.
pub struct PortalClient {
    session: HttpSession,
    config: PortalConfig,
    throttle: Option<Arc<dyn Throttle>>,
}

impl PortalClient {
    /// Open the session for `credentials.username` and make sure it is
    /// authenticated.
    ///
    /// A stored session that passes the probe is reused without looking at
    /// the password. With `reset`, the stored session is discarded and a
    /// full login is always performed.
    pub async fn connect(config: PortalConfig, credentials: Credentials, reset: bool) -> Result<Self> {
        let identity = Identity::from_username(&credentials.username)?;
        let mut session = HttpSession::open(&identity, &config)?;

        if reset {
            info!("Resetting stored session");
            session.clear_session()?;
        } else if AuthFlow::new(&mut session, &config).probe().await? {
            info!("Reusing stored session");
            return Ok(Self::from_session(session, config));
        }

        let password = credentials
            .password
            .as_deref()
            .ok_or(ConnectError::MissingCredential("Password"))?;

        AuthFlow::new(&mut session, &config)
            .login(&credentials.username, password)
            .await?;

        Ok(Self::from_session(session, config))
    }

    fn from_session(session: HttpSession, config: PortalConfig) -> Self {
        Self {
            session,
            config,
            throttle: None,
        }
    }

    /// Pace multi-page operations with `throttle`
    pub fn with_throttle(mut self, throttle: impl Throttle + 'static) -> Self {
        self.throttle = Some(Arc::new(throttle));
        self
    }

    pub fn session(&self) -> &HttpSession {
        &self.session
    }

    /// Sign out locally: drop the connections and delete the stored session
    pub fn close(mut self) -> Result<()> {
        self.session.close()
    }

    // ===== Request helpers =====

    async fn get_raw(
        &mut self,
        path: &str,
        query: Option<&QuerySpec>,
        follow_redirects: bool,
    ) -> Result<String> {
        let url = self.config.portal(path);
        let response = self.session.get(&url, query, follow_redirects).await?;
        if response.meta.status != 200 {
            return Err(ConnectError::unexpected_status(
                response.meta.status,
                &response.body,
            ));
        }
        Ok(response.body)
    }

    async fn get_json<T: DeserializeOwned>(
        &mut self,
        path: &str,
        query: Option<&QuerySpec>,
        follow_redirects: bool,
    ) -> Result<T> {
        let body = self.get_raw(path, query, follow_redirects).await?;
        serde_json::from_str(&body).map_err(|e| {
            ConnectError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", path, e))
        })
    }

    // ===== Data Fetching Methods =====

    pub async fn activity_types(&mut self) -> Result<Value> {
        self.get_json(ACTIVITY_TYPES_PATH, None, false).await
    }

    pub async fn gear_list(&mut self) -> Result<Value> {
        self.get_json(GEAR_LIST_PATH, None, false).await
    }

    pub async fn gear(&mut self, uuid: &str) -> Result<Value> {
        let path = format!("{}/{}", GEAR_PATH, urlencoding::encode(uuid));
        self.get_json(&path, None, false).await
    }

    pub async fn activity_gear(&mut self, activity_id: i64) -> Result<Value> {
        let mut params = QuerySpec::new();
        params.set_eq("activityId", activity_id);
        self.get_json(ACTIVITY_GEAR_PATH, Some(&params), true).await
    }

    pub async fn activity_count(&mut self) -> Result<Value> {
        self.get_json(ACTIVITY_COUNT_PATH, None, false).await
    }

    /// One page of the activity search
    pub async fn activities(&mut self, filter: Option<&ActivityFilter>) -> Result<Vec<Value>> {
        let query: Option<&QuerySpec> = filter.map(|f| f.as_ref());
        match self.get_json::<Value>(ACTIVITY_SEARCH_PATH, query, true).await? {
            Value::Array(items) => Ok(items),
            other => Err(ConnectError::InvalidResponse(format!(
                "Expected an activity list, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Every activity matching `filter`, fetched page by page.
    ///
    /// Paging stops at the first page shorter than the page size. Any
    /// `start`/`limit` already set on the filter is overridden.
    pub async fn all_activities(&mut self, mut filter: ActivityFilter) -> Result<Vec<Value>> {
        let mut all = Vec::new();
        let mut page: i64 = 0;

        loop {
            if page > 0 {
                if let Some(throttle) = self.throttle.clone() {
                    throttle.wait().await;
                }
            }

            filter.page(page * ACTIVITY_PAGE_SIZE, ACTIVITY_PAGE_SIZE);
            let found = self.activities(Some(&filter)).await?;
            let count = found.len();
            debug!(page = page, count = count, "Fetched activity page");
            all.extend(found);

            if (count as i64) < ACTIVITY_PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    pub async fn activity_summary(&mut self, activity_id: i64) -> Result<Value> {
        let path = format!("{}/{}", ACTIVITY_PATH, activity_id);
        self.get_json(&path, None, true).await
    }

    pub async fn activity_details(&mut self, activity_id: i64) -> Result<Value> {
        let path = format!("{}/{}/details", ACTIVITY_PATH, activity_id);
        let mut params = QuerySpec::new();
        params
            .set_eq("maxChartSize", DETAILS_MAX_SIZE)
            .set_eq("maxPolylineSize", DETAILS_MAX_SIZE);
        self.get_json(&path, Some(&params), true).await
    }

    /// Activity details at full resolution
    pub async fn extended_activity_details(&mut self, activity_id: i64) -> Result<Value> {
        let path = format!("{}/{}/details", ACTIVITY_PATH, activity_id);
        self.get_json(&path, None, true).await
    }

    /// Raw export of an activity. `format` must be one of `csv`, `tcx`,
    /// `gpx` or `kml`; it is checked before anything is sent.
    pub async fn data_file(&mut self, format: &str, activity_id: i64) -> Result<String> {
        let format: DataFormat = format.parse()?;
        let path = format!("{}/{}/activity/{}", EXPORT_PATH, format, activity_id);
        self.get_raw(&path, None, true).await
    }

    pub async fn user_info(&mut self) -> Result<UserInfo> {
        self.get_json(USER_INFO_PATH, None, true).await
    }

    pub async fn username(&mut self) -> Result<String> {
        let info = self.user_info().await?;
        if !info.has_username() {
            return Err(ConnectError::InvalidResponse(
                "Current user has no username".to_string(),
            ));
        }
        Ok(info.username)
    }

    /// Daily wellness summary, for today when `date` is `None`
    pub async fn wellness_daily_summary(&mut self, date: Option<NaiveDate>) -> Result<Value> {
        let date = date.unwrap_or_else(|| Local::now().date_naive());
        let username = self.username().await?;
        let path = format!(
            "{}/{}/{}",
            WELLNESS_SUMMARY_PATH,
            date.format("%Y-%m-%d"),
            urlencoding::encode(&username)
        );
        self.get_json(&path, None, true).await
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&json!({"a": 1})), "an object");
        assert_eq!(json_kind(&json!(null)), "null");
        assert_eq!(json_kind(&json!([])), "an array");
    }
}
