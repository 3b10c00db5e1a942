use chrono::NaiveDate;

use crate::error::{ConnectError, Result};

use super::QuerySpec;

/// Date format the activity search endpoint expects
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filter for the activity search endpoint.
///
/// Setters validate their bounds; `start` and `limit` are also driven by
/// `PortalClient::all_activities` when paging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityFilter {
    params: QuerySpec,
}

impl ActivityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self, start: i64) -> Result<Self> {
        if start < 0 {
            return Err(ConnectError::invalid_parameter(
                "ActivityFilter start must be greater than or equal to zero",
            ));
        }
        self.params.set_eq("start", start);
        Ok(self)
    }

    pub fn limit(mut self, limit: i64) -> Result<Self> {
        if limit <= 0 {
            return Err(ConnectError::invalid_parameter(
                "ActivityFilter limit must be greater than zero",
            ));
        }
        self.params.set_eq("limit", limit);
        Ok(self)
    }

    pub fn activity_type(mut self, type_key: &str) -> Self {
        self.params.set_eq("activityType", type_key);
        self
    }

    pub fn event_type(mut self, type_key: &str) -> Self {
        self.params.set_eq("eventType", type_key);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.params
            .set_eq("startDate", date.format(DATE_FORMAT).to_string());
        self
    }

    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.params.set_eq("endDate", date.format(DATE_FORMAT).to_string());
        self
    }

    pub fn between_dates(self, from: NaiveDate, to: NaiveDate) -> Self {
        self.start_date(from).end_date(to)
    }

    pub fn min_distance(mut self, meters: i64) -> Result<Self> {
        if meters <= 0 {
            return Err(ConnectError::invalid_parameter(
                "ActivityFilter minDistance must be greater than zero",
            ));
        }
        self.params.set_eq("minDistance", meters);
        Ok(self)
    }

    pub fn max_distance(mut self, meters: i64) -> Result<Self> {
        if meters <= 0 {
            return Err(ConnectError::invalid_parameter(
                "ActivityFilter maxDistance must be greater than zero",
            ));
        }
        self.params.set_eq("maxDistance", meters);
        Ok(self)
    }

    pub fn between_distance(self, min_meters: i64, max_meters: i64) -> Result<Self> {
        self.min_distance(min_meters)?.max_distance(max_meters)
    }

    pub(crate) fn page(&mut self, start: i64, limit: i64) {
        self.params.set_eq("limit", limit).set_eq("start", start);
    }

    pub fn build(&self) -> String {
        self.params.build()
    }
}

impl AsRef<QuerySpec> for ActivityFilter {
    fn as_ref(&self) -> &QuerySpec {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn test_between_dates_and_type() {
        let filter = ActivityFilter::new()
            .between_dates(date(2018, 5, 1), date(2018, 5, 31))
            .activity_type("running")
            .limit(1)
            .unwrap();
        assert_eq!(
            filter.build(),
            "startDate=2018-05-01&endDate=2018-05-31&activityType=running&limit=1"
        );
    }

    #[test]
    fn test_rejects_out_of_range_bounds() {
        assert!(ActivityFilter::new().start(-1).is_err());
        assert!(ActivityFilter::new().limit(0).is_err());
        assert!(ActivityFilter::new().min_distance(0).is_err());
        assert!(ActivityFilter::new().between_distance(100, -5).is_err());
        assert!(ActivityFilter::new().start(0).is_ok());
    }

    #[test]
    fn test_page_overwrites_previous_window() {
        let mut filter = ActivityFilter::new().start(10).unwrap().activity_type("cycling");
        filter.page(200, 100);
        assert_eq!(filter.build(), "start=200&activityType=cycling&limit=100");
    }
}
