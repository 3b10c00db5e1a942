//! Typed payloads and enums shared by the auth flow and the portal client.
//!
//! Most portal responses are passed through as `serde_json::Value`; only
//! the values the client itself relies on are modelled here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConnectError;

/// Payload of the "current user" endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub username: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
}

impl UserInfo {
    pub fn has_username(&self) -> bool {
        !self.username.trim().is_empty()
    }
}

/// Export formats of the activity download service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Csv,
    Tcx,
    Gpx,
    /// Google Earth
    Kml,
}

impl DataFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Tcx => "tcx",
            DataFormat::Gpx => "gpx",
            DataFormat::Kml => "kml",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataFormat {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(DataFormat::Csv),
            "tcx" => Ok(DataFormat::Tcx),
            "gpx" => Ok(DataFormat::Gpx),
            "kml" => Ok(DataFormat::Kml),
            other => Err(ConnectError::invalid_parameter(format!(
                "Unsupported data type: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_info() {
        let json = r#"{"username":"runner42","displayName":"Runner","fullName":"Pat Runner","id":7}"#;
        let info: UserInfo = serde_json::from_str(json).expect("Failed to parse user info");
        assert_eq!(info.username, "runner42");
        assert_eq!(info.display_name.as_deref(), Some("Runner"));
        assert!(info.has_username());
    }

    #[test]
    fn test_user_info_without_username() {
        let info: UserInfo = serde_json::from_str("{}").unwrap();
        assert!(!info.has_username());
        let blank: UserInfo = serde_json::from_str(r#"{"username":"  "}"#).unwrap();
        assert!(!blank.has_username());
    }

    #[test]
    fn test_data_format_allow_list() {
        for name in ["csv", "tcx", "gpx", "kml"] {
            let format: DataFormat = name.parse().unwrap();
            assert_eq!(format.to_string(), name);
        }
        for name in ["bmp", "GPX", "fit", ""] {
            assert!(matches!(
                name.parse::<DataFormat>(),
                Err(ConnectError::InvalidParameter(_))
            ));
        }
    }
}
