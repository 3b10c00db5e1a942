//! Client for the Garmin Connect web portal.
//!
//! The portal has no public API for personal data, so this crate signs in
//! the way a browser does (SSO ticket exchange over a cookie session),
//! keeps the cookies on disk between runs, and then reads the JSON
//! endpoints the web app itself uses.
//!
//! ```no_run
//! use gconnect_core::{Credentials, PortalClient, PortalConfig};
//!
//! # async fn run() -> gconnect_core::Result<()> {
//! let credentials = Credentials::new("runner@example.com", "secret");
//! let mut client = PortalClient::connect(PortalConfig::default(), credentials, false).await?;
//! println!("{}", client.username().await?);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod query;

pub use api::{FixedInterval, PortalClient, Throttle};
pub use auth::{AuthFlow, Credentials, Identity};
pub use config::PortalConfig;
pub use error::{ConnectError, Result};
pub use http::{HttpResponse, HttpSession, ResponseMeta};
pub use models::{DataFormat, UserInfo};
pub use query::{ActivityFilter, AuthForm, Operator, QuerySpec, QueryValue};
