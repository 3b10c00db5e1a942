//! Authentication: identity keys, credentials and the SSO login flow.
//!
//! This module provides:
//! - `Identity`: hashed username that names the session cookie file
//! - `Credentials`: username plus optional password
//! - `AuthFlow`: the probe-then-login state machine run on an `HttpSession`
//!
//! Page scraping lives in `scrape` so that markup changes on the portal
//! stay out of the state machine.

pub mod credentials;
pub mod flow;
pub mod identity;
pub mod scrape;

pub use credentials::Credentials;
pub use flow::AuthFlow;
pub use identity::Identity;
pub use scrape::extract_token;
