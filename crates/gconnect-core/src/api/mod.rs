//! Portal API client.
//!
//! This module provides the `PortalClient` for reading activities, gear
//! and wellness data from the portal's internal JSON endpoints once a
//! cookie session has been established.

pub mod client;
pub mod throttle;

pub use client::PortalClient;
pub use throttle::{FixedInterval, Throttle};
