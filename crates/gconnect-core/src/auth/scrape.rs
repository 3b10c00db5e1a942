//! Token extraction from SSO page markup.
//!
//! The SSO pages are unversioned HTML, so everything the login flow needs
//! from them goes through `extract_token` and the patterns below.

use std::sync::LazyLock;

use regex::Regex;

/// Hidden CSRF input on the SSO login form
pub static CSRF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name="_csrf"\s+value="([^"]+)""#).expect("valid CSRF pattern"));

/// Service ticket embedded in the post-login redirect script
pub static TICKET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"ticket=([^"]+)""#).expect("valid ticket pattern"));

/// Marker of the account-locked page
pub static LOCKED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("locked").expect("valid locked pattern"));

/// First capture group of `pattern` in `body`, if any
pub fn extract_token(body: &str, pattern: &Regex) -> Option<String> {
    pattern
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|token| !token.is_empty())
}
