//! Cookie-backed HTTP transport.

pub mod cookie_jar;
pub mod session;

pub use cookie_jar::CookieJarFile;
pub use session::{HttpResponse, HttpSession, ResponseMeta};
