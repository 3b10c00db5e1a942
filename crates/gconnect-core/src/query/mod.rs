//! Query-string and form-body builders.
//!
//! `QuerySpec` is the generic encoder; `ActivityFilter` and `AuthForm`
//! are typed front ends for the activity search and SSO login requests.

pub mod auth_form;
pub mod filter;
pub mod spec;

pub use auth_form::AuthForm;
pub use filter::ActivityFilter;
pub use spec::{Operator, QuerySpec, QueryValue};
