use super::QuerySpec;

/// Form body submitted to the SSO login endpoint.
///
/// The hidden fields are filled in up front; credentials and the CSRF
/// token scraped from the login page are added by the caller.
#[derive(Clone)]
pub struct AuthForm {
    params: QuerySpec,
}

impl AuthForm {
    pub fn new() -> Self {
        let mut params = QuerySpec::new();
        params
            .set_eq("_eventId", "submit")
            .set_eq("embed", "true")
            .set_eq("displayNameRequired", "false");
        Self { params }
    }

    pub fn username(mut self, username: &str) -> Self {
        self.params.set_eq("username", username);
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.params.set_eq("password", password);
        self
    }

    pub fn csrf(mut self, token: &str) -> Self {
        self.params.set_eq("_csrf", token);
        self
    }
}

impl Default for AuthForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<QuerySpec> for AuthForm {
    fn as_ref(&self) -> &QuerySpec {
        &self.params
    }
}

// Keeps the password out of debug output
impl std::fmt::Debug for AuthForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthForm").field("fields", &self.params.len()).finish()
    }
}
