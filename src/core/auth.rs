//! # Auth Context
//!
//! Echo never issues or refreshes tokens. It consumes an identity and bearer
//! token that an external auth provider already handed out (via config file,
//! environment, or CLI flag) and attaches them to every backend call.

/// Current user identity plus bearer token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub access_token: Option<String>,
}

impl Credentials {
    /// `Authorization` header value, or `None` when there is no session.
    pub fn bearer(&self) -> Option<String> {
        self.token().map(|token| format!("Bearer {token}"))
    }

    /// The access token, ignoring blank values.
    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Key the profile cache is indexed by. `None` means nobody is signed in
    /// and profile fetches are not issued.
    pub fn cache_key(&self) -> Option<&str> {
        non_empty(&self.user_id).or_else(|| non_empty(&self.email))
    }

    pub fn is_signed_in(&self) -> bool {
        self.cache_key().is_some() && self.token().is_some()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
