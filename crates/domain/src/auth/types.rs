//! Authentication types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the role that unlocks administrative sections.
pub const ADMIN_ROLE: &str = "admin";

/// The access/refresh credential pair held by a session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived credential sent on protected requests
    pub access_token: String,
    /// Longer-lived credential used only to obtain a new access token
    pub refresh_token: String,
}

impl TokenPair {
    /// Creates a token pair.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Formats the `Authorization` header value.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        bearer(&self.access_token)
    }

    /// Returns true if a refresh can be attempted with this pair.
    #[must_use]
    pub const fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &token_preview(&self.access_token))
            .field("refresh_token", &token_preview(&self.refresh_token))
            .finish()
    }
}

/// Formats a bearer `Authorization` header value.
#[must_use]
pub fn bearer(access_token: &str) -> String {
    format!("Bearer {access_token}")
}

/// Shortens a token for logs (first 8 chars + ...).
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() > 12 {
        let head: String = token.chars().take(8).collect();
        format!("{head}...")
    } else {
        "***".to_string()
    }
}

/// Token payload returned by `/auth/login` and `/auth/refresh`.
///
/// The refresh endpoint may omit `refresh_token`, in which case the caller
/// keeps the one it already has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// New access token
    pub access_token: String,
    /// New refresh token, if rotated
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token type, usually "bearer"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Builds the stored pair, falling back to `previous_refresh` when the
    /// server did not rotate the refresh token.
    #[must_use]
    pub fn into_pair(self, previous_refresh: &str) -> TokenPair {
        let refresh = self
            .refresh_token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| previous_refresh.to_string());
        TokenPair::new(self.access_token, refresh)
    }
}

/// Body of `POST /auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token to exchange
    pub refresh_token: String,
}

/// Login form credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the form fields sent to `/auth/login`.
    #[must_use]
    pub fn form_fields(&self) -> [(&'static str, String); 2] {
        [
            ("username", self.username.clone()),
            ("password", self.password.clone()),
        ]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A role assigned to a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role id
    pub id: i64,
    /// Role name
    pub name: String,
}

/// The profile returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRead {
    /// User id
    pub id: i64,
    /// Login name
    pub username: String,
    /// Whether the account is enabled
    pub is_active: bool,
    /// Assigned roles
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl UserRead {
    /// Returns true if the user has a role with the given name.
    #[must_use]
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }

    /// Returns true if the user may open administrative sections.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}
