//! Identity types for the logged-in user

use serde::{Deserialize, Serialize};

/// The authenticated user as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// Canonical mail address (e.g., "alice@mailroom.local")
    pub address: String,
    /// Name shown in the UI; falls back to the address when unset
    pub display_name: String,
}

impl UserRef {
    pub fn new(address: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            display_name: display_name.into(),
        }
    }

    /// Create a user whose display name is the address itself
    pub fn from_address(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            display_name: address.clone(),
            address,
        }
    }
}

/// Opaque session token proving an authenticated session
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for an `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Tokens must not end up in logs
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl From<&str> for Credential {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Credential {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_from_address() {
        let user = UserRef::from_address("alice@mailroom.local");
        assert_eq!(user.display_name, "alice@mailroom.local");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let cred = Credential::new("tok1");
        assert_eq!(format!("{:?}", cred), "Credential(***)");
        assert_eq!(cred.bearer(), "Bearer tok1");
    }
}
