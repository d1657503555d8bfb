use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a credential lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSlot {
    /// Survives restarts ("remember me").
    Durable,
    /// Lives only as long as the current process or tab.
    Ephemeral,
}

impl CredentialSlot {
    /// Resolution order: durable first, then ephemeral.
    pub const LOOKUP_ORDER: [CredentialSlot; 2] =
        [CredentialSlot::Durable, CredentialSlot::Ephemeral];
}

/// Opaque bearer credential.
///
/// Never empty. `Debug` does not print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wraps `raw`, returning `None` for empty or whitespace-only input.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}
