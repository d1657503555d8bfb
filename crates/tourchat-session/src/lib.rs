//! Credential storage and session resolution.
//!
//! The widget never owns a credential: a login flow elsewhere writes a
//! bearer token into one of two slots, and the widget reads it (durable slot
//! first) or clears both when the backend reports it stale.
//!
//! # Main types
//!
//! - [`Token`]: Opaque bearer credential with redacted `Debug`.
//! - [`CredentialSlot`]: Durable or ephemeral storage location.
//! - [`SessionStore`]: Read/clear capability injected into the widget.
//! - [`InMemorySessionStore`]: Process-local store.
//! - [`FileSessionStore`]: JSON-file durable slot plus in-memory ephemeral slot.

/// Credential lookup across slots.
pub mod resolver;
/// Storage backends for the credential slots.
pub mod store;
/// Bearer tokens and slot identifiers.
pub mod token;

pub use resolver::resolve_credential;
pub use store::{FileSessionStore, InMemorySessionStore, SessionStore};
pub use token::{CredentialSlot, Token};
