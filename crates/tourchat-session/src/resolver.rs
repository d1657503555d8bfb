use crate::store::SessionStore;
use crate::token::{CredentialSlot, Token};

/// Finds the bearer credential, durable slot first.
///
/// Read-only. A slot that cannot be read is logged and skipped, so a broken
/// durable store still lets an ephemeral login through and otherwise yields
/// anonymous mode.
pub async fn resolve_credential(store: &dyn SessionStore) -> Option<Token> {
    for slot in CredentialSlot::LOOKUP_ORDER {
        match store.get(slot).await {
            Ok(Some(token)) => {
                tracing::debug!(slot = ?slot, "Credential resolved");
                return Some(token);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(slot = ?slot, error = %e, "Failed to read credential slot");
            }
        }
    }
    None
}
