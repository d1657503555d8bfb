use crate::token::{CredentialSlot, Token};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use tourchat_core::{TourchatError, TourchatResult};

/// Read/clear access to the credential slots.
///
/// This is the whole capability the widget receives; writing a token is the
/// login flow's job and lives on the concrete stores.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the token held in `slot`, if any.
    async fn get(&self, slot: CredentialSlot) -> TourchatResult<Option<Token>>;
    /// Removes whatever `slot` holds. Clearing an empty slot is not an error.
    async fn clear(&self, slot: CredentialSlot) -> TourchatResult<()>;

    /// Clears both slots. Attempts both even if the first fails.
    async fn clear_all(&self) -> TourchatResult<()> {
        let durable = self.clear(CredentialSlot::Durable).await;
        let ephemeral = self.clear(CredentialSlot::Ephemeral).await;
        durable.and(ephemeral)
    }
}

// ---------------------------------------------------------------------------
// InMemorySessionStore
// ---------------------------------------------------------------------------

/// Process-local store. Useful for embedding hosts and tests.
#[derive(Default)]
pub struct InMemorySessionStore {
    slots: RwLock<HashMap<CredentialSlot, Token>>,
}

impl InMemorySessionStore {
    /// Creates a store with both slots empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`InMemorySessionStore::store`].
    pub fn with_token(self, slot: CredentialSlot, token: Token) -> Self {
        self.store(slot, token);
        self
    }

    /// Puts `token` into `slot`, replacing any previous value.
    pub fn store(&self, slot: CredentialSlot, token: Token) {
        self.slots.write().insert(slot, token);
    }

    /// True when neither slot holds a token.
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, slot: CredentialSlot) -> TourchatResult<Option<Token>> {
        Ok(self.slots.read().get(&slot).cloned())
    }

    async fn clear(&self, slot: CredentialSlot) -> TourchatResult<()> {
        self.slots.write().remove(&slot);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileSessionStore
// ---------------------------------------------------------------------------

/// Durable slot persisted as a JSON object on disk; ephemeral slot in memory.
///
/// The file is a JSON object shared with other hosts. Only the configured
/// key is read or written; every other entry is kept as-is whatever its type.
/// A non-string value under the key counts as no token. The durable slot is
/// re-read on every lookup so a login performed by another process is picked
/// up without restarting.
pub struct FileSessionStore {
    path: PathBuf,
    key: String,
    ephemeral: RwLock<Option<Token>>,
}

impl FileSessionStore {
    /// Default storage key for the bearer token.
    pub const DEFAULT_KEY: &'static str = "token";

    /// Opens a store backed by `path`, creating its parent directory.
    pub async fn new(path: PathBuf) -> TourchatResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(Self {
            path,
            key: Self::DEFAULT_KEY.to_string(),
            ephemeral: RwLock::new(None),
        })
    }

    /// Use a storage key other than [`FileSessionStore::DEFAULT_KEY`].
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Writes `token` into `slot`. Called by login flows, never by the widget.
    pub async fn store(&self, slot: CredentialSlot, token: Token) -> TourchatResult<()> {
        match slot {
            CredentialSlot::Ephemeral => {
                *self.ephemeral.write() = Some(token);
                Ok(())
            }
            CredentialSlot::Durable => {
                let mut entries = self.read_entries().await?;
                entries.insert(self.key.clone(), Value::String(token.as_str().to_string()));
                self.write_entries(&entries).await
            }
        }
    }

    async fn read_entries(&self) -> TourchatResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let data = tokio::fs::read_to_string(&self.path).await?;
        if data.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&data)
            .map_err(|e| TourchatError::Session(format!("Failed to parse credential file: {e}")))
    }

    async fn write_entries(&self, entries: &Map<String, Value>) -> TourchatResult<()> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, slot: CredentialSlot) -> TourchatResult<Option<Token>> {
        match slot {
            CredentialSlot::Ephemeral => Ok(self.ephemeral.read().clone()),
            CredentialSlot::Durable => {
                let entries = self.read_entries().await?;
                Ok(entries
                    .get(&self.key)
                    .and_then(Value::as_str)
                    .and_then(Token::parse))
            }
        }
    }

    async fn clear(&self, slot: CredentialSlot) -> TourchatResult<()> {
        match slot {
            CredentialSlot::Ephemeral => {
                *self.ephemeral.write() = None;
                Ok(())
            }
            CredentialSlot::Durable => {
                let mut entries = self.read_entries().await?;
                if entries.remove(&self.key).is_some() {
                    self.write_entries(&entries).await?;
                    tracing::debug!(path = %self.path.display(), "Durable credential cleared");
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn token(raw: &str) -> Token {
        Token::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_get_and_clear() {
        let store = InMemorySessionStore::new().with_token(CredentialSlot::Durable, token("d"));
        assert_eq!(
            store.get(CredentialSlot::Durable).await.unwrap(),
            Some(token("d"))
        );
        assert_eq!(store.get(CredentialSlot::Ephemeral).await.unwrap(), None);

        store.clear(CredentialSlot::Durable).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_clear_all_empties_both_slots() {
        let store = InMemorySessionStore::new()
            .with_token(CredentialSlot::Durable, token("d"))
            .with_token(CredentialSlot::Ephemeral, token("e"));
        store.clear_all().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(tmp.path().join("storage.json"))
            .await
            .unwrap();
        assert_eq!(store.get(CredentialSlot::Durable).await.unwrap(), None);
        // Clearing an absent credential is fine.
        store.clear(CredentialSlot::Durable).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_keeps_foreign_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("storage.json");
        tokio::fs::write(&path, r#"{"theme":"dark","token":"abc"}"#)
            .await
            .unwrap();

        let store = FileSessionStore::new(path.clone()).await.unwrap();
        assert_eq!(
            store.get(CredentialSlot::Durable).await.unwrap(),
            Some(token("abc"))
        );

        store.clear(CredentialSlot::Durable).await.unwrap();
        let data = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(data.contains("theme"));
        assert!(!data.contains("abc"));
    }

    #[tokio::test]
    async fn test_file_store_tolerates_non_string_foreign_values() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("storage.json");
        tokio::fs::write(&path, r#"{"remember":true,"cart":{"items":[1,2]},"token":"abc"}"#)
            .await
            .unwrap();

        let store = FileSessionStore::new(path.clone()).await.unwrap();
        assert_eq!(
            store.get(CredentialSlot::Durable).await.unwrap(),
            Some(token("abc"))
        );

        store.clear_all().await.unwrap();
        assert_eq!(store.get(CredentialSlot::Durable).await.unwrap(), None);

        let data = tokio::fs::read_to_string(&path).await.unwrap();
        let entries: Value = serde_json::from_str(&data).unwrap();
        assert_eq!(entries["remember"], Value::Bool(true));
        assert_eq!(entries["cart"]["items"][1], 2);
        assert!(entries.get("token").is_none());
    }

    #[tokio::test]
    async fn test_file_store_non_string_token_is_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("storage.json");
        tokio::fs::write(&path, r#"{"token":42}"#).await.unwrap();

        let store = FileSessionStore::new(path.clone()).await.unwrap();
        assert_eq!(store.get(CredentialSlot::Durable).await.unwrap(), None);

        store
            .store(CredentialSlot::Durable, token("fresh"))
            .await
            .unwrap();
        assert_eq!(
            store.get(CredentialSlot::Durable).await.unwrap(),
            Some(token("fresh"))
        );
    }

    #[tokio::test]
    async fn test_file_store_blank_value_is_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("storage.json");
        tokio::fs::write(&path, r#"{"token":"  "}"#).await.unwrap();

        let store = FileSessionStore::new(path).await.unwrap();
        assert_eq!(store.get(CredentialSlot::Durable).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_is_session_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("storage.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = FileSessionStore::new(path).await.unwrap();
        let err = store.get(CredentialSlot::Durable).await.unwrap_err();
        assert!(matches!(err, TourchatError::Session(_)));
    }

    #[tokio::test]
    async fn test_file_store_custom_key() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("storage.json");
        let store = FileSessionStore::new(path.clone())
            .await
            .unwrap()
            .with_key("access_token");
        store
            .store(CredentialSlot::Durable, token("k"))
            .await
            .unwrap();

        let data = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(data.contains("access_token"));
    }
}
