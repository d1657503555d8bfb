#![allow(clippy::unwrap_used, clippy::expect_used)]

use tourchat_session::{resolve_credential, CredentialSlot, FileSessionStore, SessionStore, Token};

/// Helper: create a FileSessionStore in a temp directory.
async fn temp_store() -> (FileSessionStore, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(tmp.path().join("browser").join("storage.json"))
        .await
        .unwrap();
    (store, tmp)
}

fn token(raw: &str) -> Token {
    Token::parse(raw).unwrap()
}

#[tokio::test]
async fn test_durable_token_survives_new_instance() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("storage.json");

    {
        let store = FileSessionStore::new(path.clone()).await.unwrap();
        store
            .store(CredentialSlot::Durable, token("jwt-1"))
            .await
            .unwrap();
    }

    let store = FileSessionStore::new(path).await.unwrap();
    assert_eq!(resolve_credential(&store).await, Some(token("jwt-1")));
}

#[tokio::test]
async fn test_ephemeral_token_does_not_survive_new_instance() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("storage.json");

    {
        let store = FileSessionStore::new(path.clone()).await.unwrap();
        store
            .store(CredentialSlot::Ephemeral, token("tab-only"))
            .await
            .unwrap();
        assert_eq!(resolve_credential(&store).await, Some(token("tab-only")));
    }

    let store = FileSessionStore::new(path).await.unwrap();
    assert!(resolve_credential(&store).await.is_none());
}

#[tokio::test]
async fn test_clear_all_removes_both_slots() {
    let (store, _tmp) = temp_store().await;
    store
        .store(CredentialSlot::Durable, token("d"))
        .await
        .unwrap();
    store
        .store(CredentialSlot::Ephemeral, token("e"))
        .await
        .unwrap();

    store.clear_all().await.unwrap();

    assert!(store.get(CredentialSlot::Durable).await.unwrap().is_none());
    assert!(store.get(CredentialSlot::Ephemeral).await.unwrap().is_none());
    assert!(resolve_credential(&store).await.is_none());
}

#[tokio::test]
async fn test_durable_preferred_on_file_store() {
    let (store, _tmp) = temp_store().await;
    store
        .store(CredentialSlot::Ephemeral, token("e"))
        .await
        .unwrap();
    store
        .store(CredentialSlot::Durable, token("d"))
        .await
        .unwrap();

    assert_eq!(resolve_credential(&store).await, Some(token("d")));
}

#[tokio::test]
async fn test_store_overwrites_previous_token() {
    let (store, _tmp) = temp_store().await;
    store
        .store(CredentialSlot::Durable, token("old"))
        .await
        .unwrap();
    store
        .store(CredentialSlot::Durable, token("new"))
        .await
        .unwrap();

    assert_eq!(
        store.get(CredentialSlot::Durable).await.unwrap(),
        Some(token("new"))
    );
}

#[tokio::test]
async fn test_shared_file_with_mixed_values_still_resolves_token() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("storage.json");
    tokio::fs::write(&path, r#"{"remember":true,"token":"abc"}"#)
        .await
        .unwrap();

    let store = FileSessionStore::new(path.clone()).await.unwrap();
    assert_eq!(resolve_credential(&store).await, Some(token("abc")));

    // A stale token must still be removable without touching other entries.
    store.clear_all().await.unwrap();
    assert!(resolve_credential(&store).await.is_none());
    let data = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(data.contains("remember"));
}
