use super::*;

use chrono::Duration;

fn sample_user(role: Role) -> User {
    User {
        id: UserId(7),
        name: "Lucia".to_string(),
        last_name: Some("Paz".to_string()),
        email: "lucia@example.com".to_string(),
        role,
        phone: None,
        active: true,
    }
}

fn jwt_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"7","exp":{exp}}}"#));
    format!("{header}.{claims}.signature")
}

#[test]
fn reads_expiry_from_jwt_payload() {
    let now = Utc::now();
    let session = Session::new(jwt_with_exp(now.timestamp() + 3600), sample_user(Role::Inquilino));

    let expiry = session.token_expiry().expect("exp claim");
    assert_eq!(expiry.timestamp(), now.timestamp() + 3600);
    assert!(!session.is_expired(now));
    assert!(session.is_expired(now + Duration::hours(2)));
}

#[test]
fn opaque_tokens_never_expire_client_side() {
    let session = Session::new("opaque-token", sample_user(Role::Contador));
    assert!(session.token_expiry().is_none());
    assert!(!session.is_expired(Utc::now() + Duration::days(3650)));
    assert_eq!(session.role(), Role::Contador);
}

#[tokio::test]
async fn file_store_round_trips_and_clears() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileSessionStore::in_dir(&dir.path().join("nested"));
    assert!(store.load().await.expect("load empty").is_none());

    let session = Session::new("tok", sample_user(Role::Propietario));
    store.save(&session).await.expect("save");
    assert!(store.path().exists());

    let loaded = store.load().await.expect("load").expect("session present");
    assert_eq!(loaded.user.id, UserId(7));
    assert_eq!(loaded.role(), Role::Propietario);

    store.clear().await.expect("clear");
    assert!(store.load().await.expect("load after clear").is_none());
    store.clear().await.expect("clearing twice is fine");
}

#[tokio::test]
async fn corrupt_session_file_is_discarded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileSessionStore::in_dir(dir.path());
    std::fs::write(store.path(), b"{not json").expect("write garbage");

    assert!(store.load().await.expect("load").is_none());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn memory_store_holds_latest_session() {
    let store = MemorySessionStore::default();
    store
        .save(&Session::new("a", sample_user(Role::Inquilino)))
        .await
        .expect("save");
    store
        .save(&Session::new("b", sample_user(Role::Administrador)))
        .await
        .expect("save");

    let loaded = store.load().await.expect("load").expect("present");
    assert_eq!(loaded.token, "b");
    store.clear().await.expect("clear");
    assert!(store.load().await.expect("load").is_none());
}
