use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::domain::{Role, User, UserId};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

const SESSION_FILE_NAME: &str = "session.json";

/// Bearer token plus the user object returned at login, as cached locally
/// between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub saved_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
            saved_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    /// `exp` claim of the token, if it is a JWT carrying one. The signature is
    /// not checked; the backend remains the authority.
    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        let payload = self.token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
        let exp = claims.get("exp")?.as_i64()?;
        DateTime::from_timestamp(exp, 0)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.token_expiry().is_some_and(|exp| exp <= now)
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> ClientResult<Option<Session>>;
    async fn save(&self, session: &Session) -> ClientResult<()>;
    async fn clear(&self) -> ClientResult<()>;
}

pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SESSION_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> ClientResult<Option<Session>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_slice::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    "discarding unreadable session file: {err}"
                );
                self.clear().await?;
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let serialized = serde_json::to_vec_pretty(session)
            .map_err(|err| ClientError::Session(err.to_string()))?;
        tokio::fs::write(&self.path, serialized).await?;
        debug!(path = %self.path.display(), user_id = session.user.id.0, "session saved");
        Ok(())
    }

    async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> ClientResult<Option<Session>> {
        Ok(self.inner.lock().await.clone())
    }

    async fn save(&self, session: &Session) -> ClientResult<()> {
        *self.inner.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> ClientResult<()> {
        self.inner.lock().await.take();
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
