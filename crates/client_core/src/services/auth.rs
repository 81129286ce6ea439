use std::sync::Arc;

use chrono::Utc;
use shared::protocol::{LoginRequest, LoginResponse};
use tracing::{info, warn};

use crate::{
    api::{ApiClient, API_PREFIX},
    error::{ClientError, ClientResult},
    session::{Session, SessionStore},
};

#[derive(Clone)]
pub struct AuthService {
    api: Arc<ApiClient>,
    store: Arc<dyn SessionStore>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>, store: Arc<dyn SessionStore>) -> Self {
        Self { api, store }
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "email and password are required".into(),
            ));
        }

        let response: LoginResponse = self
            .api
            .post_json(
                &format!("{API_PREFIX}/auth/login"),
                &LoginRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                },
            )
            .await?;

        let session = Session::new(response.token, response.user);
        self.api.set_token(Some(session.token.clone())).await;
        self.store.save(&session).await?;
        info!(
            user_id = session.user.id.0,
            role = ?session.role(),
            "signed in"
        );
        Ok(session)
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.api.set_token(None).await;
        self.store.clear().await?;
        info!("signed out");
        Ok(())
    }

    /// Forgets a session the backend refused. The token is dropped from the
    /// HTTP client and the persisted copy is removed, so the next start does
    /// not reinstall it.
    pub async fn invalidate(&self) -> ClientResult<()> {
        self.api.set_token(None).await;
        self.store.clear().await?;
        warn!("session rejected by backend; cleared");
        Ok(())
    }

    /// Installs the persisted session's token, if any. An expired session is
    /// removed and reported as [`ClientError::SessionExpired`].
    pub async fn restore(&self) -> ClientResult<Option<Session>> {
        let Some(session) = self.store.load().await? else {
            return Ok(None);
        };
        if session.is_expired(Utc::now()) {
            return Err(self.discard_expired(&session).await);
        }
        self.api.set_token(Some(session.token.clone())).await;
        info!(user_id = session.user.id.0, "restored session");
        Ok(Some(session))
    }

    pub async fn current_session(&self) -> ClientResult<Session> {
        let session = self
            .store
            .load()
            .await?
            .ok_or(ClientError::NotAuthenticated)?;
        if session.is_expired(Utc::now()) {
            return Err(self.discard_expired(&session).await);
        }
        Ok(session)
    }

    async fn discard_expired(&self, session: &Session) -> ClientError {
        warn!(user_id = session.user.id.0, "persisted session expired");
        self.api.set_token(None).await;
        match self.store.clear().await {
            Ok(()) => ClientError::SessionExpired,
            Err(err) => err,
        }
    }
}
