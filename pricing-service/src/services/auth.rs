use std::sync::Arc;

use rand::Rng;

use crate::{
    dtos::auth::{SigninRequest, SignupRequest},
    models::User,
    services::{ServiceError, SessionStore, UserStore},
    utils::{hash_password, verify_password, Password},
};

/// Credential creation, verification and session identity resolution.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    session_ttl_seconds: i64,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        session_ttl_seconds: i64,
    ) -> Self {
        Self {
            users,
            sessions,
            session_ttl_seconds,
        }
    }

    pub async fn signup(&self, req: SignupRequest) -> Result<User, ServiceError> {
        // The unique index on users.email backs this check at the storage
        // layer; concurrent duplicates fail on insert.
        if self
            .users
            .find_by_email(&req.email)
            .await
            .map_err(ServiceError::Database)?
            .is_some()
        {
            return Err(ServiceError::EmailInUse);
        }

        let password_hash = hash_password(&Password::new(req.password));

        let user = self
            .users
            .create(&req.email, &password_hash)
            .await
            .map_err(ServiceError::Database)?;

        tracing::info!(user_id = user.id, "User signed up");

        Ok(user)
    }

    pub async fn signin(&self, req: SigninRequest) -> Result<User, ServiceError> {
        let user = self
            .users
            .find_by_email(&req.email)
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::UserNotFound)?;

        let matches = verify_password(&Password::new(req.password), &user.password_hash)?;
        if !matches {
            return Err(ServiceError::InvalidCredentials);
        }

        tracing::info!(user_id = user.id, "User signed in");

        Ok(user)
    }

    /// Mint an opaque session token for an authenticated user. The boundary
    /// layer hands the token to the client as a cookie.
    pub async fn establish_session(&self, user: &User) -> Result<String, ServiceError> {
        let token = generate_session_token();
        self.sessions
            .put(&token, user.id, self.session_ttl_seconds)
            .await
            .map_err(ServiceError::Session)?;
        Ok(token)
    }

    pub async fn destroy_session(&self, token: &str) -> Result<(), ServiceError> {
        self.sessions
            .remove(token)
            .await
            .map_err(ServiceError::Session)
    }

    /// Session lookup, then user load. Absent or stale sessions are not an
    /// error; callers decide whether anonymous access is allowed.
    pub async fn resolve_current_user(&self, token: &str) -> Result<Option<User>, ServiceError> {
        let Some(user_id) = self
            .sessions
            .get(token)
            .await
            .map_err(ServiceError::Session)?
        else {
            return Ok(None);
        };

        self.users
            .find_by_id(user_id)
            .await
            .map_err(ServiceError::Database)
    }
}

fn generate_session_token() -> String {
    let mut rng = rand::thread_rng();
    let token_bytes: [u8; 32] = rng.gen();
    hex::encode(token_bytes)
}
