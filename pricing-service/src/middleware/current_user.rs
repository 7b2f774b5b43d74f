use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use service_core::error::AppError;

use crate::{models::User, AppState};

/// The authenticated user for this request, if any.
///
/// Resolved once per request from the session cookie and attached to request
/// extensions; handlers receive it through the extractors below rather than
/// re-reading shared mutable state.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Resolve the session cookie into a `CurrentUser` extension.
///
/// A missing or stale session is not an error here; the request continues
/// anonymously and route extractors decide whether that is acceptable.
pub async fn current_user_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = CookieJar::from_headers(req.headers())
        .get(&state.config.session.cookie_name)
        .map(|cookie| cookie.value().to_string());

    if let Some(token) = token {
        if let Some(user) = state.auth_service.resolve_current_user(&token).await? {
            req.extensions_mut().insert(CurrentUser(user));
        }
    }

    Ok(next.run(req).await)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Sign in required")))
    }
}

/// Extractor for routes restricted to admin users.
pub struct AdminUser(pub User);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.admin {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Admin access required"
            )));
        }
        Ok(AdminUser(user))
    }
}
