use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use service_core::error::AppError;

use crate::{
    dtos::auth::{SigninRequest, SignupRequest},
    middleware::CurrentUser,
    utils::ValidatedJson,
    AppState,
};

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((state.config.session.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.session.secure_cookies)
        .build()
}

fn removal_cookie(state: &AppState) -> Cookie<'static> {
    Cookie::build((state.config.session.cookie_name.clone(), ""))
        .path("/")
        .build()
}

/// Create an account and start a session
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created; session cookie set"),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.signup(req).await?;
    let token = state.auth_service.establish_session(&user).await?;

    let body = state.projections.user.project(&user)?;

    Ok((
        jar.add(session_cookie(&state, token)),
        (StatusCode::CREATED, Json(body)),
    ))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set"),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 404, description = "Unknown email", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<SigninRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.signin(req).await?;
    let token = state.auth_service.establish_session(&user).await?;

    let body = state.projections.user.project(&user)?;

    Ok((
        jar.add(session_cookie(&state, token)),
        (StatusCode::OK, Json(body)),
    ))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/auth/signout",
    responses(
        (status = 200, description = "Session ended")
    ),
    tag = "Authentication"
)]
pub async fn signout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let token = jar
        .get(&state.config.session.cookie_name)
        .map(|cookie| cookie.value().to_string());

    let mut jar = jar;
    if let Some(token) = token {
        state.auth_service.destroy_session(&token).await?;
        jar = jar.remove(removal_cookie(&state));
    }

    Ok((
        jar,
        Json(serde_json::json!({
            "message": "Signed out"
        })),
    ))
}

/// Report the signed-in user
#[utoipa::path(
    get,
    path = "/auth/whoami",
    responses(
        (status = 200, description = "The current user"),
        (status = 401, description = "No session", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn whoami(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let body = state.projections.user.project(&user)?;
    Ok(Json(body))
}
