use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::users::{UpdateUserRequest, UserListParams},
    utils::ValidatedJson,
    AppState,
};

/// Fetch one user by id
#[utoipa::path(
    get,
    path = "/auth/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "The user"),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn find_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_service.find_by_id(id).await?;
    let body = state.projections.user.project(&user)?;
    Ok(Json(body))
}

/// List users, optionally filtered by email
#[utoipa::path(
    get,
    path = "/auth",
    params(UserListParams),
    responses(
        (status = 200, description = "Matching users")
    ),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<impl IntoResponse, AppError> {
    let users = state.user_service.find(params.email.as_deref()).await?;
    let body = state.projections.user.project_all(&users)?;
    Ok(Json(body))
}

/// Update a user's email and/or password
#[utoipa::path(
    patch,
    path = "/auth/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "The updated user"),
        (status = 404, description = "Unknown user", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_service.update(id, req).await?;
    let body = state.projections.user.project(&user)?;
    Ok(Json(body))
}

/// Remove a user
#[utoipa::path(
    delete,
    path = "/auth/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "The removed user"),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn remove_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_service.remove(id).await?;
    let body = state.projections.user.project(&user)?;
    Ok(Json(body))
}
