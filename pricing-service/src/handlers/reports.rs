use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::reports::{ApproveReportRequest, CreateReportRequest, EstimateQuery, EstimateResponse},
    middleware::{AdminUser, CurrentUser},
    utils::ValidatedJson,
    AppState,
};

/// Submit a price report for the signed-in user
#[utoipa::path(
    post,
    path = "/reports",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report created"),
        (status = 401, description = "No session", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn create_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let report = state.report_service.create(&user, req).await?;
    let body = state.projections.report.project(&report)?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// Approve or reject a report
#[utoipa::path(
    patch,
    path = "/reports/{id}",
    params(("id" = i64, Path, description = "Report id")),
    request_body = ApproveReportRequest,
    responses(
        (status = 200, description = "The updated report"),
        (status = 401, description = "No session", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Unknown report", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn approve_report(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(req): Json<ApproveReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let report = state.report_service.set_approval(id, req.approved).await?;
    let body = state.projections.report.project(&report)?;
    Ok(Json(body))
}

/// Estimate a vehicle's value from approved reports
#[utoipa::path(
    get,
    path = "/reports",
    params(EstimateQuery),
    responses(
        (status = 200, description = "The estimate", body = EstimateResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn get_estimate(
    State(state): State<AppState>,
    Query(params): Query<EstimateQuery>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let price = state.report_service.estimate(&params).await?;
    Ok(Json(EstimateResponse { price }))
}
