pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, REQUEST_ID_HEADER};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ServiceConfig;
use crate::dtos::Projections;
use crate::services::{
    AuthService, Database, ReportService, ReportStore, SessionStore, UserService, UserStore,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::auth::signup,
        handlers::auth::signin,
        handlers::auth::signout,
        handlers::auth::whoami,
        handlers::user::find_user,
        handlers::user::list_users,
        handlers::user::update_user,
        handlers::user::remove_user,
        handlers::reports::create_report,
        handlers::reports::approve_report,
        handlers::reports::get_estimate,
    ),
    components(schemas(
        dtos::ErrorResponse,
        dtos::auth::SignupRequest,
        dtos::auth::SigninRequest,
        dtos::users::UpdateUserRequest,
        dtos::reports::CreateReportRequest,
        dtos::reports::ApproveReportRequest,
        dtos::reports::EstimateResponse,
    )),
    tags(
        (name = "Authentication", description = "Signup, signin and session identity"),
        (name = "Users", description = "User lookup and administration"),
        (name = "Reports", description = "Vehicle price reports and estimates"),
        (name = "Observability", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub db: Database,
    pub sessions: Arc<dyn SessionStore>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub report_service: ReportService,
    pub projections: Arc<Projections>,
}

impl AppState {
    /// Wire the service layer over a database and session store.
    pub fn new(config: ServiceConfig, db: Database, sessions: Arc<dyn SessionStore>) -> Self {
        let users: Arc<dyn UserStore> = Arc::new(db.clone());
        let reports: Arc<dyn ReportStore> = Arc::new(db.clone());

        let auth_service = AuthService::new(
            users.clone(),
            sessions.clone(),
            config.session.ttl_seconds,
        );
        let user_service = UserService::new(users);
        let report_service = ReportService::new(reports);

        Self {
            config,
            db,
            sessions,
            auth_service,
            user_service,
            report_service,
            projections: Arc::new(Projections::new()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let mut app = Router::new().route("/health", get(health_check));

    // Swagger UI is always on in dev; production exposes it only when
    // configured to.
    let swagger_enabled = match state.config.environment {
        config::Environment::Dev => true,
        config::Environment::Prod => state.config.swagger.enabled == config::SwaggerMode::Public,
    };

    if swagger_enabled {
        app = app.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .security
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<axum::http::HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    app.route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/signin", post(handlers::auth::signin))
        .route("/auth/signout", post(handlers::auth::signout))
        .route("/auth/whoami", get(handlers::auth::whoami))
        .route("/auth", get(handlers::user::list_users))
        .route(
            "/auth/:id",
            get(handlers::user::find_user)
                .patch(handlers::user::update_user)
                .delete(handlers::user::remove_user),
        )
        .route(
            "/reports",
            post(handlers::reports::create_report).get(handlers::reports::get_estimate),
        )
        .route("/reports/:id", patch(handlers::reports::approve_report))
        // Resolve the session identity once, before any handler runs.
        .layer(from_fn_with_state(
            state.clone(),
            middleware::current_user_middleware,
        ))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(cors)
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 500, description = "Service is unhealthy")
    ),
    tag = "Observability"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Database health check failed");
        AppError::InternalError(e)
    })?;

    state.sessions.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Session store health check failed");
        AppError::InternalError(e)
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "checks": {
            "database": "up",
            "sessions": "up"
        }
    })))
}
