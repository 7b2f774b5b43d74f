pub mod auth;
pub mod reports;
pub mod users;

use serde::{Deserialize, Serialize};
use service_core::projection::ProjectionSpec;
use utoipa::ToSchema;

use crate::models::{Report, User};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Invalid credentials")]
    pub error: String,
}

/// The registered output shapes, built once at startup and shared through
/// `AppState`. Every route that returns an entity picks its spec here; the
/// projection is the only path from internal objects to response bodies.
pub struct Projections {
    pub user: ProjectionSpec<User>,
    pub report: ProjectionSpec<Report>,
}

impl Projections {
    pub fn new() -> Self {
        Self {
            user: users::user_projection(),
            report: reports::report_projection(),
        }
    }
}

impl Default for Projections {
    fn default() -> Self {
        Self::new()
    }
}
