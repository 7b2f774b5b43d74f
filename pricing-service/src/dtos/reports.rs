use serde::{Deserialize, Serialize};
use service_core::projection::ProjectionSpec;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::Report;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReportRequest {
    #[validate(length(min = 1, message = "Make is required"))]
    #[schema(example = "toyota")]
    pub make: String,

    #[validate(length(min = 1, message = "Model is required"))]
    #[schema(example = "corolla")]
    pub model: String,

    #[validate(range(min = 1930, max = 2050))]
    #[schema(example = 2018)]
    pub year: i64,

    #[validate(range(min = 0, max = 1_000_000))]
    #[schema(example = 45_000)]
    pub mileage: i64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = 0.0, max = 1_000_000.0))]
    #[schema(example = 12_500.0)]
    pub price: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveReportRequest {
    pub approved: bool,
}

/// Query parameters for a price estimate: the vehicle being valued.
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct EstimateQuery {
    #[validate(length(min = 1, message = "Make is required"))]
    pub make: String,

    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,

    #[validate(range(min = 1930, max = 2050))]
    pub year: i64,

    #[validate(range(min = 0, max = 1_000_000))]
    pub mileage: i64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EstimateResponse {
    /// Average price of the three approved reports closest in mileage, or
    /// null when nothing comparable has been reported.
    pub price: Option<f64>,
}

/// Whitelist for report-shaped responses. The owner is flattened into a
/// `userId` field; internal bookkeeping stays internal.
pub fn report_projection() -> ProjectionSpec<Report> {
    ProjectionSpec::new("report")
        .expose("id", |r: &Report| r.id)
        .expose("price", |r: &Report| r.price)
        .expose("year", |r: &Report| r.year)
        .expose("lng", |r: &Report| r.lng)
        .expose("lat", |r: &Report| r.lat)
        .expose("make", |r: &Report| r.make.clone())
        .expose("model", |r: &Report| r.model.clone())
        .expose("mileage", |r: &Report| r.mileage)
        .expose("approved", |r: &Report| r.approved)
        .expose("userId", |r: &Report| r.user_id)
}
