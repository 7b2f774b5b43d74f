//! Report model - one submitted vehicle sale price.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A price report submitted by a user. Reports only feed estimates once an
/// admin has approved them.
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: i64,
    pub user_id: i64,
    pub make: String,
    pub model: String,
    pub year: i64,
    pub mileage: i64,
    pub lng: f64,
    pub lat: f64,
    pub price: f64,
    pub approved: bool,
    pub created_utc: DateTime<Utc>,
}
