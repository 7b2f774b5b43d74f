//! Services layer for the pricing backend.
//!
//! Business logic for identity, users and reports. Storage and the session
//! store sit behind traits so tests can swap in in-memory fakes.

mod auth;
pub mod database;
pub mod error;
mod reports;
mod session;
mod users;

pub use auth::AuthService;
pub use database::{
    Database, MockReportStore, MockUserStore, ReportStore, UserChanges, UserStore,
};
pub use error::ServiceError;
pub use reports::ReportService;
pub use session::{MockSessionStore, RedisSessionStore, SessionStore};
pub use users::UserService;
