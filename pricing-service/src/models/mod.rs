pub mod report;
pub mod user;

pub use report::Report;
pub use user::User;
