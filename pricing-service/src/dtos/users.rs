use serde::Deserialize;
use service_core::projection::ProjectionSpec;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::User;

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserListParams {
    /// Restrict the listing to one email address.
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "driver@example.com")]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "password123", min_length = 8)]
    pub password: Option<String>,
}

/// Whitelist for user-shaped responses. Anything not listed here (the
/// password hash included) never reaches a client.
pub fn user_projection() -> ProjectionSpec<User> {
    ProjectionSpec::new("user")
        .expose("id", |u: &User| u.id)
        .expose("email", |u: &User| u.email.clone())
}
