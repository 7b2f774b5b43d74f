use std::sync::Arc;

use crate::{
    dtos::users::UpdateUserRequest,
    models::User,
    services::{ServiceError, UserStore},
    services::database::UserChanges,
    utils::{hash_password, Password},
};

/// User lookup and administration on top of the user store.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<User, ServiceError> {
        self.users
            .find_by_id(id)
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::UserNotFound)
    }

    pub async fn find(&self, email: Option<&str>) -> Result<Vec<User>, ServiceError> {
        self.users
            .list(email)
            .await
            .map_err(ServiceError::Database)
    }

    /// Apply a partial update. A new password goes through the same KDF as
    /// signup; plaintext is never written to the store.
    pub async fn update(&self, id: i64, req: UpdateUserRequest) -> Result<User, ServiceError> {
        let changes = UserChanges {
            email: req.email,
            password_hash: req
                .password
                .map(|password| hash_password(&Password::new(password))),
        };
        self.users
            .update(id, changes)
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::UserNotFound)
    }

    pub async fn remove(&self, id: i64) -> Result<User, ServiceError> {
        self.users
            .delete(id)
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockUserStore;

    async fn seeded() -> (UserService, User) {
        let store = Arc::new(MockUserStore::new());
        let user = store.create("driver@example.com", "salt.key").await.unwrap();
        (UserService::new(store), user)
    }

    #[tokio::test]
    async fn find_by_id_returns_not_found_for_missing_users() {
        let (service, _) = seeded().await;

        let err = service.find_by_id(999).await.unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound));
    }

    #[tokio::test]
    async fn update_rehashes_a_new_password() {
        let (service, user) = seeded().await;

        let updated = service
            .update(
                user.id,
                UpdateUserRequest {
                    email: None,
                    password: Some("freshpassword".to_string()),
                },
            )
            .await
            .unwrap();

        assert_ne!(updated.password_hash, "freshpassword");
        assert!(updated.password_hash.contains('.'));
    }

    #[tokio::test]
    async fn remove_returns_the_removed_user() {
        let (service, user) = seeded().await;

        let removed = service.remove(user.id).await.unwrap();
        assert_eq!(removed.id, user.id);

        let err = service.find_by_id(user.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound));
    }
}
