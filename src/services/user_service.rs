//! User management: create, list, fetch, update

use crate::{
    auth::password::PasswordHasher,
    error::AppError,
    models::user::{InsertAck, UpdateAck, UpdateUser, User, UserDocument, UserRequest},
    repository::{StoreError, UserFilter, UserStore},
};
use std::sync::Arc;
use uuid::Uuid;

pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
        }
    }

    /// Store a new user; only the password digest is kept
    pub async fn create(&self, req: UserRequest) -> Result<InsertAck, AppError> {
        if req.username.trim().is_empty() {
            return Err(AppError::BadRequest("username must not be empty".to_string()));
        }

        let doc = UserDocument {
            id: Uuid::new_v4().to_string(),
            username: req.username,
            name: req.name,
            rating: req.rating,
            password: self.hasher.hash(&req.password),
        };

        let ack = self.store.insert(doc).await.map_err(conflict_on_duplicate)?;

        tracing::info!(user_id = %ack.inserted_id, "User created");
        Ok(ack)
    }

    pub async fn list(&self, usernames: &[String]) -> Result<Vec<User>, AppError> {
        let docs = self.store.find_by_usernames(usernames).await?;
        Ok(docs.into_iter().map(User::from).collect())
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, AppError> {
        self.store
            .find_one(&UserFilter::Username(username.to_string()))
            .await?
            .map(User::from)
            .ok_or(AppError::NotFound)
    }

    pub async fn update(&self, id: &str, update: UpdateUser) -> Result<UpdateAck, AppError> {
        if update.username.trim().is_empty() {
            return Err(AppError::BadRequest("username must not be empty".to_string()));
        }

        let ack = self
            .store
            .update(id, &update)
            .await
            .map_err(conflict_on_duplicate)?;

        tracing::info!(
            user_id = %id,
            matched = ack.matched_count,
            modified = ack.modified_count,
            "User updated"
        );
        Ok(ack)
    }
}

fn conflict_on_duplicate(e: StoreError) -> AppError {
    match e {
        StoreError::Duplicate(_) => AppError::Conflict("Username already exists".to_string()),
        other => AppError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryUserStore;
    use std::collections::HashMap;

    fn request(username: &str) -> UserRequest {
        UserRequest {
            username: username.to_string(),
            password: "secret1".to_string(),
            name: "Some Name".to_string(),
            rating: HashMap::from([("blitz".to_string(), 1500)]),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = UserService::new(Arc::new(MemoryUserStore::new()));

        let ack = service.create(request("alice")).await.unwrap();
        let user = service.get_by_username("alice").await.unwrap();

        assert_eq!(user.id, ack.inserted_id);
        assert_eq!(user.rating["blitz"], 1500);
    }

    #[tokio::test]
    async fn test_create_stores_digest_only() {
        let store = Arc::new(MemoryUserStore::new());
        let service = UserService::new(store.clone());
        service.create(request("alice")).await.unwrap();

        let doc = store
            .find_one(&UserFilter::Username("alice".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.password, PasswordHasher::new().hash("secret1"));
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let service = UserService::new(Arc::new(MemoryUserStore::new()));
        service.create(request("alice")).await.unwrap();

        let err = service.create(request("alice")).await.unwrap_err();
        assert_eq!(err.code(), 409);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let service = UserService::new(Arc::new(MemoryUserStore::new()));
        let err = service.get_by_username("nobody").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_empty_username_rejected() {
        let service = UserService::new(Arc::new(MemoryUserStore::new()));
        let err = service.create(request("  ")).await.unwrap_err();
        assert_eq!(err.code(), 400);
    }
}
