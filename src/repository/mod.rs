//! User store: the persistence collaborator
//!
//! Callers only supply filters and consume typed documents; how documents are
//! kept is up to the implementation.

pub mod memory;
pub mod user_repo;

pub use memory::MemoryUserStore;
pub use user_repo::PgUserStore;

use crate::{
    auth::password::Digest,
    models::user::{InsertAck, UpdateAck, UpdateUser, UserDocument},
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate username: {0}")]
    Duplicate(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Lookup filter for a single user document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    /// `{_id}`
    Id(String),
    /// `{username}`
    Username(String),
    /// `{username, password digest}`
    Credentials { username: String, digest: Digest },
}

impl UserFilter {
    pub fn matches(&self, doc: &UserDocument) -> bool {
        match self {
            UserFilter::Id(id) => doc.id == *id,
            UserFilter::Username(username) => doc.username == *username,
            UserFilter::Credentials { username, digest } => {
                doc.username == *username && doc.password == *digest
            }
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// First document matching `filter`, `None` when nothing matches
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<UserDocument>, StoreError>;

    /// All documents whose username is in `usernames`
    async fn find_by_usernames(&self, usernames: &[String])
        -> Result<Vec<UserDocument>, StoreError>;

    async fn insert(&self, doc: UserDocument) -> Result<InsertAck, StoreError>;

    /// Replace the updatable fields of the document with `_id == id`
    async fn update(&self, id: &str, update: &UpdateUser) -> Result<UpdateAck, StoreError>;

    /// Cheap liveness probe
    async fn ping(&self) -> Result<(), StoreError>;
}
