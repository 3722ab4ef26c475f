//! User models

use crate::auth::password::Digest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User as returned to clients (the credential digest is never included)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: HashMap<String, i32>,
}

/// Stored user document
#[derive(Debug, Clone)]
pub struct UserDocument {
    pub id: String,
    pub username: String,
    pub name: String,
    pub rating: HashMap<String, i32>,
    pub password: Digest,
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        Self {
            id: doc.id,
            username: doc.username,
            name: doc.name,
            rating: doc.rating,
        }
    }
}

/// Minimal token subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub name: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
        }
    }
}

/// Create user request
#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: HashMap<String, i32>,
}

/// Update user request; replaces these fields on the stored document
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUser {
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: HashMap<String, i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub inserted_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub matched_count: u64,
    pub modified_count: u64,
}
