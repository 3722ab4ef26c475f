//! In-memory user store
//!
//! Usernames are claimed in a separate index before a document is written, so
//! two concurrent writers can never both own the same username.

use super::{StoreError, UserFilter, UserStore};
use crate::models::user::{InsertAck, UpdateAck, UpdateUser, UserDocument};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};

/// User documents keyed by `_id`, plus a username -> `_id` index
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    documents: DashMap<String, UserDocument>,
    usernames: DashMap<String, String>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a document; returns whether it existed
    pub fn remove(&self, id: &str) -> bool {
        match self.documents.remove(id) {
            Some((_, doc)) => {
                self.release_username(&doc.username, id);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Claim `username` for `id`. Succeeds if it is free or already owned by `id`.
    fn claim_username(&self, username: &str, id: &str) -> Result<(), StoreError> {
        match self.usernames.entry(username.to_string()) {
            Entry::Occupied(owner) if owner.get() != id => {
                Err(StoreError::Duplicate(username.to_string()))
            }
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(id.to_string());
                Ok(())
            }
        }
    }

    fn release_username(&self, username: &str, id: &str) {
        self.usernames.remove_if(username, |_, owner| owner == id);
    }

    fn by_username(&self, username: &str) -> Option<UserDocument> {
        let id = self.usernames.get(username)?.value().clone();
        self.documents
            .get(&id)
            .map(|doc| doc.value().clone())
            .filter(|doc| doc.username == username)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<UserDocument>, StoreError> {
        let found = match filter {
            UserFilter::Id(id) => self.documents.get(id).map(|doc| doc.value().clone()),
            UserFilter::Username(username) => self.by_username(username),
            UserFilter::Credentials { username, .. } => self.by_username(username),
        };

        Ok(found.filter(|doc| filter.matches(doc)))
    }

    async fn find_by_usernames(
        &self,
        usernames: &[String],
    ) -> Result<Vec<UserDocument>, StoreError> {
        let mut docs: Vec<UserDocument> = self
            .documents
            .iter()
            .filter(|entry| usernames.contains(&entry.username))
            .map(|entry| entry.value().clone())
            .collect();
        docs.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(docs)
    }

    async fn insert(&self, doc: UserDocument) -> Result<InsertAck, StoreError> {
        self.claim_username(&doc.username, &doc.id)?;

        let inserted_id = doc.id.clone();
        let new_username = doc.username.clone();
        if let Some(previous) = self.documents.insert(doc.id.clone(), doc) {
            if previous.username != new_username {
                self.release_username(&previous.username, &inserted_id);
            }
        }

        Ok(InsertAck { inserted_id })
    }

    async fn update(&self, id: &str, update: &UpdateUser) -> Result<UpdateAck, StoreError> {
        let not_matched = UpdateAck {
            matched_count: 0,
            modified_count: 0,
        };

        if !self.documents.contains_key(id) {
            return Ok(not_matched);
        }

        self.claim_username(&update.username, id)?;

        let previous_username = {
            let Some(mut doc) = self.documents.get_mut(id) else {
                self.release_username(&update.username, id);
                return Ok(not_matched);
            };

            let unchanged = doc.username == update.username
                && doc.name == update.name
                && doc.rating == update.rating;
            if unchanged {
                return Ok(UpdateAck {
                    matched_count: 1,
                    modified_count: 0,
                });
            }

            let previous = std::mem::replace(&mut doc.username, update.username.clone());
            doc.name = update.name.clone();
            doc.rating = update.rating.clone();
            previous
        };

        if previous_username != update.username {
            self.release_username(&previous_username, id);
        }

        Ok(UpdateAck {
            matched_count: 1,
            modified_count: 1,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
