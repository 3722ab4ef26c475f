//! PostgreSQL-backed user store
//!
//! Each user document is one row of `"<database>"."<collection>"`.

use super::{StoreError, UserFilter, UserStore};
use crate::{
    auth::password::Digest,
    models::user::{InsertAck, UpdateAck, UpdateUser, UserDocument},
};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use std::collections::HashMap;

pub struct PgUserStore {
    db: PgPool,
    schema: String,
    table: String,
}

impl PgUserStore {
    /// `database` and `collection` must already be validated identifiers
    pub fn new(db: PgPool, database: &str, collection: &str) -> Self {
        Self {
            db,
            schema: format!("\"{}\"", database),
            table: format!("\"{}\".\"{}\"", database, collection),
        }
    }

    /// Create the schema and collection table if missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", self.schema))
            .execute(&self.db)
            .await?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL DEFAULT '',
                rating JSONB NOT NULL DEFAULT '{{}}'::jsonb,
                password BYTEA NOT NULL
            )
            "#,
            self.table
        ))
        .execute(&self.db)
        .await?;

        tracing::info!(table = %self.table, "User collection ready");
        Ok(())
    }

    fn from_row(row: &PgRow) -> Result<UserDocument, StoreError> {
        let password: Vec<u8> = row.try_get("password")?;
        let Json(rating): Json<HashMap<String, i32>> = row.try_get("rating")?;

        Ok(UserDocument {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            name: row.try_get("name")?,
            rating,
            password: Digest::from_slice(&password)
                .ok_or_else(|| StoreError::Backend("stored digest is not 32 bytes".to_string()))?,
        })
    }
}

fn map_unique_violation(e: sqlx::Error, username: &str) -> StoreError {
    match e.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => StoreError::Duplicate(username.to_string()),
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<UserDocument>, StoreError> {
        let select = format!("SELECT id, username, name, rating, password FROM {}", self.table);

        let row = match filter {
            UserFilter::Id(id) => {
                sqlx::query(&format!("{} WHERE id = $1", select))
                    .bind(id)
                    .fetch_optional(&self.db)
                    .await?
            }
            UserFilter::Username(username) => {
                sqlx::query(&format!("{} WHERE username = $1", select))
                    .bind(username)
                    .fetch_optional(&self.db)
                    .await?
            }
            UserFilter::Credentials { username, digest } => {
                sqlx::query(&format!("{} WHERE username = $1 AND password = $2", select))
                    .bind(username)
                    .bind(digest.as_bytes().to_vec())
                    .fetch_optional(&self.db)
                    .await?
            }
        };

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn find_by_usernames(
        &self,
        usernames: &[String],
    ) -> Result<Vec<UserDocument>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT id, username, name, rating, password FROM {}
            WHERE username = ANY($1)
            ORDER BY username
            "#,
            self.table
        ))
        .bind(usernames.to_vec())
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(Self::from_row).collect()
    }

    async fn insert(&self, doc: UserDocument) -> Result<InsertAck, StoreError> {
        sqlx::query(&format!(
            "INSERT INTO {} (id, username, name, rating, password) VALUES ($1, $2, $3, $4, $5)",
            self.table
        ))
        .bind(&doc.id)
        .bind(&doc.username)
        .bind(&doc.name)
        .bind(Json(&doc.rating))
        .bind(doc.password.as_bytes().to_vec())
        .execute(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, &doc.username))?;

        Ok(InsertAck {
            inserted_id: doc.id,
        })
    }

    async fn update(&self, id: &str, update: &UpdateUser) -> Result<UpdateAck, StoreError> {
        let matched: Option<i32> =
            sqlx::query_scalar(&format!("SELECT 1 FROM {} WHERE id = $1", self.table))
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        if matched.is_none() {
            return Ok(UpdateAck {
                matched_count: 0,
                modified_count: 0,
            });
        }

        let result = sqlx::query(&format!(
            r#"
            UPDATE {}
            SET username = $2, name = $3, rating = $4
            WHERE id = $1
              AND (username, name, rating) IS DISTINCT FROM ($2, $3, $4)
            "#,
            self.table
        ))
        .bind(id)
        .bind(&update.username)
        .bind(&update.name)
        .bind(Json(&update.rating))
        .execute(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, &update.username))?;

        Ok(UpdateAck {
            matched_count: 1,
            modified_count: result.rows_affected(),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
