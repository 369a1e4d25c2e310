/// Postgres-backed `UserStore`.
///
/// Users live in `users`; refresh-token fingerprints live in a separate
/// `refresh_tokens` table keyed by the fingerprint with a foreign key to the
/// owning user, so membership and removal stay O(1) regardless of how many
/// sessions a user holds.
///
/// The conditional update runs DELETE and INSERT inside one transaction and
/// checks `rows_affected` on the DELETE: under read-committed isolation a
/// raced DELETE of the same row blocks until the winner commits and then
/// reports zero rows, which surfaces as `Conflict`.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{StoreError, UserStore};
use crate::user::{NewUser, User};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the schema migrations under `./migrations`.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, (Uuid, String, String, DateTime<Utc>, DateTime<Utc>)>(
            r#"
            SELECT id, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let (id, email, password_hash, created_at, updated_at) = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let fingerprints: Vec<String> = sqlx::query_scalar(
            "SELECT token_hash FROM refresh_tokens WHERE user_id = $1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(User {
            id,
            email,
            password_hash,
            refresh_tokens: fingerprints.into_iter().collect::<HashSet<_>>(),
            created_at,
            updated_at,
        }))
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            refresh_tokens: HashSet::new(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_refresh_tokens(
        &self,
        user_id: Uuid,
        remove: Option<&str>,
        add: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        if let Some(fingerprint) = remove {
            let deleted = sqlx::query(
                "DELETE FROM refresh_tokens WHERE token_hash = $1 AND user_id = $2",
            )
            .bind(fingerprint)
            .bind(user_id)
            .execute(&mut tx)
            .await?;

            if deleted.rows_affected() == 0 {
                // Already rotated by a concurrent call; dropping the
                // transaction rolls back.
                return Err(StoreError::Conflict);
            }
        }

        if let Some(fingerprint) = add {
            sqlx::query(
                r#"
                INSERT INTO refresh_tokens (token_hash, user_id, created_at)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(fingerprint)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut tx)
            .await?;
        }

        sqlx::query("UPDATE users SET updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(user_id)
            .execute(&mut tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
