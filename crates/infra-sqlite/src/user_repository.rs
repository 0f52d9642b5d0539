// SQLite UserRepository Implementation

use crate::error::{invalid_row, map_sqlx_error};
use async_trait::async_trait;
use sajilo_core::domain::{UpsertUser, User, UserRole};
use sajilo_core::error::{AppError, Result};
use sajilo_core::port::{TimeProvider, UserRepository};
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct SqliteUserRepository {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn upsert_user(&self, data: &UpsertUser) -> Result<User> {
        let now = self.time_provider.now_millis();

        if data.email.is_none() {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
                    .bind(&data.id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;
            if !exists {
                return Err(AppError::Validation(format!(
                    "User {} does not exist yet and no email was supplied",
                    data.id
                )));
            }
        }

        // NOT NULL is checked on the VALUES row before the conflict resolves,
        // so a missing email falls back to the stored one there too.
        // Conflict target is `id`, so a reused email under a new id still
        // trips the UNIQUE(email) constraint
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, first_name, last_name, role, created_at, updated_at)
            VALUES (?1, COALESCE(?2, (SELECT email FROM users WHERE id = ?1)), ?3, ?4, COALESCE(?5, 'customer'), ?6, ?6)
            ON CONFLICT(id) DO UPDATE SET
                email = COALESCE(?2, users.email),
                first_name = COALESCE(?3, users.first_name),
                last_name = COALESCE(?4, users.last_name),
                role = COALESCE(?5, users.role),
                updated_at = ?6
            RETURNING *
            "#,
        )
        .bind(&data.id)
        .bind(&data.email)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.role.map(|r| r.as_str()))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.into_user()
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn get_users_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT * FROM users
            WHERE role = ?
            ORDER BY first_name ASC, last_name ASC, id ASC
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn update_user_role(&self, id: &str, role: UserRole) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET role = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(role.as_str())
        .bind(self.time_provider.now_millis())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?
            .into_user()
    }

    async fn delete_user(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    role: String,
    created_at: i64,
    updated_at: i64,
}

impl UserRow {
    fn into_user(self) -> Result<User> {
        let role: UserRole = self
            .role
            .parse()
            .map_err(|e| invalid_row("users", &self.id, e))?;

        Ok(User {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
