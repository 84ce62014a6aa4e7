//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, User},
};

const USER_COLUMNS: &str = "id, name, email, password, role, contact_info";

/// Fields written on insert or full update
pub struct UserRecord<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role: Role,
    pub contact_info: Option<&'a str>,
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found", id)))
    }

    /// Get user by email (case-insensitive), used for authentication
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// List all users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Check if email already exists, optionally ignoring one user
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND id != $2)")
                .bind(email)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Insert a new user with an already hashed password
    pub async fn create(&self, user: &UserRecord<'_>, password_hash: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password, role, contact_info)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.name)
        .bind(user.email)
        .bind(password_hash)
        .bind(user.role)
        .bind(user.contact_info)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::on_unique_violation(
                e,
                format!("A User with the Email {} already exists.", user.email),
            )
        })
    }

    /// Replace a user's fields; the password is only changed when a new hash is given
    pub async fn update(
        &self,
        id: i64,
        user: &UserRecord<'_>,
        password_hash: Option<&str>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                name = $1,
                email = $2,
                role = $3,
                contact_info = $4,
                password = COALESCE($5, password)
            WHERE id = $6
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.name)
        .bind(user.email)
        .bind(user.role)
        .bind(user.contact_info)
        .bind(password_hash)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::on_unique_violation(
                e,
                format!("A User with the Email {} already exists.", user.email),
            )
        })?
        .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found", id)))
    }

    /// Delete a user; refused while the user still holds borrowed books
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let open_borrows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_records WHERE user_id = $1 AND return_date IS NULL",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if open_borrows > 0 {
            return Err(AppError::Conflict(format!(
                "User with ID {} still has {} borrowed book(s)",
                id, open_borrows
            )));
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with ID {} not found", id)));
        }

        Ok(())
    }
}
