//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::{AuthConfig, BootstrapConfig},
    error::{AppError, AppResult},
    models::user::{RegisterUser, Role, UpdateUser, User, UserClaims},
    repository::{users::UserRecord, Repository},
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Token lifetime in seconds
    pub fn token_lifetime(&self) -> i64 {
        self.config.jwt_expiration_hours as i64 * 3600
    }

    /// Authenticate user by email and password and return a JWT token
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !verify_password(&user.password, password)? {
            tracing::warn!(user_id = user.id, "Rejected login with wrong password");
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        tracing::info!(user_id = user.id, role = %user.role, "User logged in");

        Ok((token, user))
    }

    /// Create JWT token for a user
    pub fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            exp: now + self.token_lifetime(),
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Self-registration
    pub async fn register(&self, user: RegisterUser) -> AppResult<User> {
        tracing::info!("Attempting to register user with email: {}", user.email);

        if user.role == Role::Librarian && !self.config.allow_librarian_signup {
            return Err(AppError::Authorization(
                "Librarian accounts cannot be self-registered".to_string(),
            ));
        }

        if self.repository.users.email_exists(&user.email, None).await? {
            tracing::warn!("Email already exists: {}", user.email);
            return Err(AppError::Conflict(format!(
                "A User with the Email {} already exists.",
                user.email
            )));
        }

        let hash = hash_password(&user.password)?;
        let record = UserRecord {
            name: user.name.trim(),
            email: &user.email,
            role: user.role,
            contact_info: user.contact_info.as_deref(),
        };
        let created = self.repository.users.create(&record, &hash).await?;

        tracing::info!("Successfully registered user with email: {}", created.email);
        Ok(created)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List all users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = self.repository.users.list().await?;
        tracing::info!("Successfully retrieved {} users", users.len());
        Ok(users)
    }

    /// Update an existing user
    pub async fn update_user(&self, id: i64, user: UpdateUser) -> AppResult<User> {
        tracing::info!("Attempting to update user with ID: {}", id);

        // 404 before 409
        self.repository.users.get_by_id(id).await?;

        if self.repository.users.email_exists(&user.email, Some(id)).await? {
            return Err(AppError::Conflict(format!(
                "A User with the Email {} already exists.",
                user.email
            )));
        }

        let hash = user.new_password().map(hash_password).transpose()?;
        let record = UserRecord {
            name: user.name.trim(),
            email: &user.email,
            role: user.role,
            contact_info: user.contact_info.as_deref(),
        };
        let updated = self.repository.users.update(id, &record, hash.as_deref()).await?;

        tracing::info!("Successfully updated user with ID: {}", id);
        Ok(updated)
    }

    /// Delete a user
    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        tracing::info!("Attempting to delete user with ID: {}", id);
        self.repository.users.delete(id).await?;
        tracing::info!("Successfully deleted user with ID: {}", id);
        Ok(())
    }

    /// Create the configured librarian account unless its email is already taken
    pub async fn ensure_bootstrap_librarian(&self, bootstrap: &BootstrapConfig) -> AppResult<()> {
        if self.repository.users.email_exists(&bootstrap.email, None).await? {
            tracing::debug!("Bootstrap librarian {} already exists", bootstrap.email);
            return Ok(());
        }

        let hash = hash_password(&bootstrap.password)?;
        let record = UserRecord {
            name: &bootstrap.name,
            email: &bootstrap.email,
            role: Role::Librarian,
            contact_info: None,
        };
        let created = self.repository.users.create(&record, &hash).await?;
        tracing::info!(user_id = created.id, "Created bootstrap librarian {}", created.email);

        Ok(())
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
