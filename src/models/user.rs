//! User model, roles and JWT claims

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use super::validation::{not_blank, password_strength};
use crate::error::AppError;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Librarian,
    Patron,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Librarian => "LIBRARIAN",
            Role::Patron => "PATRON",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LIBRARIAN" => Ok(Role::Librarian),
            "PATRON" => Ok(Role::Patron),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// Stored as TEXT; VARCHAR columns decode as well
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// User as stored in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub contact_info: Option<String>,
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(custom(function = "not_blank"), length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,
    #[validate(
        email(message = "Email should be valid"),
        length(max = 255, message = "Email must be less than 255 characters")
    )]
    pub email: String,
    #[validate(
        length(min = 8, max = 100, message = "Password must be between 8 and 100 characters"),
        custom(function = "password_strength")
    )]
    pub password: String,
    pub role: Role,
    #[validate(length(max = 255, message = "Contact info must be less than 255 characters"))]
    pub contact_info: Option<String>,
}

/// Full update of a user. `password` is optional; when present it must meet the
/// same rules as registration, so an empty string is rejected.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(custom(function = "not_blank"), length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,
    #[validate(
        email(message = "Email should be valid"),
        length(max = 255, message = "Email must be less than 255 characters")
    )]
    pub email: String,
    pub role: Role,
    #[validate(length(max = 255, message = "Contact info must be less than 255 characters"))]
    pub contact_info: Option<String>,
    #[validate(
        length(min = 8, max = 100, message = "Password must be between 8 and 100 characters"),
        custom(function = "password_strength")
    )]
    pub password: Option<String>,
}

impl UpdateUser {
    /// New password, if one was supplied
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User email
    pub sub: String,
    pub user_id: i64,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_librarian(&self) -> bool {
        self.role == Role::Librarian
    }

    pub fn require_librarian(&self) -> Result<(), AppError> {
        if self.is_librarian() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "You do not have permission to perform this action".to_string(),
            ))
        }
    }

    /// Patrons may only act on their own account; librarians on any
    pub fn require_self_or_librarian(&self, user_id: i64) -> Result<(), AppError> {
        if self.is_librarian() || self.user_id == user_id {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Patrons may only access their own borrow records".to_string(),
            ))
        }
    }
}
