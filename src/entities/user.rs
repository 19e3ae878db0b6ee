//! User entity - Seekers, providers and admins with password helpers

use super::enums::{UserRole, VerificationStatus};
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DELETED_USER_NAME: &str = "Deleted User";

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub service_category: Option<String>,
    pub location: Option<String>,
    pub hourly_rate: Option<i64>,
    pub avatar_url: Option<String>,
    pub verification_status: VerificationStatus,
    pub verification_document_url: Option<String>,
    pub verification_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Verify if target_password matches the stored hashed password
    pub fn verify_password(&self, target_password: &str) -> bool {
        // anonymised accounts keep an empty hash and can never log in
        !self.is_deleted() && verify(target_password, &self.password).unwrap_or(false)
    }

    /// Hash a password using bcrypt with default cost
    pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
        let hash = hash(password, DEFAULT_COST)?;
        Ok(hash)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_provider(&self) -> bool {
        self.role == UserRole::Provider
    }

    /// Anonymised accounts keep their row but lose the password hash
    pub fn is_deleted(&self) -> bool {
        self.password.is_empty()
    }

    pub fn is_verified_provider(&self) -> bool {
        self.is_provider() && self.verification_status == VerificationStatus::Verified
    }
}
