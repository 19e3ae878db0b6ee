//! User DTOs - Data Transfer Objects for accounts and profiles

use crate::entities::{User, UserRole, VerificationStatus};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9]{7,15}$").unwrap();
}

/// Full view of an account, returned to its owner and to admins
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserDTO {
    pub id: i64,
    pub name: String,
    pub email: String,
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

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            id: value.user_id,
            name: value.name,
            email: value.email,
            role: value.role,
            phone: value.phone,
            bio: value.bio,
            service_category: value.service_category,
            location: value.location,
            hourly_rate: value.hourly_rate,
            avatar_url: value.avatar_url,
            verification_status: value.verification_status,
            verification_document_url: value.verification_document_url,
            verification_note: value.verification_note,
            created_at: value.created_at,
            // password is never exposed to the client
        }
    }
}

/// What other users may see about an account
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PublicUserDTO {
    pub id: i64,
    pub name: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
    pub service_category: Option<String>,
    pub location: Option<String>,
    pub verification_status: VerificationStatus,
}

impl From<User> for PublicUserDTO {
    fn from(value: User) -> Self {
        Self {
            id: value.user_id,
            name: value.name,
            role: value.role,
            avatar_url: value.avatar_url,
            service_category: value.service_category,
            location: value.location,
            verification_status: value.verification_status,
        }
    }
}

/// Registration body
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct RegisterRequestDTO {
    #[validate(length(min = 2, max = 80, message = "Name must be between 2 and 80 characters"))]
    pub name: String,

    #[validate(email(message = "Email is not valid"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,

    pub role: UserRole,

    #[validate(regex(path = *PHONE_REGEX, message = "Phone must contain 7 to 15 digits"))]
    pub phone: Option<String>,
}

/// Login body
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginDTO {
    pub email: String,
    pub password: String,
}

/// DTO to create a new user (without user_id, password already hashed)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateUserDTO {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub phone: Option<String>,
}

/// Profile update, only `Some` fields are written
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateProfileDTO {
    #[validate(length(min = 2, max = 80, message = "Name must be between 2 and 80 characters"))]
    pub name: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "Phone must contain 7 to 15 digits"))]
    pub phone: Option<String>,

    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters"))]
    pub bio: Option<String>,

    #[validate(length(min = 2, max = 60, message = "Category must be between 2 and 60 characters"))]
    pub service_category: Option<String>,

    #[validate(length(min = 2, max = 120, message = "Location must be between 2 and 120 characters"))]
    pub location: Option<String>,

    #[validate(range(min = 0, message = "Hourly rate cannot be negative"))]
    pub hourly_rate: Option<i64>,

    #[validate(url(message = "Avatar must be a URL"))]
    pub avatar_url: Option<String>,
}

impl UpdateProfileDTO {
    /// Fields that only make sense on a provider profile
    pub fn touches_provider_fields(&self) -> bool {
        self.service_category.is_some() || self.hourly_rate.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.bio.is_none()
            && self.service_category.is_none()
            && self.location.is_none()
            && self.hourly_rate.is_none()
            && self.avatar_url.is_none()
    }
}

/// Provider verification submission
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct VerificationRequestDTO {
    #[validate(url(message = "Document must be a URL"))]
    pub document_url: String,
}
