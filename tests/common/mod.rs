#![allow(dead_code)]

use axum_test::TestServer;
use axum_test::http::HeaderName;
use khidmap::core::{AppState, encode_jwt};
use khidmap::dtos::CreateUserDTO;
use khidmap::entities::{User, UserRole, VerificationStatus};
use khidmap::repositories::Create;
use sqlx::SqlitePool;
use std::sync::Arc;

pub const TEST_SECRET: &str = "khidmap-integration-test-secret";
pub const TEST_PASSWORD: &str = "Password123";

/// Creates an AppState over the per-test database
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState::new(pool, TEST_SECRET.to_string(), 24))
}

/// Creates a TestServer over the real router
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = khidmap::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

pub fn auth_header() -> HeaderName {
    HeaderName::from_static("authorization")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Inserts a user with `TEST_PASSWORD`, hashed with a low cost to keep tests fast
pub async fn seed_user(state: &AppState, name: &str, role: UserRole) -> User {
    state
        .user
        .create(&CreateUserDTO {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: bcrypt::hash(TEST_PASSWORD, 4).expect("hash"),
            role,
            phone: None,
        })
        .await
        .expect("Failed to seed user")
}

pub async fn seed_verified_provider(state: &AppState, name: &str) -> User {
    let provider = seed_user(state, name, UserRole::Provider).await;
    state
        .user
        .set_verification(
            provider.user_id,
            VerificationStatus::Unverified,
            VerificationStatus::Verified,
            None,
            None,
        )
        .await
        .expect("Failed to verify provider")
        .expect("Provider changed concurrently")
}

/// Signed token for `user`, as issued by the login endpoint
pub fn create_test_jwt(user: &User) -> String {
    encode_jwt(user, TEST_SECRET, 24).expect("Failed to create JWT token")
}
