//! Database bootstrap - Pool creation, migrations and the initial admin

use crate::core::AppState;
use crate::dtos::CreateUserDTO;
use crate::entities::{User, UserRole};
use crate::repositories::Create;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{info, instrument};

/// Opens the pool, creating the database file when missing
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Single-connection in-memory database with migrations applied.
/// Every connection to `sqlite::memory:` is a distinct database, hence one
/// connection that is never recycled.
pub async fn in_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Creates the admin account from configuration unless it already exists.
/// Returns true when a new account was created.
#[instrument(skip(state, password), fields(email = %email))]
pub async fn bootstrap_admin(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<bool, crate::core::AppError> {
    let email = email.trim().to_lowercase();
    if state.user.find_by_email(&email).await?.is_some() {
        info!("Admin account already present");
        return Ok(false);
    }

    let admin = CreateUserDTO {
        name: "Administrator".to_string(),
        email,
        password: User::hash_password(password)?,
        role: UserRole::Admin,
        phone: None,
    };
    let created = state.user.create(&admin).await?;
    info!("Admin account {} created", created.user_id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_admin_runs_once() {
        let pool = in_memory_pool().await.unwrap();
        let state = AppState::new(pool, "secret".into(), 1);

        assert!(bootstrap_admin(&state, " Root@Khidmap.dz ", "Password123").await.unwrap());
        assert!(!bootstrap_admin(&state, "root@khidmap.dz", "Password123").await.unwrap());

        let admin = state.user.find_by_email("root@khidmap.dz").await.unwrap().unwrap();
        assert!(admin.is_admin());
        assert!(admin.verify_password("Password123"));
    }
}
