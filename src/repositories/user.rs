//! UserRepository - Accounts, provider search and verification state

use super::{Create, Delete, Read, Update};
use crate::dtos::{CreateUserDTO, ProviderRow, ProviderSearchQuery, UpdateProfileDTO};
use crate::entities::{DELETED_USER_NAME, User, UserRole, VerificationStatus};
use chrono::Utc;
use sqlx::{Error, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info, instrument};

const PROVIDER_SELECT: &str = r#"
    SELECT u.*, AVG(r.stars) AS rating_average, COUNT(r.rating_id) AS rating_count
    FROM users u
    LEFT JOIN ratings r ON r.provider_id = u.user_id
    WHERE u.role = 'provider'
"#;

pub struct UserRepository {
    connection_pool: SqlitePool,
}

impl UserRepository {
    pub fn new(connection_pool: SqlitePool) -> UserRepository {
        Self { connection_pool }
    }

    /// Emails are stored lowercase, the lookup expects a normalised address
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.connection_pool)
            .await?;

        Ok(user)
    }

    /// Verified providers matching every given filter, best rated first
    #[instrument(skip(self))]
    pub async fn search_providers(
        &self,
        filter: &ProviderSearchQuery,
    ) -> Result<Vec<ProviderRow>, Error> {
        let mut query_builder = QueryBuilder::<Sqlite>::new(PROVIDER_SELECT);
        query_builder
            .push(" AND u.password <> ''")
            .push(" AND u.verification_status = ")
            .push_bind(VerificationStatus::Verified);

        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            query_builder
                .push(" AND u.service_category LIKE ")
                .push_bind(category.to_string());
        }
        if let Some(location) = filter.location.as_deref().filter(|l| !l.is_empty()) {
            query_builder
                .push(" AND u.location LIKE ")
                .push_bind(format!("%{}%", location));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            query_builder
                .push(" AND (u.name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR u.bio LIKE ")
                .push_bind(pattern.clone())
                .push(" OR u.service_category LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        query_builder.push(
            " GROUP BY u.user_id ORDER BY COALESCE(AVG(r.stars), 0) DESC, u.name ASC LIMIT 100",
        );

        let providers = query_builder
            .build_query_as::<ProviderRow>()
            .fetch_all(&self.connection_pool)
            .await?;
        debug!("Found {} providers", providers.len());
        Ok(providers)
    }

    /// A provider with its rating aggregate, whatever its verification status
    #[instrument(skip(self))]
    pub async fn find_provider(&self, provider_id: i64) -> Result<Option<ProviderRow>, Error> {
        let sql = format!("{} AND u.user_id = ? GROUP BY u.user_id", PROVIDER_SELECT);
        let provider = sqlx::query_as::<_, ProviderRow>(&sql)
            .bind(provider_id)
            .fetch_optional(&self.connection_pool)
            .await?;
        Ok(provider)
    }

    /// Providers waiting for a verification decision, oldest first
    #[instrument(skip(self))]
    pub async fn list_pending_verifications(&self) -> Result<Vec<User>, Error> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE role = 'provider' AND verification_status = ? ORDER BY created_at ASC",
        )
        .bind(VerificationStatus::Pending)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Moves the verification status from `expected` to `next`.
    /// Returns `None` when the stored status is no longer `expected`.
    #[instrument(skip(self, document_url, note))]
    pub async fn set_verification(
        &self,
        user_id: i64,
        expected: VerificationStatus,
        next: VerificationStatus,
        document_url: Option<String>,
        note: Option<String>,
    ) -> Result<Option<User>, Error> {
        let mut query_builder = QueryBuilder::<Sqlite>::new("UPDATE users SET verification_status = ");
        query_builder.push_bind(next);
        if let Some(url) = document_url {
            query_builder.push(", verification_document_url = ").push_bind(url);
        }
        // a new decision always replaces the previous note
        query_builder.push(", verification_note = ").push_bind(note);
        query_builder.push(" WHERE user_id = ").push_bind(user_id);
        query_builder
            .push(" AND verification_status = ")
            .push_bind(expected);
        query_builder.push(" RETURNING *");

        let user = query_builder
            .build_query_as::<User>()
            .fetch_optional(&self.connection_pool)
            .await?;

        if user.is_some() {
            info!("Verification status of user {} set to {:?}", user_id, next);
        }
        Ok(user)
    }

    pub async fn ids_by_role(&self, role: UserRole) -> Result<Vec<i64>, Error> {
        sqlx::query_scalar::<_, i64>("SELECT user_id FROM users WHERE role = ?")
            .bind(role)
            .fetch_all(&self.connection_pool)
            .await
    }

    pub async fn count_by_role(&self) -> Result<Vec<(UserRole, i64)>, Error> {
        sqlx::query_as::<_, (UserRole, i64)>(
            "SELECT role, COUNT(*) FROM users WHERE password <> '' GROUP BY role",
        )
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn count_pending_verifications(&self) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE role = 'provider' AND verification_status = ?",
        )
        .bind(VerificationStatus::Pending)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    #[instrument(skip(self, data), fields(role = ?data.role))]
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        debug!("Creating new user");
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, role, phone, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.password)
        .bind(data.role)
        .bind(&data.phone)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;

        info!("User created with id {}", user.user_id);
        Ok(user)
    }
}

impl Read<User, i64> for UserRepository {
    async fn read(&self, id: &i64) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<User, UpdateProfileDTO, i64> for UserRepository {
    #[instrument(skip(self, data), fields(user_id = %id))]
    async fn update(&self, id: &i64, data: &UpdateProfileDTO) -> Result<User, Error> {
        if data.is_empty() {
            debug!("No fields to update, returning current user");
            return self.read(id).await?.ok_or(Error::RowNotFound);
        }

        let mut query_builder = QueryBuilder::<Sqlite>::new("UPDATE users SET ");
        let mut separated = query_builder.separated(", ");
        if let Some(ref name) = data.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.clone());
        }
        if let Some(ref phone) = data.phone {
            separated.push("phone = ");
            separated.push_bind_unseparated(phone.clone());
        }
        if let Some(ref bio) = data.bio {
            separated.push("bio = ");
            separated.push_bind_unseparated(bio.clone());
        }
        if let Some(ref category) = data.service_category {
            separated.push("service_category = ");
            separated.push_bind_unseparated(category.clone());
        }
        if let Some(ref location) = data.location {
            separated.push("location = ");
            separated.push_bind_unseparated(location.clone());
        }
        if let Some(rate) = data.hourly_rate {
            separated.push("hourly_rate = ");
            separated.push_bind_unseparated(rate);
        }
        if let Some(ref avatar) = data.avatar_url {
            separated.push("avatar_url = ");
            separated.push_bind_unseparated(avatar.clone());
        }

        query_builder.push(" WHERE user_id = ");
        query_builder.push_bind(*id);
        query_builder.push(" RETURNING *");

        let user = query_builder
            .build_query_as::<User>()
            .fetch_optional(&self.connection_pool)
            .await?
            .ok_or(Error::RowNotFound)?;

        info!("User profile updated");
        Ok(user)
    }
}

impl Delete<i64> for UserRepository {
    /// Soft delete: anonymises the account so orders, ratings and messages
    /// keep a valid author while the person's data is gone
    #[instrument(skip(self), fields(user_id = %id))]
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = ?,
                email = 'deleted-' || user_id || '@khidmap.invalid',
                password = '',
                phone = NULL,
                bio = NULL,
                location = NULL,
                avatar_url = NULL,
                service_category = NULL,
                hourly_rate = NULL,
                verification_status = ?,
                verification_document_url = NULL,
                verification_note = NULL
            WHERE user_id = ?
            "#,
        )
        .bind(DELETED_USER_NAME)
        .bind(VerificationStatus::Unverified)
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        info!("User anonymised");
        Ok(())
    }
}
