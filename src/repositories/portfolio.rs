//! PortfolioRepository - Portfolio entries of providers

use super::{Create, Delete, Read};
use crate::dtos::CreatePortfolioItemDTO;
use crate::entities::PortfolioItem;
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct PortfolioRepository {
    connection_pool: SqlitePool,
}

impl PortfolioRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn list_by_provider(&self, provider_id: i64) -> Result<Vec<PortfolioItem>, Error> {
        sqlx::query_as::<_, PortfolioItem>(
            "SELECT * FROM portfolio_items WHERE provider_id = ? ORDER BY created_at DESC, item_id DESC",
        )
        .bind(provider_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_by_provider(&self, provider_id: i64) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM portfolio_items WHERE provider_id = ?")
            .bind(provider_id)
            .execute(&self.connection_pool)
            .await?;
        debug!("Removed {} portfolio items", result.rows_affected());
        Ok(result.rows_affected())
    }
}

impl Create<PortfolioItem, CreatePortfolioItemDTO> for PortfolioRepository {
    #[instrument(skip(self, data), fields(provider_id = %data.provider_id))]
    async fn create(&self, data: &CreatePortfolioItemDTO) -> Result<PortfolioItem, Error> {
        let item = sqlx::query_as::<_, PortfolioItem>(
            r#"
            INSERT INTO portfolio_items (provider_id, title, description, media_url, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.provider_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.media_url)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Portfolio item {} created", item.item_id);
        Ok(item)
    }
}

impl Read<PortfolioItem, i64> for PortfolioRepository {
    async fn read(&self, id: &i64) -> Result<Option<PortfolioItem>, Error> {
        sqlx::query_as::<_, PortfolioItem>("SELECT * FROM portfolio_items WHERE item_id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Delete<i64> for PortfolioRepository {
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM portfolio_items WHERE item_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        Ok(())
    }
}
