//! RatingRepository - One rating per completed order

use super::Create;
use crate::dtos::CreateRatingDTO;
use crate::entities::Rating;
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{info, instrument};

pub struct RatingRepository {
    connection_pool: SqlitePool,
}

impl RatingRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn find_by_order(&self, order_id: i64) -> Result<Option<Rating>, Error> {
        sqlx::query_as::<_, Rating>("SELECT * FROM ratings WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&self.connection_pool)
            .await
    }

    pub async fn list_by_provider(&self, provider_id: i64) -> Result<Vec<Rating>, Error> {
        sqlx::query_as::<_, Rating>(
            "SELECT * FROM ratings WHERE provider_id = ? ORDER BY created_at DESC, rating_id DESC",
        )
        .bind(provider_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Create<Rating, CreateRatingDTO> for RatingRepository {
    /// A second rating for the same order fails with a unique violation
    #[instrument(skip(self, data), fields(order_id = %data.order_id))]
    async fn create(&self, data: &CreateRatingDTO) -> Result<Rating, Error> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (order_id, seeker_id, provider_id, stars, comment, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.order_id)
        .bind(data.seeker_id)
        .bind(data.provider_id)
        .bind(data.stars)
        .bind(&data.comment)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Order {} rated {} stars", rating.order_id, rating.stars);
        Ok(rating)
    }
}
