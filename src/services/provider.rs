//! Provider services - Public directory of providers

use crate::core::{AppError, AppState};
use crate::dtos::{
    PortfolioItemDTO, ProviderProfileDTO, ProviderSearchQuery, ProviderSummaryDTO, RatingDTO,
};
use axum::extract::{Json, Path, Query, State};
use std::sync::Arc;
use tracing::{debug, instrument};

#[instrument(skip(state))]
pub async fn list_providers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProviderSearchQuery>,
) -> Result<Json<Vec<ProviderSummaryDTO>>, AppError> {
    let providers = state.user.search_providers(&query).await?;
    debug!("Returning {} providers", providers.len());
    Ok(Json(providers.into_iter().map(ProviderSummaryDTO::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_provider(
    State(state): State<Arc<AppState>>,
    Path(provider_id): Path<i64>,
) -> Result<Json<ProviderProfileDTO>, AppError> {
    let provider = state
        .user
        .find_provider(provider_id)
        .await?
        .ok_or_else(|| AppError::not_found("Provider not found"))?;
    let portfolio = state.portfolio.list_by_provider(provider_id).await?;

    Ok(Json(ProviderProfileDTO {
        provider: provider.into(),
        portfolio: portfolio.into_iter().map(PortfolioItemDTO::from).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn list_provider_ratings(
    State(state): State<Arc<AppState>>,
    Path(provider_id): Path<i64>,
) -> Result<Json<Vec<RatingDTO>>, AppError> {
    if state.user.find_provider(provider_id).await?.is_none() {
        return Err(AppError::not_found("Provider not found"));
    }
    let ratings = state.rating.list_by_provider(provider_id).await?;
    Ok(Json(ratings.into_iter().map(RatingDTO::from).collect()))
}
