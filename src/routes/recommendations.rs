// ABOUTME: Brand recommendation route: GET /api/recommendations/brands
// ABOUTME: Validates the product query and delegates to the recommendation agent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! Brand recommendation routes
//!
//! One endpoint takes a product name as a query parameter and returns a
//! `{brands: [...]}` body with UAE-available, sustainability-rated brand
//! suggestions.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::agents;
use crate::errors::{AppError, AppResult};
use crate::models::RecommendedBrands;
use crate::resources::ServerResources;

/// Bounds on the product query string
const PRODUCT_MIN_CHARS: usize = 2;
const PRODUCT_MAX_CHARS: usize = 100;

/// Query parameters for `GET /api/recommendations/brands`
#[derive(Debug, Deserialize)]
pub struct BrandQuery {
    /// Product name to recommend brands for
    pub product: String,
}

/// Recommendation routes implementation
pub struct RecommendationRoutes;

impl RecommendationRoutes {
    /// Create the recommendation route tree
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/recommendations/brands", get(brands_handler))
            .with_state(resources)
    }
}

/// Handle a brand recommendation request
async fn brands_handler(
    State(resources): State<Arc<ServerResources>>,
    Query(query): Query<BrandQuery>,
) -> AppResult<Json<RecommendedBrands>> {
    let product = query.product.trim();
    if product.chars().count() < PRODUCT_MIN_CHARS || product.chars().count() > PRODUCT_MAX_CHARS {
        return Err(AppError::invalid_input(format!(
            "product must be between {PRODUCT_MIN_CHARS} and {PRODUCT_MAX_CHARS} characters"
        )));
    }

    let request_id = Uuid::new_v4().to_string();
    info!(request_id, product, "Brand recommendation request");

    let recommendations = agents::recommend_brands(
        resources.provider.inner(),
        &resources.config.llm,
        product,
    )
    .await
    .map_err(|e| e.with_request_id(request_id))?;

    Ok(Json(recommendations))
}
