//! Read-only query endpoints

use super::types::{ErrorBody, PriceTickOut, PricesParams, RangeParams, MAX_LIMIT};
use crate::store::{normalize_ticker, RangeQuery, TickStore};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

/// Shared state for the query API
pub struct ApiState {
    pub store: TickStore,
}

type ApiError = (StatusCode, Json<ErrorBody>);

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/prices", get(get_prices))
        .route("/prices/latest", get(get_latest_price))
        .route("/prices/range", get(get_prices_range))
        .with_state(state)
}

fn bad_request(detail: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
}

fn storage_error(e: sqlx::Error) -> ApiError {
    tracing::error!(error = %e, "query failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            detail: "storage unavailable".to_string(),
        }),
    )
}

fn validate_page(limit: i64, offset: i64) -> Result<(), ApiError> {
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(bad_request(format!("limit must be in 1..={}", MAX_LIMIT)));
    }
    if offset < 0 {
        return Err(bad_request("offset must be >= 0"));
    }
    Ok(())
}

async fn health(State(state): State<Arc<ApiState>>) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.healthcheck().await.map_err(|e| {
        tracing::error!(error = %e, "health check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorBody {
                detail: "db unavailable".to_string(),
            }),
        )
    })?;

    Ok(Json(serde_json::json!({"status": "ok"})))
}

async fn get_prices(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<PricesParams>,
) -> Result<Json<Vec<PriceTickOut>>, ApiError> {
    validate_page(params.limit, params.offset)?;
    let ticker = normalize_ticker(&params.ticker);

    let query = RangeQuery {
        from_ts: None,
        to_ts: None,
        limit: params.limit,
        offset: params.offset,
    };
    let rows = state
        .store
        .range(&ticker, &query)
        .await
        .map_err(storage_error)?;

    Ok(Json(rows.into_iter().map(PriceTickOut::from).collect()))
}

async fn get_latest_price(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<PricesParams>,
) -> Result<Json<PriceTickOut>, ApiError> {
    let ticker = normalize_ticker(&params.ticker);

    let row = state
        .store
        .latest(&ticker)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    detail: "no data for this ticker yet".to_string(),
                }),
            )
        })?;

    Ok(Json(row.into()))
}

async fn get_prices_range(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<PriceTickOut>>, ApiError> {
    validate_page(params.limit, params.offset)?;
    let ticker = normalize_ticker(&params.ticker);

    let query = RangeQuery {
        from_ts: params.from_ts,
        to_ts: params.to_ts,
        limit: params.limit,
        offset: params.offset,
    };
    let rows = state
        .store
        .range(&ticker, &query)
        .await
        .map_err(storage_error)?;

    Ok(Json(rows.into_iter().map(PriceTickOut::from).collect()))
}
