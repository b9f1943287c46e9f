use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::{
    TransactionTrait,
    models::deal::{CreateDeal, Deal, UpdateDeal},
    types::DealStage,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_deal_middleware, routes::OrderedId};

#[derive(Debug, Serialize, Deserialize)]
pub struct DealQuery {
    pub stage: Option<DealStage>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateDealStage {
    pub stage: DealStage,
}

/// Per-column reorder batch for the pipeline board.
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct DealReorderRequest {
    pub stage: DealStage,
    pub items: Vec<OrderedId>,
}

pub async fn get_deals(
    State(state): State<AppState>,
    Query(query): Query<DealQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Deal>>>, ApiError> {
    let deals = match query.stage {
        Some(stage) => Deal::find_by_stage(&state.db().pool, stage).await?,
        None => Deal::find_all(&state.db().pool).await?,
    };

    Ok(ResponseJson(ApiResponse::success(deals)))
}

pub async fn get_deal(
    Extension(deal): Extension<Deal>,
) -> Result<ResponseJson<ApiResponse<Deal>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(deal)))
}

pub async fn create_deal(
    State(state): State<AppState>,
    Json(payload): Json<CreateDeal>,
) -> Result<ResponseJson<ApiResponse<Deal>>, ApiError> {
    let id = Uuid::new_v4();

    tracing::debug!("Creating deal for '{}'", payload.contact_name);

    let deal = Deal::create(&state.db().pool, &payload, id).await?;

    Ok(ResponseJson(ApiResponse::success(deal)))
}

pub async fn update_deal(
    Extension(existing_deal): Extension<Deal>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateDeal>,
) -> Result<ResponseJson<ApiResponse<Deal>>, ApiError> {
    let deal = Deal::update(&state.db().pool, existing_deal.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(deal)))
}

/// Drag between pipeline columns: the deal lands at the tail of the target
/// stage. The tail insert and the gap close in the source column commit
/// together.
pub async fn update_deal_stage(
    Extension(deal): Extension<Deal>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateDealStage>,
) -> Result<ResponseJson<ApiResponse<Deal>>, ApiError> {
    let tx = state.db().pool.begin().await?;
    let deal = Deal::update_stage(&tx, deal.id, payload.stage).await?;
    tx.commit().await?;
    Ok(ResponseJson(ApiResponse::success(deal)))
}

pub async fn reorder_deals(
    State(state): State<AppState>,
    Json(payload): Json<DealReorderRequest>,
) -> Result<ResponseJson<ApiResponse<Vec<Deal>>>, ApiError> {
    let pairs: Vec<(Uuid, i64)> = payload
        .items
        .iter()
        .map(|item| (item.id, item.display_order))
        .collect();
    let tx = state.db().pool.begin().await?;
    Deal::reorder(&tx, payload.stage, &pairs).await?;
    tx.commit().await?;
    let deals = Deal::find_by_stage(&state.db().pool, payload.stage).await?;
    Ok(ResponseJson(ApiResponse::success(deals)))
}

pub async fn delete_deal(
    Extension(deal): Extension<Deal>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let tx = state.db().pool.begin().await?;
    Deal::delete(&tx, deal.id).await?;
    tx.commit().await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let deal_id_router = Router::new()
        .route("/", get(get_deal).put(update_deal).delete(delete_deal))
        .route("/stage", put(update_deal_stage))
        .layer(from_fn_with_state(state.clone(), load_deal_middleware::<AppState>));

    let inner = Router::new()
        .route("/", get(get_deals).post(create_deal))
        .route("/reorder", post(reorder_deals))
        .nest("/{deal_id}", deal_id_router);

    Router::new().nest("/deals", inner)
}
