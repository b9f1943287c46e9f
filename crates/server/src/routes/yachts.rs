use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{delete, get, post},
};
use db::{
    TransactionTrait,
    models::yacht::{CreateYacht, CreateYachtImage, UpdateYacht, Yacht, YachtImage},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    middleware::load_yacht_middleware,
    routes::{ReorderRequest, translation},
};

pub async fn get_yachts(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Yacht>>>, ApiError> {
    let yachts = Yacht::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(yachts)))
}

pub async fn get_yacht(
    Extension(yacht): Extension<Yacht>,
) -> Result<ResponseJson<ApiResponse<Yacht>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(yacht)))
}

pub async fn create_yacht(
    State(state): State<AppState>,
    Json(payload): Json<CreateYacht>,
) -> Result<ResponseJson<ApiResponse<Yacht>>, ApiError> {
    let id = Uuid::new_v4();

    tracing::debug!("Creating yacht '{}'", payload.name);

    let yacht = Yacht::create(&state.db().pool, &payload, id).await?;

    Ok(ResponseJson(ApiResponse::success(yacht)))
}

pub async fn update_yacht(
    Extension(existing): Extension<Yacht>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateYacht>,
) -> Result<ResponseJson<ApiResponse<Yacht>>, ApiError> {
    let yacht = Yacht::update(&state.db().pool, existing.id, &payload).await?;
    queue_missing_translations(&state, yacht.id, &payload);
    Ok(ResponseJson(ApiResponse::success(yacht)))
}

/// Same auto-fill as the property form: edited English copy gets a debounced
/// translation job unless the German text came along in the payload.
fn queue_missing_translations(state: &AppState, yacht_id: Uuid, payload: &UpdateYacht) {
    let fields = [
        ("summary", &payload.summary, payload.summary_de.is_none()),
        (
            "description",
            &payload.description,
            payload.description_de.is_none(),
        ),
    ];

    for (field, text, missing_translation) in fields {
        let Some(text) = text else { continue };
        if !missing_translation || text.trim().is_empty() {
            continue;
        }

        let job_state = state.clone();
        translation::schedule_field_translation(
            state.translation_debouncer(),
            format!("yacht:{}:{}", yacht_id, field),
            text.clone(),
            move |translated| {
                let update = match field {
                    "summary" => UpdateYacht {
                        summary_de: Some(translated),
                        ..Default::default()
                    },
                    _ => UpdateYacht {
                        description_de: Some(translated),
                        ..Default::default()
                    },
                };
                async move {
                    if let Err(err) = Yacht::update(&job_state.db().pool, yacht_id, &update).await {
                        tracing::warn!(
                            "Failed to store translation for yacht {}: {}",
                            yacht_id,
                            err
                        );
                    }
                }
            },
        );
    }
}

pub async fn delete_yacht(
    Extension(yacht): Extension<Yacht>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Yacht::delete(&state.db().pool, yacht.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn get_images(
    State(state): State<AppState>,
    Path(yacht_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<YachtImage>>>, ApiError> {
    let images = YachtImage::find_by_yacht_id(&state.db().pool, yacht_id).await?;
    Ok(ResponseJson(ApiResponse::success(images)))
}

pub async fn create_image(
    State(state): State<AppState>,
    Path(yacht_id): Path<Uuid>,
    Json(payload): Json<CreateYachtImage>,
) -> Result<ResponseJson<ApiResponse<YachtImage>>, ApiError> {
    let image = YachtImage::create(&state.db().pool, yacht_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(image)))
}

pub async fn reorder_images(
    State(state): State<AppState>,
    Path(yacht_id): Path<Uuid>,
    Json(payload): Json<ReorderRequest>,
) -> Result<ResponseJson<ApiResponse<Vec<YachtImage>>>, ApiError> {
    let tx = state.db().pool.begin().await?;
    YachtImage::reorder(&tx, yacht_id, &payload.pairs()).await?;
    tx.commit().await?;
    let images = YachtImage::find_by_yacht_id(&state.db().pool, yacht_id).await?;
    Ok(ResponseJson(ApiResponse::success(images)))
}

pub async fn feature_image(
    State(state): State<AppState>,
    Path((yacht_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<YachtImage>>, ApiError> {
    let tx = state.db().pool.begin().await?;
    let image = YachtImage::set_featured(&tx, yacht_id, image_id).await?;
    tx.commit().await?;
    Ok(ResponseJson(ApiResponse::success(image)))
}

pub async fn delete_image(
    State(state): State<AppState>,
    Path((yacht_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let tx = state.db().pool.begin().await?;
    let rows = YachtImage::delete(&tx, yacht_id, image_id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("Image not found".to_string()));
    }
    tx.commit().await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let yacht_detail_router = Router::new()
        .route("/", get(get_yacht).put(update_yacht).delete(delete_yacht))
        .layer(from_fn_with_state(state.clone(), load_yacht_middleware::<AppState>));

    let images_router = Router::new()
        .route("/", get(get_images).post(create_image))
        .route("/reorder", post(reorder_images))
        .route("/{image_id}/feature", post(feature_image))
        .route("/{image_id}", delete(delete_image));

    let yacht_id_router = Router::new()
        .merge(yacht_detail_router)
        .nest("/images", images_router);

    let inner = Router::new()
        .route("/", get(get_yachts).post(create_yacht))
        .nest("/{yacht_id}", yacht_id_router);

    Router::new().nest("/yachts", inner)
}
