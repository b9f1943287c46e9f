use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{delete, get, post},
};
use db::{
    TransactionTrait,
    models::property::{
        CreateProperty, CreatePropertyImage, Property, PropertyImage, UpdateProperty,
    },
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    middleware::load_property_middleware,
    routes::{ReorderRequest, translation},
};

pub async fn get_properties(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Property>>>, ApiError> {
    let properties = Property::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(properties)))
}

pub async fn get_property(
    Extension(property): Extension<Property>,
) -> Result<ResponseJson<ApiResponse<Property>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(property)))
}

pub async fn create_property(
    State(state): State<AppState>,
    Json(payload): Json<CreateProperty>,
) -> Result<ResponseJson<ApiResponse<Property>>, ApiError> {
    let id = Uuid::new_v4();

    tracing::debug!("Creating property '{}'", payload.name);

    let property = Property::create(&state.db().pool, &payload, id).await?;

    Ok(ResponseJson(ApiResponse::success(property)))
}

pub async fn update_property(
    Extension(existing): Extension<Property>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProperty>,
) -> Result<ResponseJson<ApiResponse<Property>>, ApiError> {
    let property = Property::update(&state.db().pool, existing.id, &payload).await?;
    queue_missing_translations(&state, property.id, &payload);
    Ok(ResponseJson(ApiResponse::success(property)))
}

/// German copy auto-fills when the admin edits the English text without
/// supplying the translation. Jobs are debounced per field, so a burst of
/// edits only translates the final text.
fn queue_missing_translations(state: &AppState, property_id: Uuid, payload: &UpdateProperty) {
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
            format!("property:{}:{}", property_id, field),
            text.clone(),
            move |translated| {
                let update = match field {
                    "summary" => UpdateProperty {
                        summary_de: Some(translated),
                        ..Default::default()
                    },
                    _ => UpdateProperty {
                        description_de: Some(translated),
                        ..Default::default()
                    },
                };
                async move {
                    if let Err(err) =
                        Property::update(&job_state.db().pool, property_id, &update).await
                    {
                        tracing::warn!(
                            "Failed to store translation for property {}: {}",
                            property_id,
                            err
                        );
                    }
                }
            },
        );
    }
}

pub async fn delete_property(
    Extension(property): Extension<Property>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Property::delete(&state.db().pool, property.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn get_images(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<PropertyImage>>>, ApiError> {
    let images = PropertyImage::find_by_property_id(&state.db().pool, property_id).await?;
    Ok(ResponseJson(ApiResponse::success(images)))
}

pub async fn create_image(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Json(payload): Json<CreatePropertyImage>,
) -> Result<ResponseJson<ApiResponse<PropertyImage>>, ApiError> {
    let image = PropertyImage::create(&state.db().pool, property_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(image)))
}

pub async fn reorder_images(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Json(payload): Json<ReorderRequest>,
) -> Result<ResponseJson<ApiResponse<Vec<PropertyImage>>>, ApiError> {
    let tx = state.db().pool.begin().await?;
    PropertyImage::reorder(&tx, property_id, &payload.pairs()).await?;
    tx.commit().await?;
    let images = PropertyImage::find_by_property_id(&state.db().pool, property_id).await?;
    Ok(ResponseJson(ApiResponse::success(images)))
}

/// Flips the featured flag to this image. The clear-and-set runs in one
/// transaction so the gallery never shows two featured images.
pub async fn feature_image(
    State(state): State<AppState>,
    Path((property_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<PropertyImage>>, ApiError> {
    let tx = state.db().pool.begin().await?;
    let image = PropertyImage::set_featured(&tx, property_id, image_id).await?;
    tx.commit().await?;
    Ok(ResponseJson(ApiResponse::success(image)))
}

pub async fn delete_image(
    State(state): State<AppState>,
    Path((property_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let tx = state.db().pool.begin().await?;
    let rows = PropertyImage::delete(&tx, property_id, image_id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("Image not found".to_string()));
    }
    tx.commit().await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let property_detail_router = Router::new()
        .route(
            "/",
            get(get_property).put(update_property).delete(delete_property),
        )
        .layer(from_fn_with_state(state.clone(), load_property_middleware::<AppState>));

    // Image routes carry the parent uuid in the path; the two-segment routes
    // skip the loader middleware and resolve both ids themselves.
    let images_router = Router::new()
        .route("/", get(get_images).post(create_image))
        .route("/reorder", post(reorder_images))
        .route("/{image_id}/feature", post(feature_image))
        .route("/{image_id}", delete(delete_image));

    let property_id_router = Router::new()
        .merge(property_detail_router)
        .nest("/images", images_router);

    let inner = Router::new()
        .route("/", get(get_properties).post(create_property))
        .nest("/{property_id}", property_id_router);

    Router::new().nest("/properties", inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestEnvGuard;

    async fn setup_state() -> (TestEnvGuard, AppState) {
        let temp_root = std::env::temp_dir().join(format!("rivamar-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&temp_root).unwrap();

        let db_path = temp_root.join("db.sqlite");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
        let env_guard = TestEnvGuard::new(&temp_root, db_url);

        let state = AppState::new().await.unwrap();

        (env_guard, state)
    }

    #[tokio::test]
    async fn english_edit_queues_a_debounced_translation() {
        let (_env_guard, state) = setup_state().await;
        let property_id = Uuid::new_v4();

        let payload = UpdateProperty {
            summary: Some("Sunny villa near the marina".to_string()),
            ..Default::default()
        };
        queue_missing_translations(&state, property_id, &payload);

        let debouncer = state.translation_debouncer();
        assert!(debouncer.is_scheduled(&format!("property:{}:summary", property_id)));
        assert!(!debouncer.is_scheduled(&format!("property:{}:description", property_id)));
    }

    #[tokio::test]
    async fn supplied_german_text_suppresses_the_job() {
        let (_env_guard, state) = setup_state().await;
        let property_id = Uuid::new_v4();

        let payload = UpdateProperty {
            description: Some("Four bedrooms, private pool".to_string()),
            description_de: Some("Vier Schlafzimmer, eigener Pool".to_string()),
            ..Default::default()
        };
        queue_missing_translations(&state, property_id, &payload);

        assert!(
            !state
                .translation_debouncer()
                .is_scheduled(&format!("property:{}:description", property_id))
        );
    }
}
