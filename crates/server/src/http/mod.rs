use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{AppState, routes};

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::tasks::router(&state))
        .merge(routes::deals::router(&state))
        .merge(routes::properties::router(&state))
        .merge(routes::yachts::router(&state))
        .merge(routes::translation::router());

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, Response, StatusCode, header},
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{AppState, test_support::TestEnvGuard};

    async fn setup_state() -> (TestEnvGuard, AppState) {
        let temp_root = std::env::temp_dir().join(format!("rivamar-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&temp_root).unwrap();

        let db_path = temp_root.join("db.sqlite");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
        let env_guard = TestEnvGuard::new(&temp_root, db_url);

        let state = AppState::new().await.unwrap();

        (env_guard, state)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_check_is_public() {
        let (_env_guard, state) = setup_state().await;
        let app = super::router(state);

        let response = app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.get("success").and_then(|v| v.as_bool()), Some(true));
    }

    #[tokio::test]
    async fn task_board_lifecycle() {
        let (_env_guard, state) = setup_state().await;
        let app = super::router(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/tasks",
                serde_json::json!({ "title": "Fix boiler", "priority": "high" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let first = body_json(response).await;
        let first_id = first.pointer("/data/id").and_then(|v| v.as_str()).unwrap().to_string();
        assert_eq!(first.pointer("/data/position").and_then(|v| v.as_i64()), Some(1));

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/tasks",
                serde_json::json!({ "title": "Order linens" }),
            ))
            .await
            .unwrap();
        let second = body_json(response).await;
        assert_eq!(second.pointer("/data/position").and_then(|v| v.as_i64()), Some(2));
        assert_eq!(
            second.pointer("/data/priority").and_then(|v| v.as_str()),
            Some("medium")
        );

        // Complete the first task; the second closes the gap.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/tasks/{first_id}/complete"),
                serde_json::json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let completed = body_json(response).await;
        assert_eq!(
            completed.pointer("/data/completed").and_then(|v| v.as_bool()),
            Some(true)
        );

        let response = app.clone().oneshot(get_request("/api/tasks")).await.unwrap();
        let active = body_json(response).await;
        let items = active.pointer("/data").and_then(|v| v.as_array()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("position").and_then(|v| v.as_i64()), Some(1));

        let response = app
            .clone()
            .oneshot(get_request("/api/tasks?completed=true"))
            .await
            .unwrap();
        let done = body_json(response).await;
        let items = done.pointer("/data").and_then(|v| v.as_array()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("id").and_then(|v| v.as_str()), Some(first_id.as_str()));

        // Reopen prepends: the task returns at position 1.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/tasks/{first_id}/reopen"),
                serde_json::json!({}),
            ))
            .await
            .unwrap();
        let reopened = body_json(response).await;
        assert_eq!(reopened.pointer("/data/position").and_then(|v| v.as_i64()), Some(1));

        let response = app.clone().oneshot(get_request("/api/tasks")).await.unwrap();
        let active = body_json(response).await;
        let items = active.pointer("/data").and_then(|v| v.as_array()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("id").and_then(|v| v.as_str()), Some(first_id.as_str()));
        assert_eq!(items[1].get("position").and_then(|v| v.as_i64()), Some(2));
    }

    #[tokio::test]
    async fn task_reorder_rejects_sparse_sequences() {
        let (_env_guard, state) = setup_state().await;
        let app = super::router(state);

        let mut ids = Vec::new();
        for title in ["One", "Two"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/api/tasks",
                    serde_json::json!({ "title": title }),
                ))
                .await
                .unwrap();
            let json = body_json(response).await;
            ids.push(json.pointer("/data/id").and_then(|v| v.as_str()).unwrap().to_string());
        }

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/tasks/reorder",
                serde_json::json!({ "items": [
                    { "id": ids[0], "display_order": 1 },
                    { "id": ids[1], "display_order": 3 },
                ]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/tasks/reorder",
                serde_json::json!({ "items": [
                    { "id": ids[1], "display_order": 1 },
                    { "id": ids[0], "display_order": 2 },
                ]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let items = json.pointer("/data").and_then(|v| v.as_array()).unwrap();
        assert_eq!(items[0].get("id").and_then(|v| v.as_str()), Some(ids[1].as_str()));
    }

    #[tokio::test]
    async fn unknown_task_returns_404() {
        let (_env_guard, state) = setup_state().await;
        let app = super::router(state);

        let response = app
            .oneshot(get_request(&format!("/api/tasks/{}", Uuid::new_v4())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deal_stage_move_lands_at_target_tail() {
        let (_env_guard, state) = setup_state().await;
        let app = super::router(state);

        let mut inquiry_ids = Vec::new();
        for name in ["Alice", "Bob"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/api/deals",
                    serde_json::json!({ "contact_name": name }),
                ))
                .await
                .unwrap();
            let json = body_json(response).await;
            inquiry_ids
                .push(json.pointer("/data/id").and_then(|v| v.as_str()).unwrap().to_string());
        }
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/deals",
                serde_json::json!({ "contact_name": "Carol", "stage": "viewing" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/deals/{}/stage", inquiry_ids[0]),
                serde_json::json!({ "stage": "viewing" }),
            ))
            .await
            .unwrap();
        let moved = body_json(response).await;
        assert_eq!(moved.pointer("/data/stage").and_then(|v| v.as_str()), Some("viewing"));
        assert_eq!(moved.pointer("/data/position").and_then(|v| v.as_i64()), Some(2));

        // The vacated inquiry column is renumbered.
        let response = app
            .oneshot(get_request("/api/deals?stage=inquiry"))
            .await
            .unwrap();
        let json = body_json(response).await;
        let items = json.pointer("/data").and_then(|v| v.as_array()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("position").and_then(|v| v.as_i64()), Some(1));
    }

    #[tokio::test]
    async fn gallery_feature_is_exclusive() {
        let (_env_guard, state) = setup_state().await;
        let app = super::router(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/properties",
                serde_json::json!({ "name": "Villa Mare", "location": "Mallorca" }),
            ))
            .await
            .unwrap();
        let property = body_json(response).await;
        let property_id = property
            .pointer("/data/id")
            .and_then(|v| v.as_str())
            .unwrap()
            .to_string();

        let mut image_ids = Vec::new();
        for path in ["villa/front.jpg", "villa/pool.jpg"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    &format!("/api/properties/{property_id}/images"),
                    serde_json::json!({ "file_path": path }),
                ))
                .await
                .unwrap();
            let json = body_json(response).await;
            image_ids
                .push(json.pointer("/data/id").and_then(|v| v.as_str()).unwrap().to_string());
        }

        for image_id in &image_ids {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    &format!("/api/properties/{property_id}/images/{image_id}/feature"),
                    serde_json::json!({}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(get_request(&format!("/api/properties/{property_id}/images")))
            .await
            .unwrap();
        let json = body_json(response).await;
        let items = json.pointer("/data").and_then(|v| v.as_array()).unwrap();
        assert_eq!(items.len(), 2);
        let featured: Vec<&serde_json::Value> = items
            .iter()
            .filter(|img| img.get("is_featured").and_then(|v| v.as_bool()) == Some(true))
            .collect();
        assert_eq!(featured.len(), 1);
        assert_eq!(
            featured[0].get("id").and_then(|v| v.as_str()),
            Some(image_ids[1].as_str())
        );
        let orders: Vec<i64> = items
            .iter()
            .map(|img| img.get("display_order").and_then(|v| v.as_i64()).unwrap())
            .collect();
        assert_eq!(orders, vec![1, 2]);
    }

    #[tokio::test]
    async fn deleting_a_gallery_image_renumbers_the_rest() {
        let (_env_guard, state) = setup_state().await;
        let app = super::router(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/yachts",
                serde_json::json!({ "name": "Sea Whisper" }),
            ))
            .await
            .unwrap();
        let yacht = body_json(response).await;
        let yacht_id = yacht
            .pointer("/data/id")
            .and_then(|v| v.as_str())
            .unwrap()
            .to_string();

        let mut image_ids = Vec::new();
        for path in ["deck.jpg", "salon.jpg", "cabin.jpg"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    &format!("/api/yachts/{yacht_id}/images"),
                    serde_json::json!({ "file_path": path }),
                ))
                .await
                .unwrap();
            let json = body_json(response).await;
            image_ids
                .push(json.pointer("/data/id").and_then(|v| v.as_str()).unwrap().to_string());
        }

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/yachts/{yacht_id}/images/{}", image_ids[0]))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_request(&format!("/api/yachts/{yacht_id}/images")))
            .await
            .unwrap();
        let json = body_json(response).await;
        let items = json.pointer("/data").and_then(|v| v.as_array()).unwrap();
        let orders: Vec<i64> = items
            .iter()
            .map(|img| img.get("display_order").and_then(|v| v.as_i64()).unwrap())
            .collect();
        assert_eq!(orders, vec![1, 2]);
    }
}
