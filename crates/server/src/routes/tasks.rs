use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::{
    TransactionTrait,
    models::task::{CreateTask, Task, UpdateTask},
};
use serde::{Deserialize, Serialize};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_task_middleware, routes::ReorderRequest};

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskQuery {
    pub completed: Option<bool>,
}

pub async fn get_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    let tasks = if query.completed.unwrap_or(false) {
        Task::find_completed(&state.db().pool).await?
    } else {
        Task::find_active(&state.db().pool).await?
    };

    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn get_task(
    Extension(task): Extension<Task>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let id = Uuid::new_v4();

    tracing::debug!("Creating task '{}'", payload.title);

    let task = Task::create(&state.db().pool, &payload, id).await?;

    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn update_task(
    Extension(existing_task): Extension<Task>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = Task::update(&state.db().pool, existing_task.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

/// Marks the task complete. The client keeps it in an undo window for a few
/// seconds before calling this; by the time the request lands the decision is
/// final. The flag flip and the position shift commit together so the active
/// board never ends up with a gap.
pub async fn complete_task(
    Extension(task): Extension<Task>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let tx = state.db().pool.begin().await?;
    let task = Task::complete(&tx, task.id).await?;
    tx.commit().await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

/// Puts a completed task back at the top of the active board.
pub async fn reopen_task(
    Extension(task): Extension<Task>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let tx = state.db().pool.begin().await?;
    let task = Task::reopen(&tx, task.id).await?;
    tx.commit().await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn reorder_tasks(
    State(state): State<AppState>,
    Json(payload): Json<ReorderRequest>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    let tx = state.db().pool.begin().await?;
    Task::reorder(&tx, &payload.pairs()).await?;
    tx.commit().await?;
    let tasks = Task::find_active(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn delete_task(
    Extension(task): Extension<Task>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let tx = state.db().pool.begin().await?;
    Task::delete(&tx, task.id).await?;
    tx.commit().await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let task_id_router = Router::new()
        .route("/", get(get_task).put(update_task).delete(delete_task))
        .route("/complete", post(complete_task))
        .route("/reopen", post(reopen_task))
        .layer(from_fn_with_state(state.clone(), load_task_middleware::<AppState>));

    let inner = Router::new()
        .route("/", get(get_tasks).post(create_task))
        .route("/reorder", post(reorder_tasks))
        .nest("/{task_id}", task_id_router);

    Router::new().nest("/tasks", inner)
}
