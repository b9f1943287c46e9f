use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::entities::task;
pub use crate::types::TaskPriority;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found")]
    TaskNotFound,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub title_de: Option<String>,
    pub priority: TaskPriority,
    pub assigned_to: Option<String>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTask {
    pub title: String,
    pub title_de: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub title_de: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<String>,
}

impl Task {
    fn from_model(model: task::Model) -> Self {
        Self {
            id: model.uuid,
            title: model.title,
            title_de: model.title_de,
            priority: model.priority,
            assigned_to: model.assigned_to,
            completed: model.completed,
            completed_at: model.completed_at.map(Into::into),
            position: model.position,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    pub async fn find_active<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let models = task::Entity::find()
            .filter(task::Column::Completed.eq(false))
            .order_by_asc(task::Column::Position)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_completed<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let models = task::Entity::find()
            .filter(task::Column::Completed.eq(true))
            .order_by_desc(task::Column::CompletedAt)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    /// New tasks land at the tail of the active board.
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateTask,
        task_id: Uuid,
    ) -> Result<Self, TaskError> {
        let title = data.title.trim();
        if title.is_empty() {
            return Err(TaskError::ValidationError("Task title is empty".to_string()));
        }

        let tail = next_position(db).await?;
        let now = Utc::now();
        let active = task::ActiveModel {
            uuid: Set(task_id),
            title: Set(title.to_string()),
            title_de: Set(data.title_de.clone()),
            priority: Set(data.priority.unwrap_or_default()),
            assigned_to: Set(data.assigned_to.clone()),
            completed: Set(false),
            completed_at: Set(None),
            position: Set(tail),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateTask,
    ) -> Result<Self, TaskError> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(TaskError::TaskNotFound)?;

        let mut active: task::ActiveModel = record.clone().into();
        if let Some(title) = &data.title {
            if title.trim().is_empty() {
                return Err(TaskError::ValidationError("Task title is empty".to_string()));
            }
            active.title = Set(title.trim().to_string());
        }
        if let Some(title_de) = &data.title_de {
            // Empty string clears the translation.
            let trimmed = title_de.trim();
            active.title_de = Set((!trimmed.is_empty()).then(|| trimmed.to_string()));
        }
        if let Some(priority) = data.priority {
            active.priority = Set(priority);
        }
        if let Some(assigned_to) = &data.assigned_to {
            let trimmed = assigned_to.trim();
            active.assigned_to = Set((!trimmed.is_empty()).then(|| trimmed.to_string()));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    /// Marks the task complete and closes the gap it leaves in the active
    /// ordering, so active positions stay dense.
    pub async fn complete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Self, TaskError> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(TaskError::TaskNotFound)?;

        if record.completed {
            return Ok(Self::from_model(record));
        }

        let vacated = record.position;
        let now = Utc::now();
        let mut active: task::ActiveModel = record.into();
        active.completed = Set(true);
        active.completed_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        let updated = active.update(db).await?;

        task::Entity::update_many()
            .col_expr(
                task::Column::Position,
                Expr::col(task::Column::Position).sub(1),
            )
            .filter(task::Column::Completed.eq(false))
            .filter(task::Column::Position.gt(vacated))
            .exec(db)
            .await?;

        Ok(Self::from_model(updated))
    }

    /// Reopened tasks are prepended to the active board.
    pub async fn reopen<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Self, TaskError> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(TaskError::TaskNotFound)?;

        if !record.completed {
            return Ok(Self::from_model(record));
        }

        task::Entity::update_many()
            .col_expr(
                task::Column::Position,
                Expr::col(task::Column::Position).add(1),
            )
            .filter(task::Column::Completed.eq(false))
            .exec(db)
            .await?;

        let now = Utc::now();
        let mut active: task::ActiveModel = record.into();
        active.completed = Set(false);
        active.completed_at = Set(None);
        active.position = Set(1);
        active.updated_at = Set(now.into());
        let updated = active.update(db).await?;

        Ok(Self::from_model(updated))
    }

    /// Persists a full reorder of the active board in one batch. The pairs
    /// must cover exactly the active tasks with a dense 1..N sequence;
    /// last write wins across admin sessions.
    pub async fn reorder<C: ConnectionTrait>(
        db: &C,
        pairs: &[(Uuid, i64)],
    ) -> Result<(), TaskError> {
        let active_ids: Vec<Uuid> = task::Entity::find()
            .filter(task::Column::Completed.eq(false))
            .all(db)
            .await?
            .into_iter()
            .map(|model| model.uuid)
            .collect();

        board::validate_order(&active_ids, pairs)
            .map_err(|err| TaskError::ValidationError(err.to_string()))?;

        let now = Utc::now();
        for (id, position) in pairs {
            task::Entity::update_many()
                .col_expr(task::Column::Position, Expr::value(*position))
                .col_expr(task::Column::UpdatedAt, Expr::value(now))
                .filter(task::Column::Uuid.eq(*id))
                .exec(db)
                .await?;
        }

        Ok(())
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?;

        let Some(record) = record else {
            return Ok(0);
        };

        let was_active = !record.completed;
        let vacated = record.position;

        let result = task::Entity::delete_many()
            .filter(task::Column::Uuid.eq(id))
            .exec(db)
            .await?;

        if was_active && result.rows_affected > 0 {
            task::Entity::update_many()
                .col_expr(
                    task::Column::Position,
                    Expr::col(task::Column::Position).sub(1),
                )
                .filter(task::Column::Completed.eq(false))
                .filter(task::Column::Position.gt(vacated))
                .exec(db)
                .await?;
        }

        Ok(result.rows_affected)
    }
}

async fn next_position<C: ConnectionTrait>(db: &C) -> Result<i64, DbErr> {
    let tail = task::Entity::find()
        .filter(task::Column::Completed.eq(false))
        .order_by_desc(task::Column::Position)
        .one(db)
        .await?
        .map(|model| model.position);
    Ok(tail.unwrap_or(0) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DBService, TransactionTrait};

    async fn memory_db() -> DBService {
        DBService::new_with_url("sqlite::memory:").await.unwrap()
    }

    fn create(title: &str) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            title_de: None,
            priority: None,
            assigned_to: None,
        }
    }

    async fn active_positions(db: &DBService) -> Vec<(Uuid, i64)> {
        Task::find_active(&db.pool)
            .await
            .unwrap()
            .into_iter()
            .map(|task| (task.id, task.position))
            .collect()
    }

    #[tokio::test]
    async fn create_appends_at_the_tail() {
        let db = memory_db().await;

        let a = Task::create(&db.pool, &create("A"), Uuid::new_v4()).await.unwrap();
        let b = Task::create(&db.pool, &create("B"), Uuid::new_v4()).await.unwrap();

        assert_eq!(a.position, 1);
        assert_eq!(b.position, 2);
        assert_eq!(a.priority, TaskPriority::Medium);
    }

    #[tokio::test]
    async fn complete_closes_the_gap_and_reopen_prepends() {
        let db = memory_db().await;

        let a = Task::create(&db.pool, &create("A"), Uuid::new_v4()).await.unwrap();
        let b = Task::create(&db.pool, &create("B"), Uuid::new_v4()).await.unwrap();
        let c = Task::create(&db.pool, &create("C"), Uuid::new_v4()).await.unwrap();

        let completed = Task::complete(&db.pool, b.id).await.unwrap();
        assert!(completed.completed);
        assert!(completed.completed_at.is_some());
        assert_eq!(active_positions(&db).await, vec![(a.id, 1), (c.id, 2)]);

        let reopened = Task::reopen(&db.pool, b.id).await.unwrap();
        assert!(!reopened.completed);
        assert_eq!(reopened.position, 1);
        assert_eq!(
            active_positions(&db).await,
            vec![(b.id, 1), (a.id, 2), (c.id, 3)]
        );
    }

    #[tokio::test]
    async fn reorder_validates_the_batch_before_writing() {
        let db = memory_db().await;

        let a = Task::create(&db.pool, &create("A"), Uuid::new_v4()).await.unwrap();
        let b = Task::create(&db.pool, &create("B"), Uuid::new_v4()).await.unwrap();

        let sparse = vec![(a.id, 1), (b.id, 3)];
        let err = Task::reorder(&db.pool, &sparse).await.unwrap_err();
        assert!(matches!(err, TaskError::ValidationError(_)));
        assert_eq!(active_positions(&db).await, vec![(a.id, 1), (b.id, 2)]);

        Task::reorder(&db.pool, &[(b.id, 1), (a.id, 2)]).await.unwrap();
        assert_eq!(active_positions(&db).await, vec![(b.id, 1), (a.id, 2)]);
    }

    #[tokio::test]
    async fn delete_renumbers_the_active_board() {
        let db = memory_db().await;

        let a = Task::create(&db.pool, &create("A"), Uuid::new_v4()).await.unwrap();
        let b = Task::create(&db.pool, &create("B"), Uuid::new_v4()).await.unwrap();
        let c = Task::create(&db.pool, &create("C"), Uuid::new_v4()).await.unwrap();

        assert_eq!(Task::delete(&db.pool, a.id).await.unwrap(), 1);
        assert_eq!(active_positions(&db).await, vec![(b.id, 1), (c.id, 2)]);

        // Deleting an unknown id is a no-op.
        assert_eq!(Task::delete(&db.pool, Uuid::new_v4()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn batched_writes_respect_the_wrapping_transaction() {
        let db = memory_db().await;

        let a = Task::create(&db.pool, &create("A"), Uuid::new_v4()).await.unwrap();
        let b = Task::create(&db.pool, &create("B"), Uuid::new_v4()).await.unwrap();
        let c = Task::create(&db.pool, &create("C"), Uuid::new_v4()).await.unwrap();

        // A rolled-back reorder leaves no partial renumbering behind.
        let tx = db.pool.begin().await.unwrap();
        Task::reorder(&tx, &[(c.id, 1), (a.id, 2), (b.id, 3)]).await.unwrap();
        tx.rollback().await.unwrap();
        assert_eq!(
            active_positions(&db).await,
            vec![(a.id, 1), (b.id, 2), (c.id, 3)]
        );

        // Same for the flag flip plus gap close on completion.
        let tx = db.pool.begin().await.unwrap();
        Task::complete(&tx, a.id).await.unwrap();
        tx.rollback().await.unwrap();
        assert_eq!(
            active_positions(&db).await,
            vec![(a.id, 1), (b.id, 2), (c.id, 3)]
        );

        let tx = db.pool.begin().await.unwrap();
        Task::complete(&tx, a.id).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(active_positions(&db).await, vec![(b.id, 1), (c.id, 2)]);
    }

    #[tokio::test]
    async fn update_clears_translation_on_empty_string() {
        let db = memory_db().await;

        let task = Task::create(
            &db.pool,
            &CreateTask {
                title: "Fix boiler".to_string(),
                title_de: Some("Boiler reparieren".to_string()),
                priority: Some(TaskPriority::High),
                assigned_to: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let updated = Task::update(
            &db.pool,
            task.id,
            &UpdateTask {
                title: None,
                title_de: Some(String::new()),
                priority: None,
                assigned_to: Some("Maria".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.title, "Fix boiler");
        assert_eq!(updated.title_de, None);
        assert_eq!(updated.assigned_to.as_deref(), Some("Maria"));
        assert_eq!(updated.priority, TaskPriority::High);
    }
}
