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

use crate::entities::deal;
pub use crate::types::DealStage;

#[derive(Debug, Error)]
pub enum DealError {
    #[error("Deal not found")]
    DealNotFound,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Deal {
    pub id: Uuid,
    pub contact_name: String,
    pub email: Option<String>,
    pub stage: DealStage,
    pub value_eur: Option<i64>,
    pub notes: Option<String>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateDeal {
    pub contact_name: String,
    pub email: Option<String>,
    pub stage: Option<DealStage>,
    pub value_eur: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateDeal {
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub value_eur: Option<i64>,
    pub notes: Option<String>,
}

impl Deal {
    fn from_model(model: deal::Model) -> Self {
        Self {
            id: model.uuid,
            contact_name: model.contact_name,
            email: model.email,
            stage: model.stage,
            value_eur: model.value_eur,
            notes: model.notes,
            position: model.position,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let models = deal::Entity::find()
            .order_by_asc(deal::Column::Position)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_stage<C: ConnectionTrait>(
        db: &C,
        stage: DealStage,
    ) -> Result<Vec<Self>, DbErr> {
        let models = deal::Entity::find()
            .filter(deal::Column::Stage.eq(stage))
            .order_by_asc(deal::Column::Position)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = deal::Entity::find()
            .filter(deal::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateDeal,
        deal_id: Uuid,
    ) -> Result<Self, DealError> {
        let contact_name = data.contact_name.trim();
        if contact_name.is_empty() {
            return Err(DealError::ValidationError(
                "Deal contact name is empty".to_string(),
            ));
        }

        let stage = data.stage.unwrap_or_default();
        let tail = next_position(db, stage).await?;
        let now = Utc::now();
        let active = deal::ActiveModel {
            uuid: Set(deal_id),
            contact_name: Set(contact_name.to_string()),
            email: Set(data.email.clone()),
            stage: Set(stage),
            value_eur: Set(data.value_eur),
            notes: Set(data.notes.clone()),
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
        data: &UpdateDeal,
    ) -> Result<Self, DealError> {
        let record = deal::Entity::find()
            .filter(deal::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DealError::DealNotFound)?;

        let mut active: deal::ActiveModel = record.into();
        if let Some(contact_name) = &data.contact_name {
            if contact_name.trim().is_empty() {
                return Err(DealError::ValidationError(
                    "Deal contact name is empty".to_string(),
                ));
            }
            active.contact_name = Set(contact_name.trim().to_string());
        }
        if let Some(email) = &data.email {
            let trimmed = email.trim();
            active.email = Set((!trimmed.is_empty()).then(|| trimmed.to_string()));
        }
        if let Some(value_eur) = data.value_eur {
            active.value_eur = Set(Some(value_eur));
        }
        if let Some(notes) = &data.notes {
            let trimmed = notes.trim();
            active.notes = Set((!trimmed.is_empty()).then(|| trimmed.to_string()));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    /// Moves the deal to the tail of the target stage column and closes the
    /// gap it leaves behind.
    pub async fn update_stage<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        stage: DealStage,
    ) -> Result<Self, DealError> {
        let record = deal::Entity::find()
            .filter(deal::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DealError::DealNotFound)?;

        if record.stage == stage {
            return Ok(Self::from_model(record));
        }

        let old_stage = record.stage;
        let vacated = record.position;
        let tail = next_position(db, stage).await?;

        let mut active: deal::ActiveModel = record.into();
        active.stage = Set(stage);
        active.position = Set(tail);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db).await?;

        deal::Entity::update_many()
            .col_expr(
                deal::Column::Position,
                Expr::col(deal::Column::Position).sub(1),
            )
            .filter(deal::Column::Stage.eq(old_stage))
            .filter(deal::Column::Position.gt(vacated))
            .exec(db)
            .await?;

        Ok(Self::from_model(updated))
    }

    /// Persists a full reorder of one pipeline column in one batch.
    pub async fn reorder<C: ConnectionTrait>(
        db: &C,
        stage: DealStage,
        pairs: &[(Uuid, i64)],
    ) -> Result<(), DealError> {
        let stage_ids: Vec<Uuid> = deal::Entity::find()
            .filter(deal::Column::Stage.eq(stage))
            .all(db)
            .await?
            .into_iter()
            .map(|model| model.uuid)
            .collect();

        board::validate_order(&stage_ids, pairs)
            .map_err(|err| DealError::ValidationError(err.to_string()))?;

        let now = Utc::now();
        for (id, position) in pairs {
            deal::Entity::update_many()
                .col_expr(deal::Column::Position, Expr::value(*position))
                .col_expr(deal::Column::UpdatedAt, Expr::value(now))
                .filter(deal::Column::Uuid.eq(*id))
                .exec(db)
                .await?;
        }

        Ok(())
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let record = deal::Entity::find()
            .filter(deal::Column::Uuid.eq(id))
            .one(db)
            .await?;

        let Some(record) = record else {
            return Ok(0);
        };

        let stage = record.stage;
        let vacated = record.position;

        let result = deal::Entity::delete_many()
            .filter(deal::Column::Uuid.eq(id))
            .exec(db)
            .await?;

        if result.rows_affected > 0 {
            deal::Entity::update_many()
                .col_expr(
                    deal::Column::Position,
                    Expr::col(deal::Column::Position).sub(1),
                )
                .filter(deal::Column::Stage.eq(stage))
                .filter(deal::Column::Position.gt(vacated))
                .exec(db)
                .await?;
        }

        Ok(result.rows_affected)
    }
}

async fn next_position<C: ConnectionTrait>(db: &C, stage: DealStage) -> Result<i64, DbErr> {
    let tail = deal::Entity::find()
        .filter(deal::Column::Stage.eq(stage))
        .order_by_desc(deal::Column::Position)
        .one(db)
        .await?
        .map(|model| model.position);
    Ok(tail.unwrap_or(0) + 1)
}
