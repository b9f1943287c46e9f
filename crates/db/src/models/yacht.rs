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

use crate::{
    entities::{yacht, yacht_image},
    models::ids,
};

#[derive(Debug, Error)]
pub enum YachtError {
    #[error("Yacht not found")]
    YachtNotFound,
    #[error("Image not found")]
    ImageNotFound,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Yacht {
    pub id: Uuid,
    pub name: String,
    pub model: Option<String>,
    pub length_m: Option<f64>,
    pub max_guests: Option<i32>,
    pub price_per_day_eur: Option<i64>,
    pub summary: Option<String>,
    pub summary_de: Option<String>,
    pub description: Option<String>,
    pub description_de: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateYacht {
    pub name: String,
    pub model: Option<String>,
    pub length_m: Option<f64>,
    pub max_guests: Option<i32>,
    pub price_per_day_eur: Option<i64>,
    pub summary: Option<String>,
    pub summary_de: Option<String>,
    pub description: Option<String>,
    pub description_de: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, TS)]
pub struct UpdateYacht {
    pub name: Option<String>,
    pub model: Option<String>,
    pub length_m: Option<f64>,
    pub max_guests: Option<i32>,
    pub price_per_day_eur: Option<i64>,
    pub summary: Option<String>,
    pub summary_de: Option<String>,
    pub description: Option<String>,
    pub description_de: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct YachtImage {
    pub id: Uuid,
    pub yacht_id: Uuid,
    pub file_path: String,
    pub display_order: i64,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateYachtImage {
    pub file_path: String,
}

impl Yacht {
    fn from_model(model: yacht::Model) -> Self {
        Self {
            id: model.uuid,
            name: model.name,
            model: model.model,
            length_m: model.length_m,
            max_guests: model.max_guests,
            price_per_day_eur: model.price_per_day_eur,
            summary: model.summary,
            summary_de: model.summary_de,
            description: model.description,
            description_de: model.description_de,
            published: model.published,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let models = yacht::Entity::find()
            .order_by_asc(yacht::Column::Name)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = yacht::Entity::find()
            .filter(yacht::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateYacht,
        yacht_id: Uuid,
    ) -> Result<Self, YachtError> {
        if data.name.trim().is_empty() {
            return Err(YachtError::ValidationError("Yacht name is empty".to_string()));
        }

        let now = Utc::now();
        let active = yacht::ActiveModel {
            uuid: Set(yacht_id),
            name: Set(data.name.trim().to_string()),
            model: Set(data.model.clone()),
            length_m: Set(data.length_m),
            max_guests: Set(data.max_guests),
            price_per_day_eur: Set(data.price_per_day_eur),
            summary: Set(data.summary.clone()),
            summary_de: Set(data.summary_de.clone()),
            description: Set(data.description.clone()),
            description_de: Set(data.description_de.clone()),
            published: Set(false),
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
        data: &UpdateYacht,
    ) -> Result<Self, YachtError> {
        let record = yacht::Entity::find()
            .filter(yacht::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(YachtError::YachtNotFound)?;

        let mut active: yacht::ActiveModel = record.into();
        if let Some(name) = &data.name {
            if name.trim().is_empty() {
                return Err(YachtError::ValidationError("Yacht name is empty".to_string()));
            }
            active.name = Set(name.trim().to_string());
        }
        if let Some(model) = &data.model {
            active.model = Set(clear_on_empty(model));
        }
        if let Some(length_m) = data.length_m {
            active.length_m = Set(Some(length_m));
        }
        if let Some(max_guests) = data.max_guests {
            active.max_guests = Set(Some(max_guests));
        }
        if let Some(price) = data.price_per_day_eur {
            active.price_per_day_eur = Set(Some(price));
        }
        if let Some(summary) = &data.summary {
            active.summary = Set(clear_on_empty(summary));
        }
        if let Some(summary_de) = &data.summary_de {
            active.summary_de = Set(clear_on_empty(summary_de));
        }
        if let Some(description) = &data.description {
            active.description = Set(clear_on_empty(description));
        }
        if let Some(description_de) = &data.description_de {
            active.description_de = Set(clear_on_empty(description_de));
        }
        if let Some(published) = data.published {
            active.published = Set(published);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = yacht::Entity::delete_many()
            .filter(yacht::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

impl YachtImage {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: yacht_image::Model,
    ) -> Result<Self, DbErr> {
        let yacht_uuid = ids::yacht_uuid_by_id(db, model.yacht_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Yacht not found".to_string()))?;
        Ok(Self {
            id: model.uuid,
            yacht_id: yacht_uuid,
            file_path: model.file_path,
            display_order: model.display_order,
            is_featured: model.is_featured,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    pub async fn find_by_yacht_id<C: ConnectionTrait>(
        db: &C,
        yacht_id: Uuid,
    ) -> Result<Vec<Self>, YachtError> {
        let yacht_row_id = ids::yacht_id_by_uuid(db, yacht_id)
            .await?
            .ok_or(YachtError::YachtNotFound)?;

        let models = yacht_image::Entity::find()
            .filter(yacht_image::Column::YachtId.eq(yacht_row_id))
            .order_by_asc(yacht_image::Column::DisplayOrder)
            .all(db)
            .await?;

        let mut images = Vec::with_capacity(models.len());
        for model in models {
            images.push(Self::from_model(db, model).await?);
        }
        Ok(images)
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        yacht_id: Uuid,
        data: &CreateYachtImage,
    ) -> Result<Self, YachtError> {
        let yacht_row_id = ids::yacht_id_by_uuid(db, yacht_id)
            .await?
            .ok_or(YachtError::YachtNotFound)?;

        let tail = yacht_image::Entity::find()
            .filter(yacht_image::Column::YachtId.eq(yacht_row_id))
            .order_by_desc(yacht_image::Column::DisplayOrder)
            .one(db)
            .await?
            .map(|model| model.display_order)
            .unwrap_or(0);

        let now = Utc::now();
        let active = yacht_image::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            yacht_id: Set(yacht_row_id),
            file_path: Set(data.file_path.clone()),
            display_order: Set(tail + 1),
            is_featured: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Self::from_model(db, model).await.map_err(Into::into)
    }

    pub async fn reorder<C: ConnectionTrait>(
        db: &C,
        yacht_id: Uuid,
        pairs: &[(Uuid, i64)],
    ) -> Result<(), YachtError> {
        let yacht_row_id = ids::yacht_id_by_uuid(db, yacht_id)
            .await?
            .ok_or(YachtError::YachtNotFound)?;

        let image_ids: Vec<Uuid> = yacht_image::Entity::find()
            .filter(yacht_image::Column::YachtId.eq(yacht_row_id))
            .all(db)
            .await?
            .into_iter()
            .map(|model| model.uuid)
            .collect();

        board::validate_order(&image_ids, pairs)
            .map_err(|err| YachtError::ValidationError(err.to_string()))?;

        let now = Utc::now();
        for (id, display_order) in pairs {
            yacht_image::Entity::update_many()
                .col_expr(yacht_image::Column::DisplayOrder, Expr::value(*display_order))
                .col_expr(yacht_image::Column::UpdatedAt, Expr::value(now))
                .filter(yacht_image::Column::Uuid.eq(*id))
                .exec(db)
                .await?;
        }

        Ok(())
    }

    /// At most one image per yacht is featured; run inside a transaction.
    pub async fn set_featured<C: ConnectionTrait>(
        db: &C,
        yacht_id: Uuid,
        image_id: Uuid,
    ) -> Result<Self, YachtError> {
        let yacht_row_id = ids::yacht_id_by_uuid(db, yacht_id)
            .await?
            .ok_or(YachtError::YachtNotFound)?;

        let record = yacht_image::Entity::find()
            .filter(yacht_image::Column::Uuid.eq(image_id))
            .filter(yacht_image::Column::YachtId.eq(yacht_row_id))
            .one(db)
            .await?
            .ok_or(YachtError::ImageNotFound)?;

        yacht_image::Entity::update_many()
            .col_expr(yacht_image::Column::IsFeatured, Expr::value(false))
            .filter(yacht_image::Column::YachtId.eq(yacht_row_id))
            .filter(yacht_image::Column::IsFeatured.eq(true))
            .exec(db)
            .await?;

        let mut active: yacht_image::ActiveModel = record.into();
        active.is_featured = Set(true);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db).await?;

        Self::from_model(db, updated).await.map_err(Into::into)
    }

    pub async fn delete<C: ConnectionTrait>(
        db: &C,
        yacht_id: Uuid,
        image_id: Uuid,
    ) -> Result<u64, YachtError> {
        let yacht_row_id = ids::yacht_id_by_uuid(db, yacht_id)
            .await?
            .ok_or(YachtError::YachtNotFound)?;

        let record = yacht_image::Entity::find()
            .filter(yacht_image::Column::Uuid.eq(image_id))
            .filter(yacht_image::Column::YachtId.eq(yacht_row_id))
            .one(db)
            .await?;

        let Some(record) = record else {
            return Ok(0);
        };

        let vacated = record.display_order;
        let result = yacht_image::Entity::delete_many()
            .filter(yacht_image::Column::Uuid.eq(image_id))
            .exec(db)
            .await?;

        if result.rows_affected > 0 {
            yacht_image::Entity::update_many()
                .col_expr(
                    yacht_image::Column::DisplayOrder,
                    Expr::col(yacht_image::Column::DisplayOrder).sub(1),
                )
                .filter(yacht_image::Column::YachtId.eq(yacht_row_id))
                .filter(yacht_image::Column::DisplayOrder.gt(vacated))
                .exec(db)
                .await?;
        }

        Ok(result.rows_affected)
    }
}

fn clear_on_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
