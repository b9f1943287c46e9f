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
    entities::{property, property_image},
    models::ids,
};

#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("Property not found")]
    PropertyNotFound,
    #[error("Image not found")]
    ImageNotFound,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Property {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub summary: Option<String>,
    pub summary_de: Option<String>,
    pub description: Option<String>,
    pub description_de: Option<String>,
    pub price_per_week_eur: Option<i64>,
    pub bedrooms: Option<i32>,
    pub max_guests: Option<i32>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProperty {
    pub name: String,
    pub location: String,
    pub summary: Option<String>,
    pub summary_de: Option<String>,
    pub description: Option<String>,
    pub description_de: Option<String>,
    pub price_per_week_eur: Option<i64>,
    pub bedrooms: Option<i32>,
    pub max_guests: Option<i32>,
}

#[derive(Debug, Default, Serialize, Deserialize, TS)]
pub struct UpdateProperty {
    pub name: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    pub summary_de: Option<String>,
    pub description: Option<String>,
    pub description_de: Option<String>,
    pub price_per_week_eur: Option<i64>,
    pub bedrooms: Option<i32>,
    pub max_guests: Option<i32>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct PropertyImage {
    pub id: Uuid,
    pub property_id: Uuid,
    pub file_path: String,
    pub display_order: i64,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreatePropertyImage {
    pub file_path: String,
}

impl Property {
    fn from_model(model: property::Model) -> Self {
        Self {
            id: model.uuid,
            name: model.name,
            location: model.location,
            summary: model.summary,
            summary_de: model.summary_de,
            description: model.description,
            description_de: model.description_de,
            price_per_week_eur: model.price_per_week_eur,
            bedrooms: model.bedrooms,
            max_guests: model.max_guests,
            published: model.published,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let models = property::Entity::find()
            .order_by_asc(property::Column::Name)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = property::Entity::find()
            .filter(property::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateProperty,
        property_id: Uuid,
    ) -> Result<Self, PropertyError> {
        if data.name.trim().is_empty() {
            return Err(PropertyError::ValidationError(
                "Property name is empty".to_string(),
            ));
        }

        let now = Utc::now();
        let active = property::ActiveModel {
            uuid: Set(property_id),
            name: Set(data.name.trim().to_string()),
            location: Set(data.location.trim().to_string()),
            summary: Set(data.summary.clone()),
            summary_de: Set(data.summary_de.clone()),
            description: Set(data.description.clone()),
            description_de: Set(data.description_de.clone()),
            price_per_week_eur: Set(data.price_per_week_eur),
            bedrooms: Set(data.bedrooms),
            max_guests: Set(data.max_guests),
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
        data: &UpdateProperty,
    ) -> Result<Self, PropertyError> {
        let record = property::Entity::find()
            .filter(property::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(PropertyError::PropertyNotFound)?;

        let mut active: property::ActiveModel = record.into();
        if let Some(name) = &data.name {
            if name.trim().is_empty() {
                return Err(PropertyError::ValidationError(
                    "Property name is empty".to_string(),
                ));
            }
            active.name = Set(name.trim().to_string());
        }
        if let Some(location) = &data.location {
            active.location = Set(location.trim().to_string());
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
        if let Some(price) = data.price_per_week_eur {
            active.price_per_week_eur = Set(Some(price));
        }
        if let Some(bedrooms) = data.bedrooms {
            active.bedrooms = Set(Some(bedrooms));
        }
        if let Some(max_guests) = data.max_guests {
            active.max_guests = Set(Some(max_guests));
        }
        if let Some(published) = data.published {
            active.published = Set(published);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    /// Deleting a property also drops its gallery (FK cascade).
    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = property::Entity::delete_many()
            .filter(property::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

impl PropertyImage {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: property_image::Model,
    ) -> Result<Self, DbErr> {
        let property_uuid = ids::property_uuid_by_id(db, model.property_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Property not found".to_string()))?;
        Ok(Self {
            id: model.uuid,
            property_id: property_uuid,
            file_path: model.file_path,
            display_order: model.display_order,
            is_featured: model.is_featured,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    pub async fn find_by_property_id<C: ConnectionTrait>(
        db: &C,
        property_id: Uuid,
    ) -> Result<Vec<Self>, PropertyError> {
        let property_row_id = ids::property_id_by_uuid(db, property_id)
            .await?
            .ok_or(PropertyError::PropertyNotFound)?;

        let models = property_image::Entity::find()
            .filter(property_image::Column::PropertyId.eq(property_row_id))
            .order_by_asc(property_image::Column::DisplayOrder)
            .all(db)
            .await?;

        let mut images = Vec::with_capacity(models.len());
        for model in models {
            images.push(Self::from_model(db, model).await?);
        }
        Ok(images)
    }

    /// New images are appended to the tail of the gallery.
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        property_id: Uuid,
        data: &CreatePropertyImage,
    ) -> Result<Self, PropertyError> {
        let property_row_id = ids::property_id_by_uuid(db, property_id)
            .await?
            .ok_or(PropertyError::PropertyNotFound)?;

        let tail = property_image::Entity::find()
            .filter(property_image::Column::PropertyId.eq(property_row_id))
            .order_by_desc(property_image::Column::DisplayOrder)
            .one(db)
            .await?
            .map(|model| model.display_order)
            .unwrap_or(0);

        let now = Utc::now();
        let active = property_image::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            property_id: Set(property_row_id),
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

    /// Replaces the gallery ordering in one batch. The pairs must cover
    /// exactly the property's images with a dense 1..N sequence.
    pub async fn reorder<C: ConnectionTrait>(
        db: &C,
        property_id: Uuid,
        pairs: &[(Uuid, i64)],
    ) -> Result<(), PropertyError> {
        let property_row_id = ids::property_id_by_uuid(db, property_id)
            .await?
            .ok_or(PropertyError::PropertyNotFound)?;

        let image_ids: Vec<Uuid> = property_image::Entity::find()
            .filter(property_image::Column::PropertyId.eq(property_row_id))
            .all(db)
            .await?
            .into_iter()
            .map(|model| model.uuid)
            .collect();

        board::validate_order(&image_ids, pairs)
            .map_err(|err| PropertyError::ValidationError(err.to_string()))?;

        let now = Utc::now();
        for (id, display_order) in pairs {
            property_image::Entity::update_many()
                .col_expr(property_image::Column::DisplayOrder, Expr::value(*display_order))
                .col_expr(property_image::Column::UpdatedAt, Expr::value(now))
                .filter(property_image::Column::Uuid.eq(*id))
                .exec(db)
                .await?;
        }

        Ok(())
    }

    /// Marks one image as featured and clears the flag on every other image
    /// of the same property. Run inside a transaction.
    pub async fn set_featured<C: ConnectionTrait>(
        db: &C,
        property_id: Uuid,
        image_id: Uuid,
    ) -> Result<Self, PropertyError> {
        let property_row_id = ids::property_id_by_uuid(db, property_id)
            .await?
            .ok_or(PropertyError::PropertyNotFound)?;

        let record = property_image::Entity::find()
            .filter(property_image::Column::Uuid.eq(image_id))
            .filter(property_image::Column::PropertyId.eq(property_row_id))
            .one(db)
            .await?
            .ok_or(PropertyError::ImageNotFound)?;

        property_image::Entity::update_many()
            .col_expr(property_image::Column::IsFeatured, Expr::value(false))
            .filter(property_image::Column::PropertyId.eq(property_row_id))
            .filter(property_image::Column::IsFeatured.eq(true))
            .exec(db)
            .await?;

        let mut active: property_image::ActiveModel = record.into();
        active.is_featured = Set(true);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db).await?;

        Self::from_model(db, updated).await.map_err(Into::into)
    }

    /// Removes an image and renumbers the remaining gallery so the ordering
    /// stays dense.
    pub async fn delete<C: ConnectionTrait>(
        db: &C,
        property_id: Uuid,
        image_id: Uuid,
    ) -> Result<u64, PropertyError> {
        let property_row_id = ids::property_id_by_uuid(db, property_id)
            .await?
            .ok_or(PropertyError::PropertyNotFound)?;

        let record = property_image::Entity::find()
            .filter(property_image::Column::Uuid.eq(image_id))
            .filter(property_image::Column::PropertyId.eq(property_row_id))
            .one(db)
            .await?;

        let Some(record) = record else {
            return Ok(0);
        };

        let vacated = record.display_order;
        let result = property_image::Entity::delete_many()
            .filter(property_image::Column::Uuid.eq(image_id))
            .exec(db)
            .await?;

        if result.rows_affected > 0 {
            property_image::Entity::update_many()
                .col_expr(
                    property_image::Column::DisplayOrder,
                    Expr::col(property_image::Column::DisplayOrder).sub(1),
                )
                .filter(property_image::Column::PropertyId.eq(property_row_id))
                .filter(property_image::Column::DisplayOrder.gt(vacated))
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
