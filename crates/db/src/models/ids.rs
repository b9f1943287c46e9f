//! Row-id / public-uuid mapping helpers. Row ids never leave this crate;
//! the gallery models use these to translate at the boundary.

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entities::{property, yacht};

pub async fn property_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    property::Entity::find()
        .select_only()
        .column(property::Column::Id)
        .filter(property::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn property_uuid_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<Uuid>, DbErr> {
    property::Entity::find()
        .select_only()
        .column(property::Column::Uuid)
        .filter(property::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn yacht_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    yacht::Entity::find()
        .select_only()
        .column(yacht::Column::Id)
        .filter(yacht::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn yacht_uuid_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<Uuid>, DbErr> {
    yacht::Entity::find()
        .select_only()
        .column(yacht::Column::Uuid)
        .filter(yacht::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}
