use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
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
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
