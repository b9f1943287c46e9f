use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "yachts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
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
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
