use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Tasks::Table)
                    .col(pk_id_col(manager, Tasks::Id))
                    .col(uuid_col(Tasks::Uuid))
                    .col(ColumnDef::new(Tasks::Title).string().not_null())
                    .col(ColumnDef::new(Tasks::TitleDe).string())
                    .col(
                        ColumnDef::new(Tasks::Priority)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("medium")),
                    )
                    .col(ColumnDef::new(Tasks::AssignedTo).string())
                    .col(
                        ColumnDef::new(Tasks::Completed)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(ColumnDef::new(Tasks::CompletedAt).timestamp())
                    .col(ColumnDef::new(Tasks::Position).big_integer().not_null())
                    .col(timestamp_col(Tasks::CreatedAt))
                    .col(timestamp_col(Tasks::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_uuid")
                    .table(Tasks::Table)
                    .col(Tasks::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_completed_position")
                    .table(Tasks::Table)
                    .col(Tasks::Completed)
                    .col(Tasks::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Deals::Table)
                    .col(pk_id_col(manager, Deals::Id))
                    .col(uuid_col(Deals::Uuid))
                    .col(ColumnDef::new(Deals::ContactName).string().not_null())
                    .col(ColumnDef::new(Deals::Email).string())
                    .col(
                        ColumnDef::new(Deals::Stage)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("inquiry")),
                    )
                    .col(ColumnDef::new(Deals::ValueEur).big_integer())
                    .col(ColumnDef::new(Deals::Notes).text())
                    .col(ColumnDef::new(Deals::Position).big_integer().not_null())
                    .col(timestamp_col(Deals::CreatedAt))
                    .col(timestamp_col(Deals::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_deals_uuid")
                    .table(Deals::Table)
                    .col(Deals::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_deals_stage_position")
                    .table(Deals::Table)
                    .col(Deals::Stage)
                    .col(Deals::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Properties::Table)
                    .col(pk_id_col(manager, Properties::Id))
                    .col(uuid_col(Properties::Uuid))
                    .col(ColumnDef::new(Properties::Name).string().not_null())
                    .col(ColumnDef::new(Properties::Location).string().not_null())
                    .col(ColumnDef::new(Properties::Summary).text())
                    .col(ColumnDef::new(Properties::SummaryDe).text())
                    .col(ColumnDef::new(Properties::Description).text())
                    .col(ColumnDef::new(Properties::DescriptionDe).text())
                    .col(ColumnDef::new(Properties::PricePerWeekEur).big_integer())
                    .col(ColumnDef::new(Properties::Bedrooms).integer())
                    .col(ColumnDef::new(Properties::MaxGuests).integer())
                    .col(
                        ColumnDef::new(Properties::Published)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(timestamp_col(Properties::CreatedAt))
                    .col(timestamp_col(Properties::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_properties_uuid")
                    .table(Properties::Table)
                    .col(Properties::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(PropertyImages::Table)
                    .col(pk_id_col(manager, PropertyImages::Id))
                    .col(uuid_col(PropertyImages::Uuid))
                    .col(fk_id_col(manager, PropertyImages::PropertyId))
                    .col(ColumnDef::new(PropertyImages::FilePath).string().not_null())
                    .col(
                        ColumnDef::new(PropertyImages::DisplayOrder)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PropertyImages::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(timestamp_col(PropertyImages::CreatedAt))
                    .col(timestamp_col(PropertyImages::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_property_images_property_id")
                            .from(PropertyImages::Table, PropertyImages::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_property_images_uuid")
                    .table(PropertyImages::Table)
                    .col(PropertyImages::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_property_images_property_id_order")
                    .table(PropertyImages::Table)
                    .col(PropertyImages::PropertyId)
                    .col(PropertyImages::DisplayOrder)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Yachts::Table)
                    .col(pk_id_col(manager, Yachts::Id))
                    .col(uuid_col(Yachts::Uuid))
                    .col(ColumnDef::new(Yachts::Name).string().not_null())
                    .col(ColumnDef::new(Yachts::Model).string())
                    .col(ColumnDef::new(Yachts::LengthM).double())
                    .col(ColumnDef::new(Yachts::MaxGuests).integer())
                    .col(ColumnDef::new(Yachts::PricePerDayEur).big_integer())
                    .col(ColumnDef::new(Yachts::Summary).text())
                    .col(ColumnDef::new(Yachts::SummaryDe).text())
                    .col(ColumnDef::new(Yachts::Description).text())
                    .col(ColumnDef::new(Yachts::DescriptionDe).text())
                    .col(
                        ColumnDef::new(Yachts::Published)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(timestamp_col(Yachts::CreatedAt))
                    .col(timestamp_col(Yachts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_yachts_uuid")
                    .table(Yachts::Table)
                    .col(Yachts::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(YachtImages::Table)
                    .col(pk_id_col(manager, YachtImages::Id))
                    .col(uuid_col(YachtImages::Uuid))
                    .col(fk_id_col(manager, YachtImages::YachtId))
                    .col(ColumnDef::new(YachtImages::FilePath).string().not_null())
                    .col(
                        ColumnDef::new(YachtImages::DisplayOrder)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(YachtImages::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(timestamp_col(YachtImages::CreatedAt))
                    .col(timestamp_col(YachtImages::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_yacht_images_yacht_id")
                            .from(YachtImages::Table, YachtImages::YachtId)
                            .to(Yachts::Table, Yachts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_yacht_images_uuid")
                    .table(YachtImages::Table)
                    .col(YachtImages::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_yacht_images_yacht_id_order")
                    .table(YachtImages::Table)
                    .col(YachtImages::YachtId)
                    .col(YachtImages::DisplayOrder)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(YachtImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Yachts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PropertyImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    Uuid,
    Title,
    TitleDe,
    Priority,
    AssignedTo,
    Completed,
    CompletedAt,
    Position,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Deals {
    Table,
    Id,
    Uuid,
    ContactName,
    Email,
    Stage,
    ValueEur,
    Notes,
    Position,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Properties {
    Table,
    Id,
    Uuid,
    Name,
    Location,
    Summary,
    SummaryDe,
    Description,
    DescriptionDe,
    PricePerWeekEur,
    Bedrooms,
    MaxGuests,
    Published,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PropertyImages {
    Table,
    Id,
    Uuid,
    PropertyId,
    FilePath,
    DisplayOrder,
    IsFeatured,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Yachts {
    Table,
    Id,
    Uuid,
    Name,
    Model,
    LengthM,
    MaxGuests,
    PricePerDayEur,
    Summary,
    SummaryDe,
    Description,
    DescriptionDe,
    Published,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum YachtImages {
    Table,
    Id,
    Uuid,
    YachtId,
    FilePath,
    DisplayOrder,
    IsFeatured,
    CreatedAt,
    UpdatedAt,
}
