use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_supplies_table::Migration),
            Box::new(m20260101_000002_create_incoming_shipments_table::Migration),
            Box::new(m20260101_000003_create_requisitions_tables::Migration),
            Box::new(m20260101_000004_create_cart_items_table::Migration),
        ]
    }
}

mod m20260101_000001_create_supplies_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000001_create_supplies_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Supplies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Supplies::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Supplies::Name).string().not_null())
                        .col(
                            ColumnDef::new(Supplies::SizeSpec)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Supplies::Description)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Supplies::Category).string_len(64).not_null())
                        .col(ColumnDef::new(Supplies::Unit).string_len(16).not_null())
                        .col(
                            ColumnDef::new(Supplies::BoxesCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Supplies::ItemsPerBox)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Supplies::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Supplies::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx-supplies-name-size-spec")
                        .table(Supplies::Table)
                        .col(Supplies::Name)
                        .col(Supplies::SizeSpec)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Supplies::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Supplies {
        Table,
        Id,
        Name,
        SizeSpec,
        Description,
        Category,
        Unit,
        BoxesCount,
        ItemsPerBox,
        Quantity,
        CreatedAt,
    }
}

mod m20260101_000002_create_incoming_shipments_table {
    use sea_orm_migration::prelude::*;

    use super::m20260101_000001_create_supplies_table::Supplies;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000002_create_incoming_shipments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(IncomingShipments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(IncomingShipments::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(IncomingShipments::SupplyId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(IncomingShipments::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(IncomingShipments::ExpectedDate).date().null())
                        .col(
                            ColumnDef::new(IncomingShipments::Notes)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(IncomingShipments::Status)
                                .string_len(20)
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(IncomingShipments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(IncomingShipments::ReceivedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk-incoming-shipments-supply")
                                .from(IncomingShipments::Table, IncomingShipments::SupplyId)
                                .to(Supplies::Table, Supplies::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(IncomingShipments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum IncomingShipments {
        Table,
        Id,
        SupplyId,
        Quantity,
        ExpectedDate,
        Notes,
        Status,
        CreatedAt,
        ReceivedAt,
    }
}

mod m20260101_000003_create_requisitions_tables {
    use sea_orm_migration::prelude::*;

    use super::m20260101_000001_create_supplies_table::Supplies;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000003_create_requisitions_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Requisitions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Requisitions::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Requisitions::UserId).uuid().not_null())
                        .col(
                            ColumnDef::new(Requisitions::Status)
                                .string_len(20)
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(Requisitions::RequestedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Requisitions::RequesterName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Requisitions::OrganizationName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Requisitions::Department).string().not_null())
                        .col(
                            ColumnDef::new(Requisitions::Notes)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Requisitions::DecidedBy).uuid().null())
                        .col(
                            ColumnDef::new(Requisitions::DecisionAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Requisitions::IsArchived)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx-requisitions-user")
                        .table(Requisitions::Table)
                        .col(Requisitions::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RequisitionItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RequisitionItems::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(RequisitionItems::RequisitionId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequisitionItems::SupplyId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequisitionItems::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequisitionItems::PricePerUnit)
                                .decimal_len(12, 2)
                                .null(),
                        )
                        .col(ColumnDef::new(RequisitionItems::NeededBy).date().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk-requisition-items-requisition")
                                .from(RequisitionItems::Table, RequisitionItems::RequisitionId)
                                .to(Requisitions::Table, Requisitions::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk-requisition-items-supply")
                                .from(RequisitionItems::Table, RequisitionItems::SupplyId)
                                .to(Supplies::Table, Supplies::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RequisitionItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Requisitions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Requisitions {
        Table,
        Id,
        UserId,
        Status,
        RequestedAt,
        RequesterName,
        OrganizationName,
        Department,
        Notes,
        DecidedBy,
        DecisionAt,
        IsArchived,
    }

    #[derive(DeriveIden)]
    enum RequisitionItems {
        Table,
        Id,
        RequisitionId,
        SupplyId,
        Quantity,
        PricePerUnit,
        NeededBy,
    }
}

mod m20260101_000004_create_cart_items_table {
    use sea_orm_migration::prelude::*;

    use super::m20260101_000001_create_supplies_table::Supplies;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000004_create_cart_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CartItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CartItems::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(CartItems::UserId).uuid().not_null())
                        .col(ColumnDef::new(CartItems::SupplyId).big_integer().not_null())
                        .col(ColumnDef::new(CartItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(CartItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CartItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk-cart-items-supply")
                                .from(CartItems::Table, CartItems::SupplyId)
                                .to(Supplies::Table, Supplies::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx-cart-items-user-supply")
                        .table(CartItems::Table)
                        .col(CartItems::UserId)
                        .col(CartItems::SupplyId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CartItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum CartItems {
        Table,
        Id,
        UserId,
        SupplyId,
        Quantity,
        CreatedAt,
        UpdatedAt,
    }
}
