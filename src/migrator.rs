//! Embedded schema migrations.
//!
//! Migrations are compiled into the binary and applied on startup when
//! `auto_migrate` is enabled, so a fresh database needs no external tooling.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_vehicles::Migration),
            Box::new(m20250801_000002_create_drivers::Migration),
            Box::new(m20250801_000003_create_parties::Migration),
            Box::new(m20250801_000004_create_orders::Migration),
            Box::new(m20250801_000005_create_shipments::Migration),
            Box::new(m20250801_000006_create_status_updates::Migration),
            Box::new(m20250801_000007_seed_default_admin::Migration),
        ]
    }
}

mod m20250801_000001_create_vehicles {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250801_000001_create_vehicles"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vehicles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Vehicles::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Vehicles::VehicleNumber)
                                .text()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Vehicles::VehicleType).text().not_null())
                        .col(ColumnDef::new(Vehicles::Capacity).integer().not_null())
                        .col(ColumnDef::new(Vehicles::Status).text().not_null())
                        .col(
                            ColumnDef::new(Vehicles::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Auto-assignment scans for available vehicles by capacity.
            manager
                .create_index(
                    Index::create()
                        .name("idx_vehicles_status_capacity")
                        .table(Vehicles::Table)
                        .col(Vehicles::Status)
                        .col(Vehicles::Capacity)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Vehicles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Vehicles {
        Table,
        Id,
        VehicleNumber,
        VehicleType,
        Capacity,
        Status,
        CreatedAt,
    }
}

mod m20250801_000002_create_drivers {
    use sea_orm_migration::prelude::*;

    use super::m20250801_000001_create_vehicles::Vehicles;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250801_000002_create_drivers"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Drivers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Drivers::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Drivers::Name).text().not_null())
                        .col(ColumnDef::new(Drivers::Phone).text().not_null())
                        .col(ColumnDef::new(Drivers::LicenseNumber).text().not_null())
                        .col(ColumnDef::new(Drivers::AssignedVehicleId).big_integer())
                        .col(
                            ColumnDef::new(Drivers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_drivers_assigned_vehicle")
                                .from(Drivers::Table, Drivers::AssignedVehicleId)
                                .to(Vehicles::Table, Vehicles::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_drivers_assigned_vehicle")
                        .table(Drivers::Table)
                        .col(Drivers::AssignedVehicleId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Drivers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Drivers {
        Table,
        Id,
        Name,
        Phone,
        LicenseNumber,
        AssignedVehicleId,
        CreatedAt,
    }
}

mod m20250801_000003_create_parties {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250801_000003_create_parties"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Customers::Name).text().not_null())
                        .col(ColumnDef::new(Customers::Email).text().not_null().unique_key())
                        .col(ColumnDef::new(Customers::Phone).text())
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Suppliers::Name).text().not_null())
                        .col(ColumnDef::new(Suppliers::Email).text().not_null().unique_key())
                        .col(ColumnDef::new(Suppliers::Phone).text())
                        .col(
                            ColumnDef::new(Suppliers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Admins::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Admins::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Admins::Name).text().not_null())
                        .col(ColumnDef::new(Admins::Email).text().not_null().unique_key())
                        .col(
                            ColumnDef::new(Admins::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Admins::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Customers {
        Table,
        Id,
        Name,
        Email,
        Phone,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub enum Suppliers {
        Table,
        Id,
        Name,
        Email,
        Phone,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub enum Admins {
        Table,
        Id,
        Name,
        Email,
        CreatedAt,
    }
}

mod m20250801_000004_create_orders {
    use sea_orm_migration::prelude::*;

    use super::m20250801_000003_create_parties::Customers;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250801_000004_create_orders"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Orders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Orders::CustomerId).big_integer().not_null())
                        .col(ColumnDef::new(Orders::Status).text().not_null())
                        .col(
                            ColumnDef::new(Orders::OrderDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::TotalAmount)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp_with_time_zone())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_customer")
                                .from(Orders::Table, Orders::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_customer")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Orders {
        Table,
        Id,
        CustomerId,
        Status,
        OrderDate,
        TotalAmount,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250801_000005_create_shipments {
    use sea_orm_migration::prelude::*;

    use super::m20250801_000001_create_vehicles::Vehicles;
    use super::m20250801_000002_create_drivers::Drivers;
    use super::m20250801_000004_create_orders::Orders;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250801_000005_create_shipments"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Shipments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Shipments::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Shipments::OrderId).big_integer().not_null())
                        .col(ColumnDef::new(Shipments::VehicleId).big_integer())
                        .col(ColumnDef::new(Shipments::DriverId).big_integer())
                        .col(
                            ColumnDef::new(Shipments::ShipmentDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Shipments::DeliveryDate).timestamp_with_time_zone())
                        .col(ColumnDef::new(Shipments::Status).text().not_null())
                        .col(
                            ColumnDef::new(Shipments::TrackingNumber)
                                .text()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Shipments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Shipments::UpdatedAt).timestamp_with_time_zone())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shipments_order")
                                .from(Shipments::Table, Shipments::OrderId)
                                .to(Orders::Table, Orders::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shipments_vehicle")
                                .from(Shipments::Table, Shipments::VehicleId)
                                .to(Vehicles::Table, Vehicles::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shipments_driver")
                                .from(Shipments::Table, Shipments::DriverId)
                                .to(Drivers::Table, Drivers::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_shipments_order")
                        .table(Shipments::Table)
                        .col(Shipments::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_shipments_status")
                        .table(Shipments::Table)
                        .col(Shipments::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Shipments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Shipments {
        Table,
        Id,
        OrderId,
        VehicleId,
        DriverId,
        ShipmentDate,
        DeliveryDate,
        Status,
        TrackingNumber,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250801_000006_create_status_updates {
    use sea_orm_migration::prelude::*;

    use super::m20250801_000003_create_parties::Admins;
    use super::m20250801_000004_create_orders::Orders;
    use super::m20250801_000005_create_shipments::Shipments;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250801_000006_create_status_updates"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StatusUpdates::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StatusUpdates::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(StatusUpdates::OrderId).big_integer())
                        .col(ColumnDef::new(StatusUpdates::ShipmentId).big_integer())
                        .col(
                            ColumnDef::new(StatusUpdates::StakeholderType)
                                .text()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StatusUpdates::StakeholderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StatusUpdates::PreviousStatus).text())
                        .col(ColumnDef::new(StatusUpdates::NewStatus).text().not_null())
                        .col(ColumnDef::new(StatusUpdates::UpdateReason).text())
                        .col(ColumnDef::new(StatusUpdates::CustomerNotes).text())
                        .col(ColumnDef::new(StatusUpdates::InternalNotes).text())
                        .col(
                            ColumnDef::new(StatusUpdates::IsCancellationRequest)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(StatusUpdates::CancellationReason).text())
                        .col(
                            ColumnDef::new(StatusUpdates::RequiresApproval)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(StatusUpdates::ApprovalStatus)
                                .text()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StatusUpdates::ApprovedBy).big_integer())
                        .col(ColumnDef::new(StatusUpdates::ApprovedAt).timestamp_with_time_zone())
                        .col(
                            ColumnDef::new(StatusUpdates::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_status_updates_order")
                                .from(StatusUpdates::Table, StatusUpdates::OrderId)
                                .to(Orders::Table, Orders::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_status_updates_shipment")
                                .from(StatusUpdates::Table, StatusUpdates::ShipmentId)
                                .to(Shipments::Table, Shipments::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_status_updates_approved_by")
                                .from(StatusUpdates::Table, StatusUpdates::ApprovedBy)
                                .to(Admins::Table, Admins::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_status_updates_order")
                        .table(StatusUpdates::Table)
                        .col(StatusUpdates::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_status_updates_shipment")
                        .table(StatusUpdates::Table)
                        .col(StatusUpdates::ShipmentId)
                        .to_owned(),
                )
                .await?;

            // The pending-approvals queue filters on both columns.
            manager
                .create_index(
                    Index::create()
                        .name("idx_status_updates_approval")
                        .table(StatusUpdates::Table)
                        .col(StatusUpdates::RequiresApproval)
                        .col(StatusUpdates::ApprovalStatus)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StatusUpdates::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum StatusUpdates {
        Table,
        Id,
        OrderId,
        ShipmentId,
        StakeholderType,
        StakeholderId,
        PreviousStatus,
        NewStatus,
        UpdateReason,
        CustomerNotes,
        InternalNotes,
        IsCancellationRequest,
        CancellationReason,
        RequiresApproval,
        ApprovalStatus,
        ApprovedBy,
        ApprovedAt,
        CreatedAt,
    }
}

mod m20250801_000007_seed_default_admin {
    use sea_orm_migration::prelude::*;

    use super::m20250801_000003_create_parties::Admins;

    const DEFAULT_ADMIN_NAME: &str = "admin";
    const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250801_000007_seed_default_admin"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let insert = Query::insert()
                .into_table(Admins::Table)
                .columns([Admins::Name, Admins::Email, Admins::CreatedAt])
                .values_panic([
                    DEFAULT_ADMIN_NAME.into(),
                    DEFAULT_ADMIN_EMAIL.into(),
                    Expr::current_timestamp().into(),
                ])
                .to_owned();

            manager.exec_stmt(insert).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let delete = Query::delete()
                .from_table(Admins::Table)
                .and_where(Expr::col(Admins::Email).eq(DEFAULT_ADMIN_EMAIL))
                .to_owned();

            manager.exec_stmt(delete).await
        }
    }
}
