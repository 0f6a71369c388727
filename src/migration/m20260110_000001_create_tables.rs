// SPDX-License-Identifier: MIT

//! Baseline schema: users, teams, arenas, visits, images.
//!
//! Written with the schema builder so the same migration runs on SQLite
//! (local/tests) and PostgreSQL (production).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Arenas::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Arenas::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Arenas::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Arenas::City).string_len(100))
                    .col(ColumnDef::new(Arenas::Capacity).integer())
                    .col(
                        ColumnDef::new(Arenas::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teams::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Teams::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Teams::Abbreviation)
                            .string_len(3)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Teams::City).string_len(100))
                    .col(ColumnDef::new(Teams::ArenaId).uuid())
                    .col(
                        ColumnDef::new(Teams::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-teams-arena_id")
                            .from(Teams::Table, Teams::ArenaId)
                            .to(Arenas::Table, Arenas::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::FirebaseUid)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Users::DisplayName).string_len(255))
                    .col(ColumnDef::new(Users::AvatarUrl).string_len(500))
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Visits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Visits::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Visits::UserId).uuid().not_null())
                    .col(ColumnDef::new(Visits::ArenaId).uuid().not_null())
                    .col(ColumnDef::new(Visits::HomeTeamId).uuid().not_null())
                    .col(ColumnDef::new(Visits::AwayTeamId).uuid().not_null())
                    .col(ColumnDef::new(Visits::VisitDate).date().not_null())
                    .col(ColumnDef::new(Visits::SeatingLocation).string_len(100))
                    .col(
                        ColumnDef::new(Visits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Visits::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-visits-user_id")
                            .from(Visits::Table, Visits::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-visits-arena_id")
                            .from(Visits::Table, Visits::ArenaId)
                            .to(Arenas::Table, Arenas::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-visits-home_team_id")
                            .from(Visits::Table, Visits::HomeTeamId)
                            .to(Teams::Table, Teams::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-visits-away_team_id")
                            .from(Visits::Table, Visits::AwayTeamId)
                            .to(Teams::Table, Teams::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Images::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Images::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Images::VisitId).uuid().not_null())
                    .col(
                        ColumnDef::new(Images::StorageUrl)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Images::FileSize).big_integer())
                    .col(ColumnDef::new(Images::MimeType).string_len(50))
                    .col(
                        ColumnDef::new(Images::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-images-visit_id")
                            .from(Images::Table, Images::VisitId)
                            .to(Visits::Table, Visits::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-visits-user_id")
                    .table(Visits::Table)
                    .col(Visits::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-visits-arena_id")
                    .table(Visits::Table)
                    .col(Visits::ArenaId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-images-visit_id")
                    .table(Images::Table)
                    .col(Images::VisitId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Images::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Visits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Arenas::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FirebaseUid,
    Email,
    DisplayName,
    AvatarUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
    Name,
    Abbreviation,
    City,
    ArenaId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Arenas {
    Table,
    Id,
    Name,
    City,
    Capacity,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Visits {
    Table,
    Id,
    UserId,
    ArenaId,
    HomeTeamId,
    AwayTeamId,
    VisitDate,
    SeatingLocation,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Images {
    Table,
    Id,
    VisitId,
    StorageUrl,
    FileSize,
    MimeType,
    UploadedAt,
}
