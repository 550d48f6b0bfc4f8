//! Initial schema for Tally.
//!
//! - `friend_requests`: directed friend-request edges, one row per ordered pair
//! - `deals`: expense headers
//! - `spendings`: one signed share per party of a deal

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum FriendRequests {
    Table,
    Sender,
    Target,
}

#[derive(Iden)]
enum Deals {
    Table,
    Id,
    Timestamp,
    Details,
    Cost,
    Currency,
}

#[derive(Iden)]
enum Spendings {
    Table,
    Id,
    DealId,
    Cost,
    Counterparty,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Friend requests
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(FriendRequests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FriendRequests::Sender).string().not_null())
                    .col(ColumnDef::new(FriendRequests::Target).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(FriendRequests::Sender)
                            .col(FriendRequests::Target),
                    )
                    .to_owned(),
            )
            .await?;

        // Reverse lookups ("who asked me") scan by target.
        manager
            .create_index(
                Index::create()
                    .name("idx-friend_requests-target")
                    .table(FriendRequests::Table)
                    .col(FriendRequests::Target)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Deals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Deals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Deals::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Deals::Timestamp).big_integer().not_null())
                    .col(ColumnDef::new(Deals::Details).string().not_null())
                    .col(ColumnDef::new(Deals::Cost).big_integer().not_null())
                    .col(ColumnDef::new(Deals::Currency).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Spendings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Spendings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Spendings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Spendings::DealId).string().not_null())
                    .col(ColumnDef::new(Spendings::Cost).big_integer().not_null())
                    .col(ColumnDef::new(Spendings::Counterparty).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-spendings-deal_id")
                            .from(Spendings::Table, Spendings::DealId)
                            .to(Deals::Table, Deals::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-spendings-deal_id")
                    .table(Spendings::Table)
                    .col(Spendings::DealId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-spendings-counterparty")
                    .table(Spendings::Table)
                    .col(Spendings::Counterparty)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Spendings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FriendRequests::Table).to_owned())
            .await?;
        Ok(())
    }
}
