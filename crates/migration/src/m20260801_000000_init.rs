//! Initial schema migration - creates all tables from scratch.
//!
//! - `users_postpaid`: member accounts settled after consumption
//! - `users_prepaid`: pre-funded guest accounts owned by a member
//! - `retired_keys`: point-of-sale keys of deleted prepaid accounts
//! - `drink_types`: the drink catalog with stock and consumption counters

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum UsersPostpaid {
    Table,
    Id,
    Username,
    Money,
    Activated,
    LastDrink,
}

#[derive(Iden)]
enum UsersPrepaid {
    Table,
    Id,
    Username,
    UserKey,
    PostpaidUserId,
    Money,
    Activated,
    LastDrink,
}

#[derive(Iden)]
enum RetiredKeys {
    Table,
    UserKey,
}

#[derive(Iden)]
enum DrinkTypes {
    Table,
    Id,
    Name,
    Icon,
    Quantity,
    Consumed,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Postpaid accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UsersPostpaid::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsersPostpaid::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsersPostpaid::Username).string().not_null())
                    .col(
                        ColumnDef::new(UsersPostpaid::Money)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsersPostpaid::Activated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(UsersPostpaid::LastDrink).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users_postpaid-username-unique")
                    .table(UsersPostpaid::Table)
                    .col(UsersPostpaid::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Prepaid accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UsersPrepaid::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsersPrepaid::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsersPrepaid::Username).string().not_null())
                    .col(ColumnDef::new(UsersPrepaid::UserKey).string().not_null())
                    .col(
                        ColumnDef::new(UsersPrepaid::PostpaidUserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UsersPrepaid::Money)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsersPrepaid::Activated)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(UsersPrepaid::LastDrink).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-users_prepaid-postpaid_user_id")
                            .from(UsersPrepaid::Table, UsersPrepaid::PostpaidUserId)
                            .to(UsersPostpaid::Table, UsersPostpaid::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users_prepaid-username-unique")
                    .table(UsersPrepaid::Table)
                    .col(UsersPrepaid::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users_prepaid-user_key-unique")
                    .table(UsersPrepaid::Table)
                    .col(UsersPrepaid::UserKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users_prepaid-postpaid_user_id")
                    .table(UsersPrepaid::Table)
                    .col(UsersPrepaid::PostpaidUserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Retired keys
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(RetiredKeys::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RetiredKeys::UserKey)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Drink catalog
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(DrinkTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DrinkTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DrinkTypes::Name).string().not_null())
                    .col(ColumnDef::new(DrinkTypes::Icon).string().not_null())
                    .col(
                        ColumnDef::new(DrinkTypes::Quantity)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DrinkTypes::Consumed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-drink_types-name-unique")
                    .table(DrinkTypes::Table)
                    .col(DrinkTypes::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(DrinkTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RetiredKeys::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UsersPrepaid::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UsersPostpaid::Table).to_owned())
            .await?;
        Ok(())
    }
}
