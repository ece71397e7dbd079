//! Seeds the drink catalog with the club room's standard assortment.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum DrinkTypes {
    Table,
    Name,
    Icon,
}

const SEED: &[(&str, &str)] = &[
    ("Sonstiges", "sonstiges.png"),
    ("Paulaner Spezi", "paulaner_spezi.png"),
    ("Paulaner Limo Orange", "paulaner_limo_orange.png"),
    ("Paulaner Limo Zitrone", "paulaner_limo_zitrone.png"),
    ("Mio Mate Original", "mio_mate_original.png"),
    ("Mio Mate Ginger", "mio_mate_ginger.png"),
    ("Mio Mate Pomegranate", "mio_mate_pomegranate.png"),
    ("Club Mate", "club_mate.png"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, icon) in SEED {
            let insert = Query::insert()
                .into_table(DrinkTypes::Table)
                .columns([DrinkTypes::Name, DrinkTypes::Icon])
                .values_panic([(*name).into(), (*icon).into()])
                .to_owned();
            manager.exec_stmt(insert).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, _) in SEED {
            let delete = Query::delete()
                .from_table(DrinkTypes::Table)
                .and_where(Expr::col(DrinkTypes::Name).eq(*name))
                .to_owned();
            manager.exec_stmt(delete).await?;
        }
        Ok(())
    }
}
