//! Adds the `category` column to both ledger tables.
//!
//! Earlier deployments ran without categories; existing rows get the fixed
//! placeholder so the column can stay NOT NULL.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const DEFAULT_CATEGORY: &str = "Прочее";

#[derive(Iden)]
enum Expenses {
    Table,
    Category,
}

#[derive(Iden)]
enum Incomes {
    Table,
    Category,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Expenses::Table)
                    .add_column(
                        ColumnDef::new(Expenses::Category)
                            .string()
                            .not_null()
                            .default(DEFAULT_CATEGORY),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Incomes::Table)
                    .add_column(
                        ColumnDef::new(Incomes::Category)
                            .string()
                            .not_null()
                            .default(DEFAULT_CATEGORY),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Expenses::Table)
                    .drop_column(Expenses::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Incomes::Table)
                    .drop_column(Incomes::Category)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
