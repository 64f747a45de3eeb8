use sea_orm_migration::prelude::*;

#[derive(DeriveIden, Clone, Copy)]
enum Feedback {
    Table,
    Id,
    Name,
    Department,
    WorkEnvironment,
    Management,
    WorkLifeBalance,
    DevelopmentPotential,
    Overall,
    CreatedAt,
}

fn rating_col(col: Feedback) -> ColumnDef {
    let mut def = ColumnDef::new(col);
    def.small_integer()
        .not_null()
        .check(Expr::col(col).between(1, 5));
    def
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Feedback::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Feedback::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Feedback::Name).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Feedback::Department)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(&mut rating_col(Feedback::WorkEnvironment))
                    .col(&mut rating_col(Feedback::Management))
                    .col(&mut rating_col(Feedback::WorkLifeBalance))
                    .col(&mut rating_col(Feedback::DevelopmentPotential))
                    .col(&mut rating_col(Feedback::Overall))
                    .col(
                        ColumnDef::new(Feedback::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .to_owned(),
            )
            .await?;

        // One submission per person.
        manager
            .create_index(
                Index::create()
                    .name("idx_feedback_name")
                    .table(Feedback::Table)
                    .col(Feedback::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Feedback::Table).to_owned())
            .await?;
        Ok(())
    }
}
