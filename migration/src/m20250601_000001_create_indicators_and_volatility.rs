use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per scheduled release
        manager
            .create_table(
                Table::create()
                    .table(EconomicIndicators::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EconomicIndicators::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(EconomicIndicators::ReleasedAt).timestamp().not_null())
                    .col(ColumnDef::new(EconomicIndicators::Country).string_len(16).not_null())
                    .col(ColumnDef::new(EconomicIndicators::Name).string_len(255).not_null())
                    .col(ColumnDef::new(EconomicIndicators::Actual).double().null())
                    .col(ColumnDef::new(EconomicIndicators::Forecast).double().null())
                    .col(ColumnDef::new(EconomicIndicators::Previous).double().null())
                    .col(ColumnDef::new(EconomicIndicators::Impact).string_len(10).not_null()) // "HIGH", "MEDIUM", "LOW"
                    .col(ColumnDef::new(EconomicIndicators::Source).string_len(255).null())
                    .col(ColumnDef::new(EconomicIndicators::Unit).string_len(32).null())
                    .col(ColumnDef::new(EconomicIndicators::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(EconomicIndicators::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_indicators_country_released")
                    .table(EconomicIndicators::Table)
                    .col(EconomicIndicators::Country)
                    .col(EconomicIndicators::ReleasedAt)
                    .to_owned(),
            )
            .await?;

        // Price range measured around each release
        manager
            .create_table(
                Table::create()
                    .table(VolatilityData::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VolatilityData::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(VolatilityData::IndicatorId).big_integer().not_null())
                    .col(ColumnDef::new(VolatilityData::Timeframe).string_len(16).not_null()) // "15m", "1h", ...
                    .col(ColumnDef::new(VolatilityData::PeriodStart).timestamp().not_null())
                    .col(ColumnDef::new(VolatilityData::PeriodEnd).timestamp().not_null())
                    .col(ColumnDef::new(VolatilityData::HighPrice).double().not_null())
                    .col(ColumnDef::new(VolatilityData::LowPrice).double().not_null())
                    .col(ColumnDef::new(VolatilityData::Volatility).double().not_null())
                    .col(ColumnDef::new(VolatilityData::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(VolatilityData::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_volatility_indicator")
                            .from(VolatilityData::Table, VolatilityData::IndicatorId)
                            .to(EconomicIndicators::Table, EconomicIndicators::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_volatility_indicator")
                    .table(VolatilityData::Table)
                    .col(VolatilityData::IndicatorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VolatilityData::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EconomicIndicators::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EconomicIndicators {
    Table,
    Id,
    ReleasedAt,
    Country,
    Name,
    Actual,
    Forecast,
    Previous,
    Impact,
    Source,
    Unit,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum VolatilityData {
    Table,
    Id,
    IndicatorId,
    Timeframe,
    PeriodStart,
    PeriodEnd,
    HighPrice,
    LowPrice,
    Volatility,
    CreatedAt,
    UpdatedAt,
}
