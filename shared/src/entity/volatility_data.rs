//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "volatility_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub indicator_id: i64,
    pub timeframe: String, // "15m", "1h", etc.
    pub period_start: DateTimeUtc,
    pub period_end: DateTimeUtc,
    #[sea_orm(column_type = "Double")]
    pub high_price: f64,
    #[sea_orm(column_type = "Double")]
    pub low_price: f64,
    #[sea_orm(column_type = "Double")]
    pub volatility: f64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::economic_indicators::Entity",
        from = "Column::IndicatorId",
        to = "super::economic_indicators::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    EconomicIndicators,
}

impl Related<super::economic_indicators::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EconomicIndicators.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
