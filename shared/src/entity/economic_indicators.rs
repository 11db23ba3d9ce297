//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "economic_indicators")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub released_at: DateTimeUtc,
    pub country: String,
    pub name: String,
    #[sea_orm(column_type = "Double", nullable)]
    pub actual: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub forecast: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub previous: Option<f64>,
    pub impact: String, // "HIGH", "MEDIUM", "LOW"
    #[sea_orm(nullable)]
    pub source: Option<String>,
    #[sea_orm(nullable)]
    pub unit: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::volatility_data::Entity")]
    VolatilityData,
}

impl Related<super::volatility_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VolatilityData.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
