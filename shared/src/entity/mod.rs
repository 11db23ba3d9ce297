//! `SeaORM` entities for the canonical schema

pub mod economic_indicators;
pub mod user_settings;
pub mod users;
pub mod volatility_data;
