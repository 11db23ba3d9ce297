pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod mapping;
pub mod models;
pub mod password;
pub mod statistics;

pub use config::{Config, LogFormat, StatisticsSettings};
pub use database::get_db_connection;
pub use error::{MappingError, StatisticsError};
pub use models::*;
