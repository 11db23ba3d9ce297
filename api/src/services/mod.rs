pub mod indicator_service;
pub mod statistics_service;
pub mod user_service;
pub mod volatility_service;

pub use indicator_service::IndicatorService;
pub use statistics_service::StatisticsService;
pub use user_service::UserService;
pub use volatility_service::VolatilityService;
