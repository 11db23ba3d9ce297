pub mod indicator_repository;
pub mod user_repository;
pub mod volatility_repository;

pub use indicator_repository::IndicatorRepository;
pub use user_repository::UserRepository;
pub use volatility_repository::VolatilityRepository;
