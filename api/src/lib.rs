pub mod dto;
pub mod error;
pub mod handlers;
pub mod repositories;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
