use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{self, indicators, statistics, users, volatilities};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/indicators",
            get(indicators::list_indicators).post(indicators::create_indicator),
        )
        .route(
            "/indicators/:id",
            get(indicators::get_indicator)
                .put(indicators::update_indicator)
                .delete(indicators::delete_indicator),
        )
        .route("/volatilities", post(volatilities::create_volatility))
        .route(
            "/volatilities/:id",
            get(volatilities::get_volatility)
                .put(volatilities::update_volatility)
                .delete(volatilities::delete_volatility),
        )
        .route(
            "/volatilities/indicator/:id",
            get(volatilities::list_for_indicator),
        )
        .route("/statistics/indicators", get(statistics::volatility_ranking))
        .route(
            "/statistics/indicator/:id",
            get(statistics::indicator_statistics),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/users/:id/settings",
            get(users::get_settings).put(users::replace_settings),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
