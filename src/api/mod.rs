//! HTTP layer: routing, middleware, and page handlers

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod middleware;
pub mod pages;

pub use middleware::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/gallery", get(pages::gallery))
        .route("/admin", get(pages::admin_dashboard))
        .route("/admin/login", get(pages::login_page).post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .route("/admin/items", post(admin::create_item))
        .route("/admin/items/{id}/delete", post(admin::delete_item))
        .route("/admin/categories", post(admin::create_category))
        .route("/admin/categories/{id}/delete", post(admin::delete_category))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
