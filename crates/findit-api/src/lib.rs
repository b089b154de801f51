pub mod auth;
pub mod categories;
pub mod config;
pub mod error;
pub mod items;
pub mod middleware;
pub mod pages;
pub mod session;
pub mod state;
pub mod uploads;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use config::AppConfig;
pub use error::ApiError;
pub use state::AppState;

/// Room for the form fields next to a maximum-size photo.
const ITEM_FORM_LIMIT: usize = uploads::MAX_IMAGE_SIZE + 64 * 1024;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route("/", get(auth::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout));

    let public_api = Router::new()
        .route("/api/items", get(items::list_items))
        .route("/api/categories", get(categories::list_categories));

    let protected_api = Router::new()
        .route("/api/items", post(items::create_item))
        .route("/api/items/{id}/resolve", post(items::resolve_item))
        .layer(DefaultBodyLimit::max(ITEM_FORM_LIMIT))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_session));

    let static_files = Router::new()
        .route("/static/uploads/{filename}", get(uploads::serve_upload))
        .nest_service("/static", ServeDir::new(&state.config.static_dir));

    Router::new()
        .merge(page_routes)
        .merge(public_api)
        .merge(protected_api)
        .merge(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
