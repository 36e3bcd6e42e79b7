pub mod auth;
pub mod comments;
pub mod error;
pub mod images;
pub mod middleware;
pub mod notifications;
pub mod reactions;
pub mod users;

use axum::{
    Json, Router,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AppState;
use crate::middleware::require_auth;

/// Build the full HTTP surface. `cors` comes from the server config.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/images", get(images::list_images))
        .route("/api/images/{id}", get(images::get_image))
        .route("/api/comments/image/{image_id}", get(comments::list_comments))
        .route("/api/reactions/image/{image_id}", get(reactions::list_reactions))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/api/images", post(images::create_image))
        .route(
            "/api/images/{id}",
            put(images::update_image).delete(images::delete_image),
        )
        .route("/api/comments", post(comments::create_comment))
        .route("/api/comments/{id}", axum::routing::delete(comments::delete_comment))
        .route("/api/reactions", post(reactions::toggle_reaction))
        .route("/api/notifications", get(notifications::list_notifications))
        .route("/api/notifications/unread-count", get(notifications::unread_count))
        .route("/api/users/me", get(users::my_profile))
        .route("/api/users/me/nickname", put(users::update_nickname))
        .route("/api/users/me/images", get(users::my_images))
        .route("/api/users/images/{id}/mark-viewed", post(users::mark_viewed))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
