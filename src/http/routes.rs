use axum::{routing::get, routing::post, routing::put, Router};

use crate::AppState;
use crate::http::handlers;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn tips() -> Router<AppState> {
    Router::new()
        .route(
            "/api/tips",
            post(handlers::create_tip).get(handlers::list_tips),
        )
        .route("/api/tips/my", get(handlers::list_my_tips))
        .route("/api/tips/search", get(handlers::search_tips))
        .route("/api/tips/category", get(handlers::list_tips_by_category))
        .route("/api/tips/featured", get(handlers::list_featured_tips))
        .route("/api/tips/tip-of-the-day", get(handlers::tip_of_the_day))
        .route(
            "/api/tips/:id",
            put(handlers::update_tip).delete(handlers::delete_tip),
        )
        .route("/api/tips/:id/rate", put(handlers::rate_tip))
        .route("/api/tips/:id/user-rating", get(handlers::get_user_rating))
        .route("/api/tips/:id/featured", put(handlers::set_tip_featured))
        .route(
            "/api/tips/:id/comments",
            post(handlers::add_comment).get(handlers::list_comments),
        )
        .route(
            "/api/tips/:id/comments/:comment_id",
            put(handlers::update_comment).delete(handlers::delete_comment),
        )
}
