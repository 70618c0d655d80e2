pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::state::AppState;
use crate::thoughts::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Thoughts
        .route(
            "/api/v1/thoughts",
            get(handlers::handle_list_thoughts).post(handlers::handle_create_thought),
        )
        .route(
            "/api/v1/thoughts/:id",
            get(handlers::handle_get_thought)
                .patch(handlers::handle_update_thought)
                .delete(handlers::handle_delete_thought),
        )
        .route(
            "/api/v1/thoughts/:id/park",
            patch(handlers::handle_set_parked),
        )
        .route(
            "/api/v1/thoughts/:id/shared",
            patch(handlers::handle_mark_shared),
        )
        .route(
            "/api/v1/thoughts/:id/score",
            get(handlers::handle_score_thought),
        )
        // AI
        .route(
            "/api/v1/thoughts/:id/classify",
            post(handlers::handle_classify),
        )
        .route(
            "/api/v1/thoughts/:id/share-drafts",
            post(handlers::handle_share_drafts),
        )
        // Ranking
        .route("/api/v1/powerful", get(handlers::handle_powerful))
        .route("/api/v1/scores/refresh", post(handlers::handle_refresh_scores))
        .route("/api/v1/scores/rank", post(handlers::handle_rank))
        .with_state(state)
}
