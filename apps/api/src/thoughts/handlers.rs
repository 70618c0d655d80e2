//! Axum route handlers for the Thoughts API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::classifier::Classification;
use crate::errors::AppError;
use crate::state::AppState;
use crate::thoughts::models::{
    normalize_tags, Platform, Potential, ShareDrafts, Thought, ThoughtPatch,
};
use crate::thoughts::scoring::{RankedThought, ScoreBreakdown, ScoreEngine};
use crate::thoughts::store::{self, NewThought};
use crate::thoughts::views::{apply_view, View};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub user_id: Uuid,
    #[serde(default)]
    pub view: View,
}

#[derive(Serialize)]
pub struct ViewResponse {
    pub view: View,
    pub count: usize,
    pub thoughts: Vec<Thought>,
}

#[derive(Debug, Deserialize)]
pub struct CreateThoughtRequest {
    pub user_id: Uuid,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub potential: Option<Potential>,
    #[serde(default)]
    pub is_spark: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateThoughtRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub patch: ThoughtPatch,
}

#[derive(Deserialize)]
pub struct ParkRequest {
    pub user_id: Uuid,
    pub is_parked: bool,
}

#[derive(Deserialize)]
pub struct SharedRequest {
    pub user_id: Uuid,
    pub platform: Platform,
    pub shared: bool,
}

#[derive(Serialize)]
pub struct ScoreResponse {
    pub thought_id: Uuid,
    pub cached_score: Option<u8>,
    pub breakdown: ScoreBreakdown,
}

#[derive(Serialize)]
pub struct ClassifyResponse {
    pub classification: Classification,
    pub thought: Thought,
}

#[derive(Serialize)]
pub struct ShareDraftsResponse {
    pub drafts: ShareDrafts,
    pub thought: Thought,
}

#[derive(Deserialize)]
pub struct PowerfulQuery {
    pub user_id: Uuid,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ScoredThought {
    pub score: u8,
    pub thought: Thought,
}

impl From<RankedThought<'_>> for ScoredThought {
    fn from(ranked: RankedThought<'_>) -> Self {
        Self {
            score: ranked.score,
            thought: ranked.thought.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct PowerfulResponse {
    pub thoughts: Vec<ScoredThought>,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub scored: usize,
    pub updated: u64,
}

/// Ranks a client-supplied corpus without touching the store.
#[derive(Deserialize)]
pub struct RankRequest {
    pub thoughts: Vec<Thought>,
    pub limit: Option<usize>,
    /// Pins "now" for reproducible recency; defaults to the server clock.
    pub now: Option<DateTime<Utc>>,
}

fn resolve_limit(limit: Option<usize>, default: usize) -> Result<usize, AppError> {
    match limit {
        Some(0) => Err(AppError::Validation("limit must be at least 1".to_string())),
        Some(n) => Ok(n),
        None => Ok(default),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Thought CRUD
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/thoughts
pub async fn handle_list_thoughts(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ViewResponse>, AppError> {
    let all = store::list_thoughts(&state.db, params.user_id).await?;
    let thoughts = apply_view(params.view, &all, &ScoreEngine::new());
    Ok(Json(ViewResponse {
        view: params.view,
        count: thoughts.len(),
        thoughts,
    }))
}

/// POST /api/v1/thoughts
///
/// Captures a thought. When a classifier is configured, classification runs in
/// the background and lands on the record once the model answers.
pub async fn handle_create_thought(
    State(state): State<AppState>,
    Json(req): Json<CreateThoughtRequest>,
) -> Result<(StatusCode, Json<Thought>), AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let thought = store::create_thought(
        &state.db,
        NewThought {
            user_id: req.user_id,
            text: req.text,
            tags: normalize_tags(&req.tags),
            potential: req.potential,
            is_spark: req.is_spark,
        },
    )
    .await?;

    spawn_classification(&state, &thought);
    Ok((StatusCode::CREATED, Json(thought)))
}

fn spawn_classification(state: &AppState, thought: &Thought) {
    let Some(classifier) = state.classifier.clone() else {
        return;
    };
    let db = state.db.clone();
    let (user_id, id, text) = (thought.user_id, thought.id, thought.original_text.clone());

    tokio::spawn(async move {
        let result = async {
            let classification = classifier.classify(&text).await?;
            store::apply_classification(&db, user_id, id, &classification).await?;
            Ok::<_, AppError>(())
        }
        .await;
        match result {
            Ok(()) => info!("Background classification of thought {id} applied"),
            Err(e) => warn!("Background classification of thought {id} failed: {e}"),
        }
    });
}

/// GET /api/v1/thoughts/:id
pub async fn handle_get_thought(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Thought>, AppError> {
    let thought = store::get_thought(&state.db, params.user_id, id)
        .await?
        .ok_or_else(|| AppError::thought_not_found(id))?;
    Ok(Json(thought))
}

/// PATCH /api/v1/thoughts/:id
pub async fn handle_update_thought(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateThoughtRequest>,
) -> Result<Json<Thought>, AppError> {
    if req.patch.text.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    let thought = store::update_thought(&state.db, req.user_id, id, req.patch)
        .await?
        .ok_or_else(|| AppError::thought_not_found(id))?;
    Ok(Json(thought))
}

/// DELETE /api/v1/thoughts/:id
pub async fn handle_delete_thought(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    if store::delete_thought(&state.db, params.user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::thought_not_found(id))
    }
}

/// PATCH /api/v1/thoughts/:id/park
pub async fn handle_set_parked(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ParkRequest>,
) -> Result<Json<Thought>, AppError> {
    let thought = store::set_parked(&state.db, req.user_id, id, req.is_parked)
        .await?
        .ok_or_else(|| AppError::thought_not_found(id))?;
    Ok(Json(thought))
}

/// PATCH /api/v1/thoughts/:id/shared
pub async fn handle_mark_shared(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SharedRequest>,
) -> Result<Json<Thought>, AppError> {
    let thought = store::mark_shared(&state.db, req.user_id, id, req.platform, req.shared)
        .await?
        .ok_or_else(|| AppError::thought_not_found(id))?;
    Ok(Json(thought))
}

// ────────────────────────────────────────────────────────────────────────────
// AI
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/thoughts/:id/classify
pub async fn handle_classify(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UserIdQuery>,
) -> Result<Json<ClassifyResponse>, AppError> {
    let classifier = state.classifier()?;
    let thought = store::get_thought(&state.db, req.user_id, id)
        .await?
        .ok_or_else(|| AppError::thought_not_found(id))?;

    let classification = classifier.classify(&thought.original_text).await?;
    let thought = store::apply_classification(&state.db, req.user_id, id, &classification)
        .await?
        .ok_or_else(|| AppError::thought_not_found(id))?;

    Ok(Json(ClassifyResponse {
        classification,
        thought,
    }))
}

/// POST /api/v1/thoughts/:id/share-drafts
pub async fn handle_share_drafts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UserIdQuery>,
) -> Result<Json<ShareDraftsResponse>, AppError> {
    let classifier = state.classifier()?;
    let thought = store::get_thought(&state.db, req.user_id, id)
        .await?
        .ok_or_else(|| AppError::thought_not_found(id))?;

    let drafts = classifier.draft_share_posts(&thought.original_text).await?;
    let thought = store::save_share_drafts(&state.db, req.user_id, id, &drafts)
        .await?
        .ok_or_else(|| AppError::thought_not_found(id))?;

    Ok(Json(ShareDraftsResponse { drafts, thought }))
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/thoughts/:id/score
///
/// Always recomputes; `cached_score` shows what the store currently holds.
pub async fn handle_score_thought(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ScoreResponse>, AppError> {
    let all = store::list_thoughts(&state.db, params.user_id).await?;
    let thought = all
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| AppError::thought_not_found(id))?;

    Ok(Json(ScoreResponse {
        thought_id: id,
        cached_score: thought.powerful_score,
        breakdown: ScoreEngine::new().score_breakdown(thought, &all),
    }))
}

/// GET /api/v1/powerful
pub async fn handle_powerful(
    State(state): State<AppState>,
    Query(params): Query<PowerfulQuery>,
) -> Result<Json<PowerfulResponse>, AppError> {
    let limit = resolve_limit(params.limit, state.config.powerful_limit)?;
    let all = store::list_thoughts(&state.db, params.user_id).await?;
    let thoughts = ScoreEngine::new()
        .rank_powerful_thoughts(&all, limit)
        .into_iter()
        .map(ScoredThought::from)
        .collect();
    Ok(Json(PowerfulResponse { thoughts }))
}

/// POST /api/v1/scores/refresh
///
/// Recomputes every score against the current corpus and caches the results.
pub async fn handle_refresh_scores(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let all = store::list_thoughts(&state.db, req.user_id).await?;
    let engine = ScoreEngine::new();
    let scores: Vec<(Uuid, u8)> = all
        .iter()
        .map(|t| (t.id, engine.compute_score(t, &all)))
        .collect();

    let updated = store::cache_scores(&state.db, req.user_id, &scores).await?;
    Ok(Json(RefreshResponse {
        scored: scores.len(),
        updated,
    }))
}

/// POST /api/v1/scores/rank
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(req): Json<RankRequest>,
) -> Result<Json<PowerfulResponse>, AppError> {
    let limit = resolve_limit(req.limit, state.config.powerful_limit)?;
    let engine = req.now.map(ScoreEngine::at).unwrap_or_default();
    let thoughts = engine
        .rank_powerful_thoughts(&req.thoughts, limit)
        .into_iter()
        .map(ScoredThought::from)
        .collect();
    Ok(Json(PowerfulResponse { thoughts }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_limit() {
        assert_eq!(resolve_limit(None, 3).unwrap(), 3);
        assert_eq!(resolve_limit(Some(7), 3).unwrap(), 7);
        assert!(matches!(
            resolve_limit(Some(0), 3),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_update_request_flattens_patch() {
        let req: UpdateThoughtRequest = serde_json::from_value(serde_json::json!({
            "user_id": Uuid::nil(),
            "text": "edited",
            "is_powerful": true
        }))
        .unwrap();
        assert_eq!(req.patch.text.as_deref(), Some("edited"));
        assert_eq!(req.patch.is_powerful, Some(true));
        assert!(req.patch.tags.is_none());
    }
}
