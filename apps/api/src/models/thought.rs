use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

use crate::thoughts::models::{Potential, SharePosts, Thought, TodoData};
use crate::thoughts::scoring::MAX_SCORE;

/// Row shape of the `thoughts` table.
#[derive(Debug, Clone, FromRow)]
pub struct ThoughtRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_text: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub is_spark: bool,
    pub is_parked: bool,
    pub potential: Option<String>,
    pub best_potential: Option<String>,
    pub share_posts: Option<Json<SharePosts>>,
    pub todo_data: Option<Json<TodoData>>,
    pub is_powerful: Option<bool>,
    pub powerful_score: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ThoughtRow> for Thought {
    fn from(row: ThoughtRow) -> Self {
        let id = row.id;
        Thought {
            id,
            user_id: row.user_id,
            original_text: row.original_text,
            summary: row.summary,
            tags: row.tags.into_iter().collect(),
            created_at: row.created_at,
            updated_at: Some(row.updated_at),
            is_spark: row.is_spark,
            is_parked: row.is_parked,
            potential: parse_potential(id, row.potential.as_deref()),
            best_potential: parse_potential(id, row.best_potential.as_deref()),
            share_posts: row.share_posts.map(|Json(p)| p),
            todo_data: row.todo_data.map(|Json(t)| t),
            is_powerful: row.is_powerful,
            powerful_score: row
                .powerful_score
                .map(|s| s.clamp(0, MAX_SCORE as i32) as u8),
        }
    }
}

/// Unrecognised stored labels are dropped rather than failing the whole read.
fn parse_potential(id: Uuid, raw: Option<&str>) -> Option<Potential> {
    let raw = raw?;
    match raw.parse() {
        Ok(p) => Some(p),
        Err(e) => {
            warn!("Thought {id}: ignoring stored potential: {e}");
            None
        }
    }
}
