//! Postgres persistence for thoughts. Every query is scoped by `user_id`.
//!
//! Mutations go through `modify`: lock the row, apply a pure edit to the
//! domain value, write the whole mutable column set back in one transaction.

use std::collections::BTreeSet;

use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::classifier::Classification;
use crate::models::thought::ThoughtRow;
use crate::thoughts::models::{
    set_shared, Platform, Potential, ShareDrafts, SharePosts, Thought, ThoughtPatch, TodoData,
};

pub struct NewThought {
    pub user_id: Uuid,
    pub text: String,
    pub tags: BTreeSet<String>,
    pub potential: Option<Potential>,
    pub is_spark: bool,
}

pub async fn create_thought(pool: &PgPool, new: NewThought) -> Result<Thought, sqlx::Error> {
    let NewThought {
        user_id,
        text,
        tags,
        potential,
        is_spark,
    } = new;
    let id = Uuid::new_v4();
    let tags: Vec<String> = tags.into_iter().collect();
    let todo_data = (potential == Some(Potential::Todo)).then(|| Json(TodoData::default()));

    let row: ThoughtRow = sqlx::query_as(
        r#"
        INSERT INTO thoughts
            (id, user_id, original_text, tags, is_spark, is_parked, potential, todo_data,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(text.trim())
    .bind(tags.as_slice())
    .bind(is_spark)
    .bind(potential.map(|p| p.as_str()))
    .bind(todo_data)
    .fetch_one(pool)
    .await?;

    info!("Captured thought {id} for user {user_id}");
    Ok(row.into())
}

pub async fn get_thought(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<Thought>, sqlx::Error> {
    let row: Option<ThoughtRow> =
        sqlx::query_as("SELECT * FROM thoughts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(Thought::from))
}

/// The user's complete corpus, newest first. Never paginated: repetition
/// scoring needs every thought.
pub async fn list_thoughts(pool: &PgPool, user_id: Uuid) -> Result<Vec<Thought>, sqlx::Error> {
    let rows: Vec<ThoughtRow> =
        sqlx::query_as("SELECT * FROM thoughts WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(Thought::from).collect())
}

pub async fn update_thought(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    patch: ThoughtPatch,
) -> Result<Option<Thought>, sqlx::Error> {
    modify(pool, user_id, id, |t| patch.apply(t)).await
}

pub async fn set_parked(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    is_parked: bool,
) -> Result<Option<Thought>, sqlx::Error> {
    modify(pool, user_id, id, |t| t.is_parked = is_parked).await
}

pub async fn mark_shared(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    platform: Platform,
    shared: bool,
) -> Result<Option<Thought>, sqlx::Error> {
    modify(pool, user_id, id, |t| set_shared(t, platform, shared)).await
}

pub async fn apply_classification(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    classification: &Classification,
) -> Result<Option<Thought>, sqlx::Error> {
    modify(pool, user_id, id, |t| classification.apply_to(t)).await
}

pub async fn save_share_drafts(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    drafts: &ShareDrafts,
) -> Result<Option<Thought>, sqlx::Error> {
    modify(pool, user_id, id, |t| {
        t.share_posts.get_or_insert_with(SharePosts::default).drafts = Some(drafts.clone());
    })
    .await
}

/// Persists freshly computed scores. Returns the number of rows written.
pub async fn cache_scores(
    pool: &PgPool,
    user_id: Uuid,
    scores: &[(Uuid, u8)],
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut written = 0;
    for (id, score) in scores {
        written += sqlx::query(
            "UPDATE thoughts SET powerful_score = $1 WHERE id = $2 AND user_id = $3",
        )
        .bind(i32::from(*score))
        .bind(*id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }
    tx.commit().await?;

    info!("Cached {written} powerful scores for user {user_id}");
    Ok(written)
}

pub async fn delete_thought(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM thoughts WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    let deleted = result.rows_affected() > 0;
    if deleted {
        info!("Deleted thought {id} for user {user_id}");
    }
    Ok(deleted)
}

async fn modify<F>(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    edit: F,
) -> Result<Option<Thought>, sqlx::Error>
where
    F: FnOnce(&mut Thought),
{
    let mut tx = pool.begin().await?;

    let row: Option<ThoughtRow> =
        sqlx::query_as("SELECT * FROM thoughts WHERE id = $1 AND user_id = $2 FOR UPDATE")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(row) = row else {
        return Ok(None);
    };

    let mut thought = Thought::from(row);
    edit(&mut thought);
    let tags: Vec<String> = thought.tags.iter().cloned().collect();

    let row: ThoughtRow = sqlx::query_as(
        r#"
        UPDATE thoughts SET
            original_text = $3, summary = $4, tags = $5, is_spark = $6, is_parked = $7,
            potential = $8, best_potential = $9, share_posts = $10, todo_data = $11,
            is_powerful = $12, powerful_score = $13, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&thought.original_text)
    .bind(thought.summary.as_deref())
    .bind(tags.as_slice())
    .bind(thought.is_spark)
    .bind(thought.is_parked)
    .bind(thought.potential.map(|p| p.as_str()))
    .bind(thought.best_potential.map(|p| p.as_str()))
    .bind(thought.share_posts.clone().map(Json))
    .bind(thought.todo_data.clone().map(Json))
    .bind(thought.is_powerful)
    .bind(thought.powerful_score.map(i32::from))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    info!("Updated thought {id} for user {user_id}");
    Ok(Some(row.into()))
}
