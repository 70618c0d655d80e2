//! Powerful score: a bounded 0–100 heuristic that ranks thoughts by recency,
//! repetition, emotional language, engagement and the spark flag.
//!
//! The engine is pure. It reads a thought and its corpus, never the store, and
//! takes "now" at construction so a score is reproducible for a fixed instant.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::thoughts::models::{Potential, Thought};
use crate::thoughts::similarity::count_similar;

pub const MAX_SCORE: u8 = 100;
pub const DEFAULT_POWERFUL_COUNT: usize = 3;

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const SPARK_POINTS: u32 = 10;
const SHARE_PLATFORM_POINTS: u32 = 7;
const SHARE_PLATFORM_CAP: u32 = 15;
const ENGAGEMENT_CAP: u32 = 20;

/// Matched as case-insensitive substrings, so "needed" counts for "need".
const EMOTIONAL_LEXICON: &[&str] = &[
    "love",
    "amazing",
    "incredible",
    "fantastic",
    "brilliant",
    "excellent",
    "wonderful",
    "perfect",
    "hate",
    "terrible",
    "awful",
    "horrible",
    "disaster",
    "crisis",
    "urgent",
    "critical",
    "very",
    "extremely",
    "absolutely",
    "completely",
    "totally",
    "really",
    "truly",
    "must",
    "need",
    "essential",
    "crucial",
    "important",
    "vital",
    "key",
    "priority",
];

/// Per-component points plus the clamped total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub recency: u32,
    pub repetition: u32,
    pub emotion: u32,
    pub engagement: u32,
    pub spark: u32,
    pub total: u8,
}

/// A ranked thought with the score it was ranked by (cached or computed).
#[derive(Debug, Clone, Serialize)]
pub struct RankedThought<'a> {
    pub score: u8,
    pub thought: &'a Thought,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoreEngine {
    now: DateTime<Utc>,
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreEngine {
    /// Engine anchored at the current wall-clock instant.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn compute_score(&self, thought: &Thought, all: &[Thought]) -> u8 {
        self.score_breakdown(thought, all).total
    }

    pub fn score_breakdown(&self, thought: &Thought, all: &[Thought]) -> ScoreBreakdown {
        let recency = recency_points(days_between(thought.created_at, self.now));
        let repetition = repetition_points(count_similar(thought, all));
        let emotion = emotion_points(count_emotional_words(&thought.original_text));
        let engagement = engagement_points(thought);
        let spark = if thought.is_spark { SPARK_POINTS } else { 0 };

        let sum = recency + repetition + emotion + engagement + spark;
        let total = sum.min(MAX_SCORE as u32) as u8;

        debug!(
            "Scored thought {}: recency={recency} repetition={repetition} emotion={emotion} engagement={engagement} spark={spark} total={total}",
            thought.id
        );

        ScoreBreakdown {
            recency,
            repetition,
            emotion,
            engagement,
            spark,
            total,
        }
    }

    /// The cached score when present (trusted as-is), otherwise a fresh computation.
    pub fn resolve_score(&self, thought: &Thought, all: &[Thought]) -> u8 {
        match thought.powerful_score {
            Some(cached) => cached.min(MAX_SCORE),
            None => self.compute_score(thought, all),
        }
    }

    /// Top `max_count` unparked thoughts: pinned first, then score, then newest.
    /// The sort is stable, so exact ties keep their input order.
    pub fn rank_powerful_thoughts<'a>(
        &self,
        all: &'a [Thought],
        max_count: usize,
    ) -> Vec<RankedThought<'a>> {
        let mut ranked: Vec<RankedThought<'a>> = all
            .iter()
            .filter(|t| !t.is_parked)
            .map(|thought| RankedThought {
                score: self.resolve_score(thought, all),
                thought,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.thought
                .is_pinned()
                .cmp(&a.thought.is_pinned())
                .then_with(|| b.score.cmp(&a.score))
                .then_with(|| b.thought.created_at.cmp(&a.thought.created_at))
        });

        let candidates = ranked.len();
        ranked.truncate(max_count);
        debug!("Ranked {candidates} unparked thoughts, returning {}", ranked.len());
        ranked
    }
}

/// Fractional days from `created_at` to `now`. Negative for future timestamps.
fn days_between(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - created_at).num_milliseconds() as f64 / MILLIS_PER_DAY
}

fn recency_points(days: f64) -> u32 {
    if days <= 1.0 {
        30
    } else if days <= 7.0 {
        20
    } else if days <= 30.0 {
        10
    } else {
        5
    }
}

fn repetition_points(similar: usize) -> u32 {
    match similar {
        0 => 0,
        1 => 8,
        2 => 15,
        _ => 25,
    }
}

pub fn count_emotional_words(text: &str) -> usize {
    let lowered = text.to_lowercase();
    EMOTIONAL_LEXICON
        .iter()
        .filter(|word| lowered.contains(*word))
        .count()
}

fn emotion_points(matches: usize) -> u32 {
    match matches {
        0 => 0,
        1 | 2 => 8,
        3 | 4 => 15,
        _ => 25,
    }
}

/// Share and To-Do bonuses are checked independently of each other; the sum
/// is capped at 20.
fn engagement_points(thought: &Thought) -> u32 {
    let mut points = 0;

    if let Some(shared) = thought.shared_platforms() {
        points += (shared.count() as u32 * SHARE_PLATFORM_POINTS).min(SHARE_PLATFORM_CAP);
    }
    if thought.has_potential(Potential::Share) {
        points += 5;
    }
    if thought.has_potential(Potential::Todo) {
        points += if thought.is_todo_completed() { 10 } else { 5 };
    }

    points.min(ENGAGEMENT_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thoughts::models::{SharePosts, SharedPlatforms, TodoData};
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn thought_at(text: &str, age: Duration) -> Thought {
        Thought::new(Uuid::new_v4(), text, now() - age)
    }

    fn engine() -> ScoreEngine {
        ScoreEngine::at(now())
    }

    #[test]
    fn test_fresh_plain_thought_scores_recency_only() {
        let t = thought_at("groceries after work", Duration::zero());
        let all = vec![t.clone()];
        assert_eq!(engine().compute_score(&t, &all), 30);
    }

    #[test]
    fn test_recency_buckets() {
        assert_eq!(recency_points(0.5), 30);
        assert_eq!(recency_points(1.0), 30);
        assert_eq!(recency_points(1.01), 20);
        assert_eq!(recency_points(7.0), 20);
        assert_eq!(recency_points(29.9), 10);
        assert_eq!(recency_points(30.5), 5);
    }

    #[test]
    fn test_recency_uses_fractional_days() {
        let t = thought_at("x", Duration::hours(25));
        let b = engine().score_breakdown(&t, &[]);
        assert_eq!(b.recency, 20);
    }

    #[test]
    fn test_future_timestamp_falls_in_first_bucket() {
        let t = thought_at("x", Duration::days(-3));
        assert_eq!(engine().score_breakdown(&t, &[]).recency, 30);
    }

    #[test]
    fn test_scenario_emotional_spark() {
        let mut a = thought_at("I love this amazing incredible idea", Duration::zero());
        a.is_spark = true;
        let all = vec![a.clone()];
        let b = engine().score_breakdown(&a, &all);
        assert_eq!(b.emotion, 15);
        assert_eq!(b.repetition, 0);
        assert_eq!(b.total, 55);
    }

    #[test]
    fn test_scenario_completed_todo() {
        let mut b = thought_at("buy milk", Duration::days(40));
        b.potential = Some(Potential::Todo);
        b.todo_data = Some(TodoData {
            completed: true,
            due_date: None,
        });
        let all = vec![b.clone()];
        assert_eq!(engine().compute_score(&b, &all), 15);
    }

    #[test]
    fn test_repeated_text_adds_repetition_points() {
        let a = thought_at("refactor billing service before quarter", Duration::zero());
        let b = thought_at("billing service refactor before launch", Duration::zero());
        let all = vec![a.clone(), b.clone()];
        assert!(engine().compute_score(&a, &all) >= 38);
        assert!(engine().compute_score(&b, &all) >= 38);
    }

    #[test]
    fn test_repetition_buckets() {
        assert_eq!(repetition_points(0), 0);
        assert_eq!(repetition_points(1), 8);
        assert_eq!(repetition_points(2), 15);
        assert_eq!(repetition_points(3), 25);
        assert_eq!(repetition_points(12), 25);
    }

    #[test]
    fn test_emotional_substring_matching() {
        // "needed" hits "need", "monkey" hits "key"
        assert_eq!(count_emotional_words("It was needed, said the monkey"), 2);
        assert_eq!(count_emotional_words("LOVE"), 1);
        assert_eq!(count_emotional_words("plain words only"), 0);
    }

    #[test]
    fn test_emotion_buckets() {
        assert_eq!(emotion_points(0), 0);
        assert_eq!(emotion_points(2), 8);
        assert_eq!(emotion_points(3), 15);
        assert_eq!(emotion_points(4), 15);
        assert_eq!(emotion_points(5), 25);
    }

    #[test]
    fn test_spark_adds_exactly_ten() {
        let plain = thought_at("a quiet observation", Duration::days(3));
        let mut spark = plain.clone();
        spark.is_spark = true;
        let e = engine();
        assert_eq!(
            e.compute_score(&spark, &[spark.clone()]),
            e.compute_score(&plain, &[plain.clone()]) + 10
        );
    }

    #[test]
    fn test_share_platforms_capped_at_fifteen() {
        let mut t = thought_at("x", Duration::days(60));
        t.share_posts = Some(SharePosts {
            shared: Some(SharedPlatforms {
                linkedin: true,
                twitter: true,
                instagram: true,
            }),
            drafts: None,
        });
        assert_eq!(engagement_points(&t), 15);

        t.share_posts = Some(SharePosts {
            shared: Some(SharedPlatforms {
                linkedin: true,
                ..Default::default()
            }),
            drafts: None,
        });
        assert_eq!(engagement_points(&t), 7);
    }

    #[test]
    fn test_share_and_todo_checked_independently() {
        let mut t = thought_at("x", Duration::days(60));
        t.potential = Some(Potential::Share);
        t.best_potential = Some(Potential::Todo);
        assert_eq!(engagement_points(&t), 10);
    }

    #[test]
    fn test_open_todo_gets_five() {
        let mut t = thought_at("x", Duration::days(60));
        t.best_potential = Some(Potential::Todo);
        assert_eq!(engagement_points(&t), 5);
    }

    fn shared_everywhere() -> Option<SharePosts> {
        Some(SharePosts {
            shared: Some(SharedPlatforms {
                linkedin: true,
                twitter: true,
                instagram: true,
            }),
            drafts: None,
        })
    }

    #[test]
    fn test_engagement_capped_for_completed_shared_todo() {
        let mut t = thought_at("x", Duration::days(60));
        t.potential = Some(Potential::Todo);
        t.todo_data = Some(TodoData {
            completed: true,
            due_date: None,
        });
        t.share_posts = shared_everywhere();
        assert_eq!(engagement_points(&t), 20);
    }

    #[test]
    fn test_engagement_capped_when_share_and_todo_stack() {
        let mut t = thought_at("x", Duration::days(60));
        t.potential = Some(Potential::Share);
        t.best_potential = Some(Potential::Todo);
        t.todo_data = Some(TodoData {
            completed: true,
            due_date: None,
        });
        t.share_posts = shared_everywhere();
        assert_eq!(engagement_points(&t), 20);
        assert_eq!(engine().score_breakdown(&t, &[]).engagement, 20);
    }

    #[test]
    fn test_total_clamped_to_hundred() {
        let text = "love amazing incredible fantastic brilliant urgent critical priority";
        let mut t = thought_at(text, Duration::zero());
        t.tags = ["work".to_string()].into_iter().collect();
        t.is_spark = true;
        t.potential = Some(Potential::Share);
        t.best_potential = Some(Potential::Todo);
        t.todo_data = Some(TodoData {
            completed: true,
            due_date: None,
        });
        t.share_posts = Some(SharePosts {
            shared: Some(SharedPlatforms {
                linkedin: true,
                twitter: true,
                instagram: true,
            }),
            drafts: None,
        });
        let mut all = vec![t.clone()];
        for _ in 0..3 {
            let mut other = thought_at("unrelated", Duration::zero());
            other.tags = t.tags.clone();
            all.push(other);
        }
        let b = engine().score_breakdown(&t, &all);
        assert!(b.recency + b.repetition + b.emotion + b.engagement + b.spark > 100);
        assert_eq!(b.total, MAX_SCORE);
    }

    #[test]
    fn test_rank_excludes_parked() {
        let mut parked = thought_at("parked but loud: urgent critical", Duration::zero());
        parked.is_parked = true;
        parked.is_powerful = Some(true);
        let open = thought_at("open", Duration::days(90));
        let all = vec![parked, open.clone()];
        let ranked = engine().rank_powerful_thoughts(&all, 3);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].thought.id, open.id);
    }

    #[test]
    fn test_rank_respects_max_count() {
        let all: Vec<_> = (0..5)
            .map(|i| thought_at("x", Duration::days(i)))
            .collect();
        assert_eq!(engine().rank_powerful_thoughts(&all, 3).len(), 3);
        assert_eq!(engine().rank_powerful_thoughts(&all[..2], 3).len(), 2);
        assert!(engine().rank_powerful_thoughts(&all, 0).is_empty());
    }

    #[test]
    fn test_pin_beats_score() {
        let mut pinned = thought_at("x", Duration::days(90));
        pinned.is_powerful = Some(true);
        pinned.powerful_score = Some(10);
        let mut strong = thought_at("y", Duration::zero());
        strong.powerful_score = Some(95);
        let all = vec![strong, pinned.clone()];
        let ranked = engine().rank_powerful_thoughts(&all, 3);
        assert_eq!(ranked[0].thought.id, pinned.id);
        assert_eq!(ranked[0].score, 10);
        assert_eq!(ranked[1].score, 95);
    }

    #[test]
    fn test_equal_score_newest_first() {
        let mut older = thought_at("x", Duration::days(2));
        older.powerful_score = Some(50);
        let mut newer = thought_at("y", Duration::days(1));
        newer.powerful_score = Some(50);
        let all = vec![older.clone(), newer.clone()];
        let ranked = engine().rank_powerful_thoughts(&all, 3);
        assert_eq!(ranked[0].thought.id, newer.id);
        assert_eq!(ranked[1].thought.id, older.id);
    }

    #[test]
    fn test_full_tie_keeps_input_order() {
        let mut a = thought_at("first", Duration::days(1));
        a.powerful_score = Some(40);
        let mut b = thought_at("second", Duration::days(1));
        b.powerful_score = Some(40);
        assert_eq!(a.created_at, b.created_at);

        let forward = vec![a.clone(), b.clone()];
        let ranked = engine().rank_powerful_thoughts(&forward, 3);
        let ids: Vec<_> = ranked.iter().map(|r| r.thought.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);

        let reversed = vec![b.clone(), a.clone()];
        let ranked = engine().rank_powerful_thoughts(&reversed, 3);
        let ids: Vec<_> = ranked.iter().map(|r| r.thought.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[test]
    fn test_cached_score_trusted_without_recompute() {
        let mut stale = thought_at("I love this", Duration::zero());
        stale.powerful_score = Some(3);
        let all = vec![stale.clone()];
        assert_eq!(engine().resolve_score(&stale, &all), 3);
        assert!(engine().compute_score(&stale, &all) > 3);
    }

    #[test]
    fn test_scores_always_bounded() {
        let texts = [
            "",
            "very very very",
            "need must key vital crucial essential important priority",
            "nothing here",
        ];
        let all: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let mut t = thought_at(s, Duration::days(i as i64 * 10));
                t.is_spark = i % 2 == 0;
                t
            })
            .collect();
        for t in &all {
            assert!(engine().compute_score(t, &all) <= MAX_SCORE);
        }
    }
}
