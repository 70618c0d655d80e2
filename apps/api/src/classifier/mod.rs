//! Thought classification: summary, tags, spark detection, best potential,
//! and social post drafts.
//!
//! `AppState` holds an `Option<Arc<dyn ThoughtClassifier>>`; it is `None` when
//! no API key is configured and the AI endpoints then answer 503.

pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::{FAITHFUL_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::LlmClient;
use crate::thoughts::models::{normalize_tags, Potential, ShareDrafts, Thought};

use self::prompts::{CLASSIFY_PROMPT, SHARE_DRAFTS_PROMPT};

const MAX_TAGS: usize = 4;
const TWITTER_MAX_CHARS: usize = 280;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub is_spark: bool,
    pub best_potential: Option<Potential>,
}

impl Classification {
    /// Merges the result into a thought. AI tags are added to the user's, and a
    /// manual spark is never cleared.
    pub fn apply_to(&self, thought: &mut Thought) {
        if self.summary.is_some() {
            thought.summary = self.summary.clone();
        }
        thought.tags = normalize_tags(thought.tags.iter().chain(self.tags.iter()));
        thought.is_spark |= self.is_spark;
        if self.best_potential.is_some() {
            thought.best_potential = self.best_potential;
        }
        thought.powerful_score = None;
    }
}

/// Model output before normalisation. Everything is optional: the model is
/// not trusted to follow the schema exactly.
#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    is_spark: bool,
    #[serde(default)]
    best_potential: Option<String>,
}

fn normalize_classification(raw: RawClassification) -> Classification {
    let summary = raw
        .summary
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let tags = normalize_tags(&raw.tags).into_iter().take(MAX_TAGS).collect();
    let best_potential = raw.best_potential.and_then(|p| p.parse().ok());

    Classification {
        summary,
        tags,
        is_spark: raw.is_spark,
        best_potential,
    }
}

fn normalize_drafts(raw: ShareDrafts) -> ShareDrafts {
    let clean = |draft: Option<String>| {
        draft
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
    };
    ShareDrafts {
        linkedin: clean(raw.linkedin),
        twitter: clean(raw.twitter).map(|d| truncate_chars(&d, TWITTER_MAX_CHARS)),
        instagram: clean(raw.instagram),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ThoughtClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification, AppError>;

    async fn draft_share_posts(&self, text: &str) -> Result<ShareDrafts, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmClassifier
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmClassifier(pub LlmClient);

fn render_prompt(template: &str, text: &str) -> String {
    template
        .replace("{faithful}", FAITHFUL_INSTRUCTION)
        .replace("{text}", text)
}

#[async_trait]
impl ThoughtClassifier for LlmClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, AppError> {
        let prompt = render_prompt(CLASSIFY_PROMPT, text);
        let raw: RawClassification = self
            .0
            .call_json(&prompt, JSON_ONLY_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Failed to classify thought: {e}")))?;

        let classification = normalize_classification(raw);
        info!(
            "Classified thought: potential={:?} spark={} tags={}",
            classification.best_potential,
            classification.is_spark,
            classification.tags.len()
        );
        Ok(classification)
    }

    async fn draft_share_posts(&self, text: &str) -> Result<ShareDrafts, AppError> {
        let prompt = render_prompt(SHARE_DRAFTS_PROMPT, text);
        let raw: ShareDrafts = self
            .0
            .call_json(&prompt, JSON_ONLY_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Failed to draft share posts: {e}")))?;
        Ok(normalize_drafts(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn raw(json: &str) -> RawClassification {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_normalize_full_response() {
        let c = normalize_classification(raw(
            r#"{"summary": " Plan the offsite. ", "tags": ["Work", "planning", "work"],
                "is_spark": false, "best_potential": "To-Do"}"#,
        ));
        assert_eq!(c.summary.as_deref(), Some("Plan the offsite."));
        assert_eq!(c.tags, vec!["planning", "work"]);
        assert_eq!(c.best_potential, Some(Potential::Todo));
    }

    #[test]
    fn test_unknown_potential_dropped() {
        let c = normalize_classification(raw(r#"{"best_potential": "Tweet"}"#));
        assert_eq!(c.best_potential, None);
        assert!(c.tags.is_empty());
        assert!(!c.is_spark);
    }

    #[test]
    fn test_tags_capped() {
        let c = normalize_classification(raw(r#"{"tags": ["a", "b", "c", "d", "e", "f"]}"#));
        assert_eq!(c.tags.len(), MAX_TAGS);
    }

    #[test]
    fn test_empty_summary_becomes_none() {
        let c = normalize_classification(raw(r#"{"summary": "   "}"#));
        assert!(c.summary.is_none());
    }

    #[test]
    fn test_apply_merges_tags_and_keeps_manual_spark() {
        let mut t = Thought::new(Uuid::new_v4(), "x", Utc::now());
        t.tags = normalize_tags(["health"]);
        t.is_spark = true;
        t.powerful_score = Some(70);
        Classification {
            summary: Some("s".to_string()),
            tags: vec!["sleep".to_string()],
            is_spark: false,
            best_potential: Some(Potential::Insight),
        }
        .apply_to(&mut t);

        assert!(t.is_spark);
        assert_eq!(t.tags.len(), 2);
        assert_eq!(t.best_potential, Some(Potential::Insight));
        assert!(t.powerful_score.is_none());
    }

    #[test]
    fn test_twitter_draft_truncated() {
        let drafts = normalize_drafts(ShareDrafts {
            linkedin: Some("  ".to_string()),
            twitter: Some("é".repeat(300)),
            instagram: None,
        });
        assert!(drafts.linkedin.is_none());
        assert_eq!(drafts.twitter.unwrap().chars().count(), TWITTER_MAX_CHARS);
    }

    #[test]
    fn test_render_prompt_inserts_text() {
        let prompt = render_prompt(CLASSIFY_PROMPT, "walk more");
        assert!(prompt.contains("walk more"));
        assert!(!prompt.contains("{text}"));
        assert!(!prompt.contains("{faithful}"));
    }
}
