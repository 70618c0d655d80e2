use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// What a thought could become. Serialized with the exact labels the clients use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Potential {
    Share,
    #[serde(rename = "To-Do")]
    Todo,
    Insight,
    #[serde(rename = "Just a thought")]
    JustAThought,
}

impl Potential {
    pub fn as_str(&self) -> &'static str {
        match self {
            Potential::Share => "Share",
            Potential::Todo => "To-Do",
            Potential::Insight => "Insight",
            Potential::JustAThought => "Just a thought",
        }
    }
}

impl fmt::Display for Potential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown potential '{0}'")]
pub struct UnknownPotential(pub String);

impl FromStr for Potential {
    type Err = UnknownPotential;

    /// Accepts the canonical labels plus the loose spellings the classifier tends to emit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "share" => Ok(Potential::Share),
            "to-do" | "todo" | "to do" => Ok(Potential::Todo),
            "insight" => Ok(Potential::Insight),
            "just a thought" | "just_a_thought" => Ok(Potential::JustAThought),
            _ => Err(UnknownPotential(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linkedin,
    Twitter,
    Instagram,
}

/// Which platforms the thought's derived content was marked shared on.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SharedPlatforms {
    #[serde(default)]
    pub linkedin: bool,
    #[serde(default)]
    pub twitter: bool,
    #[serde(default)]
    pub instagram: bool,
}

impl SharedPlatforms {
    pub fn count(&self) -> usize {
        [self.linkedin, self.twitter, self.instagram]
            .into_iter()
            .filter(|shared| *shared)
            .count()
    }

    pub fn set(&mut self, platform: Platform, shared: bool) {
        match platform {
            Platform::Linkedin => self.linkedin = shared,
            Platform::Twitter => self.twitter = shared,
            Platform::Instagram => self.instagram = shared,
        }
    }
}

/// AI-drafted post text, one optional draft per platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShareDrafts {
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SharePosts {
    #[serde(default)]
    pub shared: Option<SharedPlatforms>,
    #[serde(default)]
    pub drafts: Option<ShareDrafts>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TodoData {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// A captured thought. Optional members default when absent so partially
/// classified records (and client-posted corpora) deserialize cleanly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thought {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Uuid,
    pub original_text: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_spark: bool,
    #[serde(default)]
    pub is_parked: bool,
    #[serde(default)]
    pub potential: Option<Potential>,
    #[serde(default)]
    pub best_potential: Option<Potential>,
    #[serde(default)]
    pub share_posts: Option<SharePosts>,
    #[serde(default)]
    pub todo_data: Option<TodoData>,
    #[serde(default)]
    pub is_powerful: Option<bool>,
    #[serde(default)]
    pub powerful_score: Option<u8>,
}

impl Thought {
    /// Blank thought for building fixtures; the store assigns ids on insert.
    #[cfg(test)]
    pub fn new(user_id: Uuid, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            original_text: text.into(),
            summary: None,
            tags: BTreeSet::new(),
            created_at,
            updated_at: None,
            is_spark: false,
            is_parked: false,
            potential: None,
            best_potential: None,
            share_posts: None,
            todo_data: None,
            is_powerful: None,
            powerful_score: None,
        }
    }

    /// Manual pin; absent means not pinned.
    pub fn is_pinned(&self) -> bool {
        self.is_powerful.unwrap_or(false)
    }

    /// True when either the user's choice or the AI suggestion is `potential`.
    pub fn has_potential(&self, potential: Potential) -> bool {
        self.potential == Some(potential) || self.best_potential == Some(potential)
    }

    /// The user's choice wins over the AI suggestion.
    pub fn effective_potential(&self) -> Option<Potential> {
        self.potential.or(self.best_potential)
    }

    pub fn shared_platforms(&self) -> Option<&SharedPlatforms> {
        self.share_posts.as_ref().and_then(|p| p.shared.as_ref())
    }

    pub fn is_todo_completed(&self) -> bool {
        self.todo_data.as_ref().is_some_and(|t| t.completed)
    }
}

/// Trims and lower-cases tags, dropping empties. The set keeps them sorted and unique.
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Partial edit of a thought. Any change to a scoring input drops the cached score.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThoughtPatch {
    pub text: Option<String>,
    pub tags: Option<Vec<String>>,
    pub potential: Option<Potential>,
    pub is_spark: Option<bool>,
    pub is_powerful: Option<bool>,
    pub todo_completed: Option<bool>,
}

impl ThoughtPatch {
    pub fn apply(self, thought: &mut Thought) {
        let mut stale = false;

        if let Some(text) = self.text {
            thought.original_text = text.trim().to_string();
            stale = true;
        }
        if let Some(tags) = self.tags {
            thought.tags = normalize_tags(tags);
            stale = true;
        }
        if let Some(potential) = self.potential {
            thought.potential = Some(potential);
            if potential == Potential::Todo && thought.todo_data.is_none() {
                thought.todo_data = Some(TodoData::default());
            }
            stale = true;
        }
        if let Some(is_spark) = self.is_spark {
            thought.is_spark = is_spark;
            stale = true;
        }
        if let Some(completed) = self.todo_completed {
            thought.todo_data.get_or_insert_with(TodoData::default).completed = completed;
            stale = true;
        }
        if let Some(pinned) = self.is_powerful {
            thought.is_powerful = Some(pinned);
        }

        if stale {
            thought.powerful_score = None;
        }
    }
}

/// Marks `platform` shared (or not) and drops the cached score.
pub fn set_shared(thought: &mut Thought, platform: Platform, shared: bool) {
    thought
        .share_posts
        .get_or_insert_with(SharePosts::default)
        .shared
        .get_or_insert_with(SharedPlatforms::default)
        .set(platform, shared);
    thought.powerful_score = None;
}
