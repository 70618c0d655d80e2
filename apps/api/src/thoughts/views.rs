use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::thoughts::models::{Potential, Thought};
use crate::thoughts::scoring::ScoreEngine;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    All,
    Todo,
    Share,
    Explore,
    Parked,
}

/// Selects and orders the thoughts shown by `view`.
pub fn apply_view(view: View, all: &[Thought], engine: &ScoreEngine) -> Vec<Thought> {
    match view {
        View::All => newest_first(all.iter()),
        View::Todo => todo_view(all),
        View::Share => share_view(all),
        View::Explore => explore_view(all, engine),
        View::Parked => newest_first(all.iter().filter(|t| t.is_parked)),
    }
}

fn newest_first<'a>(thoughts: impl Iterator<Item = &'a Thought>) -> Vec<Thought> {
    let mut out: Vec<Thought> = thoughts.cloned().collect();
    out.sort_by_key(|t| Reverse(t.created_at));
    out
}

/// Open to-dos before completed ones, newest first within each group.
fn todo_view(all: &[Thought]) -> Vec<Thought> {
    let mut out: Vec<Thought> = all
        .iter()
        .filter(|t| !t.is_parked && t.effective_potential() == Some(Potential::Todo))
        .cloned()
        .collect();
    out.sort_by_key(|t| (t.is_todo_completed(), Reverse(t.created_at)));
    out
}

/// Share candidates not yet posted anywhere come first.
fn share_view(all: &[Thought]) -> Vec<Thought> {
    let mut out: Vec<Thought> = all
        .iter()
        .filter(|t| !t.is_parked && t.effective_potential() == Some(Potential::Share))
        .cloned()
        .collect();
    out.sort_by_key(|t| {
        let already_shared = t.shared_platforms().is_some_and(|s| s.count() > 0);
        (already_shared, Reverse(t.created_at))
    });
    out
}

fn explore_view(all: &[Thought], engine: &ScoreEngine) -> Vec<Thought> {
    let mut scored: Vec<(u8, &Thought)> = all
        .iter()
        .filter(|t| !t.is_parked)
        .map(|t| (engine.resolve_score(t, all), t))
        .collect();
    scored.sort_by_key(|(score, t)| (Reverse(*score), Reverse(t.created_at)));
    scored.into_iter().map(|(_, t)| t.clone()).collect()
}
