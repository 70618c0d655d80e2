pub const CLASSIFY_PROMPT: &str = r#"Classify this captured thought.

THOUGHT:
{text}

Return a JSON object with exactly these keys:
{
  "summary": "one sentence, at most 20 words",
  "tags": ["1 to 4 short lowercase category labels"],
  "is_spark": true | false,
  "best_potential": "Share" | "To-Do" | "Insight" | "Just a thought"
}

Rules:
- is_spark is true only for an unusually original or significant idea.
- best_potential is "To-Do" when the thought describes something the author should do,
  "Share" when it would make a good public post, "Insight" for a realisation worth keeping,
  otherwise "Just a thought".

{faithful}"#;

pub const SHARE_DRAFTS_PROMPT: &str = r#"Draft social posts from this thought.

THOUGHT:
{text}

Return a JSON object with exactly these keys:
{
  "linkedin": "a professional post of 2 to 4 short paragraphs",
  "twitter": "a single post of at most 280 characters",
  "instagram": "a caption with at most 5 hashtags at the end"
}

{faithful}"#;
