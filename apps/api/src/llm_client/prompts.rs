// Prompt fragments shared by every LLM call. Call-specific prompts live
// beside the code that makes the call (see classifier/prompts.rs).

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps the model from rewriting the author's voice.
pub const FAITHFUL_INSTRUCTION: &str = "\
    Work only from the thought as written. Do NOT invent facts, names, numbers or \
    events that the author did not mention. Keep the author's own voice.";
