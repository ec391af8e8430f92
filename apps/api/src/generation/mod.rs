// AI content generation.
// Builds prompts from the current document, parses lenient model output and
// merges it back. All LLM calls go through llm_client; no direct Anthropic
// SDK calls here.

pub mod generator;
pub mod handlers;
pub mod merge;
pub mod prompts;
