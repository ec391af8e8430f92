// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps the model from inventing facts about the candidate.
pub const FACTUAL_INSTRUCTION: &str = "\
    Use only facts present in the current document or the job description. \
    Do NOT invent employers, dates, degrees, contact details or certifications. \
    If a field is unknown, return an empty string for it.";
