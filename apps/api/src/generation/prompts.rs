// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for résumé generation.
pub const RESUME_SYSTEM: &str = "You are an expert résumé writer tailoring a candidate's \
    résumé to a specific job. \
    You MUST respond with valid JSON only — a single JSON object. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Résumé generation prompt template.
/// Replace: {factual_instruction}, {current_json}, {job_description}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"{factual_instruction}

CURRENT RÉSUMÉ (may be partially filled in):
{current_json}

JOB DESCRIPTION:
{job_description}

Rewrite the résumé so it targets this job. Return a JSON object with this EXACT schema:
{
  "personal": {
    "full_name": "",
    "job_title": "Senior Backend Engineer",
    "email": "",
    "phone": "",
    "location": "",
    "website": "",
    "linkedin": "",
    "summary": "Two or three sentences aimed at the role."
  },
  "experience": [
    {
      "company": "Acme",
      "position": "Backend Engineer",
      "start_date": "Jan 2021",
      "end_date": "",
      "current": true,
      "description": "One achievement per line, separated by \n"
    }
  ],
  "education": [
    {
      "institution": "University of Somewhere",
      "degree": "BSc",
      "field": "Computer Science",
      "start_date": "2014",
      "end_date": "2018",
      "current": false
    }
  ],
  "skills": ["Rust", "PostgreSQL"],
  "languages": ["English"]
}

RULES:
1. Keep every employer, institution and date from the current résumé exactly as written
2. Reword descriptions and the summary toward the job; do not add new employers or degrees
3. Order skills by relevance to the job
4. Leave contact fields empty if you are not certain of them"#;

/// System prompt for cover-letter generation.
pub const LETTER_SYSTEM: &str = "You are an expert career writer drafting a concise, \
    specific cover letter. \
    You MUST respond with valid JSON only — a single JSON object. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Cover-letter generation prompt template.
/// Replace: {factual_instruction}, {current_json}, {job_description}
pub const LETTER_PROMPT_TEMPLATE: &str = r#"{factual_instruction}

CURRENT COVER LETTER (may be partially filled in):
{current_json}

JOB DESCRIPTION:
{job_description}

Write the cover letter for this job. Return a JSON object with this EXACT schema:
{
  "sender": {"full_name": "", "job_title": "", "email": "", "phone": "", "location": ""},
  "recipient": {"manager_name": "", "company": "", "address": ""},
  "content": {
    "subject": "Application for Senior Backend Engineer",
    "opening": "Dear Hiring Manager,",
    "body": ["First paragraph.", "Second paragraph.", "Third paragraph."],
    "closing": "Sincerely,"
  }
}

RULES:
1. Three or four body paragraphs, each under 120 words
2. Take the company and role from the job description when the letter does not name them
3. Leave sender and recipient fields empty if you are not certain of them"#;
