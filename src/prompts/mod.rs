//! LLM prompts for script generation.
//!
//! The programmer agent's prompts demand raw, directly executable Python:
//! no markdown fences, no conversational text. Prior errors and research
//! notes are folded into the user prompt so each retry is informed by the
//! previous failure.

/// System prompt for the programmer agent.
pub const PROGRAMMER_SYSTEM: &str = r#"You are an expert Python programmer writing small, self-contained scripts.

Rules:
1. Output ONLY raw Python code - no markdown blocks like ```python, no prose.
2. The script must be directly executable as-is with python3.
3. Use the 'requests' library for HTTP calls if needed.
4. Print the final result clearly using print().
5. Handle the task in a single script; do not split into files."#;

/// User prompt template for the programmer agent.
const PROGRAMMER_USER_TEMPLATE: &str = r#"Task: {task}

If there was an error on the previous attempt: {error}
Research notes for fixing it: {research}

Write the complete script now. Remember: raw Python only, and print the final result."#;

/// Placeholder used when no error or research context exists yet.
const NONE_PLACEHOLDER: &str = "none";

/// Builds the programmer user prompt from the session view.
///
/// `previous_error` and `research_notes` may be empty on the first attempt;
/// they are rendered as "none" so the model is not misled by blank fields.
pub fn build_programmer_prompt(task: &str, previous_error: &str, research_notes: &str) -> String {
    let error = if previous_error.is_empty() {
        NONE_PLACEHOLDER
    } else {
        previous_error
    };
    let research = if research_notes.is_empty() {
        NONE_PLACEHOLDER
    } else {
        research_notes
    };

    PROGRAMMER_USER_TEMPLATE
        .replace("{task}", task)
        .replace("{error}", error)
        .replace("{research}", research)
}
