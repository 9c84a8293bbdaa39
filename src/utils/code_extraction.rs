//! Script-body extraction from LLM responses.
//!
//! Completion models are instructed to return raw code, but frequently wrap
//! it in markdown fences or prepend a sentence of prose anyway. This module
//! strips those artifacts so callers receive a plain executable script body.
//!
//! # Extraction Strategies
//!
//! The extraction functions try the following strategies in order:
//! 1. Language-labelled fenced block (```python ... ```)
//! 2. Generic fenced block (``` ... ```)
//! 3. Raw content with any stray fence markers removed
//!
//! # Example
//!
//! ```
//! use codemender::utils::code_extraction::extract_code_from_response;
//!
//! let response = "```python\nprint(2+2)\n```";
//! assert_eq!(extract_code_from_response(response), "print(2+2)");
//! ```

use regex::Regex;

/// Result of a script-body extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeExtractionResult {
    /// A non-empty script body was extracted.
    Success(String),
    /// The response contained no code after stripping artifacts.
    Empty,
}

impl CodeExtractionResult {
    /// Returns true if a script body was extracted.
    pub fn is_success(&self) -> bool {
        matches!(self, CodeExtractionResult::Success(_))
    }

    /// Returns the extracted body for the Success case.
    pub fn code(&self) -> Option<&str> {
        match self {
            CodeExtractionResult::Success(code) => Some(code),
            CodeExtractionResult::Empty => None,
        }
    }
}

/// Extracts a script body from an LLM response, trying fenced blocks first.
///
/// Returns [`CodeExtractionResult::Empty`] when nothing remains after
/// stripping, so callers can treat an all-prose reply as a generation fault.
pub fn try_extract_code_from_response(content: &str) -> CodeExtractionResult {
    // Strategy 1: language-labelled fence
    if let Some(code) = extract_from_labelled_fence(content) {
        return non_empty(code);
    }

    // Strategy 2: generic fence
    if let Some(code) = extract_from_generic_fence(content) {
        return non_empty(code);
    }

    // Strategy 3: raw content, dropping any unmatched fence markers
    let stripped = strip_stray_fences(content);
    non_empty(stripped)
}

/// Extracts a script body, falling back to the trimmed raw content.
///
/// Convenience wrapper over [`try_extract_code_from_response`] for callers
/// that handle emptiness themselves.
pub fn extract_code_from_response(content: &str) -> String {
    match try_extract_code_from_response(content) {
        CodeExtractionResult::Success(code) => code,
        CodeExtractionResult::Empty => String::new(),
    }
}

/// Extracts the first language-labelled fenced block (```python / ```py).
fn extract_from_labelled_fence(content: &str) -> Option<String> {
    // (?s) lets `.` span newlines; the language tag line is consumed
    let re = Regex::new(r"(?s)```(?:python|py)[ \t]*\r?\n(.*?)```").expect("static regex");
    re.captures(content)
        .map(|caps| caps[1].trim().to_string())
}

/// Extracts the first generic fenced block.
fn extract_from_generic_fence(content: &str) -> Option<String> {
    let re = Regex::new(r"(?s)```[ \t]*\r?\n?(.*?)```").expect("static regex");
    re.captures(content)
        .map(|caps| caps[1].trim().to_string())
}

/// Removes unmatched fence markers and language tags from raw content.
fn strip_stray_fences(content: &str) -> String {
    let mut cleaned = content.replace("```python", "").replace("```py", "");
    cleaned = cleaned.replace("```", "");
    cleaned.trim().to_string()
}

fn non_empty(code: String) -> CodeExtractionResult {
    if code.is_empty() {
        CodeExtractionResult::Empty
    } else {
        CodeExtractionResult::Success(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_code_passthrough() {
        let response = "print(2+2)";
        assert_eq!(extract_code_from_response(response), "print(2+2)");
    }

    #[test]
    fn test_labelled_fence() {
        let response = "```python\nimport requests\nprint('ok')\n```";
        assert_eq!(
            extract_code_from_response(response),
            "import requests\nprint('ok')"
        );
    }

    #[test]
    fn test_py_label() {
        let response = "```py\nprint(1)\n```";
        assert_eq!(extract_code_from_response(response), "print(1)");
    }

    #[test]
    fn test_generic_fence() {
        let response = "```\nprint('generic')\n```";
        assert_eq!(extract_code_from_response(response), "print('generic')");
    }

    #[test]
    fn test_fence_with_surrounding_prose() {
        let response =
            "Here is the script you asked for:\n```python\nprint(42)\n```\nLet me know how it goes!";
        assert_eq!(extract_code_from_response(response), "print(42)");
    }

    #[test]
    fn test_multiline_body_preserved() {
        let body = "import requests\n\nresp = requests.get('https://example.com')\nprint(resp.status_code)";
        let response = format!("```python\n{}\n```", body);
        assert_eq!(extract_code_from_response(&response), body);
    }

    #[test]
    fn test_unmatched_fence_markers_stripped() {
        let response = "```python\nprint('no closing fence')";
        assert_eq!(
            extract_code_from_response(response),
            "print('no closing fence')"
        );
    }

    #[test]
    fn test_crlf_fence() {
        let response = "```python\r\nprint('windows')\r\n```";
        assert_eq!(extract_code_from_response(response), "print('windows')");
    }

    #[test]
    fn test_empty_response() {
        assert_eq!(
            try_extract_code_from_response(""),
            CodeExtractionResult::Empty
        );
        assert_eq!(
            try_extract_code_from_response("   \n  "),
            CodeExtractionResult::Empty
        );
    }

    #[test]
    fn test_empty_fenced_block() {
        let result = try_extract_code_from_response("```python\n```");
        assert_eq!(result, CodeExtractionResult::Empty);
        assert!(result.code().is_none());
    }

    #[test]
    fn test_result_accessors() {
        let result = try_extract_code_from_response("print(0)");
        assert!(result.is_success());
        assert_eq!(result.code(), Some("print(0)"));
    }

    #[test]
    fn test_first_block_wins() {
        let response = "```python\nprint('first')\n```\ntext\n```python\nprint('second')\n```";
        assert_eq!(extract_code_from_response(response), "print('first')");
    }
}
