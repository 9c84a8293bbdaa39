//! Shared utility functions for codemender.
//!
//! This module provides common utilities used across multiple modules,
//! currently the extraction of script bodies from LLM responses.

pub mod code_extraction;

pub use code_extraction::{
    extract_code_from_response, try_extract_code_from_response, CodeExtractionResult,
};
