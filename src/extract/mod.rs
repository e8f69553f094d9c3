//! Extraction module for scanning fetched pages
//!
//! This module contains:
//! - The pattern matcher wrapping the regex engine
//! - The built-in email, phone and `<loc>` patterns
//! - The extraction engine applied to every fetched page

mod engine;
mod pattern;

pub use engine::{truncate_match, ExtractionEngine, ExtractionResult};
pub use pattern::{ExtractMode, PatternMatcher, EMAIL_PATTERN, LOC_PATTERN, PHONE_PATTERN};
