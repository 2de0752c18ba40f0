//! Request payload validation and sanitization.

use crate::context::MAX_PAYLOAD_CHARS;
use crate::error::{RouterError, RouterResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Validation patterns.
pub mod patterns {
    use super::{Lazy, Regex};

    /// Markup and script-injection fragments that are never legitimate in a
    /// routing request.
    pub static DANGEROUS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)<script|javascript:|on\w+\s*=").unwrap());

    /// Runs of whitespace, collapsed by sanitization.
    pub static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
}

/// Stateless payload validator, safe to share across tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputValidator;

impl InputValidator {
    /// Create a validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate a raw payload.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the payload is blank after trimming,
    /// longer than the 10,000-character cap, or contains a dangerous
    /// pattern.
    pub fn validate(&self, text: &str) -> RouterResult<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RouterError::invalid_input("payload must not be blank"));
        }
        let chars = trimmed.chars().count();
        if chars > MAX_PAYLOAD_CHARS {
            return Err(RouterError::invalid_input(format!(
                "payload length {chars} exceeds maximum of {MAX_PAYLOAD_CHARS} characters"
            )));
        }
        if patterns::DANGEROUS.is_match(trimmed) {
            return Err(RouterError::invalid_input(
                "payload contains a disallowed pattern",
            ));
        }
        Ok(())
    }

    /// Sanitize a payload: trim, collapse whitespace runs to a single
    /// space, and strip angle brackets. Never fails.
    #[must_use]
    pub fn sanitize(&self, text: &str) -> String {
        let collapsed = patterns::WHITESPACE_RUN.replace_all(text.trim(), " ");
        collapsed.replace(['<', '>'], "")
    }
}
