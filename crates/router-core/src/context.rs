//! The validated, immutable input to a single routing call.

use crate::error::{RouterError, RouterResult};
use serde::{Deserialize, Serialize};

/// Maximum accepted payload length, in characters, after trimming.
pub const MAX_PAYLOAD_CHARS: usize = 10_000;

/// A validated request payload.
///
/// Construction trims surrounding whitespace and enforces the payload
/// invariants; once built the context is immutable and freely shareable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionContext {
    payload: String,
}

impl DecisionContext {
    /// Create a context from a raw payload.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the payload is blank after trimming or
    /// longer than [`MAX_PAYLOAD_CHARS`].
    pub fn new(payload: impl AsRef<str>) -> RouterResult<Self> {
        let trimmed = payload.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RouterError::invalid_input("payload must not be blank"));
        }
        let chars = trimmed.chars().count();
        if chars > MAX_PAYLOAD_CHARS {
            return Err(RouterError::invalid_input(format!(
                "payload length {chars} exceeds maximum of {MAX_PAYLOAD_CHARS} characters"
            )));
        }
        Ok(Self {
            payload: trimmed.to_string(),
        })
    }

    /// The trimmed payload.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The payload lowercased, as used by the lexical engines.
    #[must_use]
    pub fn payload_lower(&self) -> String {
        self.payload.to_lowercase()
    }
}
