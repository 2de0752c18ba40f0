//! # Router Providers
//!
//! External classifier implementations for the service router.
//!
//! This crate provides the LLM-backed classifier: a chat-completion HTTP
//! client with retry, circuit breaking, timeout, and cancellation, plus
//! the tolerant JSON parsing of model responses.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod external;
pub mod parse;

pub use external::{ExternalClassifier, ExternalClassifierConfig};
pub use parse::parse_decision;
