//! # Router Classify
//!
//! Text classification for the service router.
//!
//! This crate provides:
//! - The scored, word-boundary keyword matcher with atomic index rebuilds
//! - The request complexity analyzer that picks a decision engine
//! - The `Classifier` capability trait and the built-in keyword classifier

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builtin;
pub mod classifier;
pub mod complexity;
pub mod index;
pub mod matcher;

// Re-export main types
pub use builtin::BuiltinClassifier;
pub use classifier::Classifier;
pub use complexity::{ComplexityAnalyzer, RequestComplexity};
pub use index::{KeywordIndex, KeywordSpec};
pub use matcher::{KeywordMatcher, MatcherConfig};
