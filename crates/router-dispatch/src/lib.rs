//! # Router Dispatch
//!
//! Top-level request dispatch for the service router.
//!
//! This crate provides:
//! - The hybrid dispatcher: complexity analysis picks the classifier or
//!   the graph pathfinder per request, with threshold fallback and A/B
//!   splitting layered on top
//! - The fallback-chain classifier
//! - The tiered (keyword-first) classifier

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ab;
pub mod chain;
pub mod dispatcher;
pub mod tiered;

// Re-export main types
pub use ab::{AbSplitter, AbVariant, RandomSource, ThreadRngSource};
pub use chain::ClassifierChain;
pub use dispatcher::{DispatcherBuilder, HybridDispatcher, ThresholdFallback};
pub use tiered::TieredClassifier;
