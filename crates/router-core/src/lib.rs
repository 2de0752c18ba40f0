//! # Router Core
//!
//! Core types, traits, and error handling for the service router.
//!
//! This crate provides the foundational pieces used throughout the router:
//! - Immutable value types (`DecisionContext`, `RoutingDecision`, `RoutingResult`, `RoutingPath`)
//! - The service registry and its listener capability
//! - Input validation and sanitization
//! - The caller-facing error taxonomy

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod decision;
pub mod error;
pub mod path;
pub mod registry;
pub mod validate;

// Re-export commonly used types
pub use context::DecisionContext;
pub use decision::{RoutingDecision, RoutingResult};
pub use error::{RouterError, RouterResult};
pub use path::RoutingPath;
pub use registry::{RegistryListener, ServiceDefinition, ServiceRegistry};
pub use validate::InputValidator;
