//! # Router Config
//!
//! Configuration management for the service router.
//!
//! This crate provides:
//! - The serde configuration model with the documented defaults
//! - Loading from YAML, TOML, or JSON files
//! - Startup validation that surfaces `Configuration` errors before any
//!   request is routed

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod loader;
pub mod model;

pub use loader::load_from_path;
pub use model::{
    AbTestConfig, CacheConfig, ClassifierKind, EdgeConfig, ExternalConfig, GraphConfig,
    RouterConfig, ServiceConfig, TierConfig,
};
