//! Core domain models
//!
//! Pipelines, the context shared by one run, configuration shapes and the
//! pipeline registry.

pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod store;

pub use context::*;
pub use error::*;
pub use pipeline::*;
pub use store::*;
