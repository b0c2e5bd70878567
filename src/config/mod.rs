//! Configuration loader and validator.
//!
//! Responsibilities:
//! - Read environment variables to populate [`PipelineConfig`]
//! - Apply defaults when values are missing
//! - Validate constraints (the three directory roots must be set)

pub mod model;

pub use model::{PipelineConfig, Versioning};
