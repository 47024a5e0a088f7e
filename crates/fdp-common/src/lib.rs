//! FDP Common Library
//!
//! Shared infrastructure for the Fortune Data Platform workspace.
//!
//! # Overview
//!
//! This crate provides functionality used across all FDP workspace members:
//!
//! - **Logging**: Centralized tracing configuration and initialization
//!
//! # Example
//!
//! ```no_run
//! use fdp_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     Ok(())
//! }
//! ```

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
