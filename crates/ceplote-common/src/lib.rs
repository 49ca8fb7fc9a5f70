//! Ceplote Common Library
//!
//! Shared types and utilities for the Ceplote workspace.
//!
//! # Overview
//!
//! This crate provides common functionality used across all Ceplote workspace members:
//!
//! - **CEP**: postal code normalization and validation
//! - **Types**: job status and the wire types shared by server and CLI
//! - **Logging**: tracing subscriber setup shared by both binaries
//!
//! # Example
//!
//! ```
//! use ceplote_common::cep::Cep;
//!
//! let cep = Cep::normalize("01001-000")?;
//! assert_eq!(cep.as_str(), "01001000");
//! # Ok::<(), ceplote_common::cep::InvalidCep>(())
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod cep;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use cep::{Cep, InvalidCep};
pub use types::JobStatus;
