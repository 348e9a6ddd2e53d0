//! # JobPortal Domain
//!
//! Business domain types shared by the JobPortal admin client.
//!
//! This crate contains:
//! - The REST data model (jobs, applications, candidates, packages,
//!   advertisements, homepage content, team limits, sessions)
//! - Domain error types and Result definitions
//! - Client configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other JobPortal crates
//! - No I/O
//! - Pure data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
