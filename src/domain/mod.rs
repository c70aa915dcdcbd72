//! Domain layer for CSS Inspector
//!
//! CDD Principle: Domain Model - Pure types for stylesheet findings
//! - Diagnostics and reports describe what a check run found
//! - Projections describe what an extraction returns
//! - Independent of the parser, the file system and the CLI

pub mod diagnostics;
pub mod projections;

// Re-export main domain types for convenience
pub use diagnostics::*;
pub use projections::*;
