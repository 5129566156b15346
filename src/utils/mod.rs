//! Utility functions module
//!
//! This module contains console formatting helpers, interactive prompts and
//! the field validators shared by both input paths.

pub mod format;
pub mod interactive;

pub use format::*;
pub use interactive::*;
