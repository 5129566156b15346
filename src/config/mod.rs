//! Configuration management module
//!
//! This module handles settings loading and persistence, and the interactive
//! collection of deployment parameters.

pub mod init;
pub mod settings;

pub use settings::*;
