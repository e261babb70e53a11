//! Droid Sweeper - disk usage and Gradle project analysis for Android developers
//!
//! This crate provides functionality for:
//! - Measuring the Gradle home, Android SDK, emulators, Kotlin/Native, IDE data and JDKs
//! - Analyzing Gradle build files and version catalogs against the local module cache
//! - Discovering and deleting Gradle build directories

pub mod cleaner;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod paths;
pub mod project;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SweeperError};
