//! CLI command implementations.

pub mod backup;
pub mod common;
pub mod config;
pub mod deploy;
pub mod event;
pub mod geometry;
pub mod project;
pub mod report;
