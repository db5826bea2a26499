//! Data models for receipt processing.

pub mod config;
pub mod dictionary;
pub mod options;
pub mod receipt;
