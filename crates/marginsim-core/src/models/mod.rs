//! Data models for quotes and configuration.

pub mod config;
pub mod quote;
