//! Foundation types for CONCH.
//!
//! This crate holds the types shared by every CONCH crate: the framework
//! error enum with its `Result` alias, and the console configuration loaded
//! at startup.

pub mod config;
pub mod error;
