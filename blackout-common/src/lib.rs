//! # Blackout Common Library
//!
//! Shared code for the blackout resolution services:
//! - Domain records (buildings, interruptions, weather, search results)
//! - Bootstrap configuration loading
//! - Timestamp parsing and arithmetic
//! - Database layout helpers for fixtures and local development

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod time;

pub use error::{Error, Result};
