//! # Foodprint Common Library
//!
//! Shared code for the Foodprint services including:
//! - Error type shared by every crate
//! - Bootstrap TOML configuration and root folder resolution
//! - Reference store database initialisation and schema

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;

pub use error::{Error, Result};
