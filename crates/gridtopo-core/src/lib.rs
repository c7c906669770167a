//! Gridtopo Core - Domain models, attribute normalization, and configuration
//!
//! This crate contains the core domain types and port definitions shared by the
//! grid topology pipeline and its collaborators.

pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod ports;

pub use error::{GridError, Result, Stage};
