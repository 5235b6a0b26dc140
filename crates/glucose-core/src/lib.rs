//! Core domain types for the meal-glucose dashboard.
//!
//! Holds the observation model, the row classifier that turns raw dataset
//! rows into classified observations, the error taxonomy, CLI settings and
//! the number formatting helpers shared by the report and TUI layers.

pub mod classifier;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{DashboardError, Result};
