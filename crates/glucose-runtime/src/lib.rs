//! Runtime layer for the meal-glucose dashboard.
//!
//! Loads the dataset off the async executor, holds the interactive filter
//! state and renders query results into reports for the non-interactive
//! views.

pub mod loader;
pub mod report;
pub mod session;

pub use glucose_core as core;
pub use glucose_data as data;
