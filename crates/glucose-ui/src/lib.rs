//! Terminal UI layer for the meal-glucose dashboard.
//!
//! Provides themes, the header and selector components, the glucose chart
//! with its zoom/pan viewport, the animated composition panel and the main
//! application event loop built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod composition_view;
pub mod themes;
pub mod transition;
pub mod viewport;

pub use glucose_core as core;
