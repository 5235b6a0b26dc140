//! Data ingestion and aggregation layer for the meal-glucose dashboard.
//!
//! Reads the zipped meal dataset, classifies each row into observations,
//! holds them in an append-only store and computes the grouped glucose
//! curves, macro composition and chart extents the presentation layer draws.

pub mod aggregator;
pub mod analysis;
pub mod domain;
pub mod prepare;
pub mod reader;
pub mod store;

pub use glucose_core as core;
