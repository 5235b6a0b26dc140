pub mod header;
pub mod indicators;
pub mod progress_bar;
