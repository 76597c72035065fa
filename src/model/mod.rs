//! Data model shared by every pipeline stage.

pub mod types;
