//! Listing consolidation library - shared modules for all binaries.

pub mod config;
pub mod consolidate;
pub mod grouping;
pub mod models;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod ranking;
pub mod safety;
pub mod table;
