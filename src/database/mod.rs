//! Database migration between environments

pub mod client;
pub mod pipeline;
pub mod state;

pub use client::{DatabaseClient, SearchReplaceOptions};
pub use pipeline::{DatabasePipeline, DatabaseReport};
pub use state::{Outcome, PipelineState};
