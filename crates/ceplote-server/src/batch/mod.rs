//! Batch enrichment engine
//!
//! The orchestrator that drives a job end-to-end, plus advisory throughput
//! reporting. Concurrency within a batch is bounded by
//! `stream::buffer_unordered`; batches are sequential relative to each other
//! so every committed batch is a durable checkpoint.

pub mod progress;
pub mod runner;

pub use runner::{JobRunner, RunnerError};
