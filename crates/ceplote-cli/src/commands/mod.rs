//! CLI command implementations

pub mod export;
pub mod job;
pub mod jobs;
pub mod lookup;
pub mod providers;
pub mod run;
pub mod upload;
