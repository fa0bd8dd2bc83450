//! Runtime tasks: message ingestion and display refresh

mod ingestion;
pub mod network;
mod refresh_scheduler;

pub use ingestion::run_ingestion;
pub use refresh_scheduler::RefreshScheduler;
