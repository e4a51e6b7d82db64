pub mod config;
pub mod error;
pub mod logging;

// Run pipeline: producer → queue → workers → aggregate → report
pub mod aggregate;
pub mod coordinator;
pub mod deadline;
pub mod fetcher;
pub mod queue;
pub mod report;
pub mod worker;
