pub mod cli;
pub mod config;
pub mod consumer;
pub mod db;
pub mod dhash;
pub mod error;
pub mod hamming;
pub mod indexer;
pub mod message;
mod metrics;
pub mod queue;
mod server;
pub mod similarity;
pub mod source;

pub use config::Opts;
pub use error::IndexError;
pub use indexer::Indexer;
