//! Shardform SDK - Rust Client Library
//!
//! Provides a convenient client for the Shardform transform daemon.
//!
//! # Example
//!
//! ```no_run
//! use shardform_sdk::ShardformClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect to daemon
//!     let client = ShardformClient::connect("http://127.0.0.1:9537").await?;
//!
//!     // Transform a shard
//!     let response = client.transform("data/Amount_Shard_1.parquet").await?;
//!
//!     println!("Job {} took {}", response.job_id, response.total_time_taken);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::ShardformClient;
pub use error::{Result, SdkError};
pub use types::{
    MaintenanceRequest, MaintenanceResponse, StatsResponse, TransformRequest, TransformResponse,
};
