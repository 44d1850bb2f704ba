//! Simple SDK Example
//!
//! Demonstrates basic usage of the Shardform SDK.
//!
//! # Usage
//!
//! 1. Generate a shard and start the daemon:
//!    ```bash
//!    shardform generate --source Credit.csv --target-rows 100000 --shard-size 10000
//!    cargo run --package shardform-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --example simple -- data/Amount_Shard_1.parquet
//!    ```

use shardform_sdk::ShardformClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let shard = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/Amount_Shard_1.parquet".to_string());

    println!("Shardform SDK - Simple Example");
    println!("==============================\n");

    // 1. Connect to daemon
    println!("1. Connecting to daemon...");
    let client = ShardformClient::connect("http://127.0.0.1:9537").await?;
    println!("   ✓ Connected\n");

    // 2. Transform a shard
    println!("2. Transforming {}...", shard);
    match client.transform(&shard).await {
        Ok(response) => {
            println!("   ✓ Job {} finished in {}", response.job_id, response.total_time_taken);
            println!("     - Rows: {}", response.rows_transformed);
            println!("     - Transformed: {}", response.transformed_file_path);
            println!("     - Inverse: {}\n", response.inverse_transformed_file_path);
        }
        Err(e) => {
            println!("   ✗ {} (job: {})\n", e, e.job_id().unwrap_or("-"));
        }
    }

    // 3. Stats
    println!("3. Fetching stats...");
    let stats = client.stats().await?;
    println!(
        "   ✓ {} started, {} succeeded, {} failed, {} job dirs\n",
        stats.jobs_started, stats.jobs_succeeded, stats.jobs_failed, stats.job_dirs
    );

    println!("✓ Example completed successfully!");

    Ok(())
}
