//! Shardform CLI - Command-line interface for the Shardform daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shardform_infra_parquet::{fixture, ParquetStore, ShardPlan};
use std::path::PathBuf;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9537";

#[derive(Parser)]
#[command(name = "shardform")]
#[command(about = "Shardform transform service CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "SHARDFORM_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform one shard (and inverse-transform the result)
    Transform {
        /// Shard path as seen by the daemon (.parquet or .csv)
        file_path: String,
    },

    /// Show daemon status
    Status,

    /// Delete expired job directories
    Maintenance {
        /// Retention in days (default: daemon setting)
        #[arg(long)]
        retention_days: Option<i64>,
    },

    /// Generate sharded test data from one column of a source file (local)
    Generate {
        /// Source file (.csv or .parquet)
        #[arg(long)]
        source: PathBuf,

        /// Column to replicate
        #[arg(long, default_value = "Amount")]
        column: String,

        /// Total rows across all shards
        #[arg(long)]
        target_rows: usize,

        /// Rows per shard
        #[arg(long)]
        shard_size: usize,

        /// Output directory
        #[arg(long, default_value = "data")]
        out: PathBuf,

        /// Also write CSV copies
        #[arg(long)]
        csv: bool,
    },
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Deserialize, Tabled)]
struct TransformResult {
    job_id: String,
    rows_transformed: usize,
    total_time_taken: String,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        match error.data {
            Some(data) => anyhow::bail!(
                "RPC error ({}): {} (job_id={}, stage={})",
                error.code,
                error.message,
                data["job_id"].as_str().unwrap_or("-"),
                data["stage"].as_str().unwrap_or("-")
            ),
            None => anyhow::bail!("RPC error ({}): {}", error.code, error.message),
        }
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn format_bytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

fn generate(plan: ShardPlan) -> Result<()> {
    let shards = plan.shard_count() as u64;
    let bar = ProgressBar::new(shards);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} shards {msg}")
            .context("Invalid progress template")?
            .progress_chars("=> "),
    );

    let written = fixture::generate(&ParquetStore::new(), &plan, |_, paths| {
        if let Some(name) = paths.first().and_then(|p| p.file_name()) {
            bar.set_message(name.to_string_lossy().into_owned());
        }
        bar.inc(1);
    })?;
    bar.finish_with_message("done");

    println!(
        "{}",
        format!("✓ {} files written to {}", written.len(), plan.out_dir.display())
            .green()
            .bold()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Transform { file_path } => {
            let params = json!({ "file_path": file_path });

            let result = call_rpc(&cli.rpc_url, "data.transform.v1", params).await?;
            let transformed = result["transformed_file_path"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let inverse = result["inverse_transformed_file_path"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let summary: TransformResult = serde_json::from_value(result)?;

            println!("{}", "✓ Shard transformed successfully".green().bold());
            println!();
            println!("{}", Table::new(vec![summary]));
            println!();
            println!("  {} {}", "Transformed:".bold(), transformed);
            println!("  {} {}", "Inverse:".bold(), inverse);
        }

        Commands::Status => {
            println!("{}", "System Status".cyan().bold());
            println!();

            match call_rpc(&cli.rpc_url, "admin.stats.v1", json!({})).await {
                Ok(stats) => {
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();
                    println!("  {} {}", "Jobs Started:".bold(), stats["jobs_started"]);
                    println!("  {} {}", "Succeeded:".bold(), stats["jobs_succeeded"]);
                    println!("  {} {}", "Failed:".bold(), stats["jobs_failed"]);
                    println!();
                    println!("  {} {}", "Job Dirs:".bold(), stats["job_dirs"]);
                    println!(
                        "  {} {}",
                        "Data Size:".bold(),
                        format_bytes(stats["data_dir_bytes"].as_u64().unwrap_or(0))
                    );
                    println!("  {} {} seconds", "Uptime:".bold(), stats["uptime_seconds"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }

        Commands::Maintenance { retention_days } => {
            println!("{}", "Running maintenance...".cyan().bold());
            println!();

            let params = json!({ "retention_days": retention_days });

            match call_rpc(&cli.rpc_url, "admin.maintenance.v1", params).await {
                Ok(result) => {
                    println!("  ✓ Maintenance completed");
                    println!("  {} {} job dirs deleted", "✓".green(), result["jobs_deleted"]);
                    println!(
                        "  {} {} → {}",
                        "Data Size:".bold(),
                        format_bytes(result["bytes_before"].as_u64().unwrap_or(0)),
                        format_bytes(result["bytes_after"].as_u64().unwrap_or(0))
                    );
                }
                Err(e) => {
                    println!("  {} Maintenance failed: {}", "✗".red(), e);
                }
            }
        }

        Commands::Generate {
            source,
            column,
            target_rows,
            shard_size,
            out,
            csv,
        } => {
            generate(ShardPlan {
                source,
                column,
                target_rows,
                shard_size,
                out_dir: out,
                write_csv: csv,
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.00 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 / 2), "1.50 MB");
    }

    #[test]
    fn test_parse_generate_args() {
        let cli = Cli::try_parse_from([
            "shardform",
            "generate",
            "--source",
            "Credit.csv",
            "--target-rows",
            "100",
            "--shard-size",
            "10",
            "--csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                column, csv, out, ..
            } => {
                assert_eq!(column, "Amount");
                assert!(csv);
                assert_eq!(out, PathBuf::from("data"));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_rpc_error_data_is_optional() {
        let resp: JsonRpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":4001,"message":"Not found: File not found: x"}}"#,
        )
        .unwrap();
        let error = resp.error.unwrap();
        assert_eq!(error.code, 4001);
        assert!(error.data.is_none());
    }
}
