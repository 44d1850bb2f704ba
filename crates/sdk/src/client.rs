//! Shardform Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    MaintenanceRequest, MaintenanceResponse, StatsResponse, TransformRequest, TransformResponse,
};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::Serialize;
use std::time::Duration;

/// Large shards take a while to fit and transform
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Shardform daemon client
///
/// # Example
///
/// ```no_run
/// use shardform_sdk::ShardformClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ShardformClient::connect("http://127.0.0.1:9537").await?;
/// let response = client.transform("data/Amount_Shard_1.parquet").await?;
/// println!("{} -> {}", response.job_id, response.transformed_file_path);
/// # Ok(())
/// # }
/// ```
pub struct ShardformClient {
    client: HttpClient,
}

impl ShardformClient {
    /// Connect to the Shardform daemon
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9537`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(REQUEST_TIMEOUT)
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    /// Transform one shard and inverse-transform the result
    ///
    /// # Arguments
    ///
    /// * `file_path` - Shard path as seen by the daemon
    pub async fn transform(&self, file_path: impl Into<String>) -> Result<TransformResponse> {
        let request = TransformRequest {
            file_path: file_path.into(),
        };
        let response: TransformResponse = self
            .client
            .request("data.transform.v1", object_params(&request)?)
            .await?;

        Ok(response)
    }

    /// Daemon counters and data directory usage
    pub async fn stats(&self) -> Result<StatsResponse> {
        let response: StatsResponse = self.client.request("admin.stats.v1", rpc_params![]).await?;
        Ok(response)
    }

    /// Delete expired job directories
    ///
    /// # Arguments
    ///
    /// * `retention_days` - Override the daemon's configured retention
    pub async fn maintenance(&self, retention_days: Option<i64>) -> Result<MaintenanceResponse> {
        let request = MaintenanceRequest { retention_days };
        let response: MaintenanceResponse = self
            .client
            .request("admin.maintenance.v1", object_params(&request)?)
            .await?;

        Ok(response)
    }
}

/// Named params from a request struct
fn object_params<T: Serialize>(request: &T) -> Result<ObjectParams> {
    let mut params = ObjectParams::new();
    match serde_json::to_value(request)? {
        serde_json::Value::Object(fields) => {
            for (key, value) in fields {
                params.insert(&key, value)?;
            }
        }
        other => {
            return Err(SdkError::Other(format!(
                "request must serialize to an object, got {}",
                other
            )))
        }
    }
    Ok(params)
}
