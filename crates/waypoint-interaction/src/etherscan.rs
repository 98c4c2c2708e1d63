//! Wallet balance lookup through the Etherscan account API.

use crate::http::{ensure_success, read_json, transport_error};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use waypoint_core::config::EtherscanConfig;
use waypoint_core::wallet::{WalletBalanceService, WeiBalance, validate_address};
use waypoint_core::{Result, WaypointError};

const OPERATION: &str = "fetch wallet balance";

/// `{"status": "1", "message": "OK", "result": "<wei>"}`. On failure the
/// result holds an error description instead.
#[derive(Debug, Deserialize)]
struct BalanceResponse {
    status: String,
    #[serde(default)]
    message: String,
    result: String,
}

fn into_balance(response: BalanceResponse) -> Result<WeiBalance> {
    if response.status != "1" {
        return Err(WaypointError::remote(
            OPERATION,
            format!("{}: {}", response.message, response.result),
        ));
    }
    response.result.parse()
}

#[derive(Clone)]
pub struct EtherscanClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl EtherscanClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config(config: &EtherscanConfig) -> Self {
        Self::new(config.base_url.clone(), config.api_key.clone())
    }

    fn balance_request(&self, address: &str) -> reqwest::RequestBuilder {
        let mut params = vec![
            ("module", "account"),
            ("action", "balance"),
            ("address", address),
            ("tag", "latest"),
        ];
        if let Some(key) = self.api_key.as_deref() {
            params.push(("apikey", key));
        }

        self.client
            .get(format!("{}/api", self.base_url))
            .query(&params)
            .timeout(Duration::from_secs(10))
    }
}

#[async_trait]
impl WalletBalanceService for EtherscanClient {
    async fn balance(&self, address: &str) -> Result<WeiBalance> {
        validate_address(address)?;
        tracing::debug!("[Etherscan] Fetching balance of {}", address);

        let response = self
            .balance_request(address)
            .send()
            .await
            .map_err(|e| transport_error(OPERATION, e))?;
        let response = ensure_success(OPERATION, response).await?;
        let body: BalanceResponse = read_json(OPERATION, response).await?;
        into_balance(body)
    }
}
