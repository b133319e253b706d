use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::BcvConfig;
use crate::errors::ValidationError;
use crate::types::to_raw_hex;

/// Source of runtime bytecode for one chain.
#[async_trait]
pub trait CodeFetcher: Send + Sync {
    /// `0x`-prefixed runtime code at `address`, `0x` if the account has none.
    async fn get_code(&self, address: &str) -> Result<String, ValidationError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Web3Response {
    pub jsonrpc: String,
    pub id: u64,
    pub result: Option<Value>,
    pub error: Option<Value>,
}

/// JSON-RPC client bound to one endpoint.
#[derive(Debug, Clone)]
pub struct RpcClient {
    node_url: String,
    client: Client,
}

impl RpcClient {
    pub fn new(node_url: &str, timeout_secs: u64) -> Result<Self, ValidationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(RpcClient {
            node_url: node_url.to_string(),
            client,
        })
    }

    pub fn for_chain(config: &BcvConfig, chain_id: u64) -> Result<Self, ValidationError> {
        Self::new(&config.get_rpc_url_for(chain_id)?, config.web3_timeout)
    }

    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    async fn send_web3_post(&self, request_body: &Value) -> Result<Value, ValidationError> {
        debug!("Web3 request_body: {:?}", request_body);
        let res = self
            .client
            .post(&self.node_url)
            .json(request_body)
            .send()
            .await?
            .json::<Web3Response>()
            .await?;

        if let Some(error) = res.error {
            return Err(ValidationError::from(format!("Web3Error: {:?}", error)));
        };

        debug!("Web3 response: {:?}", res.result);
        match res.result {
            Some(result) => Ok(result),
            None => Err(ValidationError::Error(
                "No result for web3 request.".to_string(),
            )),
        }
    }

    pub async fn get_eth_code(&self, address: &str) -> Result<String, ValidationError> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "method": "eth_getCode",
            "params": [address, "latest"],
            "id": 1
        });
        let result = self.send_web3_post(&request_body).await?;
        let code: String = serde_json::from_value(result)?;
        Ok(format!("0x{}", to_raw_hex(&code)))
    }

    pub async fn get_eth_chain_id(&self) -> Result<u64, ValidationError> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "method": "eth_chainId",
            "params": [],
            "id": 1
        });
        let result = self.send_web3_post(&request_body).await?;
        let chain_id_hex = result
            .as_str()
            .ok_or_else(|| ValidationError::from("eth_chainId did not return a string"))?;

        Ok(u64::from_str_radix(
            chain_id_hex.trim_start_matches("0x"),
            16,
        )?)
    }
}

#[async_trait]
impl CodeFetcher for RpcClient {
    async fn get_code(&self, address: &str) -> Result<String, ValidationError> {
        self.get_eth_code(address).await
    }
}

/// Serves code from memory, keyed by lower-case address. Unknown addresses
/// have no code.
#[derive(Debug, Clone, Default)]
pub struct StaticCodeFetcher {
    codes: HashMap<String, String>,
}

impl StaticCodeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(mut self, address: &str, code: &str) -> Self {
        self.codes.insert(address.to_lowercase(), code.to_string());
        self
    }
}

#[async_trait]
impl CodeFetcher for StaticCodeFetcher {
    async fn get_code(&self, address: &str) -> Result<String, ValidationError> {
        Ok(self
            .codes
            .get(&address.to_lowercase())
            .cloned()
            .unwrap_or_else(|| "0x".to_string()))
    }
}
