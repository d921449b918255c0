//! Blockfrost-backed verifier.

use std::time::Duration;

use async_trait::async_trait;
use agentpay_core::{AgentPayError, Result, Verification};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::verifier::LedgerVerifier;

/// Public Blockfrost endpoint for Cardano Preprod.
pub const PREPROD_BASE_URL: &str = "https://cardano-preprod.blockfrost.io/api/v0";

const LOVELACE: &str = "lovelace";

/// Configuration for the Blockfrost client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockfrostConfig {
    /// API base URL, without trailing slash.
    pub base_url: String,

    /// Project id sent in the `project_id` header.
    pub project_id: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl BlockfrostConfig {
    /// Preprod configuration with the default 20 second timeout.
    pub fn preprod(project_id: impl Into<String>) -> Self {
        Self {
            base_url: PREPROD_BASE_URL.to_string(),
            project_id: project_id.into(),
            timeout: Duration::from_secs(20),
        }
    }
}

/// Response of `GET /txs/{hash}/utxos`.
#[derive(Debug, Clone, Deserialize)]
pub struct TxUtxos {
    #[serde(default)]
    pub outputs: Vec<TxOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxOutput {
    pub address: String,
    #[serde(default)]
    pub amount: Vec<TxAmount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxAmount {
    pub unit: String,
    pub quantity: String,
}

impl TxUtxos {
    /// Total lovelace sent to `address` across all outputs.
    pub fn lovelace_to(&self, address: &str) -> Result<u64> {
        let mut received: u64 = 0;
        for output in self.outputs.iter().filter(|o| o.address == address) {
            for amount in output.amount.iter().filter(|a| a.unit == LOVELACE) {
                let value: u64 = amount.quantity.parse().map_err(|_| {
                    AgentPayError::transient(format!(
                        "unparseable lovelace quantity '{}'",
                        amount.quantity
                    ))
                })?;
                received = received.saturating_add(value);
            }
        }
        Ok(received)
    }
}

/// Whether `tx_hash` can name a transaction at all.
fn is_tx_hash(tx_hash: &str) -> bool {
    !tx_hash.is_empty() && tx_hash.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Verifier that reads transaction outputs from Blockfrost.
pub struct BlockfrostVerifier {
    config: BlockfrostConfig,
    base_url: Url,
    http_client: reqwest::Client,
}

impl BlockfrostVerifier {
    /// Create a verifier.
    pub fn new(config: BlockfrostConfig) -> Result<Self> {
        if config.project_id.trim().is_empty() {
            return Err(AgentPayError::Configuration(
                "Blockfrost project id is required".to_string(),
            ));
        }

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                AgentPayError::Configuration(format!("invalid Blockfrost URL '{}'", config.base_url))
            })?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentPayError::Configuration(e.to_string()))?;

        Ok(Self {
            config: BlockfrostConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
            base_url,
            http_client,
        })
    }

    async fn fetch_utxos(&self, tx_hash: &str) -> Result<Option<TxUtxos>> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AgentPayError::Configuration(format!("invalid Blockfrost URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(["txs", tx_hash, "utxos"]);

        let response = self
            .http_client
            .get(url)
            .header("project_id", &self.config.project_id)
            .send()
            .await
            .map_err(|e| {
                warn!(tx_hash, error = %e, "Blockfrost request failed");
                AgentPayError::transient(e.to_string())
            })?;

        match response.status() {
            // Unknown or malformed hash: the ledger answered, there is no such payment.
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Ok(None),
            status if status.is_success() => {
                let utxos = response
                    .json::<TxUtxos>()
                    .await
                    .map_err(|e| AgentPayError::transient(format!("invalid Blockfrost response: {}", e)))?;
                Ok(Some(utxos))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!(tx_hash, %status, body = %body, "Blockfrost returned an error");
                Err(AgentPayError::transient(format!(
                    "Blockfrost returned {}: {}",
                    status, body
                )))
            }
        }
    }
}

#[async_trait]
impl LedgerVerifier for BlockfrostVerifier {
    async fn verify(&self, tx_hash: &str, destination: &str, min_amount: u64) -> Result<Verification> {
        if !is_tx_hash(tx_hash) {
            debug!(tx_hash, "Not a transaction hash");
            return Ok(Verification::not_found());
        }

        let Some(utxos) = self.fetch_utxos(tx_hash).await? else {
            debug!(tx_hash, "Transaction not found");
            return Ok(Verification::not_found());
        };

        let received = utxos.lovelace_to(destination)?;
        debug!(tx_hash, received, required = min_amount, "Transaction outputs summed");

        Ok(Verification::observed(received, min_amount))
    }

    fn name(&self) -> &'static str {
        "blockfrost"
    }
}
