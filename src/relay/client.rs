//! JSON-RPC client for a Flashbots-compatible bundle relay.
//!
//! # Responsibilities
//! - Sign every request body with the ephemeral auth key
//! - Simulate bundles (`eth_callBundle`)
//! - Submit bundles (`eth_sendBundle`)
//!
//! # Authentication
//! `X-Flashbots-Signature: <address>:<signature>` where the signature is an
//! EIP-191 personal signature over the `0x`-hex string of `keccak256(body)`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy::hex;
use alloy::primitives::{keccak256, Address, Bytes};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::blockchain::Wallet;
use crate::config::RelayConfig;
use crate::relay::types::{
    BundleReceipt, RelayError, RelayResult, SignedBundle, SimulationReport,
};
use crate::relay::BundleRelay;

/// Header carrying the relay authentication signature.
pub const SIGNATURE_HEADER: &str = "X-Flashbots-Signature";

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: [P; 1],
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<R> {
    result: Option<R>,
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CallBundleParams {
    txs: Vec<Bytes>,
    block_number: String,
    state_block_number: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendBundleParams {
    txs: Vec<Bytes>,
    block_number: String,
}

/// Bundle relay client.
pub struct RelayClient {
    http: reqwest::Client,
    url: url::Url,
    auth: Wallet,
    next_id: AtomicU64,
}

impl RelayClient {
    /// Create a relay client authenticating with `auth`.
    pub fn new(config: &RelayConfig, auth: Wallet) -> RelayResult<Self> {
        let url: url::Url = config
            .url
            .parse()
            .map_err(|_| RelayError::InvalidUrl(config.url.clone()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        tracing::info!(
            relay_url = %url,
            auth_address = %auth.address(),
            "Relay client initialized"
        );

        Ok(Self {
            http,
            url,
            auth,
            next_id: AtomicU64::new(1),
        })
    }

    /// Address of the ephemeral key that signs relay requests.
    pub fn auth_address(&self) -> Address {
        self.auth.address()
    }

    /// Build the `X-Flashbots-Signature` header value for a request body.
    pub async fn signature_header(&self, body: &[u8]) -> RelayResult<String> {
        let digest = hex::encode_prefixed(keccak256(body));
        let signature = self.auth.sign_message(digest.as_bytes()).await?;
        Ok(format!(
            "{}:{}",
            self.auth.address(),
            hex::encode_prefixed(signature.as_bytes())
        ))
    }

    /// Simulate a bundle on top of the latest state against its target block.
    pub async fn call_bundle(&self, bundle: &SignedBundle) -> RelayResult<SimulationReport> {
        let params = CallBundleParams {
            txs: bundle.raw_transactions(),
            block_number: format!("{:#x}", bundle.target_block),
            state_block_number: "latest",
        };
        self.call("eth_callBundle", params).await
    }

    /// Submit a bundle for inclusion in its target block.
    pub async fn send_bundle(&self, bundle: &SignedBundle) -> RelayResult<BundleReceipt> {
        let params = SendBundleParams {
            txs: bundle.raw_transactions(),
            block_number: format!("{:#x}", bundle.target_block),
        };
        self.call("eth_sendBundle", params).await
    }

    async fn call<P, R>(&self, method: &str, params: P) -> RelayResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params: [params],
        };
        let body = serde_json::to_vec(&request)?;
        let signature = self.signature_header(&body).await?;

        tracing::debug!(method = method, id = request.id, "Relay request");

        let response = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            // Relays answer bad bundles with 4xx plus a JSON-RPC error body.
            if let Ok(JsonRpcResponse::<serde_json::Value> { error: Some(error), .. }) =
                serde_json::from_slice(&bytes)
            {
                return Err(RelayError::Rpc {
                    code: error.code,
                    message: error.message,
                });
            }
            return Err(RelayError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let decoded: JsonRpcResponse<R> = serde_json::from_slice(&bytes)?;
        if let Some(error) = decoded.error {
            return Err(RelayError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        decoded
            .result
            .ok_or_else(|| RelayError::EmptyResult(method.to_string()))
    }
}

impl BundleRelay for RelayClient {
    async fn simulate(&self, bundle: &SignedBundle) -> RelayResult<SimulationReport> {
        self.call_bundle(bundle).await
    }

    async fn send(&self, bundle: &SignedBundle) -> RelayResult<BundleReceipt> {
        self.send_bundle(bundle).await
    }
}

impl std::fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayClient")
            .field("url", &self.url.as_str())
            .field("auth_address", &self.auth.address())
            .finish()
    }
}
