use async_trait::async_trait;
use gl_api_types::{GiftCard, NetworkInfo};
use gl_chain_client::{ChainError, CreateGiftCard, GiftLedger, PreparedCall, RedeemReceipt};
use serde::Deserialize;
use tracing::warn;

pub const CITREA_TESTNET_CHAIN_ID: u64 = 5115;

/// Static description of the Citrea testnet, the network the gift-card
/// contract is deployed on.
pub fn citrea_testnet() -> NetworkInfo {
    NetworkInfo {
        chain_id: CITREA_TESTNET_CHAIN_ID,
        name: "Citrea Chain Testnet".to_owned(),
        native_symbol: "CBTC".to_owned(),
        native_decimals: 18,
        rpc_urls: vec!["https://rpc.testnet.citrea.xyz/".to_owned()],
        ws_urls: vec!["wss://ws.testnet.citrea.xyz".to_owned()],
        explorer_urls: vec!["https://explorer.testnet.citrea.xyz".to_owned()],
        testnet: true,
    }
}

pub fn supported_networks() -> Vec<NetworkInfo> {
    vec![citrea_testnet()]
}

/// HTTP adapter for the gift-card gateway fronting the Citrea contract.
///
/// Reads `CITREA_GATEWAY_URL` from environment at construction time
/// (default: `http://localhost:3000`). The gateway owns transaction
/// construction and signing; this adapter only assembles inputs and decodes
/// structured error codes.
pub struct CitreaGatewayAdapter {
    endpoint: String,
    http: reqwest::Client,
}

impl Default for CitreaGatewayAdapter {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CitreaGatewayAdapter {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("CITREA_GATEWAY_URL").ok())
            .unwrap_or_else(|| "http://localhost:3000".to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

// ── Gateway REST API types ─────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CreateResponse {
    card_id: String,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorResponse {
    code: String,
    message: String,
}

fn transport(context: &str, err: reqwest::Error) -> ChainError {
    ChainError::Transport {
        detail: format!("{context}: {err}"),
    }
}

/// Map a non-2xx gateway body onto the structured error taxonomy. An
/// unparseable body degrades to `Rpc` with the raw text as the message.
fn decode_error(status: reqwest::StatusCode, body: &str) -> ChainError {
    match serde_json::from_str::<GatewayErrorResponse>(body) {
        Ok(err) if err.code == "unsupported_network" => ChainError::UnsupportedNetwork {
            chain_id: CITREA_TESTNET_CHAIN_ID,
        },
        Ok(err) if err.code == "execution_reverted" => ChainError::Reverted {
            reason: err.message,
        },
        Ok(err) => ChainError::Rpc {
            code: err.code,
            message: err.message,
        },
        Err(_) => ChainError::Rpc {
            code: format!("http_{}", status.as_u16()),
            message: body.to_owned(),
        },
    }
}

#[async_trait]
impl GiftLedger for CitreaGatewayAdapter {
    fn chain_id(&self) -> u64 {
        CITREA_TESTNET_CHAIN_ID
    }

    async fn create_gift_card(&self, req: &CreateGiftCard) -> Result<String, ChainError> {
        let url = format!("{}/gift/create", self.endpoint);
        let response = self
            .http
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(|err| transport("gateway create", err))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(decode_error(status, &text));
        }

        let body: CreateResponse = response
            .json()
            .await
            .map_err(|err| ChainError::Decode {
                detail: format!("gateway create parse: {err}"),
            })?;

        Ok(body.card_id)
    }

    async fn simulate_redeem(&self, card_id: &str) -> Result<PreparedCall, ChainError> {
        let url = format!("{}/gift/simulate", self.endpoint);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "card_id": card_id }))
            .send()
            .await
            .map_err(|err| transport("gateway simulate", err))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(decode_error(status, &text));
        }

        response.json().await.map_err(|err| ChainError::Decode {
            detail: format!("gateway simulate parse: {err}"),
        })
    }

    async fn redeem(&self, call: &PreparedCall) -> Result<RedeemReceipt, ChainError> {
        // The prepared call goes back to the gateway exactly as simulation
        // returned it.
        let url = format!("{}/gift/redeem", self.endpoint);
        let response = self
            .http
            .post(&url)
            .json(call)
            .send()
            .await
            .map_err(|err| transport("gateway redeem", err))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(decode_error(status, &text));
        }

        response.json().await.map_err(|err| ChainError::Decode {
            detail: format!("gateway redeem parse: {err}"),
        })
    }

    async fn gift_card(&self, card_id: &str) -> Result<Option<GiftCard>, ChainError> {
        let url = format!("{}/gift/{}", self.endpoint, card_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| transport("gateway lookup", err))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("gift card lookup for {card_id} failed with HTTP {status}");
            return Err(decode_error(status, &text));
        }

        let card: GiftCard = response.json().await.map_err(|err| ChainError::Decode {
            detail: format!("gateway lookup parse: {err}"),
        })?;

        Ok(Some(card))
    }
}
