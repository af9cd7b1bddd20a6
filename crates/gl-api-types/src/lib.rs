use serde::{Deserialize, Serialize};

/// Visual theme of a gift card.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Blue,
    Purple,
    Green,
    Gold,
    Dark,
}

/// On-chain gift card snapshot. Assigned and mutated by the ledger only;
/// `redeemed` flips true once and never back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GiftCard {
    pub card_id: String,
    /// Escrowed balance in smallest currency units, carried as a string.
    pub pool_balance: String,
    pub owner: String,
    pub recipient: String,
    pub recipient_email: String,
    pub redeemed: bool,
}

/// In-progress creation form state. Owned by one form instance, reset to
/// defaults on successful submission, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreationDraft {
    pub recipient_name: String,
    pub recipient_address: String,
    pub recipient_email: String,
    /// Decimal amount at currency-unit scale, as typed.
    pub amount: String,
    pub currency: String,
    pub message: String,
    pub theme: Theme,
}

impl Default for CreationDraft {
    fn default() -> Self {
        Self {
            recipient_name: String::new(),
            recipient_address: String::new(),
            recipient_email: String::new(),
            amount: "1".to_owned(),
            currency: "CBTC".to_owned(),
            message: String::new(),
            theme: Theme::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkInfo {
    pub chain_id: u64,
    pub name: String,
    pub native_symbol: String,
    pub native_decimals: u8,
    pub rpc_urls: Vec<String>,
    pub ws_urls: Vec<String>,
    pub explorer_urls: Vec<String>,
    pub testnet: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfigResponse {
    pub networks: Vec<NetworkInfo>,
    pub wallet_project_id: String,
    pub default_chain_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCardRequest {
    #[serde(default)]
    pub chain_id: Option<u64>,
    pub sender_address: String,
    pub recipient_name: String,
    pub recipient_address: String,
    pub recipient_email: String,
    pub amount: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCardResponse {
    pub card_id: String,
    pub claim_link: String,
    pub email_sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimCardRequest {
    #[serde(default)]
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimCardResponse {
    pub card_id: String,
    pub tx_hash: String,
    pub accepted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistMessageRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistMessageResponse {
    pub message: String,
}
