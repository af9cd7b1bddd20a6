use async_trait::async_trait;
use gl_api_types::GiftCard;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Structured ledger failure taxonomy. Callers branch on variants, never on
/// message text.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("chain {chain_id} is not a supported network")]
    UnsupportedNetwork { chain_id: u64 },
    #[error("contract call reverted: {reason}")]
    Reverted { reason: String },
    #[error("gateway error {code}: {message}")]
    Rpc { code: String, message: String },
    #[error("transport failure: {detail}")]
    Transport { detail: String },
    #[error("malformed gateway response: {detail}")]
    Decode { detail: String },
}

/// A prepared redemption request produced by simulation. Submitted verbatim;
/// never reassembled by hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreparedCall {
    pub card_id: String,
    pub contract: String,
    pub calldata: String,
    pub chain_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGiftCard {
    pub recipient: String,
    /// Smallest-unit integer amount, carried as a string.
    pub amount_base_units: String,
    pub recipient_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemReceipt {
    pub tx_hash: String,
    pub accepted: bool,
}

#[async_trait]
pub trait GiftLedger: Send + Sync {
    fn chain_id(&self) -> u64;
    async fn create_gift_card(&self, req: &CreateGiftCard) -> Result<String, ChainError>;
    async fn simulate_redeem(&self, card_id: &str) -> Result<PreparedCall, ChainError>;
    async fn redeem(&self, call: &PreparedCall) -> Result<RedeemReceipt, ChainError>;
    async fn gift_card(&self, card_id: &str) -> Result<Option<GiftCard>, ChainError>;
}

#[derive(Default)]
pub struct NetworkRegistry {
    ledgers: HashMap<u64, Arc<dyn GiftLedger>>,
}

impl NetworkRegistry {
    pub fn register(&mut self, ledger: Arc<dyn GiftLedger>) {
        self.ledgers.insert(ledger.chain_id(), ledger);
    }

    pub fn ledger(&self, chain_id: u64) -> Option<Arc<dyn GiftLedger>> {
        self.ledgers.get(&chain_id).cloned()
    }
}
