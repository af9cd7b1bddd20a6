//! Gift-card claim form.
//!
//! Redemption is simulate-then-execute: the form stores the prepared call
//! produced by the dry run and submits that exact value. Submitting before
//! a prepared call exists is a precondition failure, not a crash.

use gl_api_types::GiftCard;
use gl_chain_client::{ChainError, GiftLedger, PreparedCall, RedeemReceipt};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("card id is required")]
    MissingCardId,
    #[error("redemption is still being prepared; try again shortly")]
    SimulationPending,
    #[error("a submission is already in flight")]
    Busy,
    #[error("failed to claim gift card")]
    Failed {
        #[source]
        source: ChainError,
    },
}

pub struct ClaimForm<L: ?Sized> {
    ledger: Arc<L>,
    card: GiftCard,
    card_id: String,
    prepared: Option<PreparedCall>,
    submitting: bool,
}

impl<L: ?Sized> std::fmt::Debug for ClaimForm<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimForm")
            .field("card", &self.card)
            .field("card_id", &self.card_id)
            .field("prepared", &self.prepared)
            .field("submitting", &self.submitting)
            .finish()
    }
}

impl<L> ClaimForm<L>
where
    L: GiftLedger + ?Sized,
{
    pub fn new(
        ledger: Arc<L>,
        card: GiftCard,
        card_id: impl Into<String>,
    ) -> Result<Self, ClaimError> {
        let card_id = card_id.into();
        if card_id.trim().is_empty() {
            return Err(ClaimError::MissingCardId);
        }
        Ok(Self {
            ledger,
            card,
            card_id,
            prepared: None,
            submitting: false,
        })
    }

    pub fn card(&self) -> &GiftCard {
        &self.card
    }

    pub fn prepared(&self) -> Option<&PreparedCall> {
        self.prepared.as_ref()
    }

    pub fn submitting(&self) -> bool {
        self.submitting
    }

    /// Dry-run the redemption and store the prepared call for submit.
    pub async fn refresh_simulation(&mut self) -> Result<(), ChainError> {
        self.prepared = Some(self.ledger.simulate_redeem(&self.card_id).await?);
        Ok(())
    }

    /// Execute the stored prepared call. The submitting flag is cleared on
    /// every exit path.
    pub async fn submit(&mut self) -> Result<RedeemReceipt, ClaimError> {
        if self.submitting {
            return Err(ClaimError::Busy);
        }
        self.submitting = true;
        let result = self.submit_prepared().await;
        self.submitting = false;
        result
    }

    async fn submit_prepared(&mut self) -> Result<RedeemReceipt, ClaimError> {
        let Some(call) = self.prepared.clone() else {
            return Err(ClaimError::SimulationPending);
        };

        self.ledger.redeem(&call).await.map_err(|source| {
            warn!("claim of card {} failed: {source}", self.card_id);
            ClaimError::Failed { source }
        })
    }
}
