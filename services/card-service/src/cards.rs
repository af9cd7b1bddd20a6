use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use gl_api_types::{
    ClaimCardRequest, ClaimCardResponse, CreateCardRequest, CreateCardResponse, CreationDraft,
    GiftCard,
};
use gl_card_core::{ClaimError, ClaimForm, CreationError, CreationForm, EmailOutcome};
use gl_chain_client::{ChainError, GiftLedger};
use std::sync::Arc;
use tracing::warn;

use crate::{
    ApiResult, AppState, ErrorResponse, bad_gateway, bad_request, not_found, unsupported_network,
};

fn ledger_for(
    state: &AppState,
    chain_id: Option<u64>,
) -> Result<Arc<dyn GiftLedger>, (StatusCode, Json<ErrorResponse>)> {
    let chain_id = chain_id.unwrap_or(state.config.default_chain_id);
    state
        .registry
        .ledger(chain_id)
        .ok_or_else(|| unsupported_network(chain_id))
}

fn chain_error(err: ChainError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        ChainError::UnsupportedNetwork { chain_id } => unsupported_network(chain_id),
        ChainError::Reverted { reason } => bad_request(&format!("contract call reverted: {reason}")),
        other => {
            warn!("ledger call failed: {other}");
            bad_gateway("ledger is unavailable")
        }
    }
}

pub(crate) async fn create_card(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCardRequest>,
) -> ApiResult<CreateCardResponse> {
    let ledger = ledger_for(&state, request.chain_id)?;

    let draft = CreationDraft {
        recipient_name: request.recipient_name,
        recipient_address: request.recipient_address,
        recipient_email: request.recipient_email,
        amount: request.amount,
        message: request.message,
        theme: request.theme,
        ..CreationDraft::default()
    };

    let mut form = CreationForm::new(
        ledger,
        Arc::clone(&state.mailer),
        state.config.base_url.clone(),
        request.sender_address,
    )
    .with_draft(draft);

    let receipt = form.submit().await.map_err(|err| match err {
        CreationError::SwitchNetwork { chain_id } => unsupported_network(chain_id),
        CreationError::CreationFailed { .. } => bad_gateway("gift card creation failed"),
        validation => bad_request(&validation.to_string()),
    })?;

    let (email_sent, email_error) = match receipt.email {
        EmailOutcome::Sent { .. } => (true, None),
        EmailOutcome::Failed { detail } => (false, Some(detail)),
    };

    Ok(Json(CreateCardResponse {
        card_id: receipt.card_id,
        claim_link: receipt.claim_link,
        email_sent,
        email_error,
    }))
}

pub(crate) async fn get_card(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<String>,
) -> ApiResult<GiftCard> {
    let ledger = ledger_for(&state, None)?;

    let card = ledger.gift_card(&card_id).await.map_err(chain_error)?;
    card.map(Json).ok_or_else(|| not_found("gift card not found"))
}

pub(crate) async fn claim_card(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<String>,
    Json(request): Json<ClaimCardRequest>,
) -> ApiResult<ClaimCardResponse> {
    let ledger = ledger_for(&state, request.chain_id)?;

    let card = ledger
        .gift_card(&card_id)
        .await
        .map_err(chain_error)?
        .ok_or_else(|| not_found("gift card not found"))?;

    let mut form = ClaimForm::new(ledger, card, card_id.clone())
        .map_err(|err| bad_request(&err.to_string()))?;

    form.refresh_simulation().await.map_err(chain_error)?;

    let receipt = form.submit().await.map_err(|err| match err {
        ClaimError::Failed { source } => chain_error(source),
        precondition => bad_request(&precondition.to_string()),
    })?;

    Ok(Json(ClaimCardResponse {
        card_id,
        tx_hash: receipt.tx_hash,
        accepted: receipt.accepted,
    }))
}
