use axum::{Json, extract::State};
use gl_api_types::ChainConfigResponse;
use gl_chain_citrea::supported_networks;
use std::sync::Arc;

use crate::{ApiResult, AppState};

/// Returns the canonical chain configuration for gift-card clients: the
/// supported-network list and the wallet-connector project id needed to
/// open a wallet session against the right chain.
pub(crate) async fn chain_config(
    State(state): State<Arc<AppState>>,
) -> ApiResult<ChainConfigResponse> {
    Ok(Json(ChainConfigResponse {
        networks: supported_networks(),
        wallet_project_id: state.config.wallet_project_id.clone(),
        default_chain_id: state.config.default_chain_id,
    }))
}
