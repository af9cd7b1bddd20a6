use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use gl_assist::{HttpAssist, MessageAssist};
use gl_chain_citrea::{CITREA_TESTNET_CHAIN_ID, CitreaGatewayAdapter};
use gl_chain_client::NetworkRegistry;
use gl_mailer::{HttpMailer, Mailer};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

mod assist;
mod cards;
mod chain_config;


#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) code: Option<String>,
}

pub(crate) type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

pub(crate) struct AppState {
    pub(crate) registry: NetworkRegistry,
    pub(crate) mailer: Arc<dyn Mailer>,
    pub(crate) assist: Option<Arc<dyn MessageAssist>>,
    pub(crate) config: ServiceConfig,
}

#[derive(Clone)]
pub(crate) struct ServiceConfig {
    /// Public base URL claim links are built from.
    pub(crate) base_url: String,
    pub(crate) wallet_project_id: String,
    pub(crate) default_chain_id: u64,
}

impl ServiceConfig {
    fn from_env() -> Self {
        let wallet_project_id = std::env::var("WALLET_PROJECT_ID").unwrap_or_default();
        if wallet_project_id.is_empty() {
            warn!("WALLET_PROJECT_ID is not set; wallet connector config will be incomplete");
        }

        Self {
            base_url: std::env::var("GIFTLINK_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            wallet_project_id,
            default_chain_id: CITREA_TESTNET_CHAIN_ID,
        }
    }
}

pub(crate) fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/chain/config", get(chain_config::chain_config))
        .route("/cards", post(cards::create_card))
        .route("/cards/{card_id}", get(cards::get_card))
        .route("/cards/{card_id}/claim", post(cards::claim_card))
        .route("/assist/message", post(assist::assist_message))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut registry = NetworkRegistry::default();
    registry.register(Arc::new(CitreaGatewayAdapter::default()));

    let assist: Option<Arc<dyn MessageAssist>> = match HttpAssist::from_env() {
        Some(assist) => Some(Arc::new(assist)),
        None => {
            info!("ASSIST_API_KEY is not set; message assist is disabled");
            None
        }
    };

    let state = Arc::new(AppState {
        registry,
        mailer: Arc::new(HttpMailer::default()),
        assist,
        config: ServiceConfig::from_env(),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    info!("card-service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "card-service",
        status: "ok",
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "card-service",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub(crate) fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_owned(),
            code: None,
        }),
    )
}

pub(crate) fn not_found(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_owned(),
            code: None,
        }),
    )
}

pub(crate) fn bad_gateway(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse {
            error: message.to_owned(),
            code: None,
        }),
    )
}

pub(crate) fn unsupported_network(chain_id: u64) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: format!("chain {chain_id} is not a supported network; switch network and retry"),
            code: Some("unsupported_network".to_owned()),
        }),
    )
}
