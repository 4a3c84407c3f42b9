//! HTTP service: router, handlers and server lifecycle.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /` | Banner |
//! | `GET /health` | Process health |
//! | `POST /` | Encrypted flow exchange |
//! | `POST /flow-member` | Signed member lookup (only with an app secret) |

use crate::aggregator::ReferenceDataAggregator;
use crate::channel::{ChannelCodec, InboundEnvelope};
use crate::dispatcher::ScreenDispatcher;
use crate::domain::{
    Action, ChannelError, EndpointConfig, EndpointError, FlowResponse, KEY_REFRESH_REQUIRED,
};
use crate::middleware::RequestTracingLayer;
use crate::ports::{DirectoryPort, MemberLookupPort};
use crate::signed_lookup::{MemberLookupHandler, SIGNATURE_HEADER};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, error, info, warn};

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "flow-endpoint";

const BANNER: &str = "Flow endpoint is running. POST encrypted flow requests to /";

/// Flow endpoint service
pub struct FlowEndpointService {
    config: EndpointConfig,
    codec: Arc<ChannelCodec>,
    dispatcher: Arc<ScreenDispatcher>,
    member_lookup: Option<Arc<MemberLookupHandler>>,
}

impl FlowEndpointService {
    /// Validate the configuration and load the private key.
    pub fn new(
        config: EndpointConfig,
        directory: Arc<dyn DirectoryPort>,
    ) -> Result<Self, EndpointError> {
        config.validate()?;
        let codec =
            ChannelCodec::from_pem(&config.keys.private_key_pem).map_err(EndpointError::Key)?;
        Ok(Self::with_codec(config, codec, directory))
    }

    /// Build around an already-loaded codec.
    pub fn with_codec(
        config: EndpointConfig,
        codec: ChannelCodec,
        directory: Arc<dyn DirectoryPort>,
    ) -> Self {
        let aggregator = ReferenceDataAggregator::new(directory);
        let dispatcher = ScreenDispatcher::new(aggregator, config.flow.clone());

        Self {
            config,
            codec: Arc::new(codec),
            dispatcher: Arc::new(dispatcher),
            member_lookup: None,
        }
    }

    /// Enable `POST /flow-member`. Without a configured app secret the route
    /// stays unmounted.
    pub fn with_member_lookup(mut self, lookup: Arc<dyn MemberLookupPort>) -> Self {
        match self.config.member_lookup.app_secret.as_deref() {
            Some(secret) => {
                self.member_lookup = Some(Arc::new(MemberLookupHandler::new(
                    secret.as_bytes(),
                    lookup,
                )));
            }
            None => warn!("APP_SECRET not set, member lookup route disabled"),
        }
        self
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        let state = AppState {
            codec: Arc::clone(&self.codec),
            dispatcher: Arc::clone(&self.dispatcher),
        };

        let mut router: Router = Router::new()
            .route("/", get(banner).post(handle_flow))
            .route("/health", get(health_check))
            .with_state(state);

        if let Some(handler) = &self.member_lookup {
            router = router.merge(
                Router::new()
                    .route("/flow-member", post(handle_member_lookup))
                    .with_state(Arc::clone(handler)),
            );
        }

        let middleware = ServiceBuilder::new()
            .layer(RequestTracingLayer::new())
            .layer(RequestBodyLimitLayer::new(self.config.http.max_body_bytes));

        router.layer(middleware)
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), EndpointError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.http_addr()).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already-bound listener.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), EndpointError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!(
            addr = %addr,
            member_lookup = self.member_lookup.is_some(),
            "Flow endpoint listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Flow endpoint stopped");
        Ok(())
    }
}

/// Shared handler state
#[derive(Clone)]
struct AppState {
    codec: Arc<ChannelCodec>,
    dispatcher: Arc<ScreenDispatcher>,
}

impl IntoResponse for ChannelError {
    fn into_response(self) -> Response {
        warn!(class = self.class(), "Channel failure, asking client to refresh key");
        (StatusCode::MISDIRECTED_REQUEST, KEY_REFRESH_REQUIRED).into_response()
    }
}

impl IntoResponse for EndpointError {
    fn into_response(self) -> Response {
        error!(error = %self, "Flow request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

async fn banner() -> &'static str {
    BANNER
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": crate::VERSION,
    }))
}

async fn handle_flow(State(state): State<AppState>, body: Bytes) -> Response {
    if body.iter().all(u8::is_ascii_whitespace) {
        debug!("Empty body, answering liveness probe");
        return (StatusCode::OK, "OK").into_response();
    }

    let envelope: InboundEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => return ChannelError::malformed(format!("envelope: {e}")).into_response(),
    };

    if envelope.is_liveness_probe() {
        debug!("No wrapped key, answering liveness probe");
        return (StatusCode::OK, "OK").into_response();
    }

    let opened = envelope
        .decode()
        .and_then(|decoded| state.codec.open(&decoded));
    let (request, context) = match opened {
        Ok(opened) => opened,
        Err(e) => return e.into_response(),
    };

    debug!(action = %request.action, screen = ?request.screen, "Flow request opened");

    let response = match request.action {
        Action::Ping => FlowResponse::liveness(),
        _ => state.dispatcher.dispatch(request).await,
    };

    match context.seal(&response) {
        Ok(sealed) => ([(header::CONTENT_TYPE, "text/plain")], sealed).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle_member_lookup(
    State(handler): State<Arc<MemberLookupHandler>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = handler.verify(&body, signature) {
        warn!(reason = %e, "Member lookup signature rejected");
        return (StatusCode::FORBIDDEN, e.to_string()).into_response();
    }

    Json(handler.respond(&body).await).into_response()
}
