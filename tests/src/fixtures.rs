//! Shared test fixtures.
//!
//! RSA key generation is slow, so one server key is generated per test
//! binary and shared.

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use flow_crypto::PrivateKeyMaterial;
use flow_endpoint::{
    ChannelCodec, EndpointConfig, FlowClient, FlowEndpointService, InMemoryDirectory,
    MemberProfile,
};
use flow_endpoint::domain::RawLookupRecord;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tower::ServiceExt;

/// Mobile number of the seeded member.
pub const MEMBER_MOBILE: &str = "9812345678";

/// Server key shared by every test in the binary.
pub fn server_key() -> &'static PrivateKeyMaterial {
    static KEY: OnceLock<PrivateKeyMaterial> = OnceLock::new();
    KEY.get_or_init(|| PrivateKeyMaterial::generate(1024).expect("key generation"))
}

/// Directory with one member (India / Gujarat / Surat), two countries and
/// no states for Nepal.
pub fn member_directory() -> InMemoryDirectory {
    InMemoryDirectory::new()
        .with_profile(
            MEMBER_MOBILE,
            MemberProfile {
                name: "Asha Jain".into(),
                father_name: "R. Jain".into(),
                date_of_birth: "1990-04-01".into(),
                email: "asha@example.org".into(),
                mobile: MEMBER_MOBILE.into(),
                country_id: "1".into(),
                state_id: "12".into(),
                parishad_id: "120".into(),
            },
        )
        .with_countries(vec![
            RawLookupRecord::new("1", "India"),
            RawLookupRecord::new("2", "Nepal"),
        ])
        .with_states(
            "1",
            vec![
                RawLookupRecord::new("12", "Gujarat"),
                RawLookupRecord::new("13", "Rajasthan"),
            ],
        )
        .with_sub_regions("12", vec![RawLookupRecord::new("120", "Surat")])
        .with_sub_regions(
            "13",
            vec![
                RawLookupRecord::new("130", "Jaipur"),
                RawLookupRecord::new("131", "Jodhpur"),
            ],
        )
}

/// Raw HTTP reply.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Reply {
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).expect("utf-8 body")
    }
}

/// Router over an in-memory directory plus a client holding the matching
/// public key.
pub struct TestEndpoint {
    pub router: Router,
    pub directory: Arc<InMemoryDirectory>,
    pub client: FlowClient,
}

impl TestEndpoint {
    pub fn new() -> Self {
        Self::with_config(EndpointConfig::default(), member_directory())
    }

    pub fn with_config(config: EndpointConfig, directory: InMemoryDirectory) -> Self {
        let directory = Arc::new(directory);
        let service = FlowEndpointService::with_codec(
            config,
            ChannelCodec::new(server_key().clone()),
            directory.clone(),
        );
        Self {
            router: service.router(),
            directory,
            client: FlowClient::new(server_key().public_key()),
        }
    }

    pub fn with_client(mut self, client: FlowClient) -> Self {
        self.client = client;
        self
    }

    pub async fn post(&self, uri: &str, body: impl Into<Body>) -> Reply {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .expect("request");
        send(self.router.clone(), request).await
    }

    /// Seal `request`, post it to `/` and open the reply.
    pub async fn exchange(&self, request: &Value) -> Value {
        let (envelope, session) = self.client.seal_request(request).expect("seal");
        let reply = self
            .post("/", serde_json::to_vec(&envelope).expect("envelope json"))
            .await;
        assert_eq!(reply.status, StatusCode::OK, "body: {}", reply.text());
        session.open_response(reply.text()).expect("open response")
    }
}

impl Default for TestEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive one request through a router.
pub async fn send(router: Router, request: Request<Body>) -> Reply {
    let response = router.oneshot(request).await.expect("infallible router");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    Reply {
        status,
        headers,
        body,
    }
}
