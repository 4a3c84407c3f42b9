//! # Real Adapters Against Local Upstreams
//!
//! The HTTP directory and member-lookup adapters talk to axum servers bound
//! on loopback, standing in for the remote directory API and the chatbot
//! member service.

#[cfg(test)]
mod tests {
    use crate::fixtures::{send, server_key, Reply};
    use axum::body::Body;
    use axum::extract::Query;
    use axum::http::{HeaderMap, Request, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use flow_endpoint::{
        signature_for, ChannelCodec, EndpointConfig, FlowClient, FlowEndpointService,
        HttpDirectory, HttpMemberLookup, SIGNATURE_HEADER,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;

    const API_KEY: &str = "directory-key";
    const APP_SECRET: &str = "chatbot-secret";

    async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("api-key")
            .map(|value| value == API_KEY)
            .unwrap_or(false)
    }

    /// Directory API: capitalized record fields, `{status, data}` envelope.
    fn directory_api() -> Router {
        Router::new()
            .route(
                "/v0/membershipdata",
                get(
                    |headers: HeaderMap, Query(q): Query<HashMap<String, String>>| async move {
                        if !authorized(&headers) {
                            return Json(json!({"status": false, "message": "bad key"}));
                        }
                        match q.get("MobileNo").map(String::as_str) {
                            Some("9812345678") => Json(json!({
                                "status": true,
                                "data": [{
                                    "MemberName": "Asha Jain",
                                    "FatherName": "R. Jain",
                                    "dob": "1990-04-01",
                                    "EmailId": "asha@example.org",
                                    "MobileNo": 9812345678u64,
                                    "CountryId": 1,
                                    "StateId": "12",
                                    "ParishadId": "120",
                                }],
                            })),
                            _ => Json(json!({"status": true, "data": null})),
                        }
                    },
                ),
            )
            .route(
                "/v0/country",
                get(|headers: HeaderMap| async move {
                    if !authorized(&headers) {
                        return Json(json!({"status": false}));
                    }
                    Json(json!({
                        "status": "success",
                        "data": [
                            {"CountryId": 1, "CountryName": "India"},
                            {"CountryId": "1", "CountryName": "India again"},
                            {"CountryId": 2, "CountryName": ""},
                            {"CountryName": "Nowhere"},
                        ],
                    }))
                }),
            )
            .route(
                "/v0/state",
                get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
            )
    }

    fn member_api() -> Router {
        Router::new().route(
            "/get_member.php",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                match q.get("mobile").map(String::as_str) {
                    Some("9812345678") => Json(json!({
                        "status": "success",
                        "name": "Asha Jain",
                        "dob": "1990-04-01",
                        "mobile": "9812345678",
                    })),
                    _ => Json(json!({"status": "error"})),
                }
            }),
        )
    }

    async fn endpoint() -> (FlowEndpointService, FlowClient) {
        let mut config = EndpointConfig::default();
        config.directory.base_url = format!("{}/v0", spawn(directory_api()).await);
        config.directory.api_key = API_KEY.into();
        config.directory.timeout = Duration::from_secs(5);
        config.member_lookup.app_secret = Some(APP_SECRET.into());
        config.member_lookup.url = format!("{}/get_member.php", spawn(member_api()).await);

        let directory = Arc::new(HttpDirectory::new(&config.directory).unwrap());
        let lookup =
            Arc::new(HttpMemberLookup::new(&config.member_lookup, config.directory.timeout).unwrap());

        let service = FlowEndpointService::with_codec(
            config,
            ChannelCodec::new(server_key().clone()),
            directory,
        )
        .with_member_lookup(lookup);
        (service, FlowClient::new(server_key().public_key()))
    }

    async fn exchange(service: &FlowEndpointService, client: &FlowClient, request: Value) -> Value {
        let (envelope, session) = client.seal_request(&request).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(serde_json::to_vec(&envelope).unwrap()))
            .unwrap();
        let reply = send(service.router(), request).await;
        assert_eq!(reply.status, StatusCode::OK);
        session.open_response(reply.text()).unwrap()
    }

    async fn member_lookup(service: &FlowEndpointService, body: &str, sign: bool) -> Reply {
        let mut request = Request::builder().method("POST").uri("/flow-member");
        if sign {
            let signature = signature_for(APP_SECRET.as_bytes(), body.as_bytes()).unwrap();
            request = request.header(SIGNATURE_HEADER, signature);
        }
        send(
            service.router(),
            request.body(Body::from(body.to_string())).unwrap(),
        )
        .await
    }

    #[tokio::test]
    async fn test_init_over_http_directory() {
        let (service, client) = endpoint().await;

        let response = exchange(
            &service,
            &client,
            json!({"action": "INIT", "flow_token": "919812345678"}),
        )
        .await;

        assert_eq!(
            response["data"],
            json!({
                "m_name": "Asha Jain",
                "m_father": "R. Jain",
                "m_dob": "1990-04-01",
                "m_mobile": "9812345678",
                "m_email": "asha@example.org",
                "country_list": [
                    {"id": "1", "title": "India"},
                    {"id": "2", "title": "N/A"},
                ],
                "sel_c": "1",
                "sel_s": "12",
                "sel_p": "120",
            })
        );
    }

    #[tokio::test]
    async fn test_failing_state_endpoint_degrades() {
        let (service, client) = endpoint().await;

        let response = exchange(
            &service,
            &client,
            json!({
                "action": "data_exchange",
                "screen": "LOCATION_SELECT",
                "data": {"selected_country": "1"},
            }),
        )
        .await;

        assert_eq!(response["screen"], "LOCATION_SELECT");
        assert_eq!(
            response["data"]["state_list"],
            json!([{"id": "0", "title": "Not Available"}])
        );
    }

    #[tokio::test]
    async fn test_signed_member_lookup() {
        let (service, _) = endpoint().await;

        let reply = member_lookup(&service, r#"{"mobile": "9812345678"}"#, true).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(
            serde_json::from_slice::<Value>(&reply.body).unwrap(),
            json!({"status": "success", "name": "Asha Jain", "dob": "1990-04-01", "mobile": "9812345678"})
        );

        let reply = member_lookup(&service, r#"{"mobile": "9000000000"}"#, true).await;
        assert_eq!(
            serde_json::from_slice::<Value>(&reply.body).unwrap(),
            json!({"status": "error", "name": "", "dob": "", "mobile": ""})
        );

        let reply = member_lookup(&service, r#"{"health_check": true}"#, true).await;
        assert_eq!(
            serde_json::from_slice::<Value>(&reply.body).unwrap(),
            json!({"status": "healthy"})
        );

        let reply = member_lookup(&service, r#"{"mobile": "9812345678"}"#, false).await;
        assert_eq!(reply.status, StatusCode::FORBIDDEN);
        assert_eq!(reply.text(), "No signature");
    }
}
