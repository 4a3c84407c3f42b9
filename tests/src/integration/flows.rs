//! # Form Session Flows
//!
//! Full sessions through the HTTP router: every request is sealed by a
//! client holding the server's public key, and every reply is opened with
//! the session key and the complemented IV.
//!
//! ```text
//! INIT ──► MEMBER_DETAILS ──submit──► LOCATION_SELECT ──STATE_CHANGE──► …
//!                                                     ──COUNTRY_CHANGE─► …
//! ```

#[cfg(test)]
mod tests {
    use crate::fixtures::{member_directory, TestEndpoint, MEMBER_MOBILE};
    use axum::http::StatusCode;
    use flow_crypto::PrivateKeyMaterial;
    use flow_endpoint::{EndpointConfig, FlowClient, TagMode, KEY_REFRESH_REQUIRED};
    use serde_json::{json, Value};

    fn keys_of(data: &Value) -> Vec<String> {
        data.as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    // =========================================================================
    // HAPPY PATH
    // =========================================================================

    #[tokio::test]
    async fn test_full_session() {
        let endpoint = TestEndpoint::new();

        // INIT
        let init = endpoint
            .exchange(&json!({"action": "INIT", "flow_token": format!("+91{MEMBER_MOBILE}")}))
            .await;
        assert_eq!(init["version"], "3.0");
        assert_eq!(init["screen"], "MEMBER_DETAILS");
        assert_eq!(init["data"]["m_mobile"], MEMBER_MOBILE);
        assert_eq!(init["data"]["sel_c"], "1");
        assert_eq!(init["data"]["sel_s"], "12");
        assert_eq!(init["data"]["sel_p"], "120");

        // Client edits its name and adds a key of its own.
        let mut data = init["data"].clone();
        data["temp_name"] = json!("Asha J.");
        data["flow_note"] = json!("keep me");

        let details = endpoint
            .exchange(&json!({
                "action": "data_exchange",
                "screen": "MEMBER_DETAILS",
                "data": data,
            }))
            .await;
        let data = &details["data"];
        assert_eq!(details["screen"], "LOCATION_SELECT");
        assert_eq!(data["captured_name"], "Asha J.");
        assert_eq!(data["captured_father"], "R. Jain");
        assert_eq!(data["captured_email"], "asha@example.org");
        assert!(data.get("temp_name").is_none());
        assert_eq!(
            data["state_list"],
            json!([{"id": "12", "title": "Gujarat"}, {"id": "13", "title": "Rajasthan"}])
        );
        assert_eq!(data["parishad_list"], json!([]));
        assert_eq!(data["sel_s"], "12", "same country keeps the state");
        assert_eq!(data["sel_p"], "", "sub-region list was emptied");
        assert_eq!(data["flow_note"], "keep me");

        // STATE_CHANGE
        let mut data = data.clone();
        data["exchange_type"] = json!("STATE_CHANGE");
        data["selected_state"] = json!("13");

        let state = endpoint
            .exchange(&json!({
                "action": "data_exchange",
                "screen": "LOCATION_SELECT",
                "data": data,
            }))
            .await;
        let data = &state["data"];
        assert_eq!(
            data["parishad_list"],
            json!([{"id": "130", "title": "Jaipur"}, {"id": "131", "title": "Jodhpur"}])
        );
        assert_eq!(data["sel_s"], "13");
        assert_eq!(data["sel_p"], "");
        assert!(data.get("selected_state").is_none());
        assert!(data.get("exchange_type").is_none());
        assert_eq!(data["captured_name"], "Asha J.");

        // COUNTRY_CHANGE to a country without states
        let mut data = data.clone();
        data["exchange_type"] = json!("COUNTRY_CHANGE");
        data["selected_country"] = json!("2");

        let country = endpoint
            .exchange(&json!({
                "action": "data_exchange",
                "screen": "LOCATION_SELECT",
                "data": data,
            }))
            .await;
        let data = &country["data"];
        assert_eq!(data["state_list"], json!([{"id": "0", "title": "Not Available"}]));
        assert_eq!(data["sel_c"], "2");
        assert_eq!(data["sel_s"], "");
        assert_eq!(data["parishad_list"], json!([]));
        assert_eq!(data["sel_p"], "");
        assert_eq!(data["flow_note"], "keep me");

        assert_eq!(
            endpoint.directory.calls(),
            vec![
                format!("profile:{MEMBER_MOBILE}"),
                "countries".to_string(),
                "states:1".to_string(),
                "sub_regions:13".to_string(),
                "states:2".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_carried_keys_keep_their_position() {
        let endpoint = TestEndpoint::new();
        let request = json!({
            "action": "data_exchange",
            "screen": "LOCATION_SELECT",
            "data": {
                "alpha": 1,
                "sel_c": "1",
                "state_list": [],
                "omega": {"nested": true},
                "selected_state": "12",
                "exchange_type": "STATE_CHANGE",
            },
        });

        let response = endpoint.exchange(&request).await;
        assert_eq!(
            keys_of(&response["data"]),
            vec!["alpha", "sel_c", "state_list", "omega", "parishad_list", "sel_s", "sel_p"]
        );
        assert_eq!(response["data"]["omega"], json!({"nested": true}));
    }

    #[tokio::test]
    async fn test_every_iv_and_tag_layout() {
        for (iv_len, mode) in [
            (12, TagMode::Appended),
            (12, TagMode::Detached),
            (16, TagMode::Appended),
            (16, TagMode::Detached),
            (20, TagMode::Appended),
            (32, TagMode::Detached),
        ] {
            let client = FlowClient::new(crate::fixtures::server_key().public_key())
                .with_iv_len(iv_len)
                .with_tag_mode(mode);
            let endpoint = TestEndpoint::new().with_client(client);

            let response = endpoint.exchange(&json!({"action": "ping"})).await;
            assert_eq!(response, json!({"version": "3.0", "data": {"status": "active"}}));
        }
    }

    // =========================================================================
    // TOKENS AND DEGRADATION
    // =========================================================================

    #[tokio::test]
    async fn test_preview_token_uses_default_identifier() {
        let endpoint = TestEndpoint::new();
        let response = endpoint
            .exchange(&json!({"action": "init", "flow_token": "flows-builder-preview"}))
            .await;

        assert_eq!(response["data"]["m_mobile"], "8488861504");
        assert_eq!(response["data"]["m_name"], "");
        assert!(endpoint
            .directory
            .calls()
            .contains(&"profile:8488861504".to_string()));
    }

    #[tokio::test]
    async fn test_directory_outage_degrades_to_placeholders() {
        let endpoint = TestEndpoint::new();
        endpoint.directory.set_lists_failing(true);
        endpoint.directory.set_profile_failing(true);

        let response = endpoint
            .exchange(&json!({"action": "INIT", "flow_token": MEMBER_MOBILE}))
            .await;
        assert_eq!(response["screen"], "MEMBER_DETAILS");
        assert_eq!(response["data"]["m_name"], "");
        assert_eq!(response["data"]["m_mobile"], MEMBER_MOBILE);
        assert_eq!(
            response["data"]["country_list"],
            json!([{"id": "0", "title": "Not Available"}])
        );
    }

    #[tokio::test]
    async fn test_placeholder_can_be_disabled() {
        let mut config = EndpointConfig::default();
        config.flow.empty_list_placeholder = None;
        let endpoint = TestEndpoint::with_config(config, member_directory());

        let response = endpoint
            .exchange(&json!({
                "action": "data_exchange",
                "screen": "LOCATION_SELECT",
                "data": {"selected_country": "2"},
            }))
            .await;
        assert_eq!(response["data"]["state_list"], json!([]));
    }

    #[tokio::test]
    async fn test_back_echoes_screen_and_data() {
        let endpoint = TestEndpoint::new();
        let response = endpoint
            .exchange(&json!({
                "action": "BACK",
                "screen": "MEMBER_DETAILS",
                "data": {"sel_c": "1", "m_name": "Asha"},
            }))
            .await;

        assert_eq!(
            response,
            json!({
                "version": "3.0",
                "screen": "MEMBER_DETAILS",
                "data": {"sel_c": "1", "m_name": "Asha"},
            })
        );
        assert_eq!(endpoint.directory.call_count(), 0);
    }

    // =========================================================================
    // CHANNEL FAILURES
    // =========================================================================

    #[tokio::test]
    async fn test_liveness_probe() {
        let endpoint = TestEndpoint::new();
        let reply = endpoint.post("/", r#"{"encrypted_flow_data": "AAAA"}"#).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.text(), "OK");
    }

    #[tokio::test]
    async fn test_foreign_key_asks_for_refresh() {
        let stranger = PrivateKeyMaterial::generate(1024).unwrap();
        let endpoint =
            TestEndpoint::new().with_client(FlowClient::new(stranger.public_key()));
        let (envelope, _) = endpoint.client.seal_request(&json!({"action": "ping"})).unwrap();

        let reply = endpoint.post("/", serde_json::to_vec(&envelope).unwrap()).await;
        assert_eq!(reply.status, StatusCode::MISDIRECTED_REQUEST);
        assert_eq!(reply.text(), KEY_REFRESH_REQUIRED);
    }

    #[tokio::test]
    async fn test_tampered_tag_asks_for_refresh() {
        let client = FlowClient::new(crate::fixtures::server_key().public_key())
            .with_tag_mode(TagMode::Detached);
        let endpoint = TestEndpoint::new().with_client(client);
        let (mut envelope, _) = endpoint.client.seal_request(&json!({"action": "ping"})).unwrap();

        // Swap in a well-formed but wrong tag.
        envelope.authentication_tag = Some("AAAAAAAAAAAAAAAAAAAAAA==".into());

        let reply = endpoint.post("/", serde_json::to_vec(&envelope).unwrap()).await;
        assert_eq!(reply.status, StatusCode::MISDIRECTED_REQUEST);
        assert_eq!(reply.text(), KEY_REFRESH_REQUIRED);
    }

    #[tokio::test]
    async fn test_unknown_action_asks_for_refresh() {
        let endpoint = TestEndpoint::new();
        let (envelope, _) = endpoint
            .client
            .seal_request(&json!({"action": "teleport"}))
            .unwrap();

        let reply = endpoint.post("/", serde_json::to_vec(&envelope).unwrap()).await;
        assert_eq!(reply.status, StatusCode::MISDIRECTED_REQUEST);
        assert_eq!(endpoint.directory.call_count(), 0);
    }

    #[tokio::test]
    async fn test_replies_carry_request_id() {
        let endpoint = TestEndpoint::new();
        let reply = endpoint.post("/", "{}").await;
        assert!(reply.headers.contains_key("x-request-id"));
    }
}
