//! Screen dispatcher: the form's state machine.
//!
//! ```text
//!  (none) ──INIT──► MEMBER_DETAILS ──data_exchange──► LOCATION_SELECT ─┐
//!                                                           ▲          │ COUNTRY_CHANGE
//!                                                           └──────────┘ STATE_CHANGE
//! ```
//!
//! Each transition starts from the incoming data bag, consumes the client
//! input keys it reads, and overwrites only the keys it defines. Everything
//! else is carried forward in place.

use crate::aggregator::ReferenceDataAggregator;
use crate::domain::{
    keys, normalize_token, Action, DataBag, ExchangeType, FlowConfig, FlowRequest, FlowResponse,
    LookupItem, ScreenId,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Drives `(action, screen)` to the next screen payload.
pub struct ScreenDispatcher {
    aggregator: ReferenceDataAggregator,
    flow: FlowConfig,
}

impl ScreenDispatcher {
    pub fn new(aggregator: ReferenceDataAggregator, flow: FlowConfig) -> Self {
        Self { aggregator, flow }
    }

    /// Compute the next screen. Never fails: upstream problems degrade to
    /// empty values and unsupported combinations echo the incoming data.
    pub async fn dispatch(&self, request: FlowRequest) -> FlowResponse {
        let FlowRequest {
            action,
            screen,
            token,
            data,
        } = request;

        match (action, screen) {
            (Action::Ping, _) => FlowResponse::liveness(),
            (Action::Init, _) => self.init(token.as_deref()).await,
            (Action::DataExchange, Some(ScreenId::MemberDetails)) => {
                self.submit_member_details(data).await
            }
            (Action::DataExchange, Some(ScreenId::LocationSelect)) => {
                self.exchange_location(data).await
            }
            (Action::Back, screen) => {
                debug!(screen = ?screen, "Back navigation");
                FlowResponse::new(screen, data)
            }
            (Action::DataExchange, None) => {
                warn!("data_exchange without a screen, echoing data");
                FlowResponse::new(None, data)
            }
        }
    }

    async fn init(&self, token: Option<&str>) -> FlowResponse {
        let identifier = normalize_token(token, &self.flow);
        let (profile, countries) = self.aggregator.profile_and_countries(&identifier).await;
        info!(countries = countries.len(), "Flow initialized");

        let mobile = if profile.mobile.trim().is_empty() {
            identifier
        } else {
            profile.mobile
        };

        let mut data = DataBag::new();
        data.insert(keys::MEMBER_NAME, profile.name);
        data.insert(keys::MEMBER_FATHER, profile.father_name);
        data.insert(keys::MEMBER_DOB, profile.date_of_birth);
        data.insert(keys::MEMBER_MOBILE, mobile);
        data.insert(keys::MEMBER_EMAIL, profile.email);
        data.insert(keys::COUNTRY_LIST, self.fetched_list(countries));
        data.insert(keys::SELECTED_COUNTRY, profile.country_id);
        data.insert(keys::SELECTED_STATE, profile.state_id);
        data.insert(keys::SELECTED_SUB_REGION, profile.parishad_id);

        FlowResponse::new(Some(ScreenId::MemberDetails), data)
    }

    async fn submit_member_details(&self, mut data: DataBag) -> FlowResponse {
        let previous = data.get_non_empty(keys::SELECTED_COUNTRY);
        let country = data
            .take_non_empty(keys::INPUT_COUNTRY)
            .or_else(|| previous.clone())
            .unwrap_or_default();

        for (input, carried, fallback) in keys::PERSONAL_DETAILS {
            if !data.rename(input, carried) && !data.contains_key(carried) {
                let value = data.get_string(fallback).unwrap_or_default();
                data.insert(carried, value);
            }
        }

        let states = self.aggregator.states(&country).await;

        if previous.as_deref() != Some(country.as_str()) {
            data.insert(keys::SELECTED_STATE, "");
        }
        // The sub-region list is emptied, so no sub-region can stay selected.
        data.insert(keys::SELECTED_SUB_REGION, "");
        data.insert(keys::STATE_LIST, self.list_for(&country, states));
        data.insert(keys::SUB_REGION_LIST, Value::Array(Vec::new()));
        data.insert(keys::SELECTED_COUNTRY, country);

        FlowResponse::new(Some(ScreenId::LocationSelect), data)
    }

    async fn exchange_location(&self, mut data: DataBag) -> FlowResponse {
        let exchange = match data.take_non_empty(keys::EXCHANGE_TYPE) {
            None => ExchangeType::default(),
            Some(name) => match ExchangeType::parse(&name) {
                Some(exchange) => exchange,
                None => {
                    warn!(exchange_type = %name, "Unknown exchange type, echoing data");
                    return FlowResponse::new(Some(ScreenId::LocationSelect), data);
                }
            },
        };
        debug!(exchange = ?exchange, "Location exchange");

        match exchange {
            ExchangeType::CountryChange => {
                let country = data
                    .take_non_empty(keys::INPUT_COUNTRY)
                    .or_else(|| data.get_non_empty(keys::SELECTED_COUNTRY))
                    .unwrap_or_default();
                data.remove(keys::INPUT_STATE);

                let states = self.aggregator.states(&country).await;

                data.insert(keys::STATE_LIST, self.list_for(&country, states));
                data.insert(keys::SELECTED_COUNTRY, country);
                data.insert(keys::SELECTED_STATE, "");
                data.insert(keys::SUB_REGION_LIST, Value::Array(Vec::new()));
                data.insert(keys::SELECTED_SUB_REGION, "");
            }
            ExchangeType::StateChange => {
                let state = data
                    .take_non_empty(keys::INPUT_STATE)
                    .or_else(|| data.get_non_empty(keys::SELECTED_STATE))
                    .unwrap_or_default();

                let sub_regions = self.aggregator.sub_regions(&state).await;

                data.insert(keys::SUB_REGION_LIST, self.list_for(&state, sub_regions));
                data.insert(keys::SELECTED_STATE, state);
                data.insert(keys::SELECTED_SUB_REGION, "");
            }
        }

        FlowResponse::new(Some(ScreenId::LocationSelect), data)
    }

    /// A child list; nothing was fetched when the parent id is blank.
    fn list_for(&self, parent_id: &str, items: Vec<LookupItem>) -> Value {
        if parent_id.trim().is_empty() {
            list_value(items)
        } else {
            self.fetched_list(items)
        }
    }

    /// A fetched list, with the configured placeholder standing in for an
    /// empty result.
    fn fetched_list(&self, items: Vec<LookupItem>) -> Value {
        match (&self.flow.empty_list_placeholder, items.is_empty()) {
            (Some(placeholder), true) => list_value(vec![placeholder.clone()]),
            _ => list_value(items),
        }
    }
}

fn list_value(items: Vec<LookupItem>) -> Value {
    Value::Array(
        items
            .into_iter()
            .map(|item| json!({"id": item.id, "title": item.title}))
            .collect(),
    )
}
