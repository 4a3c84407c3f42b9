//! Core flow types.

use super::data_bag::DataBag;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Protocol version stamped on every response payload.
pub const FLOW_VERSION: &str = "3.0";

/// Well-known data-bag keys.
pub mod keys {
    pub const MEMBER_NAME: &str = "m_name";
    pub const MEMBER_FATHER: &str = "m_father";
    pub const MEMBER_DOB: &str = "m_dob";
    pub const MEMBER_MOBILE: &str = "m_mobile";
    pub const MEMBER_EMAIL: &str = "m_email";

    pub const COUNTRY_LIST: &str = "country_list";
    pub const STATE_LIST: &str = "state_list";
    pub const SUB_REGION_LIST: &str = "parishad_list";

    pub const SELECTED_COUNTRY: &str = "sel_c";
    pub const SELECTED_STATE: &str = "sel_s";
    pub const SELECTED_SUB_REGION: &str = "sel_p";

    /// Client-side inputs, consumed by the transition that reads them.
    pub const INPUT_COUNTRY: &str = "selected_country";
    pub const INPUT_STATE: &str = "selected_state";
    pub const EXCHANGE_TYPE: &str = "exchange_type";

    /// Personal-detail renames applied when leaving `MEMBER_DETAILS`:
    /// `(client key, carried key, profile fallback key)`.
    pub const PERSONAL_DETAILS: [(&str, &str, &str); 4] = [
        ("temp_name", "captured_name", MEMBER_NAME),
        ("temp_father", "captured_father", MEMBER_FATHER),
        ("temp_dob", "captured_dob", MEMBER_DOB),
        ("temp_email", "captured_email", MEMBER_EMAIL),
    ];

    pub const STATUS: &str = "status";
}

/// Request action. Names are matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Platform liveness probe
    Ping,
    /// First screen of a new flow
    Init,
    /// Screen submitted data and expects the next payload
    DataExchange,
    /// User navigated back
    Back,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Ping => "ping",
            Action::Init => "INIT",
            Action::DataExchange => "data_exchange",
            Action::Back => "BACK",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ping" => Some(Action::Ping),
            "init" => Some(Action::Init),
            "data_exchange" => Some(Action::DataExchange),
            "back" => Some(Action::Back),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Action::parse(&name).ok_or_else(|| {
            serde::de::Error::unknown_variant(&name, &["ping", "INIT", "data_exchange", "BACK"])
        })
    }
}

/// Screens of the membership form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenId {
    MemberDetails,
    LocationSelect,
}

impl ScreenId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenId::MemberDetails => "MEMBER_DETAILS",
            ScreenId::LocationSelect => "LOCATION_SELECT",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-exchange on `LOCATION_SELECT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExchangeType {
    #[default]
    CountryChange,
    StateChange,
}

impl ExchangeType {
    /// `None` for names outside the known set.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "COUNTRY_CHANGE" => Some(ExchangeType::CountryChange),
            "STATE_CHANGE" => Some(ExchangeType::StateChange),
            _ => None,
        }
    }
}

/// Decrypted application request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRequest {
    pub action: Action,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<ScreenId>,

    #[serde(
        rename = "flow_token",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub token: Option<String>,

    #[serde(default)]
    pub data: DataBag,
}

impl FlowRequest {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            screen: None,
            token: None,
            data: DataBag::new(),
        }
    }

    pub fn with_screen(mut self, screen: ScreenId) -> Self {
        self.screen = Some(screen);
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_data(mut self, data: DataBag) -> Self {
        self.data = data;
        self
    }
}

/// Next-screen payload, before versioning and encryption.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowResponse {
    pub screen: Option<ScreenId>,
    pub data: DataBag,
}

impl FlowResponse {
    pub fn new(screen: Option<ScreenId>, data: DataBag) -> Self {
        Self { screen, data }
    }

    /// Reply to a `ping`.
    pub fn liveness() -> Self {
        let mut data = DataBag::new();
        data.insert(keys::STATUS, "active");
        Self { screen: None, data }
    }

    /// The serialized form: `{ version, screen?, data }`.
    pub fn versioned(&self) -> VersionedResponse<'_> {
        VersionedResponse {
            version: FLOW_VERSION,
            screen: self.screen,
            data: &self.data,
        }
    }
}

/// Wire shape of a response payload.
#[derive(Debug, Serialize)]
pub struct VersionedResponse<'a> {
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen: Option<ScreenId>,
    pub data: &'a DataBag,
}

/// One entry of a dropdown list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupItem {
    pub id: String,
    pub title: String,
}

impl LookupItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A lookup record as returned upstream, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLookupRecord {
    pub id: Option<String>,
    pub title: Option<String>,
}

impl RawLookupRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            title: Some(title.into()),
        }
    }
}

/// Reference lists served by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Country,
    State,
    SubRegion,
}

impl LookupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupKind::Country => "country",
            LookupKind::State => "state",
            LookupKind::SubRegion => "sub_region",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member record. Absent fields are empty strings, never missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberProfile {
    pub name: String,
    pub father_name: String,
    pub date_of_birth: String,
    pub email: String,
    pub mobile: String,
    pub country_id: String,
    pub state_id: String,
    pub parishad_id: String,
}
