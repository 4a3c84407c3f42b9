//! Domain layer: flow types, state bag, normalization rules and config.

pub mod config;
pub mod correlation;
pub mod data_bag;
pub mod error;
pub mod lookup;
pub mod token;
pub mod types;

pub use config::{
    ConfigError, DirectoryConfig, EndpointConfig, FlowConfig, HttpConfig, KeyConfig,
    MemberLookupConfig,
};
pub use correlation::{CorrelationId, REQUEST_ID_HEADER};
pub use data_bag::DataBag;
pub use error::{ChannelError, EndpointError, KEY_REFRESH_REQUIRED};
pub use lookup::{normalize_lookup, TITLE_SENTINEL};
pub use token::normalize_token;
pub use types::{
    keys, Action, ExchangeType, FlowRequest, FlowResponse, LookupItem, LookupKind,
    MemberProfile, RawLookupRecord, ScreenId, VersionedResponse, FLOW_VERSION,
};
