//! Flow endpoint: confidential-channel backend for a multi-step form.
//!
//! # Architecture
//!
//! ```text
//!  POST / (envelope JSON)
//!        │
//!  ┌─────┴──────────────┐
//!  │ Tracing → BodyLimit │
//!  └─────┬──────────────┘
//!        │
//!  ┌─────┴─────┐   open    ┌────────────┐  fetch   ┌────────────┐
//!  │  Channel  │──────────►│ Dispatcher │─────────►│ Aggregator │──► DirectoryPort
//!  │   Codec   │◄──────────│ (screens)  │◄─────────│ (absorbs)  │
//!  └───────────┘   seal    └────────────┘  lists   └────────────┘
//! ```
//!
//! Every channel failure answers `421 Key Refresh Required`. Directory
//! failures never reach the caller; they degrade to empty lists.
//!
//! # Usage
//!
//! ```ignore
//! use flow_endpoint::{EndpointConfig, FlowEndpointService, HttpDirectory};
//!
//! let config = EndpointConfig::from_env()?;
//! let directory = Arc::new(HttpDirectory::new(&config.directory)?);
//! let service = FlowEndpointService::new(config, directory)?;
//! service.run(shutdown_signal()).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod aggregator;
pub mod channel;
pub mod dispatcher;
pub mod domain;
pub mod middleware;
pub mod ports;
pub mod service;
pub mod signed_lookup;

pub use adapters::{HttpDirectory, HttpMemberLookup};
#[cfg(any(test, feature = "test-util"))]
pub use adapters::{InMemoryDirectory, StaticMemberLookup};
pub use aggregator::ReferenceDataAggregator;
pub use channel::{ChannelCodec, InboundEnvelope};
#[cfg(any(test, feature = "test-util"))]
pub use channel::{ClientSession, FlowClient, TagMode};
pub use dispatcher::ScreenDispatcher;
pub use domain::{
    Action, ChannelError, DataBag, EndpointConfig, EndpointError, FlowRequest, FlowResponse,
    LookupItem, MemberProfile, ScreenId, KEY_REFRESH_REQUIRED,
};
pub use ports::{DirectoryError, DirectoryPort, MemberLookupPort, MemberSummary};
pub use service::{FlowEndpointService, SERVICE_NAME};
pub use signed_lookup::{signature_for, MemberLookupHandler, SIGNATURE_HEADER};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
