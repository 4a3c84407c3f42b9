//! Confidential channel: envelope decoding, request opening and response
//! sealing around the `flow-crypto` primitives.

#[cfg(any(test, feature = "test-util"))]
pub mod client;
pub mod codec;
pub mod envelope;

#[cfg(any(test, feature = "test-util"))]
pub use client::{ClientSession, FlowClient, TagMode};
pub use codec::{ChannelCodec, SessionContext};
pub use envelope::{InboundEnvelope, RequestEnvelope};
