//! Adapters implementing the outbound ports.

pub mod directory;
pub mod member_lookup;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use directory::HttpDirectory;
pub use member_lookup::HttpMemberLookup;
#[cfg(any(test, feature = "test-util"))]
pub use memory::{InMemoryDirectory, StaticMemberLookup};
