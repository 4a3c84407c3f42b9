//! # Flow Endpoint Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Server key, seeded directory, router harness
//! └── integration/      # End-to-end flows through the HTTP router
//!     ├── flows.rs      # INIT → MEMBER_DETAILS → LOCATION_SELECT
//!     └── upstream.rs   # Real HTTP adapters against local fake upstreams
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p flow-tests
//! cargo bench -p flow-tests
//! ```

pub mod fixtures;
pub mod integration;
