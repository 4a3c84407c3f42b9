//! In-memory adapters for tests, local runs and demos.

use crate::domain::{MemberProfile, RawLookupRecord};
use crate::ports::{DirectoryError, DirectoryPort, MemberLookupPort, MemberSummary};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Directory backed by fixed data.
///
/// Every call is recorded (`"states:91"`, `"profile:98..."`) so tests can
/// assert which upstream reads a transition performed.
#[derive(Default)]
pub struct InMemoryDirectory {
    profiles: HashMap<String, MemberProfile>,
    countries: Vec<RawLookupRecord>,
    states: HashMap<String, Vec<RawLookupRecord>>,
    sub_regions: HashMap<String, Vec<RawLookupRecord>>,
    latency: Option<Duration>,
    profile_failing: AtomicBool,
    lists_failing: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, identifier: impl Into<String>, profile: MemberProfile) -> Self {
        self.profiles.insert(identifier.into(), profile);
        self
    }

    pub fn with_countries(mut self, records: Vec<RawLookupRecord>) -> Self {
        self.countries = records;
        self
    }

    pub fn with_states(mut self, country_id: impl Into<String>, records: Vec<RawLookupRecord>) -> Self {
        self.states.insert(country_id.into(), records);
        self
    }

    pub fn with_sub_regions(
        mut self,
        state_id: impl Into<String>,
        records: Vec<RawLookupRecord>,
    ) -> Self {
        self.sub_regions.insert(state_id.into(), records);
        self
    }

    /// Delay every call by `latency` (tokio time, so paused clocks apply).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_profile_failing(&self, failing: bool) {
        self.profile_failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_lists_failing(&self, failing: bool) {
        self.lists_failing.store(failing, Ordering::SeqCst);
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    async fn enter(&self, call: String) {
        self.calls.lock().push(call);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn list(
        &self,
        source: Option<&Vec<RawLookupRecord>>,
    ) -> Result<Vec<RawLookupRecord>, DirectoryError> {
        if self.lists_failing.load(Ordering::SeqCst) {
            return Err(DirectoryError::Status(503));
        }
        Ok(source.cloned().unwrap_or_default())
    }
}

#[async_trait]
impl DirectoryPort for InMemoryDirectory {
    async fn member_profile(&self, identifier: &str) -> Result<MemberProfile, DirectoryError> {
        self.enter(format!("profile:{identifier}")).await;
        if self.profile_failing.load(Ordering::SeqCst) {
            return Err(DirectoryError::Transport("connection refused".into()));
        }
        Ok(self.profiles.get(identifier).cloned().unwrap_or_default())
    }

    async fn countries(&self) -> Result<Vec<RawLookupRecord>, DirectoryError> {
        self.enter("countries".to_string()).await;
        self.list(Some(&self.countries))
    }

    async fn states(&self, country_id: &str) -> Result<Vec<RawLookupRecord>, DirectoryError> {
        self.enter(format!("states:{country_id}")).await;
        self.list(self.states.get(country_id))
    }

    async fn sub_regions(&self, state_id: &str) -> Result<Vec<RawLookupRecord>, DirectoryError> {
        self.enter(format!("sub_regions:{state_id}")).await;
        self.list(self.sub_regions.get(state_id))
    }
}

/// Member lookup backed by a fixed table.
#[derive(Default)]
pub struct StaticMemberLookup {
    members: HashMap<String, MemberSummary>,
    failing: AtomicBool,
}

impl StaticMemberLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, mobile: impl Into<String>, member: MemberSummary) -> Self {
        self.members.insert(mobile.into(), member);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl MemberLookupPort for StaticMemberLookup {
    async fn find_member(&self, mobile: &str) -> Result<MemberSummary, DirectoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DirectoryError::Transport("connection refused".into()));
        }
        self.members
            .get(mobile)
            .cloned()
            .ok_or_else(|| DirectoryError::Rejected("error".into()))
    }
}
