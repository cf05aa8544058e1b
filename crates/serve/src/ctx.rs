// crates/serve/src/ctx.rs

pub mod request;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

// ─────────────────────────────────────────────────────────────────────────────
// Request scope
// ─────────────────────────────────────────────────────────────────────────────

/// The parts of the incoming request that resolution depends on.
///
/// Passed explicitly instead of being looked up from ambient request state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestScope {
    query: BTreeMap<String, String>,
    segment: Option<String>,
    now: Option<DateTime<Utc>>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `a=1&b=two`; a leading `?` is ignored. Later keys win.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let query = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Self {
            query,
            ..Self::default()
        }
    }

    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    pub fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }

    /// Pinned request time, or the wall clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolve attributes
// ─────────────────────────────────────────────────────────────────────────────

/// Context handed down with every property resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveAttributes {
    pub webspace_key: Option<String>,
    /// Uuid of the structure owning the property being resolved.
    pub structure_uuid: Option<String>,
    /// Resource locator override of the owning structure (link pages).
    pub resource_locator: Option<String>,
    pub preview: bool,
    pub request: RequestScope,
}

impl ResolveAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_webspace(mut self, webspace_key: impl Into<String>) -> Self {
        self.webspace_key = Some(webspace_key.into());
        self
    }

    pub fn with_structure_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.structure_uuid = Some(uuid.into());
        self
    }

    pub fn with_resource_locator(mut self, url: Option<String>) -> Self {
        self.resource_locator = url;
        self
    }

    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn with_request(mut self, request: RequestScope) -> Self {
        self.request = request;
        self
    }

    pub fn webspace_key(&self) -> &str {
        self.webspace_key.as_deref().unwrap_or_default()
    }
}
