// crates/domain/src/structure.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as Json};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::property::Property;

// ─────────────────────────────────────────────────────────────────────────────
// Document capabilities
// ─────────────────────────────────────────────────────────────────────────────

/// Documents that record who authored them and when.
pub trait HasAuthorship {
    fn author(&self) -> Option<i64>;
    fn authored(&self) -> Option<DateTime<Utc>>;
}

/// Documents that record creation and last change.
pub trait HasAudit {
    fn creator(&self) -> Option<i64>;
    fn created(&self) -> Option<DateTime<Utc>>;
    fn changer(&self) -> Option<i64>;
    fn changed(&self) -> Option<DateTime<Utc>>;
}

/// The persisted document behind a structure.
///
/// Capabilities are optional; a document that lacks one simply returns
/// `None` and the resolved metadata fields become `null`.
pub trait StructureDocument: fmt::Debug + Send + Sync {
    fn authorship(&self) -> Option<&dyn HasAuthorship> {
        None
    }

    fn audit(&self) -> Option<&dyn HasAudit> {
        None
    }
}

/// Page documents carry authorship and audit data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageDocument {
    pub author: Option<i64>,
    pub authored: Option<DateTime<Utc>>,
    pub creator: Option<i64>,
    pub created: Option<DateTime<Utc>>,
    pub changer: Option<i64>,
    pub changed: Option<DateTime<Utc>>,
}

impl HasAuthorship for PageDocument {
    fn author(&self) -> Option<i64> {
        self.author
    }

    fn authored(&self) -> Option<DateTime<Utc>> {
        self.authored
    }
}

impl HasAudit for PageDocument {
    fn creator(&self) -> Option<i64> {
        self.creator
    }

    fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    fn changer(&self) -> Option<i64> {
        self.changer
    }

    fn changed(&self) -> Option<DateTime<Utc>> {
        self.changed
    }
}

impl StructureDocument for PageDocument {
    fn authorship(&self) -> Option<&dyn HasAuthorship> {
        Some(self)
    }

    fn audit(&self) -> Option<&dyn HasAudit> {
        Some(self)
    }
}

/// Snippet documents only carry audit data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnippetDocument {
    pub creator: Option<i64>,
    pub created: Option<DateTime<Utc>>,
    pub changer: Option<i64>,
    pub changed: Option<DateTime<Utc>>,
}

impl HasAudit for SnippetDocument {
    fn creator(&self) -> Option<i64> {
        self.creator
    }

    fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    fn changer(&self) -> Option<i64> {
        self.changer
    }

    fn changed(&self) -> Option<DateTime<Utc>> {
        self.changed
    }
}

impl StructureDocument for SnippetDocument {
    fn audit(&self) -> Option<&dyn HasAudit> {
        Some(self)
    }
}

/// A document without any optional capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct BareDocument;

impl StructureDocument for BareDocument {}

// ─────────────────────────────────────────────────────────────────────────────
// Structure
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    Page,
    Snippet,
}

impl StructureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureKind::Page => "page",
            StructureKind::Snippet => "snippet",
        }
    }
}

/// Link pages either point at another structure or at an external URL.
#[derive(Debug, Clone)]
pub enum Redirect {
    Internal(Box<Structure>),
    External(String),
}

/// Template instance loaded for one (uuid, webspace, locale).
#[derive(Debug, Clone)]
pub struct Structure {
    pub uuid: String,
    pub webspace_key: String,
    pub language_code: String,
    /// Template key.
    pub key: String,
    pub kind: StructureKind,
    pub properties: Vec<Property>,
    /// Extension data (`excerpt`, `seo`, ...) keyed by extension name.
    pub extensions: BTreeMap<String, JsonMap<String, Json>>,
    pub document: Arc<dyn StructureDocument>,
    pub redirect: Option<Redirect>,
}

impl Structure {
    pub fn new(uuid: impl Into<String>, key: impl Into<String>, kind: StructureKind) -> Self {
        Self {
            uuid: uuid.into(),
            webspace_key: String::new(),
            language_code: String::new(),
            key: key.into(),
            kind,
            properties: Vec::new(),
            extensions: BTreeMap::new(),
            document: Arc::new(BareDocument),
            redirect: None,
        }
    }

    pub fn page(uuid: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(uuid, key, StructureKind::Page)
    }

    pub fn snippet(uuid: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(uuid, key, StructureKind::Snippet)
    }

    // ───────────────────────────────
    // Builder-style setters
    // ───────────────────────────────

    pub fn with_webspace(mut self, webspace_key: impl Into<String>) -> Self {
        self.webspace_key = webspace_key.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.language_code = locale.into();
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_properties(mut self, properties: Vec<Property>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_extension(mut self, name: impl Into<String>, data: JsonMap<String, Json>) -> Self {
        self.extensions.insert(name.into(), data);
        self
    }

    pub fn with_document(mut self, document: Arc<dyn StructureDocument>) -> Self {
        self.document = document;
        self
    }

    pub fn with_redirect(mut self, redirect: Redirect) -> Self {
        self.redirect = Some(redirect);
        self
    }

    // ───────────────────────────────
    // Accessors
    // ───────────────────────────────

    /// Top-level properties; with `flatten`, section children replace their
    /// section.
    pub fn properties(&self, flatten: bool) -> Vec<&Property> {
        let mut out = Vec::with_capacity(self.properties.len());
        for property in &self.properties {
            push_property(property, flatten, &mut out);
        }
        out
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties(true).into_iter().find(|p| p.name == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    pub fn extension(&self, name: &str) -> Option<&JsonMap<String, Json>> {
        self.extensions.get(name)
    }

    /// URL of this structure: the redirect target's for link pages, else
    /// the value of its `resource_locator` property.
    pub fn resource_locator(&self) -> Option<String> {
        if let Some(url) = self.resource_locator_override() {
            return Some(url);
        }

        self.properties(true)
            .into_iter()
            .find(|p| p.content_type == "resource_locator")
            .and_then(|p| p.value.as_str().map(str::to_string))
    }

    /// Only link pages override their resource locator.
    pub fn resource_locator_override(&self) -> Option<String> {
        match &self.redirect {
            Some(Redirect::Internal(target)) => target.resource_locator(),
            Some(Redirect::External(url)) => Some(url.clone()),
            None => None,
        }
    }
}

fn push_property<'a>(property: &'a Property, flatten: bool, out: &mut Vec<&'a Property>) {
    match (flatten, property.section_properties()) {
        (true, Some(children)) => {
            for child in children {
                push_property(child, flatten, out);
            }
        }
        _ => out.push(property),
    }
}
