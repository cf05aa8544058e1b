// crates/adapt/src/provider.rs

//! Smart content data providers over the in-memory backend.
//!
//! Every provider works on a list of [`Candidate`]s: the item handed back,
//! a flat JSON document used for sorting, and the tag/category ids used
//! for filtering.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use domain::{
    entity::{Account, Contact, Media},
    property::PropertyParameter,
};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as Json};
use serve::backend::{
    BackendResult, DataProvider, ProviderConfiguration, ProviderQuery, ProviderResult,
    ResourceItem,
};
use std::cmp::Ordering;
use tracing::debug;

use crate::{fixture::StructureRecord, store::InMemoryBackend};

#[derive(Debug, Clone)]
pub struct Candidate<T> {
    pub id: String,
    pub item: T,
    pub doc: Json,
    pub tags: Vec<i64>,
    pub categories: Vec<i64>,
    pub locale: Option<String>,
    pub webspace: Option<String>,
}

pub struct InMemoryDataProvider<T> {
    configuration: ProviderConfiguration,
    candidates: Vec<Candidate<T>>,
}

impl<T> InMemoryDataProvider<T> {
    pub fn new(configuration: ProviderConfiguration, candidates: Vec<Candidate<T>>) -> Self {
        Self {
            configuration,
            candidates,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

fn configuration(sorting: &[&str], datasource: Option<&str>) -> ProviderConfiguration {
    ProviderConfiguration {
        has_tags: true,
        has_categories: true,
        has_sorting: !sorting.is_empty(),
        has_limit: true,
        has_pagination: true,
        has_present_as: true,
        has_audience_targeting: false,
        has_datasource: datasource.is_some(),
        sorting: sorting.iter().map(|s| s.to_string()).collect(),
        datasource_resource_key: datasource.map(str::to_string),
        datasource_adapter: datasource.map(|_| "column_list".to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pages & snippets
// ─────────────────────────────────────────────────────────────────────────────

/// Flat view of a structure: property values by name plus url and dates.
fn structure_doc(record: &StructureRecord) -> JsonMap<String, Json> {
    let structure = &record.structure;
    let mut doc = JsonMap::new();
    doc.insert("uuid".into(), Json::String(structure.uuid.clone()));
    doc.insert("template".into(), Json::String(structure.key.clone()));
    for property in structure.properties(true) {
        doc.insert(property.name.clone(), property.value.clone());
    }
    if let Some(url) = structure.resource_locator() {
        doc.insert("url".into(), Json::String(url));
    }

    let date = |d: Option<DateTime<Utc>>| {
        d.map(|d| Json::String(d.to_rfc3339_opts(SecondsFormat::Secs, true)))
            .unwrap_or(Json::Null)
    };
    if let Some(audit) = structure.document.audit() {
        doc.insert("created".into(), date(audit.created()));
        doc.insert("changed".into(), date(audit.changed()));
    }
    if let Some(authorship) = structure.document.authorship() {
        doc.insert("authored".into(), date(authorship.authored()));
    }
    for (name, data) in &structure.extensions {
        doc.insert(name.clone(), Json::Object(data.clone()));
    }
    doc
}

fn structure_candidates(records: &[StructureRecord]) -> Vec<Candidate<ResourceItem>> {
    records
        .iter()
        .filter(|r| r.published)
        .map(|record| {
            let data = structure_doc(record);
            Candidate {
                id: record.uuid().to_string(),
                doc: Json::Object(data.clone()),
                item: ResourceItem {
                    id: record.uuid().to_string(),
                    data,
                },
                tags: record.tags.clone(),
                categories: record.categories.clone(),
                locale: Some(record.locale().to_string()),
                webspace: Some(record.structure.webspace_key.clone()),
            }
        })
        .collect()
}

impl InMemoryDataProvider<ResourceItem> {
    pub fn pages(backend: &InMemoryBackend) -> Self {
        Self::new(
            configuration(&["title", "created", "changed", "authored"], Some("pages")),
            structure_candidates(backend.pages()),
        )
    }

    pub fn snippets(backend: &InMemoryBackend) -> Self {
        Self::new(
            configuration(&["title", "created", "changed"], None),
            structure_candidates(backend.snippets()),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entities
// ─────────────────────────────────────────────────────────────────────────────

fn entity_candidate<T: Serialize + Clone>(
    backend: &InMemoryBackend,
    id: i64,
    item: &T,
    tags: &[String],
) -> Candidate<T> {
    Candidate {
        id: id.to_string(),
        doc: serde_json::to_value(item).unwrap_or(Json::Null),
        item: item.clone(),
        tags: backend.tag_ids(tags),
        categories: Vec::new(),
        locale: None,
        webspace: None,
    }
}

impl InMemoryDataProvider<Media> {
    pub fn media(backend: &InMemoryBackend) -> Self {
        let candidates = backend
            .media_items()
            .map(|m| entity_candidate(backend, m.id, m, &m.tags))
            .collect();
        Self::new(configuration(&["title", "created", "changed"], Some("collections")), candidates)
    }
}

impl InMemoryDataProvider<Account> {
    pub fn accounts(backend: &InMemoryBackend) -> Self {
        let candidates = backend
            .accounts()
            .map(|a| entity_candidate(backend, a.id, a, &a.tags))
            .collect();
        Self::new(configuration(&["name"], None), candidates)
    }
}

impl InMemoryDataProvider<Contact> {
    pub fn contacts(backend: &InMemoryBackend) -> Self {
        let candidates = backend
            .contacts()
            .map(|c| entity_candidate(backend, c.id, c, &c.tags))
            .collect();
        Self::new(configuration(&["firstName", "lastName"], None), candidates)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Query evaluation
// ─────────────────────────────────────────────────────────────────────────────

fn id_list(filters: &JsonMap<String, Json>, key: &str) -> Vec<i64> {
    filters
        .get(key)
        .and_then(Json::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| match v {
                    Json::Number(n) => n.as_i64(),
                    Json::String(s) => s.parse().ok(),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn is_and(filters: &JsonMap<String, Json>, key: &str) -> bool {
    filters
        .get(key)
        .and_then(Json::as_str)
        .is_some_and(|op| op.eq_ignore_ascii_case("and"))
}

/// `required` ids against the ids a candidate carries. No requirement
/// matches everything.
fn matches_ids(required: &[i64], all: bool, have: &[i64]) -> bool {
    if required.is_empty() {
        return true;
    }
    if all {
        required.iter().all(|id| have.contains(id))
    } else {
        required.iter().any(|id| have.contains(id))
    }
}

fn matches<T>(candidate: &Candidate<T>, query: &ProviderQuery<'_>) -> bool {
    let filters = query.filters;
    let options = query.options;

    if candidate
        .locale
        .as_deref()
        .is_some_and(|l| l != options.locale)
    {
        return false;
    }
    if !options.webspace_key.is_empty()
        && candidate
            .webspace
            .as_deref()
            .is_some_and(|w| w != options.webspace_key)
    {
        return false;
    }

    let excluded = filters
        .get("excluded")
        .and_then(Json::as_array)
        .is_some_and(|ids| ids.iter().any(|id| id.as_str() == Some(candidate.id.as_str())));
    if excluded {
        return false;
    }

    matches_ids(&id_list(filters, "tags"), is_and(filters, "tagOperator"), &candidate.tags)
        && matches_ids(
            &id_list(filters, "websiteTags"),
            is_and(filters, "websiteTagsOperator"),
            &candidate.tags,
        )
        && matches_ids(
            &id_list(filters, "categories"),
            is_and(filters, "categoryOperator"),
            &candidate.categories,
        )
        && matches_ids(
            &id_list(filters, "websiteCategories"),
            is_and(filters, "websiteCategoriesOperator"),
            &candidate.categories,
        )
}

/// Resolve a dotted path into a nested JSON value.
fn field_value<'a>(doc: &'a Json, path: &str) -> Option<&'a Json> {
    let mut current = doc;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

/// Missing values sort first; mixed types fall back to their JSON text.
fn compare_field(a: &Json, b: &Json, field: &str) -> Ordering {
    match (field_value(a, field), field_value(b, field)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Json::Number(na)), Some(Json::Number(nb))) => {
            let fa = na.as_f64().unwrap_or(f64::NAN);
            let fb = nb.as_f64().unwrap_or(f64::NAN);
            fa.partial_cmp(&fb).unwrap_or(Ordering::Equal)
        }
        (Some(Json::String(sa)), Some(Json::String(sb))) => sa.cmp(sb),
        (Some(Json::Bool(ba)), Some(Json::Bool(bb))) => ba.cmp(bb),
        (Some(va), Some(vb)) => va.to_string().cmp(&vb.to_string()),
    }
}

/// Window of `total` matches for the requested page. The limit caps the
/// whole result, pages are cut from what remains.
fn window(total: usize, limit: Option<usize>, page: i64, page_size: Option<usize>) -> (usize, usize, bool) {
    let capped = limit.map_or(total, |l| l.min(total));
    let Some(size) = page_size else {
        return (0, capped, false);
    };

    let page = usize::try_from(page.max(1)).unwrap_or(usize::MAX);
    let start = (page - 1).saturating_mul(size).min(capped);
    let end = start.saturating_add(size).min(capped);
    (start, end, end < capped)
}

#[async_trait]
impl<T> DataProvider for InMemoryDataProvider<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn configuration(&self) -> ProviderConfiguration {
        self.configuration.clone()
    }

    fn default_property_parameters(&self) -> Vec<PropertyParameter> {
        Vec::new()
    }

    async fn resolve_resource_items(
        &self,
        query: &ProviderQuery<'_>,
    ) -> BackendResult<ProviderResult<T>> {
        let mut hits: Vec<&Candidate<T>> = self
            .candidates
            .iter()
            .filter(|c| matches(c, query))
            .collect();

        if let Some(sort_by) = query.filters.get("sortBy").and_then(Json::as_str) {
            let descending = query
                .filters
                .get("sortMethod")
                .and_then(Json::as_str)
                .is_some_and(|m| m.eq_ignore_ascii_case("desc"));
            hits.sort_by(|a, b| {
                let ord = compare_field(&a.doc, &b.doc, sort_by);
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        let (start, end, has_next_page) = window(hits.len(), query.limit, query.page, query.page_size);
        debug!(matched = hits.len(), start, end, has_next_page, "in-memory provider query");

        Ok(ProviderResult {
            items: hits[start..end].iter().map(|c| c.item.clone()).collect(),
            has_next_page,
        })
    }
}
