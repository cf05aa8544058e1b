// crates/adapt/src/store.rs

//! Fixture-backed implementations of the entity managers and structure
//! loading traits.

use async_trait::async_trait;
use domain::{
    entity::{Account, Category, Collection, Contact, Media, Tag, Teaser, TeaserItem},
    structure::Structure,
};
use serde_json::Map as JsonMap;
use serve::{
    backend::{
        AccountManager, BackendResult, CategoryManager, CollectionManager, ContactManager,
        ContentMapper, ContentQuery, ContentQueryBuilder, MediaManager, QueryOptions, TagManager,
        TeaserManager,
    },
    ctx::request::TargetGroupStore,
    BackendError,
};
use std::collections::BTreeMap;
use tracing::debug;

use crate::{
    fixture::{Fixture, StructureRecord},
    Result,
};

/// Teaser type derived from pages when the fixture has no explicit teaser.
pub const PAGE_TEASER_TYPE: &str = "pages";

#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    media: BTreeMap<i64, Media>,
    accounts: BTreeMap<i64, Account>,
    contacts: BTreeMap<i64, Contact>,
    categories: BTreeMap<i64, Category>,
    collections: BTreeMap<i64, Collection>,
    tags: Vec<Tag>,
    teasers: Vec<Teaser>,
    pages: Vec<StructureRecord>,
    snippets: Vec<StructureRecord>,
}

fn by_id<T>(items: &[T], id: impl Fn(&T) -> i64) -> BTreeMap<i64, T>
where
    T: Clone,
{
    items.iter().map(|item| (id(item), item.clone())).collect()
}

impl InMemoryBackend {
    pub fn from_fixture(fixture: &Fixture, webspace: &str) -> Result<Self> {
        Ok(Self {
            media: by_id(&fixture.media, |m| m.id),
            accounts: by_id(&fixture.accounts, |a| a.id),
            contacts: by_id(&fixture.contacts, |c| c.id),
            categories: by_id(&fixture.categories, |c| c.id),
            collections: by_id(&fixture.collections, |c| c.id),
            tags: fixture.tags.clone(),
            teasers: fixture.teasers.clone(),
            pages: fixture.page_records(webspace)?,
            snippets: fixture.snippet_records(webspace)?,
        })
    }

    pub fn pages(&self) -> &[StructureRecord] {
        &self.pages
    }

    pub fn snippets(&self) -> &[StructureRecord] {
        &self.snippets
    }

    pub fn media_items(&self) -> impl Iterator<Item = &Media> {
        self.media.values()
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.values()
    }

    /// Ids of the named tags; unknown names are skipped.
    pub fn tag_ids(&self, names: &[String]) -> Vec<i64> {
        names
            .iter()
            .filter_map(|name| self.tags.iter().find(|t| &t.name == name).map(|t| t.id))
            .collect()
    }

    /// Page or snippet `uuid` in `locale`.
    pub fn record(&self, uuid: &str, locale: &str) -> Option<&StructureRecord> {
        self.pages
            .iter()
            .chain(&self.snippets)
            .find(|r| r.uuid() == uuid && r.locale() == locale)
    }

    fn localized_media(&self, id: i64, locale: &str) -> Option<Media> {
        self.media.get(&id).map(|media| Media {
            locale: locale.to_string(),
            ..media.clone()
        })
    }

    fn page_teaser(&self, id: &str, locale: &str) -> Option<Teaser> {
        let record = self.pages.iter().find(|r| r.uuid() == id && r.locale() == locale)?;
        let excerpt = record.structure.extension("excerpt");
        let excerpt_str = |key: &str| {
            excerpt
                .and_then(|e| e.get(key))
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(Teaser {
            id: id.to_string(),
            teaser_type: PAGE_TEASER_TYPE.into(),
            locale: locale.to_string(),
            title: excerpt_str("title").or_else(|| record.title().map(str::to_string)),
            description: excerpt_str("description"),
            more_text: excerpt_str("more"),
            media_id: excerpt
                .and_then(|e| e.get("images"))
                .and_then(|v| v.get("ids"))
                .and_then(|ids| ids.get(0))
                .and_then(|id| id.as_i64()),
            url: record.structure.resource_locator(),
            attributes: JsonMap::new(),
        })
    }

    fn teaser(&self, item: &TeaserItem, locale: &str) -> Option<Teaser> {
        let found = self
            .teasers
            .iter()
            .find(|t| t.id == item.id && t.teaser_type == item.teaser_type)
            .cloned()
            .or_else(|| match item.teaser_type.as_str() {
                PAGE_TEASER_TYPE => self.page_teaser(&item.id, locale),
                _ => None,
            });

        let Some(mut teaser) = found else {
            debug!(id = %item.id, teaser_type = %item.teaser_type, "teaser not found, skipped");
            return None;
        };

        teaser.locale = locale.to_string();
        if item.title.is_some() {
            teaser.title = item.title.clone();
        }
        if item.description.is_some() {
            teaser.description = item.description.clone();
        }
        if item.media_id.is_some() {
            teaser.media_id = item.media_id;
        }
        Some(teaser)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entity managers
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl MediaManager for InMemoryBackend {
    async fn get_by_ids(&self, ids: &[i64], locale: &str) -> BackendResult<Vec<Media>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.localized_media(*id, locale))
            .collect())
    }

    async fn get_by_id(&self, id: i64, locale: &str) -> BackendResult<Media> {
        self.localized_media(id, locale)
            .ok_or_else(|| BackendError::not_found("media", id))
    }
}

#[async_trait]
impl AccountManager for InMemoryBackend {
    async fn get_by_ids(&self, ids: &[i64], _locale: &str) -> BackendResult<Vec<Account>> {
        Ok(ids.iter().filter_map(|id| self.accounts.get(id).cloned()).collect())
    }
}

#[async_trait]
impl ContactManager for InMemoryBackend {
    async fn get_by_ids(&self, ids: &[i64], _locale: &str) -> BackendResult<Vec<Contact>> {
        Ok(ids.iter().filter_map(|id| self.contacts.get(id).cloned()).collect())
    }
}

#[async_trait]
impl CategoryManager for InMemoryBackend {
    async fn find_by_ids(&self, ids: &[i64]) -> BackendResult<Vec<Category>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.categories.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl CollectionManager for InMemoryBackend {
    async fn get_by_ids(&self, ids: &[i64], _locale: &str) -> BackendResult<Vec<Collection>> {
        // Map order, not request order; the resolver restores it.
        Ok(self
            .collections
            .values()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TeaserManager for InMemoryBackend {
    async fn find(&self, items: &[TeaserItem], locale: &str) -> BackendResult<Vec<Teaser>> {
        Ok(items
            .iter()
            .filter_map(|item| self.teaser(item, locale))
            .collect())
    }
}

#[async_trait]
impl TagManager for InMemoryBackend {
    async fn resolve_tag_names(&self, names: &[String]) -> BackendResult<Vec<i64>> {
        Ok(self.tag_ids(names))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Structure loading
// ─────────────────────────────────────────────────────────────────────────────

impl ContentQueryBuilder for InMemoryBackend {
    fn build(&self, options: &QueryOptions, webspace_key: &str, locales: &[String]) -> ContentQuery {
        ContentQuery {
            ids: options.ids.clone(),
            properties: options.properties.clone(),
            published: options.published,
            webspace_key: webspace_key.to_string(),
            locales: locales.to_vec(),
        }
    }
}

fn in_webspace(record: &StructureRecord, webspace_key: &str) -> bool {
    webspace_key.is_empty() || record.structure.webspace_key == webspace_key
}

#[async_trait]
impl ContentMapper for InMemoryBackend {
    async fn load_by_query(
        &self,
        query: &ContentQuery,
        locale: &str,
        webspace_key: &str,
    ) -> BackendResult<Vec<Structure>> {
        Ok(self
            .pages
            .iter()
            .chain(&self.snippets)
            .filter(|r| query.ids.iter().any(|id| id == r.uuid()))
            .filter(|r| r.locale() == locale)
            .filter(|r| in_webspace(r, webspace_key))
            .filter(|r| !query.published || r.published)
            .map(|r| r.structure.clone())
            .collect())
    }

    async fn load(
        &self,
        id: &str,
        webspace_key: &str,
        locale: &str,
    ) -> BackendResult<Structure> {
        self.record(id, locale)
            .filter(|r| in_webspace(r, webspace_key))
            .map(|r| r.structure.clone())
            .ok_or_else(|| BackendError::not_found("structure", id))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Audience targeting
// ─────────────────────────────────────────────────────────────────────────────

/// Reports the same target group for every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedTargetGroupStore(pub Option<i64>);

impl TargetGroupStore for FixedTargetGroupStore {
    fn target_group_id(&self) -> Option<i64> {
        self.0
    }
}
