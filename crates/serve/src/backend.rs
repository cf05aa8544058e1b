// crates/serve/src/backend.rs

//! Collaborators the resolvers call into.
//!
//! Persistence, search and link lookup live outside this crate; the `adapt`
//! crate ships in-memory implementations of every trait here.

use async_trait::async_trait;
use domain::{
    entity::{Account, Category, Collection, Contact, LinkItem, Media, Teaser, TeaserItem},
    property::{PropertyParameter, PropertyParams},
    structure::Structure,
};
use serde_json::{Map as JsonMap, Value as Json};
use std::sync::Arc;

use crate::BackendError;

pub type BackendResult<T> = Result<T, BackendError>;

// ─────────────────────────────────────────────────────────────────────────────
// Entity managers
// ─────────────────────────────────────────────────────────────────────────────

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaManager: Send + Sync {
    /// Entities that exist, in no particular order.
    async fn get_by_ids(&self, ids: &[i64], locale: &str) -> BackendResult<Vec<Media>>;

    /// Fails with `NotFound` for unknown ids.
    async fn get_by_id(&self, id: i64, locale: &str) -> BackendResult<Media>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountManager: Send + Sync {
    async fn get_by_ids(&self, ids: &[i64], locale: &str) -> BackendResult<Vec<Account>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactManager: Send + Sync {
    async fn get_by_ids(&self, ids: &[i64], locale: &str) -> BackendResult<Vec<Contact>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryManager: Send + Sync {
    async fn find_by_ids(&self, ids: &[i64]) -> BackendResult<Vec<Category>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionManager: Send + Sync {
    async fn get_by_ids(&self, ids: &[i64], locale: &str) -> BackendResult<Vec<Collection>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeaserManager: Send + Sync {
    async fn find(&self, items: &[TeaserItem], locale: &str) -> BackendResult<Vec<Teaser>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagManager: Send + Sync {
    /// Ids of the tags with the given names; unknown names are skipped.
    async fn resolve_tag_names(&self, names: &[String]) -> BackendResult<Vec<i64>>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Structure loading
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub ids: Vec<String>,
    /// Property names the caller is going to read.
    pub properties: Vec<String>,
    pub published: bool,
}

/// Backend-specific query produced by a [`ContentQueryBuilder`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentQuery {
    pub ids: Vec<String>,
    pub properties: Vec<String>,
    pub published: bool,
    pub webspace_key: String,
    pub locales: Vec<String>,
}

#[cfg_attr(test, mockall::automock)]
pub trait ContentQueryBuilder: Send + Sync {
    fn build(&self, options: &QueryOptions, webspace_key: &str, locales: &[String]) -> ContentQuery;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentMapper: Send + Sync {
    async fn load_by_query(
        &self,
        query: &ContentQuery,
        locale: &str,
        webspace_key: &str,
    ) -> BackendResult<Vec<Structure>>;

    /// Fails with `NotFound` for unknown ids.
    async fn load(&self, id: &str, webspace_key: &str, locale: &str) -> BackendResult<Structure>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Smart content data providers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderConfiguration {
    pub has_tags: bool,
    pub has_categories: bool,
    pub has_sorting: bool,
    pub has_limit: bool,
    pub has_pagination: bool,
    pub has_present_as: bool,
    pub has_audience_targeting: bool,
    pub has_datasource: bool,
    /// Sortable field names.
    pub sorting: Vec<String>,
    pub datasource_resource_key: Option<String>,
    pub datasource_adapter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderOptions {
    pub webspace_key: String,
    pub locale: String,
}

/// Everything a data provider needs to run one query.
#[derive(Debug, Clone, Copy)]
pub struct ProviderQuery<'a> {
    pub filters: &'a JsonMap<String, Json>,
    pub params: &'a PropertyParams,
    pub options: &'a ProviderOptions,
    pub limit: Option<usize>,
    pub page: i64,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResult<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
}

/// A page or snippet hit; `data` is the provider's own flattened view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceItem {
    pub id: String,
    pub data: JsonMap<String, Json>,
}

#[async_trait]
pub trait DataProvider: Send + Sync {
    type Item: Send + Sync;

    fn configuration(&self) -> ProviderConfiguration;

    fn default_property_parameters(&self) -> Vec<PropertyParameter>;

    async fn resolve_resource_items(
        &self,
        query: &ProviderQuery<'_>,
    ) -> BackendResult<ProviderResult<Self::Item>>;
}

pub type SharedDataProvider<T> = Arc<dyn DataProvider<Item = T>>;

// ─────────────────────────────────────────────────────────────────────────────
// Markup & links
// ─────────────────────────────────────────────────────────────────────────────

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarkupParser: Send + Sync {
    /// Rewrites embedded short tags into final HTML.
    async fn parse(&self, html: &str, locale: &str) -> BackendResult<String>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkProvider: Send + Sync {
    async fn preload(
        &self,
        hrefs: &[String],
        locale: &str,
        published: bool,
    ) -> BackendResult<Vec<LinkItem>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait LinkProviderPool: Send + Sync {
    fn provider(&self, key: &str) -> Option<Arc<dyn LinkProvider>>;
}
