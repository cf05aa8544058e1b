// crates/serve/src/provider/mod.rs

//! Data-provider resolvers feed smart content: they run a provider query
//! and serialize its items.

mod entity;
mod structure;

pub use entity::{AccountDataProviderResolver, ContactDataProviderResolver, MediaDataProviderResolver};
pub use structure::{PageDataProviderResolver, SnippetDataProviderResolver};

use async_trait::async_trait;
use domain::property::PropertyParameter;
use serde_json::Value as Json;

use crate::{
    backend::{ProviderConfiguration, ProviderQuery},
    ctx::ResolveAttributes,
    resolver::ResolveContext,
    Result,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataProviderResult {
    pub items: Vec<Json>,
    pub has_next_page: bool,
}

#[async_trait]
pub trait DataProviderResolver: Send + Sync {
    /// Alias used by the `provider` parameter of smart content.
    fn data_provider(&self) -> &'static str;

    fn configuration(&self) -> ProviderConfiguration;

    fn default_property_parameters(&self) -> Vec<PropertyParameter>;

    async fn resolve(
        &self,
        query: &ProviderQuery<'_>,
        attributes: &ResolveAttributes,
        cx: &ResolveContext<'_>,
    ) -> Result<DataProviderResult>;
}
