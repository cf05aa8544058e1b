// crates/serve/src/types/collection.rs

use async_trait::async_trait;
use domain::{content::ContentView, property::Property};
use serde_json::Value as Json;
use std::sync::Arc;

use super::{empty_ids_view, ids_view, is_blank, numeric_ids, order_by_ids};
use crate::{
    backend::CollectionManager,
    ctx::ResolveAttributes,
    resolver::{ContentTypeResolver, ResolveContext},
    serializer::CollectionSerializer,
    Result,
};

pub struct CollectionSelectionResolver {
    collections: Arc<dyn CollectionManager>,
    serializer: CollectionSerializer,
}

impl CollectionSelectionResolver {
    pub fn new(collections: Arc<dyn CollectionManager>) -> Self {
        Self {
            collections,
            serializer: CollectionSerializer,
        }
    }
}

#[async_trait]
impl ContentTypeResolver for CollectionSelectionResolver {
    fn content_type(&self) -> &'static str {
        "collection_selection"
    }

    async fn resolve(
        &self,
        data: &Json,
        _property: &Property,
        locale: &str,
        _attributes: &ResolveAttributes,
        _cx: &ResolveContext<'_>,
    ) -> Result<ContentView> {
        if is_blank(data) {
            return Ok(ContentView::new(Json::Array(vec![]), empty_ids_view()));
        }

        let ids = numeric_ids(data);
        let collections = self.collections.get_by_ids(&ids, locale).await?;

        let content = order_by_ids(&ids, collections, |c| c.id)
            .iter()
            .map(|collection| self.serializer.serialize(collection, locale))
            .collect::<Result<Vec<_>>>()?;

        Ok(ContentView::new(content, ids_view(data)))
    }
}
