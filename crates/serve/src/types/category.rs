// crates/serve/src/types/category.rs

use async_trait::async_trait;
use domain::{content::ContentView, property::Property};
use serde_json::Value as Json;
use std::sync::Arc;

use super::{empty_ids_view, ids_view, is_blank, numeric_ids, order_by_ids};
use crate::{
    backend::CategoryManager,
    ctx::ResolveAttributes,
    resolver::{ContentTypeResolver, ResolveContext},
    serializer::CategorySerializer,
    Result,
};

pub struct CategorySelectionResolver {
    categories: Arc<dyn CategoryManager>,
    serializer: CategorySerializer,
}

impl CategorySelectionResolver {
    pub fn new(categories: Arc<dyn CategoryManager>) -> Self {
        Self {
            categories,
            serializer: CategorySerializer,
        }
    }
}

#[async_trait]
impl ContentTypeResolver for CategorySelectionResolver {
    fn content_type(&self) -> &'static str {
        "category_selection"
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
        let categories = self.categories.find_by_ids(&ids).await?;

        let content = order_by_ids(&ids, categories, |c| c.id)
            .iter()
            .map(|category| self.serializer.serialize(category, locale))
            .collect::<Result<Vec<_>>>()?;

        Ok(ContentView::new(content, ids_view(data)))
    }
}
