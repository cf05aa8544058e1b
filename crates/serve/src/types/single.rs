// crates/serve/src/types/single.rs

use async_trait::async_trait;
use domain::{content::ContentView, property::Property};
use serde_json::{json, Value as Json};
use std::sync::Arc;

use super::is_blank;
use crate::{
    ctx::ResolveAttributes,
    resolver::{ContentTypeResolver, ResolveContext},
    Result,
};

/// Single-item variant of a list selection: resolves `[data]` through the
/// list resolver and keeps the first entry.
pub struct SingleSelectionResolver {
    content_type: &'static str,
    inner: Arc<dyn ContentTypeResolver>,
}

impl SingleSelectionResolver {
    pub fn new(content_type: &'static str, inner: Arc<dyn ContentTypeResolver>) -> Self {
        Self {
            content_type,
            inner,
        }
    }
}

#[async_trait]
impl ContentTypeResolver for SingleSelectionResolver {
    fn content_type(&self) -> &'static str {
        self.content_type
    }

    async fn resolve(
        &self,
        data: &Json,
        property: &Property,
        locale: &str,
        attributes: &ResolveAttributes,
        cx: &ResolveContext<'_>,
    ) -> Result<ContentView> {
        if is_blank(data) {
            return Ok(ContentView::new(Json::Null, json!({ "id": null })));
        }

        let list = self
            .inner
            .resolve(&json!([data]), property, locale, attributes, cx)
            .await?;

        let content = list
            .content()
            .as_array()
            .and_then(|items| items.first())
            .cloned()
            .unwrap_or(Json::Null);

        Ok(ContentView::new(content, json!({ "id": data })))
    }
}
