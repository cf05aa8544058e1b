// crates/serve/src/types/teaser.rs

use async_trait::async_trait;
use domain::{content::ContentView, entity::TeaserItem, property::Property};
use serde_json::{json, Value as Json};
use std::sync::Arc;

use crate::{
    backend::TeaserManager,
    ctx::ResolveAttributes,
    resolver::{ContentTypeResolver, ResolveContext},
    serializer::TeaserSerializer,
    Error, Result,
};

/// `{presentAs, items: [{id, type, ...}]}`. The merged raw value is always
/// the view, even when there is nothing to show.
pub struct TeaserSelectionResolver {
    teasers: Arc<dyn TeaserManager>,
    serializer: TeaserSerializer,
}

impl TeaserSelectionResolver {
    pub fn new(teasers: Arc<dyn TeaserManager>, serializer: TeaserSerializer) -> Self {
        Self {
            teasers,
            serializer,
        }
    }
}

fn merged_value(data: &Json) -> Json {
    let mut value = json!({ "presentAs": null, "items": [] });
    if let (Some(target), Some(source)) = (value.as_object_mut(), data.as_object()) {
        for (k, v) in source {
            target.insert(k.clone(), v.clone());
        }
    }
    value
}

#[async_trait]
impl ContentTypeResolver for TeaserSelectionResolver {
    fn content_type(&self) -> &'static str {
        "teaser_selection"
    }

    async fn resolve(
        &self,
        data: &Json,
        property: &Property,
        locale: &str,
        _attributes: &ResolveAttributes,
        _cx: &ResolveContext<'_>,
    ) -> Result<ContentView> {
        let value = merged_value(data);

        let items = match value.get("items").and_then(Json::as_array) {
            Some(items) if !items.is_empty() => items.clone(),
            _ => return Ok(ContentView::new(Json::Array(vec![]), value)),
        };

        let items: Vec<TeaserItem> = serde_json::from_value(Json::Array(items))
            .map_err(|e| Error::invalid_value(property.content_type.clone(), e.to_string()))?;

        let teasers = self.teasers.find(&items, locale).await?;

        let mut content = Vec::with_capacity(teasers.len());
        for teaser in &teasers {
            content.push(self.serializer.serialize(teaser, locale).await?);
        }

        Ok(ContentView::new(content, value))
    }
}
