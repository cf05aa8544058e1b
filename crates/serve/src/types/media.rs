// crates/serve/src/types/media.rs

use async_trait::async_trait;
use domain::{content::ContentView, property::Property};
use serde_json::{json, Value as Json};
use std::sync::Arc;

use super::{empty_ids_view, is_blank, json_i64, numeric_ids, order_by_ids};
use crate::{
    backend::MediaManager,
    ctx::ResolveAttributes,
    resolver::{ContentTypeResolver, ResolveContext},
    serializer::MediaSerializer,
    Error, Result,
};

/// `{ids: [...], displayOption?}`; the raw value is echoed as view.
pub struct MediaSelectionResolver {
    media: Arc<dyn MediaManager>,
    serializer: MediaSerializer,
}

impl MediaSelectionResolver {
    pub fn new(media: Arc<dyn MediaManager>, serializer: MediaSerializer) -> Self {
        Self { media, serializer }
    }
}

#[async_trait]
impl ContentTypeResolver for MediaSelectionResolver {
    fn content_type(&self) -> &'static str {
        "media_selection"
    }

    async fn resolve(
        &self,
        data: &Json,
        _property: &Property,
        locale: &str,
        _attributes: &ResolveAttributes,
        _cx: &ResolveContext<'_>,
    ) -> Result<ContentView> {
        let raw_ids = data.get("ids").unwrap_or(&Json::Null);
        if is_blank(raw_ids) {
            return Ok(ContentView::new(Json::Array(vec![]), empty_ids_view()));
        }

        let ids = numeric_ids(raw_ids);
        let media = self.media.get_by_ids(&ids, locale).await?;

        let content = order_by_ids(&ids, media, |m| m.id)
            .iter()
            .map(|m| self.serializer.serialize(m))
            .collect::<Result<Vec<_>>>()?;

        Ok(ContentView::new(content, data.clone()))
    }
}

/// `{id, displayOption?}`. The referenced media must exist.
pub struct SingleMediaSelectionResolver {
    media: Arc<dyn MediaManager>,
    serializer: MediaSerializer,
}

impl SingleMediaSelectionResolver {
    pub fn new(media: Arc<dyn MediaManager>, serializer: MediaSerializer) -> Self {
        Self { media, serializer }
    }
}

#[async_trait]
impl ContentTypeResolver for SingleMediaSelectionResolver {
    fn content_type(&self) -> &'static str {
        "single_media_selection"
    }

    async fn resolve(
        &self,
        data: &Json,
        property: &Property,
        locale: &str,
        _attributes: &ResolveAttributes,
        _cx: &ResolveContext<'_>,
    ) -> Result<ContentView> {
        let raw_id = data.get("id").unwrap_or(&Json::Null);
        if is_blank(raw_id) {
            return Ok(ContentView::new(Json::Null, json!({ "id": null })));
        }

        let id = json_i64(raw_id).ok_or_else(|| {
            Error::invalid_value(
                property.content_type.clone(),
                format!("media id `{raw_id}` is not numeric"),
            )
        })?;

        let media = self.media.get_by_id(id, locale).await?;

        Ok(ContentView::new(self.serializer.serialize(&media)?, data.clone()))
    }
}
