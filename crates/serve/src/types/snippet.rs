// crates/serve/src/types/snippet.rs

use async_trait::async_trait;
use domain::{content::ContentView, property::Property};
use serde_json::Value as Json;
use std::sync::Arc;
use tracing::debug;

use super::{empty_ids_view, ids_view, is_blank, string_ids};
use crate::{
    backend::ContentMapper,
    ctx::ResolveAttributes,
    resolver::{ContentTypeResolver, ResolveContext},
    structure::resolve_structure,
    Result,
};

/// Snippets are resolved in full; `loadExcerpt` adds their extension data.
pub struct SnippetSelectionResolver {
    mapper: Arc<dyn ContentMapper>,
}

impl SnippetSelectionResolver {
    pub fn new(mapper: Arc<dyn ContentMapper>) -> Self {
        Self { mapper }
    }
}

#[async_trait]
impl ContentTypeResolver for SnippetSelectionResolver {
    fn content_type(&self) -> &'static str {
        "snippet_selection"
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
            return Ok(ContentView::new(Json::Array(vec![]), empty_ids_view()));
        }

        let load_excerpt = property.params.bool_value("loadExcerpt").unwrap_or(false);
        let webspace = attributes.webspace_key();

        let mut snippets = Vec::new();
        for id in string_ids(data) {
            let snippet = match self.mapper.load(&id, webspace, locale).await {
                Ok(snippet) => snippet,
                Err(e) if e.is_not_found() => {
                    debug!(snippet = %id, "snippet not found, skipped");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let document = resolve_structure(cx, &snippet, locale, load_excerpt, attributes).await?;
            snippets.push(document.to_json()?);
        }

        Ok(ContentView::new(snippets, ids_view(data)))
    }
}
