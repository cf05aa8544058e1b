// crates/serve/src/types/route.rs

//! URL-ish content types that mostly pass their value through.

use async_trait::async_trait;
use domain::{content::ContentView, property::Property};
use serde_json::Value as Json;

use crate::{
    ctx::ResolveAttributes,
    resolver::{ContentTypeResolver, ResolveContext},
    Result,
};

/// The raw URL, unless the owning structure is a link page and overrides it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceLocatorResolver;

#[async_trait]
impl ContentTypeResolver for ResourceLocatorResolver {
    fn content_type(&self) -> &'static str {
        "resource_locator"
    }

    async fn resolve(
        &self,
        data: &Json,
        _property: &Property,
        _locale: &str,
        attributes: &ResolveAttributes,
        _cx: &ResolveContext<'_>,
    ) -> Result<ContentView> {
        let content = match &attributes.resource_locator {
            Some(url) => Json::String(url.clone()),
            None => data.clone(),
        };
        Ok(ContentView::content_only(content))
    }
}

/// Unwraps `{path, page}` values to the path.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageTreeRouteResolver;

#[async_trait]
impl ContentTypeResolver for PageTreeRouteResolver {
    fn content_type(&self) -> &'static str {
        "page_tree_route"
    }

    async fn resolve(
        &self,
        data: &Json,
        _property: &Property,
        _locale: &str,
        _attributes: &ResolveAttributes,
        _cx: &ResolveContext<'_>,
    ) -> Result<ContentView> {
        let content = match data {
            Json::Object(route) => route.get("path").cloned().unwrap_or(Json::Null),
            other => other.clone(),
        };
        Ok(ContentView::content_only(content))
    }
}
