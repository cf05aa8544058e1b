// crates/serve/src/resolver.rs

//! Content type dispatch.
//!
//! `ContentResolver` maps a property's content type tag to the
//! `ContentTypeResolver` registered for it. Resolvers that hold nested
//! properties (blocks, image maps, selections of whole structures) call back
//! into the registry through the `ResolveContext` they are handed, which
//! tracks the nesting depth and stops runaway recursion.

use async_trait::async_trait;
use domain::{content::ContentView, property::Property};
use serde_json::{Map as JsonMap, Value as Json};
use std::{collections::HashMap, fmt, sync::Arc};
use tracing::debug;

use crate::{ctx::ResolveAttributes, Error, Result};

pub const DEFAULT_MAX_DEPTH: usize = 32;

// ─────────────────────────────────────────────────────────────────────────────
// Resolver trait
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ContentTypeResolver: Send + Sync {
    /// Content type tag this resolver handles (`media_selection`, `block`, ...).
    fn content_type(&self) -> &'static str;

    async fn resolve(
        &self,
        data: &Json,
        property: &Property,
        locale: &str,
        attributes: &ResolveAttributes,
        cx: &ResolveContext<'_>,
    ) -> Result<ContentView>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolve context
// ─────────────────────────────────────────────────────────────────────────────

/// Registry handle plus the depth of the property currently being resolved.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    resolver: &'a ContentResolver,
    depth: usize,
}

impl<'a> ResolveContext<'a> {
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn registry(&self) -> &'a ContentResolver {
        self.resolver
    }

    /// Resolve a child property one level deeper.
    pub async fn resolve(
        &self,
        data: &Json,
        property: &Property,
        locale: &str,
        attributes: &ResolveAttributes,
    ) -> Result<ContentView> {
        self.resolver
            .resolve_nested(data, property, locale, attributes, self.depth + 1)
            .await
    }
}

impl fmt::Debug for ResolveContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveContext")
            .field("depth", &self.depth)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

pub struct ContentResolver {
    resolvers: HashMap<String, Arc<dyn ContentTypeResolver>>,
    max_depth: usize,
}

impl ContentResolver {
    pub fn builder() -> ContentResolverBuilder {
        ContentResolverBuilder::default()
    }

    /// Root context for callers that walk a structure themselves.
    pub fn context(&self) -> ResolveContext<'_> {
        ResolveContext {
            resolver: self,
            depth: 0,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn has(&self, content_type: &str) -> bool {
        self.resolvers.contains_key(content_type)
    }

    #[tracing::instrument(skip_all, fields(property = %property.name, content_type = %property.content_type))]
    pub async fn resolve(
        &self,
        data: &Json,
        property: &Property,
        locale: &str,
        attributes: &ResolveAttributes,
    ) -> Result<ContentView> {
        self.resolve_nested(data, property, locale, attributes, 0)
            .await
    }

    async fn resolve_nested(
        &self,
        data: &Json,
        property: &Property,
        locale: &str,
        attributes: &ResolveAttributes,
        depth: usize,
    ) -> Result<ContentView> {
        if depth > self.max_depth {
            return Err(Error::MaxDepthExceeded {
                depth,
                property: property.name.clone(),
            });
        }

        let Some(resolver) = self.resolvers.get(&property.content_type) else {
            debug!(
                content_type = %property.content_type,
                "no resolver registered, passing value through"
            );
            return Ok(ContentView::new(data.clone(), JsonMap::new()));
        };

        let cx = ResolveContext {
            resolver: self,
            depth,
        };

        resolver
            .resolve(data, property, locale, attributes, &cx)
            .await
    }
}

impl fmt::Debug for ContentResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&String> = self.resolvers.keys().collect();
        tags.sort();
        f.debug_struct("ContentResolver")
            .field("content_types", &tags)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

pub struct ContentResolverBuilder {
    resolvers: HashMap<String, Arc<dyn ContentTypeResolver>>,
    max_depth: usize,
}

impl Default for ContentResolverBuilder {
    fn default() -> Self {
        Self {
            resolvers: HashMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ContentResolverBuilder {
    /// Register under the resolver's own tag. A later registration for the
    /// same tag replaces the earlier one.
    pub fn register(self, resolver: Arc<dyn ContentTypeResolver>) -> Self {
        let tag = resolver.content_type();
        self.register_as(tag, resolver)
    }

    pub fn register_as(
        mut self,
        tag: impl Into<String>,
        resolver: Arc<dyn ContentTypeResolver>,
    ) -> Self {
        self.resolvers.insert(tag.into(), resolver);
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn build(self) -> ContentResolver {
        ContentResolver {
            resolvers: self.resolvers,
            max_depth: self.max_depth,
        }
    }
}
