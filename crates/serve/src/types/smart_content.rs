// crates/serve/src/types/smart_content.rs

//! Smart content: a filtered, sorted and paginated query against one of the
//! registered data providers.
//!
//! The raw value carries the editor's filters (`tags`, `categories`,
//! `sortBy`, `limitResult`, `audienceTargeting`, ...). Website-level filters
//! come from the request query, and the page number too when the provider
//! paginates.

use async_trait::async_trait;
use domain::{
    content::ContentView,
    property::{Property, PropertyParameter},
    setting::ResolverSettings,
};
use serde_json::{json, Map as JsonMap, Value as Json};
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

use super::json_i64;
use crate::{
    backend::{ProviderOptions, ProviderQuery, TagManager},
    ctx::{
        request::{current_page, CategoryRequestHandler, TagRequestHandler, TargetGroupStore},
        ResolveAttributes,
    },
    provider::DataProviderResolver,
    resolver::{ContentTypeResolver, ResolveContext},
    Error, Result,
};

const DEFAULT_OPERATOR: &str = "OR";

pub struct SmartContentResolver {
    providers: HashMap<String, Arc<dyn DataProviderResolver>>,
    tags: Arc<dyn TagManager>,
    tag_requests: Arc<dyn TagRequestHandler>,
    category_requests: Arc<dyn CategoryRequestHandler>,
    target_groups: Option<Arc<dyn TargetGroupStore>>,
    settings: ResolverSettings,
}

impl SmartContentResolver {
    pub fn new(
        tags: Arc<dyn TagManager>,
        tag_requests: Arc<dyn TagRequestHandler>,
        category_requests: Arc<dyn CategoryRequestHandler>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            providers: HashMap::new(),
            tags,
            tag_requests,
            category_requests,
            target_groups: None,
            settings,
        }
    }

    /// Registers a provider under its `data_provider()` alias.
    pub fn with_provider(mut self, provider: Arc<dyn DataProviderResolver>) -> Self {
        self.providers
            .insert(provider.data_provider().to_string(), provider);
        self
    }

    pub fn with_target_groups(mut self, store: Arc<dyn TargetGroupStore>) -> Self {
        self.target_groups = Some(store);
        self
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Parameters every smart content property understands.
    fn global_defaults(&self) -> Vec<PropertyParameter> {
        vec![
            PropertyParameter::new("provider", self.settings.default_provider.clone()),
            PropertyParameter::new("page_parameter", self.settings.page_parameter.clone()),
            PropertyParameter::new("tags_parameter", self.settings.tags_parameter.clone()),
            PropertyParameter::new(
                "categories_parameter",
                self.settings.categories_parameter.clone(),
            ),
            PropertyParameter::new("website_tags_operator", DEFAULT_OPERATOR),
            PropertyParameter::new("website_categories_operator", DEFAULT_OPERATOR),
            PropertyParameter::new("exclude_duplicates", false),
        ]
    }

    /// Numeric entries first (in input order), then the ids of the named tags.
    /// Duplicates are kept.
    async fn tag_ids(&self, raw: &Json) -> Result<Vec<i64>> {
        let mut ids = Vec::new();
        let mut names = Vec::new();
        for entry in raw.as_array().into_iter().flatten() {
            match (json_i64(entry), entry) {
                (Some(id), _) => ids.push(id),
                (None, Json::String(name)) if !name.is_empty() => names.push(name.clone()),
                _ => {}
            }
        }

        if !names.is_empty() {
            ids.extend(self.tags.resolve_tag_names(&names).await?);
        }
        Ok(ids)
    }

    async fn website_tags(&self, attributes: &ResolveAttributes, parameter: &str) -> Result<Vec<i64>> {
        let names = self.tag_requests.tags(&attributes.request, parameter);
        if names.is_empty() {
            return Ok(vec![]);
        }
        Ok(self.tags.resolve_tag_names(&names).await?)
    }
}

fn is_missing(filters: &JsonMap<String, Json>, key: &str) -> bool {
    filters.get(key).is_none_or(Json::is_null)
}

#[async_trait]
impl ContentTypeResolver for SmartContentResolver {
    fn content_type(&self) -> &'static str {
        "smart_content"
    }

    #[tracing::instrument(skip_all, fields(property = %property.name))]
    async fn resolve(
        &self,
        data: &Json,
        property: &Property,
        locale: &str,
        attributes: &ResolveAttributes,
        cx: &ResolveContext<'_>,
    ) -> Result<ContentView> {
        let alias = property
            .params
            .str_value("provider")
            .unwrap_or(&self.settings.default_provider);
        let provider = self
            .providers
            .get(alias)
            .ok_or_else(|| Error::FeatureNotImplemented(alias.to_string()))?;

        let mut defaults = provider.default_property_parameters();
        for global in self.global_defaults() {
            if !defaults.iter().any(|p| p.name == global.name) {
                defaults.push(global);
            }
        }
        let params = property.params.with_defaults(&defaults);
        let param = |name: &str, fallback: &str| {
            params.str_value(name).unwrap_or(fallback).to_string()
        };

        // ── filters ─────────────────────────────────────────────────────────
        let mut filters = data.as_object().cloned().unwrap_or_default();

        if let Some(uuid) = &attributes.structure_uuid {
            filters.insert("excluded".into(), json!([uuid]));
        }
        for key in ["categories", "tags"] {
            if is_missing(&filters, key) {
                filters.insert(key.into(), json!([]));
            }
        }

        let tags_parameter = param("tags_parameter", &self.settings.tags_parameter);
        let website_tags = self.website_tags(attributes, &tags_parameter).await?;
        filters.insert("websiteTags".into(), json!(website_tags));
        filters.insert(
            "websiteTagsOperator".into(),
            json!(param("website_tags_operator", DEFAULT_OPERATOR)),
        );

        let categories_parameter =
            param("categories_parameter", &self.settings.categories_parameter);
        let website_categories = self
            .category_requests
            .categories(&attributes.request, &categories_parameter);
        filters.insert("websiteCategories".into(), json!(website_categories));
        filters.insert(
            "websiteCategoriesOperator".into(),
            json!(param("website_categories_operator", DEFAULT_OPERATOR)),
        );

        let targeting = filters
            .get("audienceTargeting")
            .and_then(Json::as_bool)
            .unwrap_or(false);
        if let Some(store) = self.target_groups.as_ref().filter(|_| targeting) {
            filters.insert("targetGroupId".into(), json!(store.target_group_id()));
        }

        let tags = self.tag_ids(&filters["tags"]).await?;
        filters.insert("tags".into(), json!(tags));

        // ── pagination ──────────────────────────────────────────────────────
        let configuration = provider.configuration();
        let max_per_page = params
            .i64_value("max_per_page")
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok());

        let (page, page_size) = match max_per_page {
            Some(size) if configuration.has_pagination => {
                let page_parameter = param("page_parameter", &self.settings.page_parameter);
                (current_page(&attributes.request, &page_parameter)?, Some(size))
            }
            _ => (1, None),
        };

        let limit = filters
            .get("limitResult")
            .and_then(json_i64)
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok());

        let options = ProviderOptions {
            webspace_key: attributes.webspace_key().to_string(),
            locale: locale.to_string(),
        };
        let query = ProviderQuery {
            filters: &filters,
            params: &params,
            options: &options,
            limit,
            page,
            page_size,
        };

        debug!(provider = alias, page, ?limit, ?page_size, "querying data provider");
        let result = provider.resolve(&query, attributes, cx).await?;

        if page > 1 && result.items.is_empty() {
            return Err(Error::page_out_of_bounds(page));
        }

        let mut view = filters;
        view.insert("page".into(), json!(page));
        view.insert("hasNextPage".into(), json!(result.has_next_page));
        view.insert("paginated".into(), json!(configuration.has_pagination));

        Ok(ContentView::new(Json::Array(result.items), Json::Object(view)))
    }
}
