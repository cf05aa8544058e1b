// crates/serve/src/provider/structure.rs

//! Page and snippet providers only return ids and their own flattened
//! data; the structures are reloaded and resolved so nested content comes
//! out the same way as everywhere else.

use async_trait::async_trait;
use domain::property::PropertyParameter;

use super::{DataProviderResolver, DataProviderResult};
use crate::{
    backend::{ProviderConfiguration, ProviderQuery, ResourceItem, SharedDataProvider},
    ctx::ResolveAttributes,
    resolver::ResolveContext,
    types::page::StructureLoader,
    Result,
};

async fn resolve_structures(
    provider: &SharedDataProvider<ResourceItem>,
    loader: &StructureLoader,
    query: &ProviderQuery<'_>,
    attributes: &ResolveAttributes,
    cx: &ResolveContext<'_>,
) -> Result<DataProviderResult> {
    let result = provider.resolve_resource_items(query).await?;
    let ids: Vec<String> = result.items.iter().map(|item| item.id.clone()).collect();

    let items = loader
        .serialize(&ids, query.params, &query.options.locale, attributes, cx)
        .await?;

    Ok(DataProviderResult {
        items,
        has_next_page: result.has_next_page,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// pages
// ─────────────────────────────────────────────────────────────────────────────

pub struct PageDataProviderResolver {
    provider: SharedDataProvider<ResourceItem>,
    loader: StructureLoader,
}

impl PageDataProviderResolver {
    pub fn new(provider: SharedDataProvider<ResourceItem>, loader: StructureLoader) -> Self {
        Self { provider, loader }
    }
}

#[async_trait]
impl DataProviderResolver for PageDataProviderResolver {
    fn data_provider(&self) -> &'static str {
        "pages"
    }

    fn configuration(&self) -> ProviderConfiguration {
        self.provider.configuration()
    }

    fn default_property_parameters(&self) -> Vec<PropertyParameter> {
        self.provider.default_property_parameters()
    }

    async fn resolve(
        &self,
        query: &ProviderQuery<'_>,
        attributes: &ResolveAttributes,
        cx: &ResolveContext<'_>,
    ) -> Result<DataProviderResult> {
        resolve_structures(&self.provider, &self.loader, query, attributes, cx).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// snippets
// ─────────────────────────────────────────────────────────────────────────────

pub struct SnippetDataProviderResolver {
    provider: SharedDataProvider<ResourceItem>,
    loader: StructureLoader,
}

impl SnippetDataProviderResolver {
    pub fn new(provider: SharedDataProvider<ResourceItem>, loader: StructureLoader) -> Self {
        Self { provider, loader }
    }
}

#[async_trait]
impl DataProviderResolver for SnippetDataProviderResolver {
    fn data_provider(&self) -> &'static str {
        "snippets"
    }

    fn configuration(&self) -> ProviderConfiguration {
        self.provider.configuration()
    }

    fn default_property_parameters(&self) -> Vec<PropertyParameter> {
        self.provider.default_property_parameters()
    }

    async fn resolve(
        &self,
        query: &ProviderQuery<'_>,
        attributes: &ResolveAttributes,
        cx: &ResolveContext<'_>,
    ) -> Result<DataProviderResult> {
        resolve_structures(&self.provider, &self.loader, query, attributes, cx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{
            BackendResult, ContentQuery, DataProvider, MockContentMapper, MockContentQueryBuilder,
            ProviderOptions, ProviderResult,
        },
        resolver::ContentResolver,
    };
    use domain::{
        property::{Property, PropertyParams},
        structure::Structure,
    };
    use serde_json::{json, Map as JsonMap, Value as Json};
    use std::sync::Arc;

    /// Returns three ids, one of which no longer loads.
    struct ThreePages;

    #[async_trait]
    impl DataProvider for ThreePages {
        type Item = ResourceItem;

        fn configuration(&self) -> ProviderConfiguration {
            ProviderConfiguration::default()
        }

        fn default_property_parameters(&self) -> Vec<PropertyParameter> {
            vec![PropertyParameter::new("max_per_page", 10)]
        }

        async fn resolve_resource_items(
            &self,
            _query: &ProviderQuery<'_>,
        ) -> BackendResult<ProviderResult<ResourceItem>> {
            Ok(ProviderResult {
                items: ["c", "gone", "a"]
                    .iter()
                    .map(|id| ResourceItem {
                        id: id.to_string(),
                        data: JsonMap::new(),
                    })
                    .collect(),
                has_next_page: false,
            })
        }
    }

    fn page(uuid: &str) -> Structure {
        Structure::page(uuid, "default")
            .with_property(Property::new("title", "text_line").with_value(uuid.to_uppercase()))
            .with_extension(
                "excerpt",
                json!({ "title": format!("excerpt {uuid}") })
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
            )
    }

    #[tokio::test]
    async fn reloads_structures_in_provider_order() {
        let mut qb = MockContentQueryBuilder::new();
        qb.expect_build().returning(|options, webspace, locales| ContentQuery {
            ids: options.ids.clone(),
            properties: options.properties.clone(),
            published: options.published,
            webspace_key: webspace.to_string(),
            locales: locales.to_vec(),
        });
        let mut mapper = MockContentMapper::new();
        mapper
            .expect_load_by_query()
            .withf(|query, locale, _| query.ids == ["c", "gone", "a"] && locale == "de")
            .returning(|_, _, _| Ok(vec![page("a"), page("c")]));

        let resolver = PageDataProviderResolver::new(
            Arc::new(ThreePages),
            StructureLoader::new(Arc::new(qb), Arc::new(mapper)),
        );
        let registry = ContentResolver::builder().build();

        let filters = JsonMap::new();
        let params = PropertyParams::new(vec![PropertyParameter::collection(
            "properties",
            vec![PropertyParameter::new("excerptTitle", "excerpt.title")],
        )]);
        let options = ProviderOptions {
            webspace_key: "example".into(),
            locale: "de".into(),
        };
        let query = ProviderQuery {
            filters: &filters,
            params: &params,
            options: &options,
            limit: None,
            page: 1,
            page_size: None,
        };

        let result = resolver
            .resolve(&query, &ResolveAttributes::new().with_webspace("example"), &registry.context())
            .await
            .expect("resolve");

        let ids: Vec<&Json> = result.items.iter().map(|item| &item["id"]).collect();
        assert_eq!(ids, vec![&json!("c"), &json!("a")]);
        assert_eq!(result.items[0]["content"]["title"], json!("C"));
        assert_eq!(result.items[0]["content"]["excerptTitle"], json!("excerpt c"));
        assert!(!result.has_next_page);
        assert_eq!(resolver.default_property_parameters().len(), 1);
    }
}
