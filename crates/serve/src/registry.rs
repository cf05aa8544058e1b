// crates/serve/src/registry.rs

//! Default wiring: every content type and data provider this crate ships,
//! built from one bundle of collaborators.

use domain::{
    entity::{Account, Contact, Media},
    setting::Settings,
};
use std::sync::Arc;

use crate::{
    backend::{
        AccountManager, CategoryManager, CollectionManager, ContactManager, ContentMapper,
        ContentQueryBuilder, LinkProviderPool, MarkupParser, MediaManager, ResourceItem,
        SharedDataProvider, TagManager, TeaserManager,
    },
    ctx::request::{CategoryRequestHandler, TagRequestHandler, TargetGroupStore},
    provider::{
        AccountDataProviderResolver, ContactDataProviderResolver, MediaDataProviderResolver,
        PageDataProviderResolver, SnippetDataProviderResolver,
    },
    resolver::{ContentResolver, ContentResolverBuilder, ContentTypeResolver},
    serializer::{AccountSerializer, ContactSerializer, MediaSerializer, TeaserSerializer},
    types::{
        account::AccountSelectionResolver,
        block::BlockResolver,
        category::CategorySelectionResolver,
        collection::CollectionSelectionResolver,
        contact::{ContactAccountSelectionResolver, ContactSelectionResolver},
        image_map::ImageMapResolver,
        link::LinkResolver,
        media::{MediaSelectionResolver, SingleMediaSelectionResolver},
        page::{PageSelectionResolver, StructureLoader},
        route::{PageTreeRouteResolver, ResourceLocatorResolver},
        smart_content::SmartContentResolver,
        snippet::SnippetSelectionResolver,
        teaser::TeaserSelectionResolver,
        text_editor::TextEditorResolver,
        SingleSelectionResolver,
    },
};

/// Collaborators the default resolvers are built from.
#[derive(Clone)]
pub struct Services {
    pub media: Arc<dyn MediaManager>,
    pub accounts: Arc<dyn AccountManager>,
    pub contacts: Arc<dyn ContactManager>,
    pub categories: Arc<dyn CategoryManager>,
    pub collections: Arc<dyn CollectionManager>,
    pub teasers: Arc<dyn TeaserManager>,
    pub tags: Arc<dyn TagManager>,

    pub query_builder: Arc<dyn ContentQueryBuilder>,
    pub content_mapper: Arc<dyn ContentMapper>,
    pub markup: Arc<dyn MarkupParser>,
    pub links: Arc<dyn LinkProviderPool>,

    pub tag_requests: Arc<dyn TagRequestHandler>,
    pub category_requests: Arc<dyn CategoryRequestHandler>,
    pub target_groups: Option<Arc<dyn TargetGroupStore>>,

    pub page_provider: SharedDataProvider<ResourceItem>,
    pub snippet_provider: SharedDataProvider<ResourceItem>,
    pub media_provider: SharedDataProvider<Media>,
    pub account_provider: SharedDataProvider<Account>,
    pub contact_provider: SharedDataProvider<Contact>,
}

/// Plural resolver plus its `single_*` wrapper.
fn with_single(
    builder: ContentResolverBuilder,
    single: &'static str,
    plural: Arc<dyn ContentTypeResolver>,
) -> ContentResolverBuilder {
    builder
        .register(plural.clone())
        .register(Arc::new(SingleSelectionResolver::new(single, plural)))
}

pub fn default_resolver(services: &Services, settings: &Settings) -> ContentResolver {
    let media_serializer = MediaSerializer::new(settings.media.format_uri.clone());
    let account_serializer = AccountSerializer::new(media_serializer.clone());
    let contact_serializer = ContactSerializer::new(media_serializer.clone());
    let loader = StructureLoader::new(services.query_builder.clone(), services.content_mapper.clone());

    let mut smart_content = SmartContentResolver::new(
        services.tags.clone(),
        services.tag_requests.clone(),
        services.category_requests.clone(),
        settings.resolver.clone(),
    )
    .with_provider(Arc::new(PageDataProviderResolver::new(
        services.page_provider.clone(),
        loader.clone(),
    )))
    .with_provider(Arc::new(SnippetDataProviderResolver::new(
        services.snippet_provider.clone(),
        loader.clone(),
    )))
    .with_provider(Arc::new(MediaDataProviderResolver::new(
        services.media_provider.clone(),
        media_serializer.clone(),
    )))
    .with_provider(Arc::new(AccountDataProviderResolver::new(
        services.account_provider.clone(),
        account_serializer.clone(),
    )))
    .with_provider(Arc::new(ContactDataProviderResolver::new(
        services.contact_provider.clone(),
        contact_serializer.clone(),
    )));
    if let Some(store) = &services.target_groups {
        smart_content = smart_content.with_target_groups(store.clone());
    }

    let mut builder = ContentResolver::builder().max_depth(settings.resolver.max_depth);

    builder = with_single(
        builder,
        "single_account_selection",
        Arc::new(AccountSelectionResolver::new(
            services.accounts.clone(),
            account_serializer.clone(),
        )),
    );
    builder = with_single(
        builder,
        "single_contact_selection",
        Arc::new(ContactSelectionResolver::new(
            services.contacts.clone(),
            contact_serializer.clone(),
        )),
    );
    builder = with_single(
        builder,
        "single_category_selection",
        Arc::new(CategorySelectionResolver::new(services.categories.clone())),
    );
    builder = with_single(
        builder,
        "single_collection_selection",
        Arc::new(CollectionSelectionResolver::new(services.collections.clone())),
    );
    builder = with_single(
        builder,
        "single_page_selection",
        Arc::new(PageSelectionResolver::new(loader)),
    );
    builder = with_single(
        builder,
        "single_snippet_selection",
        Arc::new(SnippetSelectionResolver::new(services.content_mapper.clone())),
    );

    builder
        .register(Arc::new(ContactAccountSelectionResolver::new(
            services.contacts.clone(),
            services.accounts.clone(),
            contact_serializer,
            account_serializer,
        )))
        .register(Arc::new(MediaSelectionResolver::new(
            services.media.clone(),
            media_serializer.clone(),
        )))
        .register(Arc::new(SingleMediaSelectionResolver::new(
            services.media.clone(),
            media_serializer.clone(),
        )))
        .register(Arc::new(TeaserSelectionResolver::new(
            services.teasers.clone(),
            TeaserSerializer::new(services.media.clone(), media_serializer.clone()),
        )))
        .register(Arc::new(BlockResolver::default()))
        .register(Arc::new(ImageMapResolver::new(
            services.media.clone(),
            media_serializer,
        )))
        .register(Arc::new(smart_content))
        .register(Arc::new(LinkResolver::new(services.links.clone())))
        .register(Arc::new(TextEditorResolver::new(services.markup.clone())))
        .register(Arc::new(ResourceLocatorResolver))
        .register(Arc::new(PageTreeRouteResolver))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{
            BackendResult, DataProvider, MockAccountManager, MockCategoryManager,
            MockCollectionManager, MockContactManager, MockContentMapper, MockContentQueryBuilder,
            MockLinkProviderPool, MockMarkupParser, MockMediaManager, MockTagManager,
            MockTeaserManager, ProviderConfiguration, ProviderQuery, ProviderResult,
        },
        ctx::{
            request::{QueryCategoryRequestHandler, QueryTagRequestHandler},
            ResolveAttributes,
        },
    };
    use async_trait::async_trait;
    use domain::{
        content::ContentView,
        property::{Property, PropertyParameter},
    };
    use serde_json::json;
    use std::marker::PhantomData;

    struct NoItems<T>(PhantomData<fn() -> T>);

    #[async_trait]
    impl<T: Send + Sync + 'static> DataProvider for NoItems<T> {
        type Item = T;

        fn configuration(&self) -> ProviderConfiguration {
            ProviderConfiguration::default()
        }

        fn default_property_parameters(&self) -> Vec<PropertyParameter> {
            vec![]
        }

        async fn resolve_resource_items(
            &self,
            _query: &ProviderQuery<'_>,
        ) -> BackendResult<ProviderResult<T>> {
            Ok(ProviderResult {
                items: vec![],
                has_next_page: false,
            })
        }
    }

    fn no_items<T: Send + Sync + 'static>() -> SharedDataProvider<T> {
        Arc::new(NoItems(PhantomData))
    }

    /// Backends without expectations: any call fails the test.
    fn services() -> Services {
        Services {
            media: Arc::new(MockMediaManager::new()),
            accounts: Arc::new(MockAccountManager::new()),
            contacts: Arc::new(MockContactManager::new()),
            categories: Arc::new(MockCategoryManager::new()),
            collections: Arc::new(MockCollectionManager::new()),
            teasers: Arc::new(MockTeaserManager::new()),
            tags: Arc::new(MockTagManager::new()),
            query_builder: Arc::new(MockContentQueryBuilder::new()),
            content_mapper: Arc::new(MockContentMapper::new()),
            markup: Arc::new(MockMarkupParser::new()),
            links: Arc::new(MockLinkProviderPool::new()),
            tag_requests: Arc::new(QueryTagRequestHandler),
            category_requests: Arc::new(QueryCategoryRequestHandler),
            target_groups: None,
            page_provider: no_items(),
            snippet_provider: no_items(),
            media_provider: no_items(),
            account_provider: no_items(),
            contact_provider: no_items(),
        }
    }

    const TAGS: &[&str] = &[
        "account_selection",
        "single_account_selection",
        "contact_selection",
        "single_contact_selection",
        "contact_account_selection",
        "category_selection",
        "single_category_selection",
        "collection_selection",
        "single_collection_selection",
        "media_selection",
        "single_media_selection",
        "page_selection",
        "single_page_selection",
        "snippet_selection",
        "single_snippet_selection",
        "teaser_selection",
        "block",
        "image_map",
        "smart_content",
        "link",
        "text_editor",
        "resource_locator",
        "page_tree_route",
    ];

    #[test]
    fn every_content_type_is_registered() {
        let mut settings = Settings::default();
        settings.resolver.max_depth = 8;
        let registry = default_resolver(&services(), &settings);

        for tag in TAGS {
            assert!(registry.has(tag), "{tag} missing");
        }
        assert!(!registry.has("text_line"));
        assert_eq!(registry.max_depth(), 8);
    }

    #[tokio::test]
    async fn empty_values_touch_no_backend() {
        let registry = default_resolver(&services(), &Settings::default());

        for tag in TAGS.iter().filter(|t| **t != "smart_content") {
            let property = Property::new("p", *tag);
            registry
                .resolve(&json!(null), &property, "en", &ResolveAttributes::new())
                .await
                .unwrap_or_else(|e| panic!("{tag}: {e}"));
        }
    }

    #[tokio::test]
    async fn every_provider_alias_resolves() {
        let registry = default_resolver(&services(), &Settings::default());

        for alias in ["pages", "snippets", "media", "accounts", "contacts"] {
            let property = Property::new("list", "smart_content")
                .with_param(PropertyParameter::new("provider", alias));
            let cv = registry
                .resolve(&json!({}), &property, "en", &ResolveAttributes::new())
                .await
                .unwrap_or_else(|e| panic!("{alias}: {e}"));
            assert_eq!(cv.content(), &json!([]), "{alias}");
        }

        let unknown = Property::new("plain", "text_line");
        let cv = registry
            .resolve(&json!("hi"), &unknown, "en", &ResolveAttributes::new())
            .await
            .expect("identity");
        assert_eq!(cv, ContentView::new(json!("hi"), json!({})));
    }
}
