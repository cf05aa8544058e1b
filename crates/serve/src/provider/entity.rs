// crates/serve/src/provider/entity.rs

use async_trait::async_trait;
use domain::{
    entity::{Account, Contact, Media},
    property::PropertyParameter,
};

use super::{DataProviderResolver, DataProviderResult};
use crate::{
    backend::{ProviderConfiguration, ProviderQuery, SharedDataProvider},
    ctx::ResolveAttributes,
    resolver::ResolveContext,
    serializer::{AccountSerializer, ContactSerializer, MediaSerializer},
    Result,
};

/// Serializes the items of an entity provider one by one.
macro_rules! entity_provider_resolver {
    ($name:ident, $alias:literal, $item:ty, $serializer:ty) => {
        pub struct $name {
            provider: SharedDataProvider<$item>,
            serializer: $serializer,
        }

        impl $name {
            pub fn new(provider: SharedDataProvider<$item>, serializer: $serializer) -> Self {
                Self {
                    provider,
                    serializer,
                }
            }
        }

        #[async_trait]
        impl DataProviderResolver for $name {
            fn data_provider(&self) -> &'static str {
                $alias
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
                _attributes: &ResolveAttributes,
                _cx: &ResolveContext<'_>,
            ) -> Result<DataProviderResult> {
                let result = self.provider.resolve_resource_items(query).await?;
                let items = result
                    .items
                    .iter()
                    .map(|item| self.serializer.serialize(item))
                    .collect::<Result<Vec<_>>>()?;

                Ok(DataProviderResult {
                    items,
                    has_next_page: result.has_next_page,
                })
            }
        }
    };
}

entity_provider_resolver!(MediaDataProviderResolver, "media", Media, MediaSerializer);
entity_provider_resolver!(AccountDataProviderResolver, "accounts", Account, AccountSerializer);
entity_provider_resolver!(ContactDataProviderResolver, "contacts", Contact, ContactSerializer);
