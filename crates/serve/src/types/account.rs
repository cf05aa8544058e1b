// crates/serve/src/types/account.rs

use async_trait::async_trait;
use domain::{content::ContentView, property::Property};
use serde_json::Value as Json;
use std::sync::Arc;

use super::{empty_ids_view, ids_view, is_blank, numeric_ids, order_by_ids};
use crate::{
    backend::AccountManager,
    ctx::ResolveAttributes,
    resolver::{ContentTypeResolver, ResolveContext},
    serializer::AccountSerializer,
    Result,
};

pub struct AccountSelectionResolver {
    accounts: Arc<dyn AccountManager>,
    serializer: AccountSerializer,
}

impl AccountSelectionResolver {
    pub fn new(accounts: Arc<dyn AccountManager>, serializer: AccountSerializer) -> Self {
        Self {
            accounts,
            serializer,
        }
    }
}

#[async_trait]
impl ContentTypeResolver for AccountSelectionResolver {
    fn content_type(&self) -> &'static str {
        "account_selection"
    }

    async fn resolve(
        &self,
        data: &Json,
        _property: &Property,
        locale: &str,
        _attributes: &ResolveAttributes,
        _cx: &ResolveContext<'_>,
    ) -> Result<ContentView> {
        if is_blank(data) {
            return Ok(ContentView::new(Json::Array(vec![]), empty_ids_view()));
        }

        let ids = numeric_ids(data);
        let accounts = self.accounts.get_by_ids(&ids, locale).await?;

        let content = order_by_ids(&ids, accounts, |a| a.id)
            .iter()
            .map(|account| self.serializer.serialize(account))
            .collect::<Result<Vec<_>>>()?;

        Ok(ContentView::new(content, ids_view(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::MockAccountManager, resolver::ContentResolver, types::SingleSelectionResolver};
    use domain::entity::Account;
    use serde_json::json;

    fn account(id: i64) -> Account {
        Account {
            id,
            name: format!("account {id}"),
            ..Default::default()
        }
    }

    fn registry(accounts: MockAccountManager) -> ContentResolver {
        let list = Arc::new(AccountSelectionResolver::new(
            Arc::new(accounts),
            AccountSerializer::default(),
        ));
        ContentResolver::builder()
            .register(list.clone())
            .register(Arc::new(SingleSelectionResolver::new(
                "single_account_selection",
                list,
            )))
            .build()
    }

    #[tokio::test]
    async fn content_follows_input_order() {
        let mut accounts = MockAccountManager::new();
        accounts
            .expect_get_by_ids()
            .withf(|ids, locale| ids == [1, 2, 3] && locale == "en")
            .times(1)
            .returning(|_, _| Ok(vec![account(3), account(1), account(2)]));

        let cv = registry(accounts)
            .resolve(
                &json!([1, 2, 3]),
                &Property::new("accounts", "account_selection"),
                "en",
                &ResolveAttributes::new(),
            )
            .await
            .expect("resolve");

        let ids: Vec<i64> = cv
            .content()
            .as_array()
            .expect("list")
            .iter()
            .filter_map(|a| a["id"].as_i64())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(cv.view(), &json!({ "ids": [1, 2, 3] }));
    }

    #[tokio::test]
    async fn empty_selection_never_hits_backend() {
        let mut accounts = MockAccountManager::new();
        accounts.expect_get_by_ids().never();
        let registry = registry(accounts);

        for data in [Json::Null, json!([])] {
            let cv = registry
                .resolve(
                    &data,
                    &Property::new("accounts", "account_selection"),
                    "en",
                    &ResolveAttributes::new(),
                )
                .await
                .expect("resolve");
            assert_eq!(cv, ContentView::new(json!([]), json!({ "ids": [] })));
        }

        let single = registry
            .resolve(
                &Json::Null,
                &Property::new("account", "single_account_selection"),
                "en",
                &ResolveAttributes::new(),
            )
            .await
            .expect("resolve");
        assert_eq!(single, ContentView::new(Json::Null, json!({ "id": null })));
    }

    #[tokio::test]
    async fn single_unwraps_first_entry() {
        let mut accounts = MockAccountManager::new();
        accounts
            .expect_get_by_ids()
            .withf(|ids, _| ids == [7])
            .returning(|_, _| Ok(vec![account(7)]));

        let cv = registry(accounts)
            .resolve(
                &json!(7),
                &Property::new("account", "single_account_selection"),
                "en",
                &ResolveAttributes::new(),
            )
            .await
            .expect("resolve");

        assert_eq!(cv.content()["name"], json!("account 7"));
        assert_eq!(cv.view(), &json!({ "id": 7 }));
    }

    #[tokio::test]
    async fn single_missing_entity_is_null() {
        let mut accounts = MockAccountManager::new();
        accounts.expect_get_by_ids().returning(|_, _| Ok(vec![]));

        let cv = registry(accounts)
            .resolve(
                &json!(7),
                &Property::new("account", "single_account_selection"),
                "en",
                &ResolveAttributes::new(),
            )
            .await
            .expect("resolve");

        assert!(cv.content().is_null());
    }
}
