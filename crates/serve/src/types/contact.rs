// crates/serve/src/types/contact.rs

use async_trait::async_trait;
use domain::{
    content::ContentView,
    entity::{Account, Contact},
    property::Property,
};
use futures::future;
use serde_json::Value as Json;
use std::{collections::HashMap, sync::Arc};

use super::{empty_ids_view, ids_view, is_blank, numeric_ids, order_by_ids};
use crate::{
    backend::{AccountManager, ContactManager},
    ctx::ResolveAttributes,
    resolver::{ContentTypeResolver, ResolveContext},
    serializer::{AccountSerializer, ContactSerializer},
    Result,
};

// ─────────────────────────────────────────────────────────────────────────────
// contact_selection
// ─────────────────────────────────────────────────────────────────────────────

pub struct ContactSelectionResolver {
    contacts: Arc<dyn ContactManager>,
    serializer: ContactSerializer,
}

impl ContactSelectionResolver {
    pub fn new(contacts: Arc<dyn ContactManager>, serializer: ContactSerializer) -> Self {
        Self {
            contacts,
            serializer,
        }
    }
}

#[async_trait]
impl ContentTypeResolver for ContactSelectionResolver {
    fn content_type(&self) -> &'static str {
        "contact_selection"
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
        let contacts = self.contacts.get_by_ids(&ids, locale).await?;

        let content = order_by_ids(&ids, contacts, |c| c.id)
            .iter()
            .map(|contact| self.serializer.serialize(contact))
            .collect::<Result<Vec<_>>>()?;

        Ok(ContentView::new(content, ids_view(data)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// contact_account_selection
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ref {
    Contact(i64),
    Account(i64),
}

/// `c12` is contact 12, `a3` is account 3. Anything else is ignored.
fn parse_ref(raw: &Json) -> Option<Ref> {
    let raw = raw.as_str()?;
    let (prefix, id) = raw.split_at_checked(1)?;
    let id = id.parse().ok()?;
    match prefix {
        "c" => Some(Ref::Contact(id)),
        "a" => Some(Ref::Account(id)),
        _ => None,
    }
}

/// Mixed list of contacts and accounts, kept in selection order.
pub struct ContactAccountSelectionResolver {
    contacts: Arc<dyn ContactManager>,
    accounts: Arc<dyn AccountManager>,
    contact_serializer: ContactSerializer,
    account_serializer: AccountSerializer,
}

impl ContactAccountSelectionResolver {
    pub fn new(
        contacts: Arc<dyn ContactManager>,
        accounts: Arc<dyn AccountManager>,
        contact_serializer: ContactSerializer,
        account_serializer: AccountSerializer,
    ) -> Self {
        Self {
            contacts,
            accounts,
            contact_serializer,
            account_serializer,
        }
    }

    async fn load_contacts(&self, ids: &[i64], locale: &str) -> Result<Vec<Contact>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(self.contacts.get_by_ids(ids, locale).await?)
    }

    async fn load_accounts(&self, ids: &[i64], locale: &str) -> Result<Vec<Account>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(self.accounts.get_by_ids(ids, locale).await?)
    }
}

#[async_trait]
impl ContentTypeResolver for ContactAccountSelectionResolver {
    fn content_type(&self) -> &'static str {
        "contact_account_selection"
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

        let refs: Vec<Ref> = data
            .as_array()
            .map(|items| items.iter().filter_map(parse_ref).collect())
            .unwrap_or_default();

        let contact_ids: Vec<i64> = refs
            .iter()
            .filter_map(|r| match r {
                Ref::Contact(id) => Some(*id),
                Ref::Account(_) => None,
            })
            .collect();
        let account_ids: Vec<i64> = refs
            .iter()
            .filter_map(|r| match r {
                Ref::Account(id) => Some(*id),
                Ref::Contact(_) => None,
            })
            .collect();

        let (contacts, accounts) = future::try_join(
            self.load_contacts(&contact_ids, locale),
            self.load_accounts(&account_ids, locale),
        )
        .await?;

        let contacts: HashMap<i64, Contact> = contacts.into_iter().map(|c| (c.id, c)).collect();
        let accounts: HashMap<i64, Account> = accounts.into_iter().map(|a| (a.id, a)).collect();

        let mut content = Vec::with_capacity(refs.len());
        for r in refs {
            let item = match r {
                Ref::Contact(id) => contacts
                    .get(&id)
                    .map(|c| self.contact_serializer.serialize(c)),
                Ref::Account(id) => accounts
                    .get(&id)
                    .map(|a| self.account_serializer.serialize(a)),
            };
            if let Some(item) = item {
                content.push(item?);
            }
        }

        Ok(ContentView::new(content, ids_view(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{MockAccountManager, MockContactManager},
        resolver::ContentResolver,
    };
    use serde_json::json;

    fn contact(id: i64) -> Contact {
        Contact {
            id,
            first_name: format!("c{id}"),
            ..Default::default()
        }
    }

    fn account(id: i64) -> Account {
        Account {
            id,
            name: format!("a{id}"),
            ..Default::default()
        }
    }

    #[test]
    fn refs_need_a_known_prefix() {
        assert_eq!(parse_ref(&json!("c12")), Some(Ref::Contact(12)));
        assert_eq!(parse_ref(&json!("a3")), Some(Ref::Account(3)));
        assert_eq!(parse_ref(&json!("x3")), None);
        assert_eq!(parse_ref(&json!("c")), None);
        assert_eq!(parse_ref(&json!(3)), None);
    }

    #[tokio::test]
    async fn contacts_follow_input_order_and_skip_missing() {
        let mut contacts = MockContactManager::new();
        contacts
            .expect_get_by_ids()
            .withf(|ids, _| ids == [1, 2])
            .returning(|_, _| Ok(vec![contact(2)]));

        let registry = ContentResolver::builder()
            .register(Arc::new(ContactSelectionResolver::new(
                Arc::new(contacts),
                ContactSerializer::default(),
            )))
            .build();

        let cv = registry
            .resolve(
                &json!([1, 2]),
                &Property::new("contacts", "contact_selection"),
                "en",
                &ResolveAttributes::new(),
            )
            .await
            .expect("resolve");

        let content = cv.content().as_array().expect("list");
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["fullName"], json!("c2"));
    }

    #[tokio::test]
    async fn mixed_selection_keeps_order() {
        let mut contacts = MockContactManager::new();
        contacts
            .expect_get_by_ids()
            .withf(|ids, _| ids == [5, 1])
            .times(1)
            .returning(|_, _| Ok(vec![contact(1), contact(5)]));
        let mut accounts = MockAccountManager::new();
        accounts
            .expect_get_by_ids()
            .withf(|ids, _| ids == [2])
            .times(1)
            .returning(|_, _| Ok(vec![account(2)]));

        let registry = ContentResolver::builder()
            .register(Arc::new(ContactAccountSelectionResolver::new(
                Arc::new(contacts),
                Arc::new(accounts),
                ContactSerializer::default(),
                AccountSerializer::default(),
            )))
            .build();

        let data = json!(["c5", "a2", "z9", "c1"]);
        let cv = registry
            .resolve(
                &data,
                &Property::new("people", "contact_account_selection"),
                "en",
                &ResolveAttributes::new(),
            )
            .await
            .expect("resolve");

        let names: Vec<String> = cv
            .content()
            .as_array()
            .expect("list")
            .iter()
            .map(|item| {
                item.get("fullName")
                    .or_else(|| item.get("name"))
                    .and_then(Json::as_str)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();
        assert_eq!(names, vec!["c5", "a2", "c1"]);
        assert_eq!(cv.view(), &json!({ "ids": data }));
    }

    #[tokio::test]
    async fn only_accounts_skips_contact_backend() {
        let mut contacts = MockContactManager::new();
        contacts.expect_get_by_ids().never();
        let mut accounts = MockAccountManager::new();
        accounts
            .expect_get_by_ids()
            .returning(|_, _| Ok(vec![account(2)]));

        let registry = ContentResolver::builder()
            .register(Arc::new(ContactAccountSelectionResolver::new(
                Arc::new(contacts),
                Arc::new(accounts),
                ContactSerializer::default(),
                AccountSerializer::default(),
            )))
            .build();

        let cv = registry
            .resolve(
                &json!(["a2"]),
                &Property::new("people", "contact_account_selection"),
                "en",
                &ResolveAttributes::new(),
            )
            .await
            .expect("resolve");
        assert_eq!(cv.content().as_array().map(Vec::len), Some(1));
    }
}
