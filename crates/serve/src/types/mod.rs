// crates/serve/src/types/mod.rs

//! One resolver per content type tag.

pub mod account;
pub mod block;
pub mod category;
pub mod collection;
pub mod contact;
pub mod image_map;
pub mod link;
pub mod media;
pub mod page;
pub mod route;
pub mod single;
pub mod smart_content;
pub mod snippet;
pub mod teaser;
pub mod text_editor;

use serde_json::{json, Map as JsonMap, Value as Json};
use std::{collections::HashMap, hash::Hash};

pub use single::SingleSelectionResolver;

/// `null`, `""`, `[]` and `{}` count as "nothing selected".
pub(crate) fn is_blank(data: &Json) -> bool {
    match data {
        Json::Null => true,
        Json::String(s) => s.is_empty(),
        Json::Array(a) => a.is_empty(),
        Json::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Numeric ids of a selection; numeric strings are accepted, anything else
/// is ignored.
pub(crate) fn numeric_ids(data: &Json) -> Vec<i64> {
    data.as_array()
        .map(|items| items.iter().filter_map(json_i64).collect())
        .unwrap_or_default()
}

/// String ids of a selection (page/snippet uuids).
pub(crate) fn string_ids(data: &Json) -> Vec<String> {
    data.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| match v {
                    Json::String(s) if !s.is_empty() => Some(s.clone()),
                    Json::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn json_i64(value: &Json) -> Option<i64> {
    match value {
        Json::Number(n) => n.as_i64(),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Puts `items` in the order of `ids`. Ids without an item are dropped;
/// a repeated id yields the item once per occurrence.
pub(crate) fn order_by_ids<K, T, F>(ids: &[K], items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    T: Clone,
    F: Fn(&T) -> K,
{
    let by_id: HashMap<K, T> = items.into_iter().map(|item| (key(&item), item)).collect();
    ids.iter().filter_map(|id| by_id.get(id).cloned()).collect()
}

pub(crate) fn ids_view(data: &Json) -> Json {
    json!({ "ids": data })
}

pub(crate) fn empty_ids_view() -> Json {
    json!({ "ids": [] })
}

pub(crate) fn empty_object() -> Json {
    Json::Object(JsonMap::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values() {
        assert!(is_blank(&Json::Null));
        assert!(is_blank(&json!([])));
        assert!(is_blank(&json!({})));
        assert!(is_blank(&json!("")));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!([1])));
    }

    #[test]
    fn ids_accept_numeric_strings() {
        assert_eq!(numeric_ids(&json!([1, "2", "x", null, 3.5])), vec![1, 2]);
        assert_eq!(string_ids(&json!(["a", "", 5])), vec!["a".to_string(), "5".to_string()]);
        assert!(numeric_ids(&json!("1")).is_empty());
    }

    #[test]
    fn order_follows_ids_and_drops_missing() {
        let items = vec![(3, "c"), (1, "a"), (2, "b")];
        let ordered = order_by_ids(&[1, 4, 2, 3], items, |(id, _)| *id);
        assert_eq!(ordered, vec![(1, "a"), (2, "b"), (3, "c")]);
    }
}
