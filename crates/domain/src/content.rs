use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as Json};

/// Result of resolving a single property value.
///
/// `content` is what a client renders. `view` is side-channel metadata
/// describing how the content was produced (referenced ids, pagination
/// flags, ...) and must not be treated as content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentView {
    content: Json,
    view: Json,
}

impl ContentView {
    pub fn new(content: impl Into<Json>, view: impl Into<Json>) -> Self {
        Self {
            content: content.into(),
            view: view.into(),
        }
    }

    /// Content with an empty view object.
    pub fn content_only(content: impl Into<Json>) -> Self {
        Self::new(content, JsonMap::new())
    }

    /// `null` content, empty view object.
    pub fn empty() -> Self {
        Self::content_only(Json::Null)
    }

    pub fn content(&self) -> &Json {
        &self.content
    }

    pub fn view(&self) -> &Json {
        &self.view
    }

    pub fn into_parts(self) -> (Json, Json) {
        (self.content, self.view)
    }
}

impl Default for ContentView {
    fn default() -> Self {
        Self::empty()
    }
}
