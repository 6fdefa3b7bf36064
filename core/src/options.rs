//! Ready-made field option objects.

use crate::format::encode_tags;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A static `{id, text}` list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Stored key.
    pub id: String,
    /// Display text.
    pub text: String,
}

/// Options for a field with a fixed item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// Selectable items.
    pub items: Vec<ListItem>,
}

/// `True`/`False` items keyed `"1"`/`"0"`.
#[must_use]
pub fn bool_options() -> ListOptions {
    ListOptions {
        items: vec![
            ListItem {
                id: "1".to_string(),
                text: "True".to_string(),
            },
            ListItem {
                id: "0".to_string(),
                text: "False".to_string(),
            },
        ],
    }
}

/// Options for a `list` field that loads its items from a dropdown endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteListOptions {
    /// Endpoint answering [`DropdownRequest`](crate::protocol::DropdownRequest)s.
    pub url: String,
    /// Field type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Record member holding the item id.
    pub rec_id: String,
    /// Match mode for typed text.
    #[serde(rename = "match")]
    pub match_mode: String,
    /// Text alignment.
    pub align: String,
    /// Maximum number of cached items.
    pub cache_max: u32,
    /// Characters typed before the first request.
    pub min_length: u32,
    /// Open the drop-down on focus.
    pub open_on_focus: bool,
}

impl RemoteListOptions {
    /// Render one drop-down entry: the item's escaped `text`.
    #[must_use]
    pub fn render_drop(item: &Value) -> String {
        item.get("text")
            .and_then(Value::as_str)
            .map(encode_tags)
            .unwrap_or_default()
    }
}

/// Remote list options with the toolkit defaults used across the application.
#[must_use]
pub fn remote_list_options(url: impl Into<String>) -> RemoteListOptions {
    RemoteListOptions {
        url: url.into(),
        kind: "list".to_string(),
        rec_id: "id".to_string(),
        match_mode: "contains".to_string(),
        align: "left".to_string(),
        cache_max: 5000,
        min_length: 0,
        open_on_focus: true,
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect for clear failure messages
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool_options() {
        assert_eq!(
            serde_json::to_value(bool_options()).expect("serializes"),
            json!({"items": [{"id": "1", "text": "True"}, {"id": "0", "text": "False"}]})
        );
    }

    #[test]
    fn test_remote_list_options() {
        assert_eq!(
            serde_json::to_value(remote_list_options("/api/v1/status/dropdown")).expect("serializes"),
            json!({
                "url": "/api/v1/status/dropdown",
                "type": "list",
                "recId": "id",
                "match": "contains",
                "align": "left",
                "cacheMax": 5000,
                "minLength": 0,
                "openOnFocus": true
            })
        );
    }

    #[test]
    fn test_render_drop() {
        assert_eq!(
            RemoteListOptions::render_drop(&json!({"id": 1, "text": "<b>x</b>"})),
            "&lt;b&gt;x&lt;&#x2f;b&gt;"
        );
        assert_eq!(RemoteListOptions::render_drop(&json!({"id": 1})), "");
    }
}
