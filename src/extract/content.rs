//! View of the document graph's labeled content.
//!
//! Content items are kept as raw JSON and only read where a lookup touches
//! them, so an unusual item in one group never affects lookups elsewhere.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label marking the content item that names its group.
pub const CONTENT_GROUP_LABEL: &str = "content_group_label";

/// One labeled item, borrowed from its group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Content<'a> {
    pub label: &'a str,
    /// Second element of the `[type-tag, payload]` value, if present.
    pub payload: Option<&'a Value>,
}

impl<'a> Content<'a> {
    /// Reads an item; `None` if it has no string label.
    fn read(item: &'a Value) -> Option<Self> {
        let label = item.get("label")?.as_str()?;
        let payload = item.get("value").and_then(|value| value.get(1));
        Some(Content { label, payload })
    }
}

/// An ordered group of content items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentGroup(pub Vec<Value>);

impl ContentGroup {
    /// Items that carry a label, in order.
    pub fn items(&self) -> impl Iterator<Item = Content<'_>> {
        self.0.iter().filter_map(Content::read)
    }

    /// Payload of the first item labeled `label`. A matching item without a
    /// payload is a miss.
    pub fn value(&self, label: &str) -> Option<&Value> {
        self.items().find(|content| content.label == label)?.payload
    }

    /// True if this group names itself `name`.
    pub fn is_labeled(&self, name: &str) -> bool {
        self.items().any(|content| {
            content.label == CONTENT_GROUP_LABEL
                && content.payload.and_then(Value::as_str) == Some(name)
        })
    }
}

/// Finds the first group labeled `name`.
pub fn content_group<'a>(groups: &'a [ContentGroup], name: &str) -> Option<&'a ContentGroup> {
    groups.iter().find(|group| group.is_labeled(name))
}

/// A document row from the graph's documents table.
///
/// Only `id` and the group structure are decoded; everything else in the
/// row is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Document {
    pub id: Value,
    #[serde(default)]
    pub content_groups: Vec<ContentGroup>,
}

impl Document {
    /// Looks up `label` inside the group named `group`.
    pub fn field(&self, group: &str, label: &str) -> Option<&Value> {
        content_group(&self.content_groups, group)?.value(label)
    }
}
