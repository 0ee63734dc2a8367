//! Abstract definition documents.
//!
//! The compiler consumes a hierarchical tree of named nodes with string
//! attribute maps, ordered children, and optional text content. How that
//! tree is produced (XML, JSON, a hand-built fixture) is a front-end
//! concern and not part of this crate's contract - the serde derives let
//! any format that maps onto [`Node`] feed the compiler.
//!
//! ## Example
//!
//! ```
//! use skill_engine::document::Node;
//!
//! let doc = Node::new("list").child(
//!     Node::new("skill")
//!         .attr("id", "100")
//!         .attr("name", "Soul Drain")
//!         .attr("max-level", "5"),
//! );
//!
//! let skill = doc.children_by_tag("skill").next().unwrap();
//! assert_eq!(skill.attr_u32_req("id").unwrap(), 100);
//! assert_eq!(skill.attr_i32("missing", 7), 7);
//! ```

use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{Result, SkillError};

/// A node in a definition document.
///
/// Attributes are kept as strings exactly as the markup front-end read
/// them; the typed readers below parse on access.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Node {
    /// Tag name.
    pub tag: String,

    /// Attribute map (string-valued, parsed on access).
    #[serde(default)]
    pub attributes: FxHashMap<String, String>,

    /// Raw text content, if any.
    #[serde(default)]
    pub text: Option<String>,

    /// Ordered child nodes.
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node with a tag and no attributes or children.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Add an attribute (builder pattern).
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add a child node (builder pattern).
    #[must_use]
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Set the text content (builder pattern).
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Iterate children with a specific tag, in document order.
    pub fn children_by_tag<'a, 'b>(
        &'a self,
        tag: &'b str,
    ) -> impl Iterator<Item = &'a Node> + use<'a, 'b> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// First child with a specific tag.
    #[must_use]
    pub fn first_child(&self, tag: &str) -> Option<&Node> {
        self.children_by_tag(tag).next()
    }

    /// Raw text content, trimmed. Empty string when absent.
    #[must_use]
    pub fn text_content(&self) -> &str {
        self.text.as_deref().map_or("", str::trim)
    }

    // === Attribute readers ===

    /// Raw attribute value.
    #[must_use]
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Mandatory string attribute.
    pub fn attr_str_req(&self, key: &str) -> Result<&str> {
        self.attr_str(key)
            .ok_or_else(|| SkillError::missing_attr(&self.tag, key))
    }

    /// Parse an attribute with `FromStr`, erroring on malformed values
    /// and falling back to `default` when absent.
    pub fn attr_or<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        match self.attr_str(key) {
            None => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|_| SkillError::bad_attr(&self.tag, key, raw)),
        }
    }

    /// Parse a mandatory attribute with `FromStr`.
    pub fn attr_req<T: FromStr>(&self, key: &str) -> Result<T> {
        let raw = self.attr_str_req(key)?;
        raw.parse()
            .map_err(|_| SkillError::bad_attr(&self.tag, key, raw))
    }

    /// Mandatory `u32` attribute.
    pub fn attr_u32_req(&self, key: &str) -> Result<u32> {
        self.attr_req(key)
    }

    /// Mandatory `u16` attribute.
    pub fn attr_u16_req(&self, key: &str) -> Result<u16> {
        self.attr_req(key)
    }

    /// Optional `i32` attribute with default.
    pub fn attr_i32(&self, key: &str, default: i32) -> i32 {
        self.attr_or(key, default).unwrap_or(default)
    }

    /// Optional `u16` attribute with default.
    pub fn attr_u16(&self, key: &str, default: u16) -> u16 {
        self.attr_or(key, default).unwrap_or(default)
    }

    /// Optional `f64` attribute with default.
    pub fn attr_f64(&self, key: &str, default: f64) -> f64 {
        self.attr_or(key, default).unwrap_or(default)
    }

    /// Optional `bool` attribute with default.
    pub fn attr_bool(&self, key: &str, default: bool) -> bool {
        self.attr_or(key, default).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let node = Node::new("skill")
            .attr("id", "42")
            .child(Node::new("consume").attr("soul", "2"))
            .child(Node::new("effects"));

        assert_eq!(node.attr_u32_req("id").unwrap(), 42);
        assert_eq!(node.children_by_tag("consume").count(), 1);
        assert!(node.first_child("effects").is_some());
        assert!(node.first_child("target").is_none());
    }

    #[test]
    fn test_missing_mandatory_attribute_is_parse_error() {
        let node = Node::new("skill");
        let err = node.attr_u32_req("id").unwrap_err();
        assert!(matches!(err, SkillError::Parse(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_malformed_attribute_is_parse_error() {
        let node = Node::new("skill").attr("id", "not-a-number");
        assert!(node.attr_u32_req("id").is_err());
        // Defaulted readers swallow malformed values.
        assert_eq!(node.attr_i32("id", -1), -1);
    }

    #[test]
    fn test_deserializes_from_json() {
        let doc: Node = serde_json::from_str(
            r#"{
                "tag": "list",
                "children": [
                    { "tag": "skill", "attributes": { "id": "7" } }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.tag, "list");
        assert_eq!(
            doc.first_child("skill").unwrap().attr_u32_req("id").unwrap(),
            7
        );
    }
}
