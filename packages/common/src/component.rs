//! # Component Model
//!
//! The serialized shape shared by the store, the validation engine and the
//! import/export layer:
//!
//! ```text
//! { id, type, props, children: [...], metadata, styles?, events? }
//! ```
//!
//! `ComponentNode` is the nested (tree) form. The editor keeps nodes in a flat
//! arena and materializes this form on demand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CommonResult;
use crate::visitor::{walk_node, walk_node_mut, Visitor, VisitorMut};

/// Untyped property value (string, number, bool, list, object)
pub type PropValue = Value;

/// Ordered property map
pub type Props = BTreeMap<String, PropValue>;

/// CSS property → value
pub type Styles = BTreeMap<String, String>;

/// Event name → handler reference
pub type Events = BTreeMap<String, String>;

/// Descriptive metadata attached to every component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMetadata {
    /// Component type key this metadata describes (e.g. "image")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ComponentMetadata {
    /// Default metadata for a component type
    pub fn for_type(component_type: impl Into<String>) -> Self {
        let component_type = component_type.into();
        Self {
            id: Some(component_type.clone()),
            name: component_type,
            category: "general".to_string(),
            version: "1.0.0".to_string(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A component and its owned subtree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentNode {
    /// Globally unique id (empty = not yet assigned)
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type", default)]
    pub component_type: String,

    #[serde(default)]
    pub props: Props,

    #[serde(default)]
    pub children: Vec<ComponentNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ComponentMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Styles>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Events>,
}

impl ComponentNode {
    /// Create a node of the given type with default metadata and no id
    pub fn new(component_type: impl Into<String>) -> Self {
        let component_type = component_type.into();
        Self {
            metadata: Some(ComponentMetadata::for_type(component_type.clone())),
            component_type,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: ComponentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_metadata(mut self, metadata: ComponentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn without_metadata(mut self) -> Self {
        self.metadata = None;
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles
            .get_or_insert_with(Styles::new)
            .insert(property.into(), value.into());
        self
    }

    pub fn with_event(mut self, name: impl Into<String>, handler: impl Into<String>) -> Self {
        self.events
            .get_or_insert_with(Events::new)
            .insert(name.into(), handler.into());
        self
    }

    /// Strip every id in the subtree so fresh ids get assigned on insertion
    pub fn without_ids(mut self) -> Self {
        ClearIds.visit_node_mut(&mut self);
        self
    }

    pub fn prop(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    /// True when the prop exists and is truthy (see [`is_truthy`])
    pub fn has_prop(&self, key: &str) -> bool {
        self.props.get(key).is_some_and(is_truthy)
    }

    /// Every id in the subtree, pre-order
    pub fn ids(&self) -> Vec<String> {
        let mut collector = IdCollector::default();
        collector.visit_node(self);
        collector.ids
    }

    /// Number of nodes in the subtree (including self)
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ComponentNode::count).sum::<usize>()
    }

    /// Parse a JSON array of nodes
    pub fn from_json_array(data: &str) -> CommonResult<Vec<ComponentNode>> {
        Ok(serde_json::from_str(data)?)
    }

    /// Serialize nodes as a JSON array
    pub fn to_json_array(nodes: &[ComponentNode], pretty: bool) -> CommonResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(nodes)?
        } else {
            serde_json::to_string(nodes)?
        };
        Ok(json)
    }
}

/// JavaScript-style truthiness for prop values
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Collects ids in pre-order
#[derive(Debug, Default)]
pub struct IdCollector {
    pub ids: Vec<String>,
}

impl Visitor for IdCollector {
    fn visit_node(&mut self, node: &ComponentNode) {
        self.ids.push(node.id.clone());
        walk_node(self, node);
    }
}

struct ClearIds;

impl VisitorMut for ClearIds {
    fn visit_node_mut(&mut self, node: &mut ComponentNode) {
        node.id.clear();
        walk_node_mut(self, node);
    }
}
