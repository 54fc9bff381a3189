//! Structural response schema passed to the backend as `responseSchema`.
//!
//! Nodes serialize to the Gemini schema dialect: `{"type": "OBJECT",
//! "properties": {...}, "required": [...]}`, `{"type": "ARRAY", "items": ...}`,
//! `{"type": "STRING"}` and `{"type": "NUMBER"}`.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Implemented by every type the backend is asked to produce.
pub trait ResponseSchema {
    fn schema() -> SchemaNode;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String,
    Number,
    Array(Box<SchemaNode>),
    Object(ObjectSchema),
}

/// Properties in declaration order plus the names that must be present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    properties: Vec<(&'static str, SchemaNode)>,
    required: Vec<&'static str>,
}

#[cfg(test)]
impl ObjectSchema {
    pub fn properties(&self) -> impl Iterator<Item = (&'static str, &SchemaNode)> {
        self.properties.iter().map(|(name, node)| (*name, node))
    }

    pub fn required_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.required.iter().copied()
    }
}

impl SchemaNode {
    pub fn object() -> Self {
        SchemaNode::Object(ObjectSchema::default())
    }

    pub fn array(items: SchemaNode) -> Self {
        SchemaNode::Array(Box::new(items))
    }

    pub fn string_array() -> Self {
        Self::array(SchemaNode::String)
    }

    /// Adds a required property. Only valid on object nodes.
    pub fn required(mut self, name: &'static str, node: SchemaNode) -> Self {
        debug_assert!(matches!(self, SchemaNode::Object(_)), "required() on a non-object node");
        if let SchemaNode::Object(object) = &mut self {
            object.properties.push((name, node));
            object.required.push(name);
        }
        self
    }

    fn type_name(&self) -> &'static str {
        match self {
            SchemaNode::String => "STRING",
            SchemaNode::Number => "NUMBER",
            SchemaNode::Array(_) => "ARRAY",
            SchemaNode::Object(_) => "OBJECT",
        }
    }

    pub fn to_value(&self) -> Value {
        // Serializing a SchemaNode cannot fail: all keys are strings.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Serializes a property list as a JSON object, keeping declaration order.
struct Properties<'a>(&'a [(&'static str, SchemaNode)]);

impl Serialize for Properties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, node) in self.0 {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.type_name())?;
        match self {
            SchemaNode::String | SchemaNode::Number => {}
            SchemaNode::Array(items) => map.serialize_entry("items", items)?,
            SchemaNode::Object(object) => {
                map.serialize_entry("properties", &Properties(&object.properties))?;
                map.serialize_entry("required", &object.required)?;
            }
        }
        map.end()
    }
}
