//! # Schema Tree
//!
//! The normalized constraint tree produced by the builder. One tree per
//! (endpoint, location). Trees are acyclic and exactly as deep as the
//! declared nesting.
//!
//! The tree is rendered to a JSON Schema (Draft 2020-12) document for the
//! structural evaluator, and consulted again after evaluation to recover the
//! declared type and keyword parameters at a violation's path.

use serde_json::{json, Map, Number, Value};

use reqguard_core::{FieldPath, PathSegment};

/// A compiled schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Object(ObjectSchema),
    Array(ArraySchema),
    String(StringSchema),
    Number(NumberSchema),
    Boolean,
    /// Accepts any JSON value.
    Any,
}

/// Properties in declared order plus the names required at this level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub properties: Vec<(String, SchemaNode)>,
    pub required: Vec<String>,
}

impl ObjectSchema {
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: Box<SchemaNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    pub format: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub enum_values: Option<Vec<Value>>,
}

/// A numeric limit and whether the limit value itself is excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub limit: Number,
    pub exclusive: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSchema {
    /// `integer` rather than `number`.
    pub integer: bool,
    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
    pub enum_values: Option<Vec<Value>>,
}

impl SchemaNode {
    /// Type name used in type-mismatch messages; `None` for [`SchemaNode::Any`].
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Self::Object(_) => Some("object"),
            Self::Array(_) => Some("array"),
            Self::String(_) => Some("string"),
            Self::Number(n) if n.integer => Some("integer"),
            Self::Number(_) => Some("number"),
            Self::Boolean => Some("boolean"),
            Self::Any => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Declared allowed values, if this node is enum-constrained.
    pub fn enum_values(&self) -> Option<&[Value]> {
        match self {
            Self::String(s) => s.enum_values.as_deref(),
            Self::Number(n) => n.enum_values.as_deref(),
            _ => None,
        }
    }

    /// Walk to the node describing the value at `path`.
    ///
    /// Object nodes match keys exactly, so `"01"` never finds `"1"`. Array
    /// nodes accept index segments and canonical decimal keys.
    pub fn resolve(&self, path: &FieldPath) -> Option<&SchemaNode> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| match (node, segment) {
                (Self::Object(object), PathSegment::Key(key)) => object.property(key),
                (Self::Object(object), PathSegment::Index(index)) => {
                    object.property(&index.to_string())
                }
                (Self::Array(array), segment) => {
                    segment.as_index().map(|_| array.items.as_ref())
                }
                _ => None,
            })
    }

    /// Render as a JSON Schema document.
    pub fn to_json_schema(&self) -> Value {
        match self {
            Self::Object(object) => {
                let properties: Map<String, Value> = object
                    .properties
                    .iter()
                    .map(|(name, node)| (name.clone(), node.to_json_schema()))
                    .collect();
                let mut schema = json!({ "type": "object", "properties": properties });
                if !object.required.is_empty() {
                    schema["required"] = json!(object.required);
                }
                schema
            }
            Self::Array(array) => json!({ "type": "array", "items": array.items.to_json_schema() }),
            Self::String(s) => {
                let mut schema = Map::new();
                schema.insert("type".into(), json!("string"));
                if let Some(format) = &s.format {
                    schema.insert("format".into(), json!(format));
                }
                if let Some(min) = s.min_length {
                    schema.insert("minLength".into(), json!(min));
                }
                if let Some(max) = s.max_length {
                    schema.insert("maxLength".into(), json!(max));
                }
                if let Some(pattern) = &s.pattern {
                    schema.insert("pattern".into(), json!(pattern));
                }
                if let Some(values) = &s.enum_values {
                    schema.insert("enum".into(), json!(values));
                }
                Value::Object(schema)
            }
            Self::Number(n) => {
                let mut schema = Map::new();
                let kind = if n.integer { "integer" } else { "number" };
                schema.insert("type".into(), json!(kind));
                if let Some(min) = &n.minimum {
                    let key = if min.exclusive { "exclusiveMinimum" } else { "minimum" };
                    schema.insert(key.into(), Value::Number(min.limit.clone()));
                }
                if let Some(max) = &n.maximum {
                    let key = if max.exclusive { "exclusiveMaximum" } else { "maximum" };
                    schema.insert(key.into(), Value::Number(max.limit.clone()));
                }
                if let Some(values) = &n.enum_values {
                    schema.insert("enum".into(), json!(values));
                }
                Value::Object(schema)
            }
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Any => json!({}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SchemaNode {
        SchemaNode::Object(ObjectSchema {
            properties: vec![
                (
                    "tags".into(),
                    SchemaNode::Array(ArraySchema {
                        items: Box::new(SchemaNode::String(StringSchema {
                            max_length: Some(7),
                            ..Default::default()
                        })),
                    }),
                ),
                (
                    "nested".into(),
                    SchemaNode::Object(ObjectSchema {
                        properties: vec![("foo".into(), SchemaNode::String(Default::default()))],
                        required: vec!["foo".into()],
                    }),
                ),
            ],
            required: vec![],
        })
    }

    #[test]
    fn resolves_through_objects_and_arrays() {
        let root = sample();
        let item = root
            .resolve(&FieldPath::root().key("tags").index(3))
            .unwrap();
        assert_eq!(item.type_name(), Some("string"));

        let foo = root
            .resolve(&FieldPath::root().key("nested").key("foo"))
            .unwrap();
        assert_eq!(foo.type_name(), Some("string"));

        assert!(root.resolve(&FieldPath::root().key("missing")).is_none());
        assert!(root.resolve(&FieldPath::root().key("tags").key("x")).is_none());
        assert_eq!(root.resolve(&FieldPath::root()), Some(&root));
    }

    #[test]
    fn resolves_digit_keys_by_parent_kind() {
        let root = SchemaNode::Object(ObjectSchema {
            properties: vec![
                ("01".into(), SchemaNode::String(StringSchema { min_length: Some(5), ..Default::default() })),
                ("1".into(), SchemaNode::Boolean),
            ],
            required: vec![],
        });
        let zero_one = root.resolve(&FieldPath::from_json_pointer("/01")).unwrap();
        assert_eq!(zero_one.type_name(), Some("string"));
        let one = root.resolve(&FieldPath::from_json_pointer("/1")).unwrap();
        assert_eq!(one.type_name(), Some("boolean"));

        let tags = sample();
        assert!(tags.resolve(&FieldPath::from_json_pointer("/tags/3")).is_some());
        assert!(tags.resolve(&FieldPath::from_json_pointer("/tags/03")).is_none());
    }

    #[test]
    fn renders_json_schema() {
        let schema = sample().to_json_schema();
        assert_eq!(schema["type"], "object");
        assert!(schema.get("required").is_none());
        assert_eq!(schema["properties"]["tags"]["items"]["maxLength"], 7);
        assert_eq!(schema["properties"]["nested"]["required"], json!(["foo"]));
    }

    #[test]
    fn renders_exclusive_bounds() {
        let node = SchemaNode::Number(NumberSchema {
            integer: true,
            minimum: Some(Bound { limit: 5.into(), exclusive: true }),
            maximum: Some(Bound { limit: 9.into(), exclusive: false }),
            enum_values: None,
        });
        assert_eq!(
            node.to_json_schema(),
            json!({ "type": "integer", "exclusiveMinimum": 5, "maximum": 9 })
        );
        assert_eq!(node.type_name(), Some("integer"));
    }

    #[test]
    fn any_renders_as_empty_schema() {
        assert_eq!(SchemaNode::Any.to_json_schema(), json!({}));
        assert_eq!(SchemaNode::Any.type_name(), None);
    }
}
