//! # Declarations
//!
//! The explicit, enumerated declaration structure for request parameters and
//! bodies. A [`TypeDecl`] is the recursive type descriptor shared by path
//! parameters, query parameters, body fields, and array elements, so all of
//! them are typed and constrained the same way.
//!
//! ## Array constraints
//!
//! Scalar constraints written on an array-typed declaration (`format`,
//! `min_length`, `pattern`, …) describe each *element*. The schema compiler
//! moves them onto the item type; they never constrain the array itself.
//!
//! ## Serialized form
//!
//! Type and constraints are flattened into the declaring entry:
//!
//! ```yaml
//! - name: tags
//!   type: array
//!   items: { type: string }
//!   max_length: 7
//!   required: true
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Primitive kind of a declared value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// UTF-8 text.
    String,
    /// Whole number.
    Integer,
    /// Any JSON number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// Ordered list of one element type.
    Array,
    /// Named fields.
    Object,
    /// Raw JSON: no type, no constraints.
    Any,
}

impl ParamType {
    /// Lowercase name as written in API descriptions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
        }
    }

    /// Leaf types a path or query parameter can hold directly.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::String | Self::Integer | Self::Number | Self::Boolean
        )
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a non-body parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// A named segment of the route template.
    Path,
    /// A key of the query string.
    Query,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => f.write_str("path"),
            Self::Query => f.write_str("query"),
        }
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Every constraint a declaration can carry.
///
/// `exclusive_minimum` / `exclusive_maximum` are independent flags that turn
/// the corresponding bound from inclusive into exclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Named string format (`uuid`, `date-time`, `email`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Minimum string length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum string length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Regular expression the string must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Allowed values, in declared order.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Lower numeric bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    /// Makes `minimum` exclusive.
    #[serde(default, skip_serializing_if = "is_false")]
    pub exclusive_minimum: bool,
    /// Upper numeric bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    /// Makes `maximum` exclusive.
    #[serde(default, skip_serializing_if = "is_false")]
    pub exclusive_maximum: bool,
}

impl Constraints {
    /// No constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing is constrained.
    pub fn is_empty(&self) -> bool {
        !self.has_string_constraints() && !self.has_numeric_bounds() && self.enum_values.is_none()
    }

    /// True when any of `format`, `min_length`, `max_length`, `pattern` is set.
    pub fn has_string_constraints(&self) -> bool {
        self.format.is_some()
            || self.min_length.is_some()
            || self.max_length.is_some()
            || self.pattern.is_some()
    }

    /// True when `minimum` or `maximum` is set.
    pub fn has_numeric_bounds(&self) -> bool {
        self.minimum.is_some() || self.maximum.is_some()
    }

    /// Fill every unset constraint from `fallback`.
    ///
    /// Bounds move together with their exclusivity flag.
    pub fn or(self, fallback: &Constraints) -> Constraints {
        let (minimum, exclusive_minimum) = match self.minimum {
            Some(min) => (Some(min), self.exclusive_minimum),
            None => (fallback.minimum.clone(), fallback.exclusive_minimum),
        };
        let (maximum, exclusive_maximum) = match self.maximum {
            Some(max) => (Some(max), self.exclusive_maximum),
            None => (fallback.maximum.clone(), fallback.exclusive_maximum),
        };
        Constraints {
            format: self.format.or_else(|| fallback.format.clone()),
            min_length: self.min_length.or(fallback.min_length),
            max_length: self.max_length.or(fallback.max_length),
            pattern: self.pattern.or_else(|| fallback.pattern.clone()),
            enum_values: self.enum_values.or_else(|| fallback.enum_values.clone()),
            minimum,
            exclusive_minimum,
            maximum,
            exclusive_maximum,
        }
    }

    /// Set `format`.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set `min_length`.
    pub fn with_min_length(mut self, min: u64) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Set `max_length`.
    pub fn with_max_length(mut self, max: u64) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Set `pattern`.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Set the allowed values, keeping their order.
    pub fn with_enum<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Set the lower bound and whether it is exclusive.
    pub fn with_minimum(mut self, min: impl Into<Number>, exclusive: bool) -> Self {
        self.minimum = Some(min.into());
        self.exclusive_minimum = exclusive;
        self
    }

    /// Set the upper bound and whether it is exclusive.
    pub fn with_maximum(mut self, max: impl Into<Number>, exclusive: bool) -> Self {
        self.maximum = Some(max.into());
        self.exclusive_maximum = exclusive;
        self
    }
}

/// Recursive type descriptor: object, array, or scalar leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Declared kind, written `type:` in descriptions.
    #[serde(rename = "type")]
    pub kind: ParamType,
    /// Object members (only meaningful for `object`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDecl>,
    /// Element type (only meaningful for `array`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<TypeDecl>>,
    /// Constraints on the value (on each element, for arrays).
    #[serde(flatten)]
    pub constraints: Constraints,
}

impl TypeDecl {
    fn leaf(kind: ParamType) -> Self {
        Self {
            kind,
            fields: Vec::new(),
            items: None,
            constraints: Constraints::default(),
        }
    }

    /// Unconstrained string.
    pub fn string() -> Self {
        Self::leaf(ParamType::String)
    }

    /// Unconstrained integer.
    pub fn integer() -> Self {
        Self::leaf(ParamType::Integer)
    }

    /// Unconstrained number.
    pub fn number() -> Self {
        Self::leaf(ParamType::Number)
    }

    /// Boolean.
    pub fn boolean() -> Self {
        Self::leaf(ParamType::Boolean)
    }

    /// Raw JSON, never checked.
    pub fn any() -> Self {
        Self::leaf(ParamType::Any)
    }

    /// Object with the given fields, in declared order.
    pub fn object(fields: impl IntoIterator<Item = FieldDecl>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            ..Self::leaf(ParamType::Object)
        }
    }

    /// Array of `items`.
    pub fn array(items: TypeDecl) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::leaf(ParamType::Array)
        }
    }

    /// Replace the constraints.
    pub fn with(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }
}

/// A named member of an object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// JSON member name, matched exactly.
    pub name: String,
    /// Absence is a violation.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Type and constraints of the member.
    #[serde(flatten)]
    pub schema: TypeDecl,
}

impl FieldDecl {
    /// A field that must be present.
    pub fn required(name: impl Into<String>, schema: TypeDecl) -> Self {
        Self {
            name: name.into(),
            required: true,
            schema,
        }
    }

    /// A field that may be omitted.
    pub fn optional(name: impl Into<String>, schema: TypeDecl) -> Self {
        Self {
            name: name.into(),
            required: false,
            schema,
        }
    }
}

/// A path or query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDecl {
    /// Placeholder name or query key.
    pub name: String,
    /// Where the value is read from.
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Absence is a violation.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Free-text documentation, not used for validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Type and constraints of the value.
    #[serde(flatten)]
    pub schema: TypeDecl,
}

impl ParameterDecl {
    /// A path parameter. Path parameters are always required.
    pub fn path(name: impl Into<String>, schema: TypeDecl) -> Self {
        Self {
            name: name.into(),
            location: ParamLocation::Path,
            required: true,
            description: None,
            schema,
        }
    }

    /// An optional query parameter.
    pub fn query(name: impl Into<String>, schema: TypeDecl) -> Self {
        Self {
            name: name.into(),
            location: ParamLocation::Query,
            required: false,
            description: None,
            schema,
        }
    }

    /// Override whether the parameter must be present.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Attach a description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The request body declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDecl {
    /// An empty body is a violation.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Free-text documentation, not used for validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Shape of the decoded JSON body.
    pub schema: TypeDecl,
}

impl BodyDecl {
    /// A body of the given type.
    pub fn new(schema: TypeDecl, required: bool) -> Self {
        Self {
            required,
            description: None,
            schema,
        }
    }
}
