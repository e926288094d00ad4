//! Statically declared type metadata consumed by the schema compiler.
//!
//! Every DTO the compiler can describe is represented by a [`TypeDescriptor`]. Descriptors
//! are supplied through the [`MetadataProvider`] trait; [`TypeRegistry`] is the in-memory
//! implementation, filled either by hand through its builder API or from parsed source by
//! [`crate::type_resolver::TypeResolver`].
//!
//! # Example
//!
//! ```
//! use openapi_from_dto::metadata::{FieldDescriptor, MetadataProvider, TypeDescriptor, TypeRegistry};
//!
//! let registry = TypeRegistry::new().with(TypeDescriptor::object(
//!     "app::dto::UserQuery",
//!     vec![
//!         FieldDescriptor::scalar("id", "i64").required().example(5),
//!         FieldDescriptor::scalar("name", "String"),
//!     ],
//! ));
//!
//! assert!(registry.describe("UserQuery").is_some());
//! ```

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// The six JSON-schema primitive kinds a field can be presented as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Integer,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl PrimitiveKind {
    /// Maps a declared element type name to its presentation kind.
    ///
    /// Unrecognized names map to [`PrimitiveKind::String`].
    pub fn from_type_name(type_name: &str) -> Self {
        match short_name(type_name).as_str() {
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "u128" | "usize" | "int" | "integer" => PrimitiveKind::Integer,
            "bool" | "boolean" => PrimitiveKind::Boolean,
            "f32" | "f64" | "float" | "double" | "number" => PrimitiveKind::Number,
            "Vec" | "VecDeque" | "HashSet" | "BTreeSet" | "array" => PrimitiveKind::Array,
            "HashMap" | "BTreeMap" | "IndexMap" | "Value" | "object" => PrimitiveKind::Object,
            _ => PrimitiveKind::String,
        }
    }

    /// Kind of a literal value, used to type enum lists.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null | Value::String(_) => PrimitiveKind::String,
            Value::Bool(_) => PrimitiveKind::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => PrimitiveKind::Integer,
            Value::Number(_) => PrimitiveKind::Number,
            Value::Array(_) => PrimitiveKind::Array,
            Value::Object(_) => PrimitiveKind::Object,
        }
    }
}

/// Returns true when the named type is a primitive that never needs further decomposition.
pub fn is_simple_type(type_name: &str) -> bool {
    matches!(
        short_name(type_name).as_str(),
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize"
            | "u8" | "u16" | "u32" | "u64" | "u128" | "usize"
            | "f32" | "f64"
            | "bool"
            | "String" | "str" | "char"
            | "DateTime" | "NaiveDateTime" | "NaiveDate" | "NaiveTime" | "Uuid" | "Decimal"
            | "HashMap" | "BTreeMap" | "IndexMap" | "Value"
            | "int" | "integer" | "float" | "double" | "number" | "boolean" | "string"
            | "array" | "object" | "mixed"
    )
}

/// Derives the short display name of a type identifier.
///
/// Generic arguments are dropped and only the last path segment is kept, so
/// `crate::dto::Page<User>` becomes `Page`.
pub fn short_name(identifier: &str) -> String {
    let base = identifier.split('<').next().unwrap_or(identifier).trim();
    base.rsplit([':', '\\', '.'])
        .next()
        .unwrap_or(base)
        .to_string()
}

/// A declared reference to a type: its element type and whether it is a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRef {
    /// Element type name as declared; `None` when it cannot be determined
    pub element: Option<String>,
    /// Whether the reference is a container of `element`
    pub is_array: bool,
}

impl TypeRef {
    pub fn named(element: impl Into<String>) -> Self {
        Self {
            element: Some(element.into()),
            is_array: false,
        }
    }

    pub fn array_of(element: impl Into<String>) -> Self {
        Self {
            element: Some(element.into()),
            is_array: true,
        }
    }

    /// A container whose element type is unknown.
    pub fn unknown_array() -> Self {
        Self {
            element: None,
            is_array: true,
        }
    }

    pub fn is_simple(&self) -> bool {
        self.element.as_deref().map(is_simple_type).unwrap_or(false)
    }
}

/// How an enumerated domain type is rendered into a field schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnumRenderMode {
    /// Emit the raw underlying values
    #[default]
    Value,
    /// Emit the symbolic variant names
    Name,
    /// Emit the human-readable messages
    Message,
    /// Emit an object carrying both the values and the messages
    All,
}

impl FromStr for EnumRenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "value" => Ok(EnumRenderMode::Value),
            "name" => Ok(EnumRenderMode::Name),
            "message" => Ok(EnumRenderMode::Message),
            "all" => Ok(EnumRenderMode::All),
            other => Err(format!("unknown enum view '{}'", other)),
        }
    }
}

/// Optional annotations attached to a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    /// Omit the field from schemas and parameter lists
    pub hidden: bool,
    /// `None` when the field carries no required annotation
    pub required: Option<bool>,
    pub description: Option<String>,
    pub example: Option<Value>,
    /// Explicit allow-list overriding the field's natural type
    pub fixed_values: Option<Vec<Value>>,
    pub default: Option<Value>,
    pub enum_view: EnumRenderMode,
}

/// One property of an object type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeRef,
    /// True when the element type is a primitive that is never decomposed
    pub simple: bool,
    pub constraints: ConstraintSet,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        let simple = ty.is_simple();
        Self {
            name: name.into(),
            ty,
            simple,
            constraints: ConstraintSet::default(),
        }
    }

    /// A non-container field of the named type.
    pub fn scalar(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::named(type_name))
    }

    /// A container field whose elements are of the named type.
    pub fn array(name: impl Into<String>, element: impl Into<String>) -> Self {
        Self::new(name, TypeRef::array_of(element))
    }

    pub fn required(mut self) -> Self {
        self.constraints.required = Some(true);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.constraints.hidden = true;
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.constraints.description = Some(text.into());
        self
    }

    pub fn example(mut self, value: impl Into<Value>) -> Self {
        self.constraints.example = Some(value.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.constraints.default = Some(value.into());
        self
    }

    pub fn one_of(mut self, values: Vec<Value>) -> Self {
        self.constraints.fixed_values = Some(values);
        self
    }

    pub fn enum_view(mut self, mode: EnumRenderMode) -> Self {
        self.constraints.enum_view = mode;
        self
    }

    pub fn with_constraints(mut self, constraints: ConstraintSet) -> Self {
        self.constraints = constraints;
        self
    }

    /// The base presentation kind of this field before any enum rendering.
    pub fn presentation_kind(&self) -> PrimitiveKind {
        if self.ty.is_array {
            return PrimitiveKind::Array;
        }
        match self.ty.element.as_deref() {
            Some(element) if self.simple => PrimitiveKind::from_type_name(element),
            Some(_) => PrimitiveKind::Object,
            None => PrimitiveKind::String,
        }
    }
}

/// One variant of an enumerated domain type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    pub name: String,
    pub value: Value,
    pub message: String,
}

impl EnumVariant {
    pub fn new(name: impl Into<String>, value: impl Into<Value>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

/// A closed set of named values, each with an underlying value and a message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumDescriptor {
    pub variants: Vec<EnumVariant>,
}

impl EnumDescriptor {
    pub fn new(variants: Vec<EnumVariant>) -> Self {
        Self { variants }
    }

    pub fn values(&self) -> Vec<Value> {
        self.variants.iter().map(|v| v.value.clone()).collect()
    }

    pub fn names(&self) -> Vec<Value> {
        self.variants
            .iter()
            .map(|v| Value::String(v.name.clone()))
            .collect()
    }

    pub fn messages(&self) -> Vec<Value> {
        self.variants
            .iter()
            .map(|v| Value::String(v.message.clone()))
            .collect()
    }
}

/// The structural kind of a described type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Scalar(PrimitiveKind),
    Array(TypeRef),
    Object(Vec<FieldDescriptor>),
    Enum(EnumDescriptor),
}

/// Metadata for one compiled type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Identifier as declared, possibly path-qualified
    pub identifier: String,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    pub fn object(identifier: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            identifier: identifier.into(),
            kind: TypeKind::Object(fields),
        }
    }

    pub fn enumeration(identifier: impl Into<String>, variants: Vec<EnumVariant>) -> Self {
        Self {
            identifier: identifier.into(),
            kind: TypeKind::Enum(EnumDescriptor::new(variants)),
        }
    }

    pub fn scalar(identifier: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self {
            identifier: identifier.into(),
            kind: TypeKind::Scalar(kind),
        }
    }

    pub fn array(identifier: impl Into<String>, items: TypeRef) -> Self {
        Self {
            identifier: identifier.into(),
            kind: TypeKind::Array(items),
        }
    }

    pub fn short_name(&self) -> String {
        short_name(&self.identifier)
    }

    /// Fields of an object type; empty for every other kind.
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.kind {
            TypeKind::Object(fields) => fields,
            _ => &[],
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match &self.kind {
            TypeKind::Enum(descriptor) => Some(descriptor),
            _ => None,
        }
    }
}

/// Source of type and constraint metadata for the schema compiler.
pub trait MetadataProvider {
    /// Describes the type with the given identifier, if known.
    fn describe(&self, type_identifier: &str) -> Option<&TypeDescriptor>;

    /// Constraints attached to one field of a type.
    fn field_constraints(&self, type_identifier: &str, field_name: &str) -> Option<&ConstraintSet> {
        self.describe(type_identifier)?
            .fields()
            .iter()
            .find(|f| f.name == field_name)
            .map(|f| &f.constraints)
    }

    /// The enumerated domain type behind an identifier, if it is one.
    fn enum_descriptor(&self, type_identifier: &str) -> Option<&EnumDescriptor> {
        self.describe(type_identifier)?.as_enum()
    }
}

/// In-memory [`MetadataProvider`] keyed by short type name.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor; a descriptor with the same short name is replaced.
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        let name = descriptor.short_name();
        debug!("Registering type metadata: {}", descriptor.identifier);
        if let Some(previous) = self.types.insert(name.clone(), descriptor) {
            warn!(
                "Type {} replaced by another declaration with short name {}",
                previous.identifier, name
            );
        }
    }

    /// Builder-style [`TypeRegistry::register`].
    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }
}

impl MetadataProvider for TypeRegistry {
    fn describe(&self, type_identifier: &str) -> Option<&TypeDescriptor> {
        self.types.get(&short_name(type_identifier))
    }
}
