use crate::error::{Error, Result};
use crate::metadata::{
    is_simple_type, short_name, EnumDescriptor, EnumRenderMode, FieldDescriptor, MetadataProvider,
    PrimitiveKind, TypeKind, TypeRef,
};
use crate::registry::DefinitionRegistry;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON pointer prefix of every definition reference
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Schema generator - compiles type metadata into schema fragments
pub struct SchemaGenerator<'a> {
    /// Type and constraint metadata for every type reachable from the routes
    metadata: &'a dyn MetadataProvider,
    /// Definitions compiled during this run
    registry: DefinitionRegistry,
}

/// A compiled schema fragment: either a reference to a definition or an inline schema, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaFragment {
    Ref(Reference),
    Inline(Box<Schema>),
}

/// A `$ref` pointing at a named definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    #[serde(rename = "$ref")]
    pub reference: String,
}

/// Inline schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The primitive kind of the schema
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<PrimitiveKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties for object types; present and empty for objects without known fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaFragment>>,
    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaFragment>>,
    /// Allowed literal values
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Schema {
    /// `{type: object, properties: {}}`
    pub fn empty_object() -> Self {
        Self {
            schema_type: Some(PrimitiveKind::Object),
            properties: Some(IndexMap::new()),
            ..Default::default()
        }
    }

    pub fn of_kind(kind: PrimitiveKind) -> Self {
        Self {
            schema_type: Some(kind),
            ..Default::default()
        }
    }
}

impl SchemaFragment {
    /// A `$ref` fragment for the definition with the given short name
    pub fn reference(name: &str) -> Self {
        SchemaFragment::Ref(Reference {
            reference: format!("{}{}", DEFINITIONS_PREFIX, name),
        })
    }

    pub fn inline(schema: Schema) -> Self {
        SchemaFragment::Inline(Box::new(schema))
    }

    /// Short name of the referenced definition, for `$ref` fragments
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            SchemaFragment::Ref(r) => r.reference.strip_prefix(DEFINITIONS_PREFIX),
            SchemaFragment::Inline(_) => None,
        }
    }

    pub fn as_inline(&self) -> Option<&Schema> {
        match self {
            SchemaFragment::Inline(schema) => Some(schema),
            SchemaFragment::Ref(_) => None,
        }
    }
}

impl<'a> SchemaGenerator<'a> {
    /// Create a new SchemaGenerator with an empty definition registry
    pub fn new(metadata: &'a dyn MetadataProvider) -> Self {
        debug!("Initializing SchemaGenerator");
        Self {
            metadata,
            registry: DefinitionRegistry::new(),
        }
    }

    pub fn metadata(&self) -> &'a dyn MetadataProvider {
        self.metadata
    }

    /// Compile a type into a definition and return a `$ref` to it.
    ///
    /// Each short name is compiled at most once per generator; later calls return the
    /// reference immediately. Types without metadata compile to an empty object.
    pub fn compile(&mut self, type_identifier: &str) -> Result<SchemaFragment> {
        let name = short_name(type_identifier);
        if self.registry.has(&name) {
            debug!("Definition for {} already exists", name);
            return Ok(SchemaFragment::reference(&name));
        }

        let metadata = self.metadata;
        let Some(descriptor) = metadata.describe(type_identifier) else {
            warn!(
                "No metadata for type {}, using empty object schema",
                type_identifier
            );
            self.registry.put(&name, Schema::empty_object());
            return Ok(SchemaFragment::reference(&name));
        };

        debug!("Compiling schema for type: {}", descriptor.identifier);
        match &descriptor.kind {
            TypeKind::Object(fields) => self.compile_object(&name, fields)?,
            TypeKind::Enum(enum_def) => {
                let schema = render_enum(
                    Schema::default(),
                    &descriptor.identifier,
                    enum_def,
                    EnumRenderMode::Value,
                    false,
                )?;
                self.registry.put(&name, schema);
            }
            TypeKind::Scalar(kind) => self.registry.put(&name, Schema::of_kind(*kind)),
            TypeKind::Array(items) => {
                self.registry.put(&name, Schema::empty_object());
                let items = self.items_for(items.element.as_deref(), items.is_simple())?;
                let schema = Schema {
                    schema_type: Some(PrimitiveKind::Array),
                    items: Some(Box::new(items)),
                    ..Default::default()
                };
                self.registry.complete(&name, schema);
            }
        }

        Ok(SchemaFragment::reference(&name))
    }

    /// Schema for a declared type reference, as used by responses and body parameters.
    ///
    /// Simple types and containers stay inline; everything else is compiled to a `$ref`.
    pub fn schema_for(&mut self, ty: &TypeRef) -> Result<SchemaFragment> {
        if ty.is_array {
            let items = self.items_for(ty.element.as_deref(), ty.is_simple())?;
            return Ok(SchemaFragment::inline(Schema {
                schema_type: Some(PrimitiveKind::Array),
                items: Some(Box::new(items)),
                ..Default::default()
            }));
        }

        match ty.element.as_deref() {
            None => Ok(SchemaFragment::inline(Schema::default())),
            Some(element) if ty.is_simple() => Ok(SchemaFragment::inline(Schema::of_kind(
                PrimitiveKind::from_type_name(element),
            ))),
            Some(element) => self.compile(element),
        }
    }

    /// Compile the fields of an object type and register the result under `name`
    fn compile_object(&mut self, name: &str, fields: &[FieldDescriptor]) -> Result<()> {
        // Registered before the fields so that cyclic type graphs terminate
        self.registry.put(name, Schema::empty_object());

        let mut properties = IndexMap::new();
        let mut required = Vec::new();

        for field in fields {
            if field.constraints.hidden {
                debug!("Skipping hidden field {}.{}", name, field.name);
                continue;
            }

            let property = self.compile_field(field)?;
            if field.constraints.required == Some(true) {
                required.push(field.name.clone());
            }
            properties.insert(field.name.clone(), property);
        }

        let schema = Schema {
            schema_type: Some(PrimitiveKind::Object),
            properties: Some(properties),
            required: if required.is_empty() {
                None
            } else {
                Some(required)
            },
            ..Default::default()
        };

        self.registry.complete(name, schema);
        Ok(())
    }

    /// Compile a single field into a property fragment
    fn compile_field(&mut self, field: &FieldDescriptor) -> Result<SchemaFragment> {
        let constraints = &field.constraints;
        let element = field.ty.element.as_deref();

        let mut schema = Schema {
            schema_type: Some(field.presentation_kind()),
            description: Some(constraints.description.clone().unwrap_or_default()),
            enum_values: constraints.fixed_values.clone(),
            example: constraints.example.clone(),
            default: constraints.default.clone(),
            ..Default::default()
        };

        if let Some(element) = element.filter(|_| !field.simple) {
            let metadata = self.metadata;
            if let Some(enum_def) = metadata.enum_descriptor(element) {
                let schema = render_enum(
                    schema,
                    element,
                    enum_def,
                    constraints.enum_view,
                    field.ty.is_array,
                )?;
                return Ok(SchemaFragment::inline(schema));
            }
        }

        if field.ty.is_array {
            schema.items = Some(Box::new(self.items_for(element, field.simple)?));
            return Ok(SchemaFragment::inline(schema));
        }

        if let Some(element) = element.filter(|_| !field.simple) {
            let fragment = self.compile(element)?;
            if let Some(description) = constraints.description.as_deref().filter(|d| !d.is_empty()) {
                self.registry.describe(&short_name(element), description);
            }
            return Ok(fragment);
        }

        Ok(SchemaFragment::inline(schema))
    }

    /// Items fragment for a container of `element`
    fn items_for(&mut self, element: Option<&str>, simple: bool) -> Result<SchemaFragment> {
        match element {
            None => Ok(SchemaFragment::inline(Schema::default())),
            Some(element) if simple || is_simple_type(element) => Ok(SchemaFragment::inline(
                Schema::of_kind(PrimitiveKind::from_type_name(element)),
            )),
            Some(element) => self.compile(element),
        }
    }

    /// Get all compiled definitions
    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> DefinitionRegistry {
        self.registry
    }
}

/// Render an enumerated domain type over a field schema.
///
/// The rendered shape replaces the type, enum, properties and items built so far; for a
/// container it becomes the `items` of an array.
fn render_enum(
    mut schema: Schema,
    type_name: &str,
    enum_def: &EnumDescriptor,
    mode: EnumRenderMode,
    is_array: bool,
) -> Result<Schema> {
    debug!("Rendering enum {} as {:?}", type_name, mode);

    let rendered = match mode {
        EnumRenderMode::All => {
            let mut properties = IndexMap::new();
            properties.insert(
                "value".to_string(),
                SchemaFragment::inline(enum_schema(type_name, enum_def.values())?),
            );
            properties.insert(
                "message".to_string(),
                SchemaFragment::inline(enum_schema(type_name, enum_def.messages())?),
            );
            Schema {
                schema_type: Some(PrimitiveKind::Object),
                properties: Some(properties),
                ..Default::default()
            }
        }
        EnumRenderMode::Value => enum_schema(type_name, enum_def.values())?,
        EnumRenderMode::Name => enum_schema(type_name, enum_def.names())?,
        EnumRenderMode::Message => enum_schema(type_name, enum_def.messages())?,
    };

    schema.enum_values = None;
    schema.properties = None;
    schema.items = None;

    if is_array {
        schema.schema_type = Some(PrimitiveKind::Array);
        schema.items = Some(Box::new(SchemaFragment::inline(rendered)));
    } else {
        schema.schema_type = rendered.schema_type;
        schema.enum_values = rendered.enum_values;
        schema.properties = rendered.properties;
    }

    Ok(schema)
}

/// `{type: <inferred>, enum: values}`
fn enum_schema(type_name: &str, values: Vec<Value>) -> Result<Schema> {
    let kind = infer_enum_type(type_name, &values)?;
    Ok(Schema {
        schema_type: Some(kind),
        enum_values: Some(values),
        ..Default::default()
    })
}

/// Infer the schema type of an enum list from its first element
pub fn infer_enum_type(type_name: &str, values: &[Value]) -> Result<PrimitiveKind> {
    values
        .first()
        .map(PrimitiveKind::of_value)
        .ok_or_else(|| Error::UndefinedEnumType {
            type_name: type_name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{EnumVariant, TypeDescriptor, TypeRegistry};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn status_enum() -> TypeDescriptor {
        TypeDescriptor::enumeration(
            "Status",
            vec![
                EnumVariant::new("Active", 1, "a"),
                EnumVariant::new("Inactive", 2, "b"),
                EnumVariant::new("Banned", 3, "c"),
            ],
        )
    }

    fn property<'s>(schema: &'s Schema, name: &str) -> &'s SchemaFragment {
        &schema.properties.as_ref().unwrap()[name]
    }

    fn inline_property<'s>(schema: &'s Schema, name: &str) -> &'s Schema {
        property(schema, name).as_inline().unwrap()
    }

    #[test]
    fn test_compile_returns_reference() {
        let metadata = TypeRegistry::new().with(TypeDescriptor::object(
            "crate::dto::User",
            vec![
                FieldDescriptor::scalar("id", "u32"),
                FieldDescriptor::scalar("name", "String"),
                FieldDescriptor::scalar("active", "bool"),
                FieldDescriptor::scalar("score", "f64"),
            ],
        ));
        let mut generator = SchemaGenerator::new(&metadata);

        let fragment = generator.compile("crate::dto::User").unwrap();
        assert_eq!(fragment.reference_name(), Some("User"));
        assert_eq!(
            serde_json::to_value(&fragment).unwrap(),
            json!({"$ref": "#/definitions/User"})
        );

        let user = generator.registry().get("User").unwrap();
        assert_eq!(user.schema_type, Some(PrimitiveKind::Object));
        assert_eq!(inline_property(user, "id").schema_type, Some(PrimitiveKind::Integer));
        assert_eq!(inline_property(user, "name").schema_type, Some(PrimitiveKind::String));
        assert_eq!(inline_property(user, "active").schema_type, Some(PrimitiveKind::Boolean));
        assert_eq!(inline_property(user, "score").schema_type, Some(PrimitiveKind::Number));
        assert_eq!(inline_property(user, "id").description.as_deref(), Some(""));
        assert!(user.required.is_none());
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let metadata = TypeRegistry::new().with(TypeDescriptor::object(
            "Ordered",
            vec![
                FieldDescriptor::scalar("zeta", "String"),
                FieldDescriptor::scalar("alpha", "String"),
                FieldDescriptor::scalar("mid", "String"),
            ],
        ));
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("Ordered").unwrap();

        let schema = generator.registry().get("Ordered").unwrap();
        let names: Vec<_> = schema.properties.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_memoization() {
        let metadata = TypeRegistry::new().with(TypeDescriptor::object(
            "User",
            vec![FieldDescriptor::scalar("id", "u32")],
        ));
        let mut generator = SchemaGenerator::new(&metadata);

        let first = generator.compile("User").unwrap();
        let second = generator.compile("app::User").unwrap();

        assert_eq!(first, second);
        assert_eq!(generator.registry().len(), 1);
    }

    #[test]
    fn test_sibling_fields_share_one_definition() {
        let metadata = TypeRegistry::new()
            .with(TypeDescriptor::object(
                "Order",
                vec![
                    FieldDescriptor::scalar("billing", "Address"),
                    FieldDescriptor::scalar("shipping", "Address"),
                ],
            ))
            .with(TypeDescriptor::object(
                "Address",
                vec![FieldDescriptor::scalar("street", "String")],
            ));
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("Order").unwrap();

        let order = generator.registry().get("Order").unwrap();
        assert_eq!(property(order, "billing"), property(order, "shipping"));
        assert_eq!(property(order, "billing").reference_name(), Some("Address"));
        assert_eq!(generator.registry().len(), 2);
    }

    #[test]
    fn test_cycle_safety() {
        let metadata = TypeRegistry::new()
            .with(TypeDescriptor::object("A", vec![FieldDescriptor::scalar("b", "B")]))
            .with(TypeDescriptor::object("B", vec![FieldDescriptor::scalar("a", "A")]));
        let mut generator = SchemaGenerator::new(&metadata);

        generator.compile("A").unwrap();

        let registry = generator.registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(property(registry.get("A").unwrap(), "b").reference_name(), Some("B"));
        assert_eq!(property(registry.get("B").unwrap(), "a").reference_name(), Some("A"));
    }

    #[test]
    fn test_self_reference() {
        let metadata = TypeRegistry::new().with(TypeDescriptor::object(
            "Category",
            vec![
                FieldDescriptor::scalar("parent", "Category"),
                FieldDescriptor::array("children", "Category"),
            ],
        ));
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("Category").unwrap();

        let category = generator.registry().get("Category").unwrap();
        assert_eq!(property(category, "parent").reference_name(), Some("Category"));
        let children = inline_property(category, "children");
        assert_eq!(children.items.as_ref().unwrap().reference_name(), Some("Category"));
    }

    #[test]
    fn test_hidden_field_exclusion() {
        let metadata = TypeRegistry::new().with(TypeDescriptor::object(
            "User",
            vec![
                FieldDescriptor::scalar("id", "u32").required(),
                FieldDescriptor::scalar("password", "String").required().hidden(),
            ],
        ));
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("User").unwrap();

        let user = generator.registry().get("User").unwrap();
        let properties = user.properties.as_ref().unwrap();
        assert_eq!(properties.len(), 1);
        assert!(!properties.contains_key("password"));
        assert_eq!(user.required, Some(vec!["id".to_string()]));
    }

    #[test]
    fn test_all_hidden_fields_compile_to_empty_object() {
        let metadata = TypeRegistry::new().with(TypeDescriptor::object(
            "Secret",
            vec![FieldDescriptor::scalar("token", "String").hidden()],
        ));
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("Secret").unwrap();

        let secret = generator.registry().get("Secret").unwrap();
        assert_eq!(
            serde_json::to_value(secret).unwrap(),
            json!({"type": "object", "properties": {}})
        );
    }

    #[test]
    fn test_missing_metadata_fallback() {
        let metadata = TypeRegistry::new().with(TypeDescriptor::object(
            "User",
            vec![FieldDescriptor::scalar("profile", "Profile")],
        ));
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("User").unwrap();

        let user = generator.registry().get("User").unwrap();
        assert_eq!(property(user, "profile").reference_name(), Some("Profile"));
        assert_eq!(
            serde_json::to_value(generator.registry().get("Profile").unwrap()).unwrap(),
            json!({"type": "object", "properties": {}})
        );
    }

    #[test]
    fn test_array_items() {
        let metadata = TypeRegistry::new()
            .with(TypeDescriptor::object(
                "Post",
                vec![
                    FieldDescriptor::array("tags", "String"),
                    FieldDescriptor::array("comments", "Comment"),
                    FieldDescriptor::new("matrix", TypeRef::unknown_array()),
                ],
            ))
            .with(TypeDescriptor::object(
                "Comment",
                vec![FieldDescriptor::scalar("body", "String")],
            ));
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("Post").unwrap();

        let post = generator.registry().get("Post").unwrap();
        let value = serde_json::to_value(post).unwrap();
        assert_eq!(value["properties"]["tags"]["type"], json!("array"));
        assert_eq!(value["properties"]["tags"]["items"], json!({"type": "string"}));
        assert_eq!(
            value["properties"]["comments"]["items"],
            json!({"$ref": "#/definitions/Comment"})
        );
        assert_eq!(value["properties"]["matrix"]["items"], json!({}));
        assert!(generator.registry().has("Comment"));
    }

    #[test]
    fn test_map_field_stays_inline_object() {
        let metadata = TypeRegistry::new().with(TypeDescriptor::object(
            "Settings",
            vec![FieldDescriptor::scalar("extra", "HashMap")],
        ));
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("Settings").unwrap();

        let settings = generator.registry().get("Settings").unwrap();
        assert_eq!(inline_property(settings, "extra").schema_type, Some(PrimitiveKind::Object));
        assert_eq!(generator.registry().len(), 1);
    }

    #[test]
    fn test_constraints_are_attached() {
        let metadata = TypeRegistry::new().with(TypeDescriptor::object(
            "Query",
            vec![
                FieldDescriptor::scalar("page", "u32")
                    .required()
                    .description("Page number")
                    .example(2)
                    .default_value(1),
                FieldDescriptor::scalar("sort", "String").one_of(vec![json!("asc"), json!("desc")]),
            ],
        ));
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("Query").unwrap();

        let value = serde_json::to_value(generator.registry().get("Query").unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "object",
                "properties": {
                    "page": {
                        "type": "integer",
                        "description": "Page number",
                        "example": 2,
                        "default": 1
                    },
                    "sort": {
                        "type": "string",
                        "description": "",
                        "enum": ["asc", "desc"]
                    }
                },
                "required": ["page"]
            })
        );
    }

    #[test]
    fn test_required_false_is_not_listed() {
        let mut field = FieldDescriptor::scalar("nickname", "String");
        field.constraints.required = Some(false);
        let metadata = TypeRegistry::new().with(TypeDescriptor::object("User", vec![field]));
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("User").unwrap();

        assert!(generator.registry().get("User").unwrap().required.is_none());
    }

    #[test]
    fn test_field_description_propagates_to_definition() {
        let metadata = TypeRegistry::new()
            .with(TypeDescriptor::object(
                "User",
                vec![
                    FieldDescriptor::scalar("profile", "Profile").description("First"),
                    FieldDescriptor::scalar("backup", "Profile").description("Second"),
                    FieldDescriptor::scalar("plain", "Profile"),
                ],
            ))
            .with(TypeDescriptor::object(
                "Profile",
                vec![FieldDescriptor::scalar("bio", "String")],
            ));
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("User").unwrap();

        let user = generator.registry().get("User").unwrap();
        assert!(property(user, "profile").as_inline().is_none());
        assert_eq!(
            serde_json::to_value(property(user, "profile")).unwrap(),
            json!({"$ref": "#/definitions/Profile"})
        );
        let profile = generator.registry().get("Profile").unwrap();
        assert_eq!(profile.description.as_deref(), Some("Second"));
    }

    #[test]
    fn test_description_survives_cycle() {
        let metadata = TypeRegistry::new()
            .with(TypeDescriptor::object("A", vec![FieldDescriptor::scalar("b", "B")]))
            .with(TypeDescriptor::object(
                "B",
                vec![FieldDescriptor::scalar("a", "A").description("Back link")],
            ));
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("A").unwrap();

        let a = generator.registry().get("A").unwrap();
        assert_eq!(a.description.as_deref(), Some("Back link"));
        assert!(a.properties.as_ref().unwrap().contains_key("b"));
    }

    #[test]
    fn test_enum_value_mode() {
        let metadata = TypeRegistry::new()
            .with(TypeDescriptor::object(
                "User",
                vec![FieldDescriptor::scalar("status", "Status")],
            ))
            .with(status_enum());
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("User").unwrap();

        let status = inline_property(generator.registry().get("User").unwrap(), "status");
        assert_eq!(status.schema_type, Some(PrimitiveKind::Integer));
        assert_eq!(status.enum_values, Some(vec![json!(1), json!(2), json!(3)]));
        assert!(!generator.registry().has("Status"));
    }

    #[test]
    fn test_enum_name_and_message_modes() {
        let metadata = TypeRegistry::new()
            .with(TypeDescriptor::object(
                "User",
                vec![
                    FieldDescriptor::scalar("by_name", "Status").enum_view(EnumRenderMode::Name),
                    FieldDescriptor::scalar("by_message", "Status").enum_view(EnumRenderMode::Message),
                ],
            ))
            .with(status_enum());
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("User").unwrap();

        let user = generator.registry().get("User").unwrap();
        let by_name = inline_property(user, "by_name");
        assert_eq!(by_name.schema_type, Some(PrimitiveKind::String));
        assert_eq!(
            by_name.enum_values,
            Some(vec![json!("Active"), json!("Inactive"), json!("Banned")])
        );
        let by_message = inline_property(user, "by_message");
        assert_eq!(by_message.enum_values, Some(vec![json!("a"), json!("b"), json!("c")]));
    }

    #[test]
    fn test_enum_all_mode() {
        let metadata = TypeRegistry::new()
            .with(TypeDescriptor::object(
                "User",
                vec![FieldDescriptor::scalar("status", "Status")
                    .description("Account status")
                    .enum_view(EnumRenderMode::All)],
            ))
            .with(status_enum());
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("User").unwrap();

        let value = serde_json::to_value(generator.registry().get("User").unwrap()).unwrap();
        assert_eq!(
            value["properties"]["status"],
            json!({
                "type": "object",
                "description": "Account status",
                "properties": {
                    "value": {"type": "integer", "enum": [1, 2, 3]},
                    "message": {"type": "string", "enum": ["a", "b", "c"]}
                }
            })
        );
    }

    #[test]
    fn test_enum_container_fields_render_into_items() {
        let metadata = TypeRegistry::new()
            .with(TypeDescriptor::object(
                "Filter",
                vec![
                    FieldDescriptor::array("statuses", "Status"),
                    FieldDescriptor::array("detailed", "Status").enum_view(EnumRenderMode::All),
                ],
            ))
            .with(status_enum());
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("Filter").unwrap();

        let value = serde_json::to_value(generator.registry().get("Filter").unwrap()).unwrap();
        assert_eq!(value["properties"]["statuses"]["type"], json!("array"));
        assert_eq!(
            value["properties"]["statuses"]["items"],
            json!({"type": "integer", "enum": [1, 2, 3]})
        );
        assert_eq!(value["properties"]["detailed"]["type"], json!("array"));
        assert_eq!(
            value["properties"]["detailed"]["items"]["properties"]["message"]["enum"],
            json!(["a", "b", "c"])
        );
    }

    #[test]
    fn test_enum_overrides_fixed_values() {
        let metadata = TypeRegistry::new()
            .with(TypeDescriptor::object(
                "User",
                vec![FieldDescriptor::scalar("status", "Status").one_of(vec![json!(9)])],
            ))
            .with(status_enum());
        let mut generator = SchemaGenerator::new(&metadata);
        generator.compile("User").unwrap();

        let status = inline_property(generator.registry().get("User").unwrap(), "status");
        assert_eq!(status.enum_values, Some(vec![json!(1), json!(2), json!(3)]));
    }

    #[test]
    fn test_empty_enum_is_an_error() {
        let metadata = TypeRegistry::new()
            .with(TypeDescriptor::object(
                "User",
                vec![FieldDescriptor::scalar("status", "Empty")],
            ))
            .with(TypeDescriptor::enumeration("Empty", vec![]));
        let mut generator = SchemaGenerator::new(&metadata);

        let err = generator.compile("User").unwrap_err();
        assert!(matches!(err, Error::UndefinedEnumType { ref type_name } if type_name == "Empty"));
    }

    #[test]
    fn test_compile_enum_type_directly() {
        let metadata = TypeRegistry::new().with(status_enum());
        let mut generator = SchemaGenerator::new(&metadata);

        let fragment = generator.compile("Status").unwrap();
        assert_eq!(fragment.reference_name(), Some("Status"));
        assert_eq!(
            serde_json::to_value(generator.registry().get("Status").unwrap()).unwrap(),
            json!({"type": "integer", "enum": [1, 2, 3]})
        );
    }

    #[test]
    fn test_compile_scalar_and_array_descriptors() {
        let metadata = TypeRegistry::new()
            .with(TypeDescriptor::scalar("UserId", PrimitiveKind::Integer))
            .with(TypeDescriptor::array("Tags", TypeRef::array_of("String")));
        let mut generator = SchemaGenerator::new(&metadata);

        generator.compile("UserId").unwrap();
        generator.compile("Tags").unwrap();

        assert_eq!(
            serde_json::to_value(generator.registry().get("UserId").unwrap()).unwrap(),
            json!({"type": "integer"})
        );
        assert_eq!(
            serde_json::to_value(generator.registry().get("Tags").unwrap()).unwrap(),
            json!({"type": "array", "items": {"type": "string"}})
        );
    }

    #[test]
    fn test_schema_for_type_refs() {
        let metadata = TypeRegistry::new().with(TypeDescriptor::object(
            "User",
            vec![FieldDescriptor::scalar("id", "u32")],
        ));
        let mut generator = SchemaGenerator::new(&metadata);

        let scalar = generator.schema_for(&TypeRef::named("i64")).unwrap();
        assert_eq!(serde_json::to_value(&scalar).unwrap(), json!({"type": "integer"}));

        let list = generator.schema_for(&TypeRef::array_of("User")).unwrap();
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!({"type": "array", "items": {"$ref": "#/definitions/User"}})
        );

        let single = generator.schema_for(&TypeRef::named("User")).unwrap();
        assert_eq!(single.reference_name(), Some("User"));
        assert_eq!(generator.registry().len(), 1);
    }

    #[test]
    fn test_infer_enum_type() {
        assert_eq!(infer_enum_type("E", &[json!(1.5)]).unwrap(), PrimitiveKind::Number);
        assert_eq!(infer_enum_type("E", &[json!(true)]).unwrap(), PrimitiveKind::Boolean);
        assert!(infer_enum_type("E", &[]).is_err());
    }

    #[test]
    fn test_fragment_deserializes_both_shapes() {
        let reference: SchemaFragment =
            serde_json::from_value(json!({"$ref": "#/definitions/User"})).unwrap();
        assert_eq!(reference.reference_name(), Some("User"));

        let inline: SchemaFragment =
            serde_json::from_value(json!({"type": "object", "properties": {}})).unwrap();
        assert_eq!(inline.as_inline(), Some(&Schema::empty_object()));
    }
}
