use crate::error::Result;
use crate::handler::{HandlerRef, HandlerSignature, HttpMethod, ParameterLocation};
use crate::metadata::{short_name, FieldDescriptor, PrimitiveKind, TypeRef};
use crate::schema_generator::{Schema, SchemaFragment, SchemaGenerator};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Swagger document builder - assembles operations for every registered route
pub struct OpenApiBuilder {
    /// Info section
    info: Info,
    /// Paths collection (URL path -> HTTP method -> Operation)
    paths: IndexMap<String, IndexMap<HttpMethod, Operation>>,
}

/// Info object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operation object - represents a single API operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Controller the handler belongs to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation ID (`Controller@method`)
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Parameters (path, query, header, formData, body)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Responses keyed by status code
    pub responses: IndexMap<String, Response>,
}

/// Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter location
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Parameter name
    pub name: String,
    /// Parameter description
    #[serde(default)]
    pub description: String,
    /// Whether the parameter is required; absent when the field carries no annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Primitive type of a non-body parameter
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<PrimitiveKind>,
    /// Items of an array parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaFragment>>,
    /// Allowed values
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Schema of a body parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaFragment>,
}

/// Response object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    /// Response schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaFragment>,
}

/// Complete Swagger document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwaggerDocument {
    /// Swagger version
    pub swagger: String,
    /// API info
    pub info: Info,
    /// API paths
    pub paths: IndexMap<String, IndexMap<HttpMethod, Operation>>,
    /// Compiled definitions
    pub definitions: IndexMap<String, Schema>,
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: "Generated API".to_string(),
                version: "1.0.0".to_string(),
                description: Some("API documentation generated from Rust DTOs".to_string()),
            },
            paths: IndexMap::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Add one operation for a route handler.
    ///
    /// A second operation for the same path and method replaces the first.
    pub fn add_operation(
        &mut self,
        schema_gen: &mut SchemaGenerator,
        path: &str,
        method: HttpMethod,
        handler: &HandlerRef,
        signature: &HandlerSignature,
    ) -> Result<()> {
        let path = Self::convert_path_format(path);
        debug!("Adding operation: {} {} -> {}", method, path, handler);

        let parameters = match &signature.parameter {
            Some(binding) => {
                let location = match binding.location {
                    Some(location) => location,
                    // A bare scalar on a templated path is the path segment itself
                    None if binding.ty.is_simple()
                        && !binding.ty.is_array
                        && !Self::path_placeholders(&path).is_empty() =>
                    {
                        ParameterLocation::Path
                    }
                    None => method.default_parameter_location(),
                };
                Self::parameters_for(schema_gen, &binding.ty, &path, location)?
            }
            None => Vec::new(),
        };

        let schema = match &signature.returns {
            Some(ty) => Some(schema_gen.schema_for(ty)?),
            None => None,
        };
        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            Response {
                description: "OK".to_string(),
                schema,
            },
        );

        let operation = Operation {
            tags: vec![short_name(&handler.controller)],
            summary: Some(format!("{} {}", method, path)),
            operation_id: Some(handler.operation_id()),
            parameters,
            responses,
        };

        let operations = self.paths.entry(path.clone()).or_default();
        if operations.insert(method, operation).is_some() {
            debug!("Replaced existing operation {} {}", method, path);
        }
        Ok(())
    }

    /// Derive the parameter list for a handler's parameter type.
    ///
    /// Object types contribute one parameter per simple, visible field; nested objects and
    /// enumerated fields cannot be expressed as flat parameters and are skipped. A body binding
    /// becomes a single `body` parameter referencing the compiled type, while fields named by a
    /// path placeholder are always emitted as required path parameters.
    pub fn parameters_for(
        schema_gen: &mut SchemaGenerator,
        ty: &TypeRef,
        path: &str,
        location: ParameterLocation,
    ) -> Result<Vec<Parameter>> {
        let placeholders = Self::path_placeholders(path);
        let metadata = schema_gen.metadata();
        let fields: &[FieldDescriptor] = match ty.element.as_deref() {
            Some(element) if !ty.is_array && !ty.is_simple() => match metadata.describe(element) {
                Some(descriptor) => descriptor.fields(),
                None => {
                    warn!("No metadata for parameter type {}", element);
                    &[]
                }
            },
            _ => &[],
        };

        if location == ParameterLocation::Body {
            let mut parameters: Vec<Parameter> = fields
                .iter()
                .filter(|f| placeholders.contains(&f.name))
                .filter_map(|f| Self::field_parameter(f, &placeholders, location))
                .collect();
            parameters.push(Parameter {
                location: ParameterLocation::Body,
                name: "body".to_string(),
                description: String::new(),
                required: Some(true),
                param_type: None,
                items: None,
                enum_values: None,
                default: None,
                example: None,
                schema: Some(schema_gen.schema_for(ty)?),
            });
            return Ok(parameters);
        }

        if ty.is_simple() && !ty.is_array {
            let element = ty.element.as_deref().unwrap_or_default();
            return Ok(match placeholders.first() {
                Some(name) if location == ParameterLocation::Path => vec![Parameter {
                    location: ParameterLocation::Path,
                    name: name.clone(),
                    description: String::new(),
                    required: Some(true),
                    param_type: Some(PrimitiveKind::from_type_name(element)),
                    items: None,
                    enum_values: None,
                    default: None,
                    example: None,
                    schema: None,
                }],
                _ => {
                    debug!("Scalar parameter {} has no placeholder to bind to", element);
                    Vec::new()
                }
            });
        }

        Ok(fields
            .iter()
            .filter_map(|f| Self::field_parameter(f, &placeholders, location))
            .collect())
    }

    /// Build a flat parameter for one field, or `None` when it cannot be one
    fn field_parameter(
        field: &FieldDescriptor,
        placeholders: &[String],
        location: ParameterLocation,
    ) -> Option<Parameter> {
        let constraints = &field.constraints;
        if constraints.hidden || !field.simple {
            return None;
        }
        let kind = field.presentation_kind();
        if kind == PrimitiveKind::Object {
            return None;
        }

        let in_path = placeholders.contains(&field.name);
        // Path parameters must name a segment of the route
        let location = match location {
            ParameterLocation::Path if !in_path => ParameterLocation::Query,
            location => location,
        };
        let items = match (field.ty.is_array, field.ty.element.as_deref()) {
            (true, Some(element)) => Some(Box::new(SchemaFragment::inline(Schema::of_kind(
                PrimitiveKind::from_type_name(element),
            )))),
            _ => None,
        };

        Some(Parameter {
            location: if in_path {
                ParameterLocation::Path
            } else {
                location
            },
            name: field.name.clone(),
            description: constraints.description.clone().unwrap_or_default(),
            required: if in_path {
                Some(true)
            } else {
                constraints.required
            },
            param_type: Some(kind),
            items,
            enum_values: constraints.fixed_values.clone(),
            default: constraints.default.clone(),
            example: constraints.example.clone(),
            schema: None,
        })
    }

    /// Names of the `{placeholder}` segments of a path
    fn path_placeholders(path: &str) -> Vec<String> {
        path.split('/')
            .filter_map(|part| part.strip_prefix('{')?.strip_suffix('}'))
            .map(|name| name.to_string())
            .collect()
    }

    /// Convert `:param` and `{param:regex}` segments to `{param}`
    fn convert_path_format(path: &str) -> String {
        path.split('/')
            .map(|part| {
                if let Some(name) = part.strip_prefix(':') {
                    format!("{{{}}}", name)
                } else if let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                    let name = inner.split(':').next().unwrap_or(inner).trim();
                    format!("{{{}}}", name)
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Build the final document, moving the compiled definitions into it
    pub fn build(self, schema_gen: SchemaGenerator) -> SwaggerDocument {
        debug!("Building final Swagger document");

        SwaggerDocument {
            swagger: "2.0".to_string(),
            info: self.info,
            paths: self.paths,
            definitions: schema_gen.into_registry().into_definitions(),
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}
