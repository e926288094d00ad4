use crate::handler::{ControllerIndex, HandlerSignature, ParameterBinding, ParameterLocation};
use crate::metadata::{
    ConstraintSet, EnumRenderMode, EnumVariant, FieldDescriptor, MetadataProvider, TypeDescriptor,
    TypeRef, TypeRegistry,
};
use crate::parser::ParsedFile;
use log::{debug, warn};
use serde_json::{Number, Value};
use syn::meta::ParseNestedMeta;
use syn::{Expr, Lit, Token, Type, UnOp};

/// Type resolver - derives type metadata and handler signatures from parsed source
pub struct TypeResolver {
    /// Object and enum descriptors keyed by short name
    types: TypeRegistry,
    /// Signatures of inherent methods, keyed by the type they are implemented on
    controllers: ControllerIndex,
}

/// Field annotations collected from `#[serde(..)]`
#[derive(Debug, Clone, Default)]
struct SerdeAttributes {
    rename: Option<String>,
    skip: bool,
}

impl TypeResolver {
    /// Create a new TypeResolver by indexing every item of the parsed files
    pub fn new(parsed_files: &[ParsedFile]) -> Self {
        debug!("Initializing TypeResolver with {} files", parsed_files.len());
        let mut resolver = Self {
            types: TypeRegistry::new(),
            controllers: ControllerIndex::new(),
        };

        for parsed_file in parsed_files {
            debug!("Indexing items of {}", parsed_file.path.display());
            resolver.index_items(&parsed_file.syntax_tree.items);
        }

        debug!(
            "Indexed {} types and {} handlers",
            resolver.types.len(),
            resolver.controllers.len()
        );
        resolver
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn controllers(&self) -> &ControllerIndex {
        &self.controllers
    }

    pub fn into_parts(self) -> (TypeRegistry, ControllerIndex) {
        (self.types, self.controllers)
    }

    /// Index items, descending into inline modules
    fn index_items(&mut self, items: &[syn::Item]) {
        for item in items {
            match item {
                syn::Item::Struct(item_struct) => {
                    let descriptor = Self::parse_struct_definition(item_struct);
                    self.types.register(descriptor);
                }
                syn::Item::Enum(item_enum) => {
                    if let Some(descriptor) = Self::parse_enum_definition(item_enum) {
                        self.types.register(descriptor);
                    }
                }
                syn::Item::Impl(item_impl) if item_impl.trait_.is_none() => {
                    self.index_impl(item_impl);
                }
                syn::Item::Mod(item_mod) => {
                    if let Some((_, items)) = &item_mod.content {
                        self.index_items(items);
                    }
                }
                _ => {}
            }
        }
    }

    /// Parse a struct definition into an object descriptor
    fn parse_struct_definition(item_struct: &syn::ItemStruct) -> TypeDescriptor {
        let struct_name = item_struct.ident.to_string();
        debug!("Parsing struct definition: {}", struct_name);

        let generics = Self::generic_names(&item_struct.generics);
        let mut fields = Vec::new();
        if let syn::Fields::Named(named_fields) = &item_struct.fields {
            for field in &named_fields.named {
                if let Some(field_def) = Self::parse_field(&struct_name, field, &generics) {
                    fields.push(field_def);
                }
            }
        }

        debug!("Parsed {} fields", fields.len());
        TypeDescriptor::object(struct_name, fields)
    }

    /// Parse a single named field
    fn parse_field(owner: &str, field: &syn::Field, generics: &[String]) -> Option<FieldDescriptor> {
        let field_name = field.ident.as_ref()?.to_string();
        debug!("Parsing field: {}.{}", owner, field_name);

        let serde_attrs = Self::parse_serde_attributes(&field.attrs);
        let mut constraints = Self::parse_api_model(owner, &field_name, &field.attrs);
        let validation = Self::parse_validate(owner, &field_name, &field.attrs);
        if constraints.required.is_none() {
            constraints.required = validation.required;
        }
        if constraints.fixed_values.is_none() {
            constraints.fixed_values = validation.fixed_values;
        }
        if constraints.description.is_none() {
            constraints.description = doc_comment(&field.attrs);
        }
        if serde_attrs.skip {
            constraints.hidden = true;
        }

        let name = serde_attrs.rename.unwrap_or(field_name);
        let ty = type_ref(&field.ty, generics);
        Some(FieldDescriptor::new(name, ty).with_constraints(constraints))
    }

    /// Parse Serde attributes from field attributes
    fn parse_serde_attributes(attrs: &[syn::Attribute]) -> SerdeAttributes {
        let mut serde_attrs = SerdeAttributes::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                    let value: syn::LitStr = meta.value()?.parse()?;
                    debug!("Found serde rename: {}", value.value());
                    serde_attrs.rename = Some(value.value());
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    debug!("Found serde skip");
                    serde_attrs.skip = true;
                } else {
                    skip_meta(&meta)?;
                }
                Ok(())
            });
            if let Err(err) = result {
                debug!("Unreadable serde attribute: {}", err);
            }
        }

        serde_attrs
    }

    /// Parse `#[api_model(..)]`; a malformed attribute is ignored as a whole
    fn parse_api_model(owner: &str, field_name: &str, attrs: &[syn::Attribute]) -> ConstraintSet {
        let mut constraints = ConstraintSet::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident("api_model")) {
            let mut parsed = constraints.clone();
            let result = attr.parse_nested_meta(|meta| {
                let key = meta
                    .path
                    .get_ident()
                    .map(|ident| ident.to_string())
                    .unwrap_or_default();
                match key.as_str() {
                    "value" | "description" => {
                        let text: syn::LitStr = meta.value()?.parse()?;
                        parsed.description = Some(text.value());
                    }
                    "required" => parsed.required = Some(flag_value(&meta)?),
                    "hidden" => parsed.hidden = flag_value(&meta)?,
                    "example" => parsed.example = Some(literal_value(&meta)?),
                    "default" => parsed.default = Some(literal_value(&meta)?),
                    "one_of" => match literal_value(&meta)? {
                        Value::Array(values) => parsed.fixed_values = Some(values),
                        _ => return Err(meta.error("one_of expects an array of literals")),
                    },
                    "enum_view" => {
                        let text: syn::LitStr = meta.value()?.parse()?;
                        parsed.enum_view = text
                            .value()
                            .parse::<EnumRenderMode>()
                            .map_err(|e| meta.error(e))?;
                    }
                    _ => return Err(meta.error(format!("unsupported key `{}`", key))),
                }
                Ok(())
            });

            match result {
                Ok(()) => constraints = parsed,
                Err(err) => warn!(
                    "Ignoring malformed #[api_model] on {}.{}: {}",
                    owner, field_name, err
                ),
            }
        }

        constraints
    }

    /// Pick up `required` and `one_of`/`in` from `#[validate(..)]`; other rules are skipped
    fn parse_validate(owner: &str, field_name: &str, attrs: &[syn::Attribute]) -> ConstraintSet {
        let mut constraints = ConstraintSet::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident("validate")) {
            let mut parsed = constraints.clone();
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("required") {
                    parsed.required = Some(flag_value(&meta)?);
                } else if meta.path.is_ident("one_of") || meta.path.is_ident("in") {
                    match literal_value(&meta)? {
                        Value::Array(values) => parsed.fixed_values = Some(values),
                        _ => return Err(meta.error("expected an array of literals")),
                    }
                } else {
                    skip_meta(&meta)?;
                }
                Ok(())
            });

            match result {
                Ok(()) => constraints = parsed,
                Err(err) => warn!(
                    "Ignoring malformed #[validate] on {}.{}: {}",
                    owner, field_name, err
                ),
            }
        }

        constraints
    }

    /// Parse an enum whose variants are all unit variants
    fn parse_enum_definition(item_enum: &syn::ItemEnum) -> Option<TypeDescriptor> {
        let enum_name = item_enum.ident.to_string();
        debug!("Parsing enum definition: {}", enum_name);

        if item_enum
            .variants
            .iter()
            .any(|v| !matches!(v.fields, syn::Fields::Unit))
        {
            debug!("Skipping enum {} with data-carrying variants", enum_name);
            return None;
        }

        // Once any discriminant is written out, every variant has a numeric one
        let numbered = item_enum.variants.iter().any(|v| v.discriminant.is_some());
        let mut next_discriminant: i64 = 0;
        let mut variants = Vec::with_capacity(item_enum.variants.len());
        for variant in &item_enum.variants {
            let discriminant = if numbered {
                if let Some(explicit) = variant
                    .discriminant
                    .as_ref()
                    .and_then(|(_, expr)| expr_to_value(expr))
                    .and_then(|value| value.as_i64())
                {
                    next_discriminant = explicit;
                }
                let current = next_discriminant;
                next_discriminant = next_discriminant.wrapping_add(1);
                Some(Value::from(current))
            } else {
                None
            };
            variants.push(Self::parse_variant(&enum_name, variant, discriminant));
        }

        debug!("Parsed {} variants", variants.len());
        Some(TypeDescriptor::enumeration(enum_name, variants))
    }

    fn parse_variant(
        owner: &str,
        variant: &syn::Variant,
        discriminant: Option<Value>,
    ) -> EnumVariant {
        let name = variant.ident.to_string();
        let mut value = None;
        let mut message = None;

        for attr in variant.attrs.iter().filter(|a| a.path().is_ident("api_enum")) {
            let (mut v, mut m) = (value.clone(), message.clone());
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("value") {
                    v = Some(literal_value(&meta)?);
                } else if meta.path.is_ident("message") {
                    let text: syn::LitStr = meta.value()?.parse()?;
                    m = Some(text.value());
                } else {
                    return Err(meta.error("expected `value` or `message`"));
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    value = v;
                    message = m;
                }
                Err(err) => warn!("Ignoring malformed #[api_enum] on {}::{}: {}", owner, name, err),
            }
        }

        let value = value
            .or(discriminant)
            .unwrap_or_else(|| Value::String(name.clone()));
        let message = message
            .or_else(|| doc_comment(&variant.attrs))
            .unwrap_or_else(|| name.clone());

        EnumVariant::new(name, value, message)
    }

    /// Index the methods of an inherent impl block as handlers
    fn index_impl(&mut self, item_impl: &syn::ItemImpl) {
        let Type::Path(self_ty) = item_impl.self_ty.as_ref() else {
            return;
        };
        let Some(segment) = self_ty.path.segments.last() else {
            return;
        };
        let controller = segment.ident.to_string();

        for item in &item_impl.items {
            if let syn::ImplItem::Fn(method) = item {
                let signature = Self::parse_signature(&method.sig);
                self.controllers
                    .insert(&controller, &method.sig.ident.to_string(), signature);
            }
        }
    }

    /// First typed argument and return type of a handler
    fn parse_signature(sig: &syn::Signature) -> HandlerSignature {
        let generics = Self::generic_names(&sig.generics);
        let parameter = sig.inputs.iter().find_map(|input| match input {
            syn::FnArg::Typed(pat_type) => Some(parameter_binding(&pat_type.ty, &generics)),
            syn::FnArg::Receiver(_) => None,
        });
        let returns = match &sig.output {
            syn::ReturnType::Default => None,
            syn::ReturnType::Type(_, ty) => return_type(ty, &generics),
        };

        HandlerSignature { parameter, returns }
    }

    fn generic_names(generics: &syn::Generics) -> Vec<String> {
        generics
            .type_params()
            .map(|param| param.ident.to_string())
            .collect()
    }
}

impl MetadataProvider for TypeResolver {
    fn describe(&self, type_identifier: &str) -> Option<&TypeDescriptor> {
        self.types.describe(type_identifier)
    }
}

/// Consume the value of a nested meta item that is not interpreted
fn skip_meta(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta(&inner))?;
    }
    Ok(())
}

/// `key` alone means true, `key = <bool>` is explicit
fn flag_value(meta: &ParseNestedMeta) -> syn::Result<bool> {
    if meta.input.peek(Token![=]) {
        let value: syn::LitBool = meta.value()?.parse()?;
        Ok(value.value)
    } else {
        Ok(true)
    }
}

fn literal_value(meta: &ParseNestedMeta) -> syn::Result<Value> {
    let expr: Expr = meta.value()?.parse()?;
    expr_to_value(&expr).ok_or_else(|| meta.error("expected a literal value"))
}

/// Convert a literal expression (string, number, bool, negation or array of those) to JSON
fn expr_to_value(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(s) => Some(Value::String(s.value())),
            Lit::Char(c) => Some(Value::String(c.value().to_string())),
            Lit::Bool(b) => Some(Value::Bool(b.value)),
            Lit::Int(i) => i.base10_parse::<i64>().ok().map(Value::from),
            Lit::Float(f) => f
                .base10_parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            _ => None,
        },
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => {
            match expr_to_value(&unary.expr)? {
                Value::Number(n) => match n.as_i64() {
                    Some(i) => Some(Value::from(-i)),
                    None => Number::from_f64(-n.as_f64()?).map(Value::Number),
                },
                _ => None,
            }
        }
        Expr::Array(array) => array
            .elems
            .iter()
            .map(expr_to_value)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        Expr::Paren(paren) => expr_to_value(&paren.expr),
        Expr::Group(group) => expr_to_value(&group.expr),
        _ => None,
    }
}

/// Joined `///` lines, or `None` when there are none
fn doc_comment(attrs: &[syn::Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(syn::ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

/// Derive the element type and container flag of a declared type
fn type_ref(ty: &Type, generics: &[String]) -> TypeRef {
    match ty {
        Type::Reference(reference) => type_ref(&reference.elem, generics),
        Type::Paren(paren) => type_ref(&paren.elem, generics),
        Type::Group(group) => type_ref(&group.elem, generics),
        Type::Slice(slice) => container_of(&slice.elem, generics),
        Type::Array(array) => container_of(&array.elem, generics),
        Type::Path(type_path) => {
            let Some(segment) = type_path.path.segments.last() else {
                return TypeRef::default();
            };
            match segment.ident.to_string().as_str() {
                "Option" | "Box" | "Arc" | "Rc" | "Cow" => first_type_argument(segment)
                    .map(|inner| type_ref(inner, generics))
                    .unwrap_or_default(),
                "Vec" | "VecDeque" | "HashSet" | "BTreeSet" | "LinkedList" => {
                    match first_type_argument(segment) {
                        Some(inner) => container_of(inner, generics),
                        None => TypeRef::unknown_array(),
                    }
                }
                name if type_path.path.segments.len() == 1 && generics.iter().any(|g| g == name) => {
                    TypeRef::default()
                }
                _ => TypeRef::named(path_name(&type_path.path)),
            }
        }
        _ => TypeRef::default(),
    }
}

/// A container of `elem`; nested containers have an unknown element
fn container_of(elem: &Type, generics: &[String]) -> TypeRef {
    let inner = type_ref(elem, generics);
    match inner.element {
        Some(element) if !inner.is_array => TypeRef::array_of(element),
        _ => TypeRef::unknown_array(),
    }
}

fn first_type_argument(segment: &syn::PathSegment) -> Option<&Type> {
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            syn::GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

/// Path segments joined by `::`, without generic arguments
fn path_name(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

/// Binding of a handler argument, with the location implied by its extractor wrapper
fn parameter_binding(ty: &Type, generics: &[String]) -> ParameterBinding {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            let location = match segment.ident.to_string().as_str() {
                "Query" => Some(ParameterLocation::Query),
                "Json" => Some(ParameterLocation::Body),
                "Form" => Some(ParameterLocation::FormData),
                "Path" => Some(ParameterLocation::Path),
                "Header" => Some(ParameterLocation::Header),
                _ => None,
            };
            if let (Some(location), Some(inner)) = (location, first_type_argument(segment)) {
                return ParameterBinding {
                    ty: type_ref(inner, generics),
                    location: Some(location),
                };
            }
        }
    }

    ParameterBinding {
        ty: type_ref(ty, generics),
        location: None,
    }
}

/// Response type of a handler; `None` for `()` and undeterminable types
fn return_type(ty: &Type, generics: &[String]) -> Option<TypeRef> {
    match ty {
        Type::Tuple(tuple) if tuple.elems.is_empty() => None,
        Type::Path(type_path) => {
            let segment = type_path.path.segments.last()?;
            match segment.ident.to_string().as_str() {
                "Json" | "Result" | "Option" | "Box" => {
                    return_type(first_type_argument(segment)?, generics)
                }
                _ => Some(type_ref(ty, generics)),
            }
        }
        _ => {
            let resolved = type_ref(ty, generics);
            (resolved.element.is_some() || resolved.is_array).then_some(resolved)
        }
    }
}
