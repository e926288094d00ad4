//! Route handler resolution.
//!
//! A route table names its handlers as `Controller@method` (or `path::Controller::method`).
//! This module splits those identifiers and looks up the handler's declared parameter and
//! return types in a [`ControllerIndex`], which is usually filled from source by
//! [`crate::type_resolver::TypeResolver`].

use crate::error::{Error, Result};
use crate::metadata::{short_name, TypeRef};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// HTTP methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "delete")]
    Delete,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "options")]
    Options,
    #[serde(alias = "head")]
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Where the fields of an unannotated parameter type are read from for this method
    pub fn default_parameter_location(&self) -> ParameterLocation {
        match self {
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => ParameterLocation::Body,
            HttpMethod::Get | HttpMethod::Delete | HttpMethod::Options | HttpMethod::Head => {
                ParameterLocation::Query
            }
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The location where a parameter value is read from in an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    /// Path placeholder (e.g. `/users/{id}`)
    Path,
    /// Query string parameter
    Query,
    /// HTTP header
    Header,
    /// Form-encoded body field
    FormData,
    /// The whole request body
    Body,
}

/// A handler identifier split into controller and method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    pub controller: String,
    pub method: String,
}

impl HandlerRef {
    /// Split `Controller@method` or `path::Controller::method`.
    pub fn parse(handler: &str) -> Result<Self> {
        let handler = handler.trim();
        let (controller, method) = if handler.contains('@') {
            let mut parts = handler.split('@');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(controller), Some(method), None) => (controller, method),
                _ => return Err(resolution_error(handler, "expected exactly one '@'")),
            }
        } else {
            handler
                .rsplit_once("::")
                .ok_or_else(|| resolution_error(handler, "no controller/method separator"))?
        };

        let controller = controller.trim();
        let method = method.trim();
        if controller.is_empty() || method.is_empty() {
            return Err(resolution_error(handler, "empty controller or method name"));
        }

        Ok(Self {
            controller: controller.to_string(),
            method: method.to_string(),
        })
    }

    /// `Controller@method` with the controller reduced to its short name
    pub fn operation_id(&self) -> String {
        format!("{}@{}", short_name(&self.controller), self.method)
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.controller, self.method)
    }
}

fn resolution_error(handler: &str, reason: &str) -> Error {
    Error::HandlerResolution {
        handler: handler.to_string(),
        reason: reason.to_string(),
    }
}

/// The parameter a handler receives and where it is bound from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBinding {
    pub ty: TypeRef,
    /// `None` when the parameter is not wrapped in a location-specific extractor
    pub location: Option<ParameterLocation>,
}

/// Declared parameter and return type of a handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerSignature {
    pub parameter: Option<ParameterBinding>,
    pub returns: Option<TypeRef>,
}

impl HandlerSignature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, ty: TypeRef, location: Option<ParameterLocation>) -> Self {
        self.parameter = Some(ParameterBinding { ty, location });
        self
    }

    pub fn with_returns(mut self, ty: TypeRef) -> Self {
        self.returns = Some(ty);
        self
    }
}

/// Handler signatures indexed by controller short name and method name.
#[derive(Debug, Clone, Default)]
pub struct ControllerIndex {
    controllers: HashMap<String, HashMap<String, HandlerSignature>>,
}

impl ControllerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, controller: &str, method: &str, signature: HandlerSignature) {
        debug!("Indexing handler {}@{}", controller, method);
        self.controllers
            .entry(short_name(controller))
            .or_default()
            .insert(method.to_string(), signature);
    }

    /// Builder-style [`ControllerIndex::insert`].
    pub fn with(mut self, controller: &str, method: &str, signature: HandlerSignature) -> Self {
        self.insert(controller, method, signature);
        self
    }

    pub fn get(&self, handler: &HandlerRef) -> Option<&HandlerSignature> {
        self.controllers
            .get(&short_name(&handler.controller))?
            .get(&handler.method)
    }

    /// Parse a handler identifier and look up its signature.
    pub fn resolve(&self, handler: &str) -> Result<(HandlerRef, &HandlerSignature)> {
        let handler_ref = HandlerRef::parse(handler)?;
        let signature = self
            .get(&handler_ref)
            .ok_or_else(|| resolution_error(handler, "handler not found"))?;
        Ok((handler_ref, signature))
    }

    /// Number of indexed handlers
    pub fn len(&self) -> usize {
        self.controllers.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
