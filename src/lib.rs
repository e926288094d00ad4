//! OpenAPI from DTO - Swagger 2.0 documents compiled from a project's data transfer types.
//!
//! The library compiles statically known type metadata (field types, constraints, enumerated
//! value sets) into Swagger 2.0 schema definitions, and assembles one document per server from
//! a route table that maps paths and HTTP methods to `Controller@method` handlers.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively scans project directories for Rust files
//! 2. [`parser`] - Parses Rust source files into syntax trees
//! 3. [`type_resolver`] - Derives type metadata and handler signatures from the trees
//! 4. [`metadata`] - Type descriptors and the [`metadata::MetadataProvider`] seam
//! 5. [`schema_generator`] - Compiles types into schema fragments and definitions
//! 6. [`registry`] - Definitions compiled during one generation run
//! 7. [`handler`] - Handler identifiers, HTTP methods and parameter locations
//! 8. [`openapi_builder`] - Assembles paths, operations and the final document
//! 9. [`generator`] - Runs the generation pass for every configured server
//! 10. [`serializer`] - Serializes and writes documents as JSON or YAML
//!
//! # Example Usage
//!
//! ```
//! use openapi_from_dto::{
//!     config::Config,
//!     generator,
//!     handler::{ControllerIndex, HandlerSignature},
//!     metadata::{FieldDescriptor, TypeDescriptor, TypeRef, TypeRegistry},
//! };
//!
//! let metadata = TypeRegistry::new()
//!     .with(TypeDescriptor::object(
//!         "UserQuery",
//!         vec![FieldDescriptor::scalar("id", "i32").required().example(5)],
//!     ))
//!     .with(TypeDescriptor::object(
//!         "UserView",
//!         vec![FieldDescriptor::scalar("id", "i32"), FieldDescriptor::scalar("name", "String")],
//!     ));
//! let controllers = ControllerIndex::new().with(
//!     "UserController",
//!     "show",
//!     HandlerSignature::new()
//!         .with_parameter(TypeRef::named("UserQuery"), None)
//!         .with_returns(TypeRef::named("UserView")),
//! );
//! let config = Config::from_yaml_str(r#"
//! servers:
//!   - name: http
//!     routes:
//!       GET:
//!         - { path: "/users/{id}", handler: "UserController@show" }
//! "#).unwrap();
//!
//! let documents = generator::generate_all(&config, &metadata, &controllers).unwrap();
//! let document = &documents["http"];
//! assert!(document.paths.contains_key("/users/{id}"));
//! assert!(document.definitions.contains_key("UserView"));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod handler;
pub mod metadata;
pub mod openapi_builder;
pub mod parser;
pub mod registry;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod type_resolver;
