//! The generation pass: one document per configured server.
//!
//! Each server is compiled in its own context (a fresh [`SchemaGenerator`], definition
//! registry and [`OpenApiBuilder`]); only the type metadata and controller index are shared.
//! Routes whose handler cannot be resolved are logged and skipped, so one bad route never
//! costs the rest of the document.

use crate::config::{Config, ServerRoutes};
use crate::error::{Error, Result};
use crate::handler::ControllerIndex;
use crate::metadata::MetadataProvider;
use crate::openapi_builder::{Info, OpenApiBuilder, SwaggerDocument};
use crate::schema_generator::SchemaGenerator;
use crate::serializer::DocumentWriter;
use indexmap::IndexMap;
use log::{debug, info, warn};
use std::path::PathBuf;

/// Build the document of a single server
pub fn generate_document(
    server: &ServerRoutes,
    info: Info,
    metadata: &dyn MetadataProvider,
    controllers: &ControllerIndex,
) -> Result<SwaggerDocument> {
    debug!("Generating document for server {}", server.name);
    let mut schema_gen = SchemaGenerator::new(metadata);
    let mut builder = OpenApiBuilder::new().with_info(info.title, info.version, info.description);

    for (method, routes) in &server.routes {
        for route in routes {
            let (handler, signature) = match controllers.resolve(&route.handler) {
                Ok(resolved) => resolved,
                Err(err @ Error::HandlerResolution { .. }) => {
                    warn!(
                        "Skipping route {} {} on server {}: {}",
                        method, route.path, server.name, err
                    );
                    continue;
                }
                Err(err) => return Err(err),
            };
            builder.add_operation(&mut schema_gen, &route.path, *method, &handler, signature)?;
        }
    }

    Ok(builder.build(schema_gen))
}

/// Build the documents of every configured server, keyed by server name.
///
/// A server name that appears twice keeps the later document.
pub fn generate_all(
    config: &Config,
    metadata: &dyn MetadataProvider,
    controllers: &ControllerIndex,
) -> Result<IndexMap<String, SwaggerDocument>> {
    let mut documents = IndexMap::new();

    for server in &config.servers {
        let info = Info {
            title: config.api_docs.title_for(&server.name),
            version: config.api_docs.version(),
            description: None,
        };
        let document = generate_document(server, info, metadata, controllers)?;
        if documents.insert(server.name.clone(), document).is_some() {
            warn!("Server {} is configured more than once, keeping the last", server.name);
        }
    }

    Ok(documents)
}

/// Generate and write every server's document.
///
/// Does nothing when document generation is disabled. Returns the written paths.
pub fn run(
    config: &Config,
    metadata: &dyn MetadataProvider,
    controllers: &ControllerIndex,
) -> anyhow::Result<Vec<PathBuf>> {
    let writer = DocumentWriter::from_config(&config.api_docs);
    if !writer.is_enabled() {
        info!("API docs generation is disabled or has no output directory, nothing to do");
        return Ok(Vec::new());
    }

    let documents = generate_all(config, metadata, controllers)?;
    let mut written = Vec::new();
    for (server, document) in &documents {
        if let Some(path) = writer.write(server, document)? {
            debug!(
                "swagger server:[{}] file has been generated at {}",
                server,
                path.display()
            );
            written.push(path);
        }
    }

    info!("Generated {} Swagger documents", written.len());
    Ok(written)
}
