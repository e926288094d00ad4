//! Serialization and persistence of generated Swagger documents.
//!
//! [`serialize_json`] and [`serialize_yaml`] render a document to text; [`DocumentWriter`]
//! decides whether and where a server's document is written.

use crate::config::{ApiDocsConfig, OutputFormat};
use crate::openapi_builder::SwaggerDocument;
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Serializes a Swagger document to YAML.
///
/// # Example
///
/// ```
/// use openapi_from_dto::metadata::TypeRegistry;
/// use openapi_from_dto::openapi_builder::OpenApiBuilder;
/// use openapi_from_dto::schema_generator::SchemaGenerator;
/// use openapi_from_dto::serializer::serialize_yaml;
///
/// let metadata = TypeRegistry::new();
/// let doc = OpenApiBuilder::new().build(SchemaGenerator::new(&metadata));
/// let yaml = serialize_yaml(&doc).unwrap();
/// assert!(yaml.starts_with("swagger:"));
/// ```
pub fn serialize_yaml(doc: &SwaggerDocument) -> Result<String> {
    debug!("Serializing Swagger document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize Swagger document to YAML")
}

/// Serializes a Swagger document to pretty-printed JSON.
pub fn serialize_json(doc: &SwaggerDocument) -> Result<String> {
    debug!("Serializing Swagger document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize Swagger document to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Persists one document per server, gated by the enable flag and output directory
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    enable: bool,
    output_dir: Option<PathBuf>,
    format: OutputFormat,
}

impl DocumentWriter {
    pub fn new(enable: bool, output_dir: Option<PathBuf>, format: OutputFormat) -> Self {
        Self {
            enable,
            output_dir,
            format,
        }
    }

    pub fn from_config(config: &ApiDocsConfig) -> Self {
        Self::new(config.enable, config.output_dir.clone(), config.format)
    }

    /// True when documents would actually be written
    pub fn is_enabled(&self) -> bool {
        self.enable && self.output_dir.is_some()
    }

    /// `<output_dir>/<server>.swagger.<ext>`, when an output directory is configured
    pub fn target_path(&self, server: &str) -> Option<PathBuf> {
        self.output_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.swagger.{}", server, self.format.extension())))
    }

    /// Write the document of `server`.
    ///
    /// Returns the written path, or `None` when writing is disabled or no output
    /// directory is configured.
    pub fn write(&self, server: &str, doc: &SwaggerDocument) -> Result<Option<PathBuf>> {
        if !self.enable {
            debug!("Document writing disabled, skipping server {}", server);
            return Ok(None);
        }
        let Some(path) = self.target_path(server) else {
            info!("No output directory configured, skipping server {}", server);
            return Ok(None);
        };

        let content = match self.format {
            OutputFormat::Json => serialize_json(doc)?,
            OutputFormat::Yaml => serialize_yaml(doc)?,
        };
        write_to_file(&content, &path)
            .with_context(|| format!("Failed to write document of server {}", server))?;

        Ok(Some(path))
    }
}
