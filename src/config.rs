//! Generation settings and route tables.
//!
//! The configuration is a YAML file with an `api_docs` section controlling the document
//! writer and a `servers` list, each server carrying its routes grouped by HTTP method.
//!
//! # Example
//!
//! ```
//! use openapi_from_dto::config::Config;
//!
//! let config = Config::from_yaml_str(r#"
//! api_docs:
//!   enable: true
//!   output_dir: runtime/swagger
//! servers:
//!   - name: http
//!     routes:
//!       GET:
//!         - { path: "/users/{id}", handler: "UserController@show" }
//! "#).unwrap();
//!
//! assert!(config.api_docs.enable);
//! assert_eq!(config.servers[0].name, "http");
//! ```

use crate::error::{Error, Result};
use crate::handler::HttpMethod;
use anyhow::Context;
use clap::ValueEnum;
use indexmap::IndexMap;
use log::debug;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_VERSION: &str = "1.0.0";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_docs: ApiDocsConfig,
    #[serde(default)]
    pub servers: Vec<ServerRoutes>,
}

/// Document writer settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiDocsConfig {
    /// Nothing is written unless this is set
    #[serde(default)]
    pub enable: bool,
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub format: OutputFormat,
    /// Document title; the server name when unset
    pub title: Option<String>,
    pub version: Option<String>,
}

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON format
    #[default]
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

/// Routes registered on one server
#[derive(Debug, Clone, Deserialize)]
pub struct ServerRoutes {
    pub name: String,
    /// Method keys are case-insensitive; groups spelled twice are merged in file order
    #[serde(default, deserialize_with = "merge_method_groups")]
    pub routes: IndexMap<HttpMethod, Vec<RouteEntry>>,
}

fn merge_method_groups<'de, D>(
    deserializer: D,
) -> std::result::Result<IndexMap<HttpMethod, Vec<RouteEntry>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct MethodGroups;

    impl<'de> Visitor<'de> for MethodGroups {
        type Value = IndexMap<HttpMethod, Vec<RouteEntry>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of HTTP methods to route lists")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut groups: Self::Value = IndexMap::new();
            while let Some((method, routes)) = map.next_entry::<HttpMethod, Vec<RouteEntry>>()? {
                let group = groups.entry(method).or_default();
                if !group.is_empty() {
                    debug!("Merging repeated {} route group", method);
                }
                group.extend(routes);
            }
            Ok(groups)
        }
    }

    deserializer.deserialize_map(MethodGroups)
}

/// One route: a path and the `Controller@method` handler serving it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteEntry {
    pub path: String,
    pub handler: String,
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        debug!("Loaded configuration with {} servers", config.servers.len());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for server in &self.servers {
            if server.name.trim().is_empty() {
                return Err(Error::InvalidArgument("server name must not be empty".to_string()));
            }
            for (method, routes) in &server.routes {
                if let Some(route) = routes.iter().find(|r| !r.path.starts_with('/')) {
                    return Err(Error::InvalidArgument(format!(
                        "route {} {} on server {} must start with '/'",
                        method, route.path, server.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Apply command line overrides on top of the file settings
    pub fn apply_overrides(
        &mut self,
        enable: bool,
        output_dir: Option<PathBuf>,
        format: Option<OutputFormat>,
    ) {
        if enable {
            self.api_docs.enable = true;
        }
        if let Some(output_dir) = output_dir {
            self.api_docs.output_dir = Some(output_dir);
        }
        if let Some(format) = format {
            self.api_docs.format = format;
        }
    }
}

impl ApiDocsConfig {
    pub fn title_for(&self, server: &str) -> String {
        self.title.clone().unwrap_or_else(|| server.to_string())
    }

    pub fn version(&self) -> String {
        self.version
            .clone()
            .unwrap_or_else(|| DEFAULT_VERSION.to_string())
    }
}
