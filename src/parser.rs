use crate::error::Error;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Parser for the DTO and controller sources of a project.
///
/// Every file is parsed with `syn` into a full syntax tree; the trees are then handed to
/// [`crate::type_resolver::TypeResolver`], which derives type metadata and handler
/// signatures from them.
///
/// # Example
///
/// ```no_run
/// use openapi_from_dto::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/dto.rs")).unwrap();
/// println!("Parsed {} items", parsed.syntax_tree.items.len());
/// ```
pub struct AstParser;

/// A source file and its syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed syntax tree
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Reads and parses a single source file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid Rust.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Self::parse_source(path, &content)
    }

    /// Parses source text that was already loaded, attributing it to `path`.
    pub fn parse_source(path: &Path, content: &str) -> Result<ParsedFile> {
        let syntax_tree = syn::parse_file(content)
            .map_err(|e| Error::ParseError {
                file: path.to_path_buf(),
                message: e.to_string(),
            })
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        debug!(
            "Parsed {} top-level items from {}",
            syntax_tree.items.len(),
            path.display()
        );

        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Parses every file, keeping one result per input path.
    ///
    /// Failures are logged as warnings; the remaining files are still parsed.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).inspect_err(|e| {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }

    /// Parses every file and keeps only the ones that parsed.
    ///
    /// A project with a broken file still yields metadata for the rest; the broken
    /// file's types then fall back to empty object schemas.
    pub fn parse_project(paths: &[PathBuf]) -> Vec<ParsedFile> {
        Self::parse_files(paths)
            .into_iter()
            .filter_map(|result| result.ok())
            .collect()
    }
}
