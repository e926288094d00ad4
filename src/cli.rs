use crate::config::{Config, OutputFormat};
use crate::generator;
use crate::parser::AstParser;
use crate::scanner::FileScanner;
use crate::type_resolver::TypeResolver;
use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

/// OpenAPI from DTO - Generate Swagger 2.0 documents from a project's DTOs and route tables
#[derive(Parser, Debug)]
#[command(name = "openapi-from-dto")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Route and generation config (YAML)
    #[arg(short = 'c', long = "config", value_name = "CONFIG")]
    pub config: PathBuf,

    /// Enable document generation regardless of the config file
    #[arg(long = "enable")]
    pub enable: bool,

    /// Directory the documents are written to (overrides the config file)
    #[arg(short = 'o', long = "output-dir", value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }
    if !args.config.is_file() {
        anyhow::bail!("Config file does not exist: {}", args.config.display());
    }

    info!("Project path: {}", args.project_path.display());
    info!("Config file: {}", args.config.display());
    if let Some(ref output_dir) = args.output_dir {
        info!("Output directory: {}", output_dir.display());
    }

    Ok(args)
}

/// Run the main workflow, returning the written document paths
pub fn run(args: CliArgs) -> Result<Vec<PathBuf>> {
    let mut config = Config::load(&args.config)?;
    config.apply_overrides(args.enable, args.output_dir, args.format);

    info!("Scanning project directory...");
    let scan_result = FileScanner::new(args.project_path.clone()).scan()?;
    info!("Found {} Rust files", scan_result.rust_files.len());
    if scan_result.rust_files.is_empty() {
        warn!("No Rust files found, every type will fall back to an empty object");
    }

    info!("Parsing Rust files...");
    let parsed_files = AstParser::parse_project(&scan_result.rust_files);
    info!("Successfully parsed {} files", parsed_files.len());

    let resolver = TypeResolver::new(&parsed_files);
    info!(
        "Indexed {} types and {} handlers",
        resolver.types().len(),
        resolver.controllers().len()
    );

    let written = generator::run(&config, &resolver, resolver.controllers())?;

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", scan_result.rust_files.len());
    info!("  - Files parsed: {}", parsed_files.len());
    info!("  - Servers: {}", config.servers.len());
    info!("  - Documents written: {}", written.len());

    Ok(written)
}
