//! OpenAPI from DTO - command-line tool for generating Swagger 2.0 documents.
//!
//! Reads a project's DTO and controller sources plus a YAML route table, and writes one
//! Swagger document per configured server.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-dto [OPTIONS] -c <CONFIG> <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Generate with the settings from the config file:
//! ```bash
//! openapi-from-dto ./my-api-project -c routes.yaml
//! ```
//!
//! Force generation into a directory as YAML:
//! ```bash
//! openapi-from-dto ./my-api-project -c routes.yaml --enable -o runtime/swagger -f yaml
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_dto::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI from DTO starting...");

    let args = cli::parse_args_from_parsed(args)?;
    let written = cli::run(args)?;

    for path in &written {
        info!("Wrote {}", path.display());
    }

    Ok(())
}
