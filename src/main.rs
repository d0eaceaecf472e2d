//! OpenRPC generator - command-line tool for documenting RPC handler sets.
//!
//! This binary generates an OpenRPC method catalog from a Rust project: it
//! scans the source tree, treats the project's public free functions as
//! the exposed handler set, and emits a complete OpenRPC document.
//!
//! # Usage
//!
//! ```bash
//! openrpc-from-source [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Generate JSON documentation:
//! ```bash
//! openrpc-from-source ./my-node -o openrpc.json
//! ```
//!
//! Document only the RPC surface, as YAML:
//! ```bash
//! openrpc-from-source ./my-node -p rpc_ -f yaml
//! ```

mod callback;
mod cli;
mod declaration;
mod document;
mod error;
mod method;
mod options;
mod registry;
mod schema;
mod serializer;
mod source;
mod type_resolver;

use anyhow::Result;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse args first so the verbose flag can pick the log level
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenRPC generator starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("OpenRPC document generation completed successfully");

    Ok(())
}
