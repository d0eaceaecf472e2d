//! OpenRPC Generator - Automatic OpenRPC method catalogs from Rust code.
//!
//! This library turns a set of exposed RPC handler functions into an
//! OpenRPC document, so clients and tooling can discover method names,
//! parameter shapes, and result shapes without reading source code. Each
//! handler is described by merging two independently-obtained metadata
//! sources: the runtime type lists it was registered with, and the static
//! declaration (argument names, doc comments, deprecation markers)
//! recovered from its Rust source.
//!
//! # Architecture
//!
//! The library is organized into several modules that work together:
//!
//! 1. [`source`] - Scans project directories and parses Rust files
//! 2. [`declaration`] - Recovers handler declarations: names, doc comments, provenance
//! 3. [`type_resolver`] - Indexes named type definitions and lowers `syn` types
//! 4. [`callback`] - Registered handlers and their runtime type descriptors
//! 5. [`schema`] - Converts runtime types to JSON-Schema values
//! 6. [`options`] - Skip and mutation hooks for customizing collection
//! 7. [`method`] - Builds one `Method` description per handler
//! 8. [`registry`] - The named handler set a document covers
//! 9. [`document`] - Assembles and deduplicates the complete document
//! 10. [`serializer`] - Serializes the document to JSON or YAML
//!
//! # Example Usage
//!
//! ```no_run
//! use openrpc_from_source::{
//!     callback::{Callback, RuntimeType},
//!     declaration::DeclarationResolver,
//!     document::DocumentBuilder,
//!     options::ParseOptions,
//!     registry::ServiceRegistry,
//!     schema::SchemaGenerator,
//!     serializer::serialize_json,
//!     source::SourceScanner,
//!     type_resolver::TypeResolver,
//! };
//!
//! // Load the project sources backing the handler declarations
//! let sources = SourceScanner::new("./my-node").load().unwrap();
//! let resolver = DeclarationResolver::new(&sources);
//! let schemas = SchemaGenerator::new(TypeResolver::new(&sources));
//!
//! // Register the exposed handlers with their runtime type lists
//! let mut registry = ServiceRegistry::new();
//! registry
//!     .register(
//!         "eth_getBalance",
//!         Callback::new(
//!             vec![RuntimeType::new("Context"), RuntimeType::new("String")],
//!             vec![RuntimeType::new("Balance"), RuntimeType::new("RpcError")],
//!         )
//!         .with_source("src/service.rs", "EthService::get_balance"),
//!     )
//!     .unwrap();
//!
//! // Drop the leading context argument, a dialect convention
//! let options = ParseOptions::new().with_skip(|is_param, index, cd| {
//!     is_param && index == 0 && cd.description.to_lowercase().contains("context")
//! });
//!
//! let document = DocumentBuilder::new()
//!     .with_options(options)
//!     .build(&registry, &resolver, &schemas)
//!     .unwrap();
//! println!("{}", serialize_json(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete
//! CLI application documenting a project's public functions.

pub mod callback;
pub mod cli;
pub mod declaration;
pub mod document;
pub mod error;
pub mod method;
pub mod options;
pub mod registry;
pub mod schema;
pub mod serializer;
pub mod source;
pub mod type_resolver;
