use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// OpenRPC generator - documents a Rust project's public functions as an OpenRPC method catalog
#[derive(Parser, Debug)]
#[command(name = "openrpc-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Output format (json or yaml)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// API title for the document info section
    #[arg(long = "title", default_value = "Generated API")]
    pub title: String,

    /// API version for the document info section
    #[arg(long = "api-version", default_value = "1.0.0")]
    pub api_version: String,

    /// Only document functions whose name starts with this prefix
    #[arg(short = 'p', long = "prefix")]
    pub prefix: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            args.project_path.display()
        );
    }
    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::callback::Callback;
    use crate::declaration::DeclarationResolver;
    use crate::document::DocumentBuilder;
    use crate::registry::ServiceRegistry;
    use crate::schema::SchemaGenerator;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
    use crate::source::SourceScanner;
    use crate::type_resolver::TypeResolver;

    info!("Starting OpenRPC document generation...");

    // Step 1: Scan and parse the project sources
    info!("Loading project sources...");
    let sources = SourceScanner::new(&args.project_path).load()?;
    info!("Loaded {} source files", sources.len());

    if sources.is_empty() {
        anyhow::bail!("No Rust files found in the project directory");
    }

    // Step 2: Index declarations and type definitions
    info!("Indexing declarations...");
    let resolver = DeclarationResolver::new(&sources);
    let schemas = SchemaGenerator::new(TypeResolver::new(&sources));

    // Step 3: Register every public free function as a handler, its
    // runtime type lists taken from the declared signature
    info!("Registering handlers...");
    let mut registry = ServiceRegistry::new();
    for (name, decl) in resolver.public_free_functions() {
        if let Some(prefix) = &args.prefix {
            if !name.starts_with(prefix.as_str()) {
                debug!("Skipping {} (prefix filter)", name);
                continue;
            }
        }
        let callback = Callback::new(
            decl.params.iter().map(|f| f.ty.clone()).collect(),
            decl.returns.iter().map(|f| f.ty.clone()).collect(),
        )
        .with_source(decl.file.clone(), name);
        registry.register(name, callback)?;
    }
    info!("Registered {} handlers", registry.len());

    if registry.is_empty() {
        log::warn!("No documentable functions found in the project");
    }

    // Step 4: Assemble the document
    info!("Assembling OpenRPC document...");
    let document = DocumentBuilder::new()
        .with_info(args.title.clone(), args.api_version.clone(), None)
        .build(&registry, &resolver, &schemas)?;
    info!("Document assembled with {} methods", document.methods.len());

    // Step 5: Serialize to the requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Json => serialize_json(&document)?,
        OutputFormat::Yaml => serialize_yaml(&document)?,
    };

    // Step 6: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Wrote OpenRPC document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Source files: {}", sources.len());
    info!("  - Handlers: {}", registry.len());
    info!("  - Methods documented: {}", document.methods.len());

    Ok(())
}
