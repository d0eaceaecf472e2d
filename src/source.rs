//! Source loading: project directory scanning and Rust file parsing.
//!
//! Declaration resolution and type resolution both work from parsed source
//! files. This module discovers `.rs` files under a project root and parses
//! them with `syn`, continuing past files that fail to parse so that a
//! partial document can still be generated.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A successfully parsed Rust source file.
#[derive(Debug)]
pub struct SourceFile {
    /// Path the file was loaded from
    pub path: PathBuf,
    /// The parsed abstract syntax tree
    pub ast: syn::File,
}

/// Loads the Rust sources of a project directory.
///
/// The scanner recursively walks the root, skipping the `target` directory
/// and hidden directories, and parses every discovered `.rs` file.
///
/// # Example
///
/// ```no_run
/// use openrpc_from_source::source::SourceScanner;
///
/// let sources = SourceScanner::new("./my-project").load().unwrap();
/// println!("Loaded {} source files", sources.len());
/// ```
pub struct SourceScanner {
    root: PathBuf,
}

impl SourceScanner {
    /// Creates a scanner rooted at the given project directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Discovers all `.rs` files under the root.
    ///
    /// Inaccessible entries are logged as warnings and skipped; an error is
    /// returned only if the root itself cannot be walked at all.
    pub fn rust_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root).into_iter().filter_entry(|e| {
            if e.path() == self.root {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && name != "target"
        }) {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    warn!("Failed to access path: {}", e);
                }
            }
        }

        debug!("Found {} Rust files under {}", files.len(), self.root.display());
        Ok(files)
    }

    /// Scans and parses the project sources.
    ///
    /// Files with syntax errors are logged as warnings and left out of the
    /// result; the remaining files are still usable for declaration and
    /// type resolution.
    pub fn load(&self) -> Result<Vec<SourceFile>> {
        let files = self.rust_files()?;
        let mut sources = Vec::new();

        for path in &files {
            match parse_source(path) {
                Ok(source) => sources.push(source),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        debug!("Parsed {} of {} files", sources.len(), files.len());
        Ok(sources)
    }
}

/// Parses a single Rust source file into a [`SourceFile`].
pub fn parse_source(path: &Path) -> Result<SourceFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    parse_source_str(path, &content)
}

/// Parses Rust source text, recording the given path as its origin.
///
/// Line numbers recovered later from the AST are relative to `content`.
pub fn parse_source_str(path: &Path, content: &str) -> Result<SourceFile> {
    let ast = syn::parse_file(content)
        .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;
    Ok(SourceFile {
        path: path.to_path_buf(),
        ast,
    })
}
