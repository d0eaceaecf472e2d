use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Which positional section of a method build failed to correlate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Params,
    Results,
}

impl Section {
    fn as_str(&self) -> &'static str {
        match self {
            Section::Params => "params",
            Section::Results => "results",
        }
    }
}

/// Error types for the library
#[derive(Debug)]
pub enum Error {
    /// The handler carries no usable source declaration (synthesized or
    /// macro-generated code). Callers are expected to exclude the handler
    /// from the document rather than treat this as a failure.
    NonDocumentable { method: String },
    /// The handler's declaration could not be resolved from the loaded
    /// sources. The message includes a dump of the callback shape.
    Declaration { method: String, message: String },
    /// A configured schema mutation rejected the generated schema.
    SchemaMutation { method: String, message: String },
    /// More runtime types than declared fields at one positional section.
    ArityMismatch {
        method: String,
        section: Section,
        runtime: usize,
        declared: usize,
    },
    /// A callback was registered under a name that is already taken.
    DuplicateMethod(String),
    IoError(std::io::Error),
    ParseError { file: PathBuf, message: String },
    SerializationError(String),
}

impl Error {
    /// True for the distinguished "handler has no real declaration"
    /// condition, which document assemblers skip silently.
    pub fn is_non_documentable(&self) -> bool {
        matches!(self, Error::NonDocumentable { .. })
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::NonDocumentable { method } => {
                write!(f, "method {} has no documentable declaration", method)
            }
            Error::Declaration { method, message } => {
                write!(f, "declaration error for method {}: {}", method, message)
            }
            Error::SchemaMutation { method, message } => {
                write!(f, "schema mutation failed for method {}: {}", method, message)
            }
            Error::ArityMismatch {
                method,
                section,
                runtime,
                declared,
            } => write!(
                f,
                "arity mismatch for method {}: {} runtime {} types but {} declared fields",
                method,
                runtime,
                section.as_str(),
                declared
            ),
            Error::DuplicateMethod(name) => write!(f, "method {} is already registered", name),
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ParseError { file, message } => {
                write!(f, "parse error {}: {}", file.display(), message)
            }
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML serialization error: {}", err))
    }
}

impl From<syn::Error> for Error {
    fn from(err: syn::Error) -> Self {
        Error::ParseError {
            file: PathBuf::from("<unknown>"),
            message: err.to_string(),
        }
    }
}
