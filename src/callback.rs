//! Registered handler callbacks and their runtime type descriptors.
//!
//! A [`Callback`] is the runtime side of a handler: the ordered parameter
//! and return type lists it was registered with, plus an optional pointer
//! at the source declaration the static metadata is recovered from. The
//! type lists are explicit at registration instead of being inferred from
//! a live function value, so the positional pairing against declared
//! fields is validated rather than assumed.

use std::path::{Path, PathBuf};

/// Structural descriptor of one Rust type as registered for a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeType {
    /// The base type name (e.g., "String", "Balance", "i64")
    pub name: String,
    /// Generic type arguments, in declaration order
    pub generic_args: Vec<RuntimeType>,
    /// Whether this type is wrapped in `Option<T>`
    pub is_option: bool,
    /// Whether this type is a `Vec<T>`
    pub is_vec: bool,
}

impl RuntimeType {
    /// Create a RuntimeType for a plain named type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generic_args: Vec::new(),
            is_option: false,
            is_vec: false,
        }
    }

    /// Create a RuntimeType for an `Option<T>` type
    pub fn option(inner: RuntimeType) -> Self {
        Self {
            name: inner.name.clone(),
            generic_args: vec![inner],
            is_option: true,
            is_vec: false,
        }
    }

    /// Create a RuntimeType for a `Vec<T>` type
    pub fn vec(inner: RuntimeType) -> Self {
        Self {
            name: inner.name.clone(),
            generic_args: vec![inner],
            is_option: false,
            is_vec: true,
        }
    }

    /// Renders the type back to Rust-like surface syntax.
    ///
    /// This string is used as the full description of a content descriptor
    /// and inside rendered method signatures.
    pub fn render(&self) -> String {
        if self.is_option {
            return format!("Option<{}>", self.generic_args[0].render());
        }
        if self.is_vec {
            return format!("Vec<{}>", self.generic_args[0].render());
        }
        if self.generic_args.is_empty() {
            return self.name.clone();
        }
        let args: Vec<String> = self.generic_args.iter().map(|a| a.render()).collect();
        format!("{}<{}>", self.name, args.join(", "))
    }
}

/// Pointer from a registered callback to its source declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceHint {
    /// File the declaration lives in
    pub file: PathBuf,
    /// Function path within the file: `"add"` for a free function,
    /// `"EthService::get_balance"` for an inherent method
    pub function: String,
}

/// A named, invocable unit registered for documentation.
///
/// Immutable once registered; the registry owns the name.
#[derive(Debug, Clone)]
pub struct Callback {
    params: Vec<RuntimeType>,
    returns: Vec<RuntimeType>,
    source: Option<SourceHint>,
}

impl Callback {
    /// Create a callback from explicit parameter and return type lists.
    ///
    /// A callback constructed this way carries no source hint and is
    /// treated as synthesized: declaration resolution classifies it as
    /// non-documentable. Attach a hint with [`Callback::with_source`].
    pub fn new(params: Vec<RuntimeType>, returns: Vec<RuntimeType>) -> Self {
        Self {
            params,
            returns,
            source: None,
        }
    }

    /// Points the callback at its declaration in a source file.
    pub fn with_source(mut self, file: impl Into<PathBuf>, function: impl Into<String>) -> Self {
        self.source = Some(SourceHint {
            file: file.into(),
            function: function.into(),
        });
        self
    }

    /// Ordered runtime parameter types
    pub fn param_types(&self) -> &[RuntimeType] {
        &self.params
    }

    /// Ordered runtime return types
    pub fn return_types(&self) -> &[RuntimeType] {
        &self.returns
    }

    pub fn source(&self) -> Option<&SourceHint> {
        self.source.as_ref()
    }

    /// True when the hint points at `file` (path compared exactly)
    pub fn declared_in(&self, file: &Path) -> bool {
        self.source.as_ref().map(|h| h.file == file).unwrap_or(false)
    }

    /// Renders the callback's shape as a function signature.
    ///
    /// Used for method descriptions and for error dumps when a build fails.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|t| t.render()).collect();
        let head = format!("fn({})", params.join(", "));
        match self.returns.len() {
            0 => head,
            1 => format!("{} -> {}", head, self.returns[0].render()),
            _ => {
                let rets: Vec<String> = self.returns.iter().map(|t| t.render()).collect();
                format!("{} -> ({})", head, rets.join(", "))
            }
        }
    }
}
