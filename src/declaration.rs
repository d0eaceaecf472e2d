//! Static declaration recovery for registered handlers.
//!
//! The resolver indexes every free function and inherent-impl method found
//! in the loaded sources, together with the metadata a method description
//! needs: parameter names, doc comments, deprecation markers, and the
//! defining file and line. A [`Callback`]'s source hint is then resolved
//! against this index instead of re-reading source text per build.
//!
//! Doc comments are read in the conventional rustdoc shape: the leading
//! paragraph becomes the method summary, bullets under an `# Arguments`
//! heading attach to parameters by name, and the `# Returns` section text
//! attaches to the first return position.

use crate::callback::{Callback, RuntimeType};
use crate::error::{Error, Result};
use crate::source::SourceFile;
use crate::type_resolver::lower_type;
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use syn::visit::Visit;

/// Static metadata for one parameter or return position.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedField {
    /// Display name: the declared argument name, or the rendered type for
    /// unnamed return positions
    pub name: String,
    /// Attached doc-comment text, possibly empty
    pub comment: String,
    /// The declared type at this position
    pub ty: RuntimeType,
}

/// A handler's resolved source declaration.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// One field per declared parameter, receiver excluded
    pub params: Vec<NamedField>,
    /// Declared return positions, flattened (see [`flatten_return_type`])
    pub returns: Vec<NamedField>,
    /// Leading doc-comment paragraph
    pub summary: String,
    /// Whether the declaration carries `#[deprecated]`
    pub deprecated: bool,
    /// File the declaration lives in
    pub file: PathBuf,
    /// 1-based line of the function name
    pub line: usize,
}

struct IndexedFn {
    decl: Declaration,
    public: bool,
    associated: bool,
}

/// Resolves callbacks to their source declarations.
pub struct DeclarationResolver {
    index: HashMap<(PathBuf, String), IndexedFn>,
}

impl DeclarationResolver {
    /// Indexes all function declarations of the given sources.
    pub fn new(sources: &[SourceFile]) -> Self {
        let mut index = HashMap::new();

        for source in sources {
            let mut collector = FnCollector {
                file: &source.path,
                index: &mut index,
            };
            collector.visit_file(&source.ast);
        }

        debug!("Indexed {} function declarations", index.len());
        Self { index }
    }

    /// Resolves a callback's declaration.
    ///
    /// A callback without a source hint is synthesized code and yields the
    /// distinguished [`Error::NonDocumentable`]; a hint that matches no
    /// indexed declaration is a fatal resolution error carrying the
    /// callback's shape for diagnosis.
    pub fn resolve(&self, method: &str, callback: &Callback) -> Result<&Declaration> {
        let Some(hint) = callback.source() else {
            return Err(Error::NonDocumentable {
                method: method.to_string(),
            });
        };

        self.index
            .get(&(hint.file.clone(), hint.function.clone()))
            .map(|indexed| &indexed.decl)
            .ok_or_else(|| Error::Declaration {
                method: method.to_string(),
                message: format!(
                    "no declaration for {} in {}; callback shape: {}",
                    hint.function,
                    hint.file.display(),
                    callback.signature()
                ),
            })
    }

    /// Lists all indexed public free functions as (function name, declaration).
    ///
    /// This is the handler discovery surface the CLI documents a project
    /// with; associated methods and private functions are left out.
    pub fn public_free_functions(&self) -> Vec<(&str, &Declaration)> {
        let mut functions: Vec<(&str, &Declaration)> = self
            .index
            .iter()
            .filter(|(_, f)| f.public && !f.associated)
            .map(|((_, name), f)| (name.as_str(), &f.decl))
            .collect();
        functions.sort_by_key(|(name, _)| name.to_string());
        functions
    }
}

struct FnCollector<'a> {
    file: &'a Path,
    index: &'a mut HashMap<(PathBuf, String), IndexedFn>,
}

impl FnCollector<'_> {
    fn record(
        &mut self,
        function: String,
        sig: &syn::Signature,
        attrs: &[syn::Attribute],
        public: bool,
        associated: bool,
    ) {
        let decl = lower_declaration(self.file, sig, attrs);
        self.index.insert(
            (self.file.to_path_buf(), function),
            IndexedFn {
                decl,
                public,
                associated,
            },
        );
    }
}

impl<'ast> Visit<'ast> for FnCollector<'_> {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        let public = matches!(node.vis, syn::Visibility::Public(_));
        self.record(node.sig.ident.to_string(), &node.sig, &node.attrs, public, false);
        // Not recursing: local fns inside bodies are not declarations
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        // Trait impls describe the trait's surface, not the handler's
        if node.trait_.is_some() {
            return;
        }
        let Some(self_ty) = type_name(&node.self_ty) else {
            return;
        };
        for item in &node.items {
            if let syn::ImplItem::Fn(method) = item {
                let public = matches!(method.vis, syn::Visibility::Public(_));
                let function = format!("{}::{}", self_ty, method.sig.ident);
                self.record(function, &method.sig, &method.attrs, public, true);
            }
        }
    }
}

fn type_name(ty: &syn::Type) -> Option<String> {
    if let syn::Type::Path(type_path) = ty {
        return type_path.path.segments.last().map(|s| s.ident.to_string());
    }
    None
}

fn lower_declaration(file: &Path, sig: &syn::Signature, attrs: &[syn::Attribute]) -> Declaration {
    let doc = parse_doc(&doc_lines(attrs));
    let deprecated = attrs.iter().any(|a| a.path().is_ident("deprecated"));
    let line = sig.ident.span().start().line;

    let mut params = Vec::new();
    for (i, input) in sig.inputs.iter().enumerate() {
        let syn::FnArg::Typed(pat_ty) = input else {
            continue; // receiver
        };
        let name = match pat_ty.pat.as_ref() {
            syn::Pat::Ident(pat_ident) => pat_ident.ident.to_string(),
            _ => format!("arg{}", i),
        };
        let comment = doc.args.get(&name).cloned().unwrap_or_default();
        params.push(NamedField {
            name,
            comment,
            ty: lower_type(&pat_ty.ty),
        });
    }

    let returns = expand_returns(&sig.output, &doc.returns);

    Declaration {
        params,
        returns,
        summary: doc.summary,
        deprecated,
        file: file.to_path_buf(),
        line,
    }
}

/// Expands a declared return type into flat positional fields.
///
/// Unnamed return positions are named after their rendered type; the
/// `# Returns` doc text attaches to position 0.
fn expand_returns(output: &syn::ReturnType, returns_comment: &str) -> Vec<NamedField> {
    let types = match output {
        syn::ReturnType::Default => Vec::new(),
        syn::ReturnType::Type(_, ty) => flatten_return_type(ty),
    };

    types
        .into_iter()
        .enumerate()
        .map(|(i, ty)| NamedField {
            name: ty.render(),
            comment: if i == 0 {
                returns_comment.to_string()
            } else {
                String::new()
            },
            ty,
        })
        .collect()
}

/// One declared return position can cover several logical return values:
/// `()` covers none, a tuple one per element, and `Result<T, E>` the value
/// and error sides. Flattening preserves declaration order.
fn flatten_return_type(ty: &syn::Type) -> Vec<RuntimeType> {
    if let Some(flattened) = flatten_tuple(ty) {
        return flattened;
    }

    if let syn::Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Result" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    let sides: Vec<&syn::Type> = args
                        .args
                        .iter()
                        .filter_map(|a| match a {
                            syn::GenericArgument::Type(t) => Some(t),
                            _ => None,
                        })
                        .collect();
                    if let Some(ok) = sides.first() {
                        let mut out = flatten_tuple(ok).unwrap_or_else(|| vec![lower_type(ok)]);
                        if let Some(err) = sides.get(1) {
                            out.push(lower_type(err));
                        }
                        return out;
                    }
                }
            }
        }
    }

    vec![lower_type(ty)]
}

fn flatten_tuple(ty: &syn::Type) -> Option<Vec<RuntimeType>> {
    if let syn::Type::Tuple(tuple) = ty {
        return Some(tuple.elems.iter().map(lower_type).collect());
    }
    None
}

#[derive(Default)]
struct DocText {
    summary: String,
    args: HashMap<String, String>,
    returns: String,
}

fn doc_lines(attrs: &[syn::Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter(|a| a.path().is_ident("doc"))
        .filter_map(|a| {
            if let syn::Meta::NameValue(nv) = &a.meta {
                if let syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) = &nv.value
                {
                    return Some(s.value().trim().to_string());
                }
            }
            None
        })
        .collect()
}

fn parse_doc(lines: &[String]) -> DocText {
    enum Section {
        Lead,
        Arguments,
        Returns,
        Other,
    }

    let mut section = Section::Lead;
    let mut summary_lines: Vec<&str> = Vec::new();
    let mut summary_done = false;
    let mut args: HashMap<String, String> = HashMap::new();
    let mut current_arg: Option<String> = None;
    let mut returns_lines: Vec<&str> = Vec::new();

    for line in lines {
        let trimmed = line.trim();

        if let Some(heading) = trimmed.strip_prefix("# ") {
            section = match heading.trim() {
                "Arguments" => Section::Arguments,
                "Returns" => Section::Returns,
                _ => Section::Other,
            };
            current_arg = None;
            continue;
        }

        match section {
            Section::Lead => {
                if trimmed.is_empty() {
                    if !summary_lines.is_empty() {
                        summary_done = true;
                    }
                } else if !summary_done {
                    summary_lines.push(trimmed);
                }
            }
            Section::Arguments => {
                if let Some(bullet) = trimmed.strip_prefix("* ") {
                    if let Some((name, comment)) = parse_bullet(bullet) {
                        current_arg = Some(name.clone());
                        args.insert(name, comment);
                    }
                } else if !trimmed.is_empty() {
                    // Continuation line of the previous bullet
                    if let Some(name) = &current_arg {
                        let entry = args.entry(name.clone()).or_default();
                        if !entry.is_empty() {
                            entry.push(' ');
                        }
                        entry.push_str(trimmed);
                    }
                }
            }
            Section::Returns => {
                if !trimmed.is_empty() {
                    returns_lines.push(trimmed);
                }
            }
            Section::Other => {}
        }
    }

    DocText {
        summary: summary_lines.join(" "),
        args,
        returns: returns_lines.join(" "),
    }
}

/// Parses a `` `name` - comment `` bullet body.
fn parse_bullet(bullet: &str) -> Option<(String, String)> {
    let rest = bullet.strip_prefix('`')?;
    let end = rest.find('`')?;
    let name = rest[..end].to_string();
    let comment = rest[end + 1..]
        .trim_start()
        .trim_start_matches(['-', ':'])
        .trim_start()
        .to_string();
    Some((name, comment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse_source_str;
    use pretty_assertions::assert_eq;

    const SERVICE: &str = r#"
/// Adds two numbers.
///
/// Longer prose about the addition method that should not leak
/// into the summary.
///
/// # Arguments
///
/// * `ctx` - Request context carrying cancellation.
/// * `a` - Left operand.
/// * `b` - Right operand,
///   which may span lines.
///
/// # Returns
///
/// The sum of the operands.
pub fn add(ctx: Context, a: i64, b: i64) -> Result<i64, RpcError> {
    unimplemented!()
}

#[deprecated]
pub fn legacy_add(a: i64, b: i64) -> i64 {
    a + b
}

fn private_helper() {}

pub struct EthService;

impl EthService {
    /// Returns the balance of an account.
    pub fn get_balance(&self, address: String) -> Result<Balance, RpcError> {
        unimplemented!()
    }
}
"#;

    fn resolver() -> DeclarationResolver {
        let source = parse_source_str(Path::new("svc.rs"), SERVICE).unwrap();
        DeclarationResolver::new(&[source])
    }

    fn callback_for(function: &str) -> Callback {
        Callback::new(vec![], vec![]).with_source("svc.rs", function)
    }

    #[test]
    fn test_resolve_free_function() {
        let resolver = resolver();
        let decl = resolver.resolve("add", &callback_for("add")).unwrap();

        assert_eq!(decl.summary, "Adds two numbers.");
        assert!(!decl.deprecated);
        assert_eq!(decl.file, PathBuf::from("svc.rs"));
        assert_eq!(decl.line, 17);
    }

    #[test]
    fn test_param_fields_carry_doc_comments() {
        let resolver = resolver();
        let decl = resolver.resolve("add", &callback_for("add")).unwrap();

        let names: Vec<&str> = decl.params.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["ctx", "a", "b"]);
        assert_eq!(decl.params[0].comment, "Request context carrying cancellation.");
        assert_eq!(decl.params[0].ty, RuntimeType::new("Context"));
        assert_eq!(decl.params[2].comment, "Right operand, which may span lines.");
    }

    #[test]
    fn test_result_return_flattens_to_value_and_error() {
        let resolver = resolver();
        let decl = resolver.resolve("add", &callback_for("add")).unwrap();

        assert_eq!(decl.returns.len(), 2);
        assert_eq!(decl.returns[0].name, "i64");
        assert_eq!(decl.returns[0].comment, "The sum of the operands.");
        assert_eq!(decl.returns[1].name, "RpcError");
        assert_eq!(decl.returns[1].comment, "");
    }

    #[test]
    fn test_deprecated_marker() {
        let resolver = resolver();
        let decl = resolver
            .resolve("legacy_add", &callback_for("legacy_add"))
            .unwrap();
        assert!(decl.deprecated);
        assert_eq!(decl.returns.len(), 1);
    }

    #[test]
    fn test_resolve_inherent_method() {
        let resolver = resolver();
        let decl = resolver
            .resolve("eth_getBalance", &callback_for("EthService::get_balance"))
            .unwrap();

        assert_eq!(decl.summary, "Returns the balance of an account.");
        // Receiver is not a parameter field
        assert_eq!(decl.params.len(), 1);
        assert_eq!(decl.params[0].name, "address");
    }

    #[test]
    fn test_missing_source_hint_is_non_documentable() {
        let resolver = resolver();
        let err = resolver
            .resolve("synthesized", &Callback::new(vec![], vec![]))
            .unwrap_err();
        assert!(err.is_non_documentable());
    }

    #[test]
    fn test_unknown_function_is_fatal_with_callback_dump() {
        let resolver = resolver();
        let cb = Callback::new(vec![RuntimeType::new("u64")], vec![]).with_source("svc.rs", "gone");
        let err = resolver.resolve("gone", &cb).unwrap_err();

        assert!(!err.is_non_documentable());
        let msg = err.to_string();
        assert!(msg.contains("gone"));
        assert!(msg.contains("fn(u64)"));
    }

    #[test]
    fn test_tuple_return_expands_per_element() {
        let source = parse_source_str(
            Path::new("multi.rs"),
            "pub fn split() -> (String, u32) { unimplemented!() }",
        )
        .unwrap();
        let resolver = DeclarationResolver::new(&[source]);
        let cb = Callback::new(vec![], vec![]).with_source("multi.rs", "split");

        let decl = resolver.resolve("split", &cb).unwrap();
        assert_eq!(decl.returns.len(), 2);
        assert_eq!(decl.returns[0].ty, RuntimeType::new("String"));
        assert_eq!(decl.returns[1].ty, RuntimeType::new("u32"));
    }

    #[test]
    fn test_unit_and_result_unit_returns_expand_to_nothing_but_error() {
        let source = parse_source_str(
            Path::new("unit.rs"),
            r#"
pub fn fire_and_forget(payload: String) {}
pub fn submit(payload: String) -> Result<(), RpcError> { Ok(()) }
"#,
        )
        .unwrap();
        let resolver = DeclarationResolver::new(&[source]);

        let cb = Callback::new(vec![], vec![]).with_source("unit.rs", "fire_and_forget");
        assert!(resolver.resolve("fire", &cb).unwrap().returns.is_empty());

        let cb = Callback::new(vec![], vec![]).with_source("unit.rs", "submit");
        let decl = resolver.resolve("submit", &cb).unwrap();
        assert_eq!(decl.returns.len(), 1);
        assert_eq!(decl.returns[0].ty, RuntimeType::new("RpcError"));
    }

    #[test]
    fn test_public_free_functions_listing() {
        let resolver = resolver();
        let functions = resolver.public_free_functions();
        let names: Vec<&str> = functions.iter().map(|(name, _)| *name).collect();

        // Sorted, no private helpers, no associated methods
        assert_eq!(names, ["add", "legacy_add"]);
    }
}
