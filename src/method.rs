//! Method construction - the per-handler description pipeline.
//!
//! [`MethodBuilder`] turns one registered callback into one [`Method`]
//! record: it resolves the callback's source declaration, pairs each
//! runtime type with the declared field at the same position, converts
//! types to schemas, applies the caller's skip and mutation hooks, and
//! assembles the result. Every build is a pure function of (options,
//! name, callback) over shared read-only collaborators, so distinct
//! handlers can be built concurrently.

use crate::callback::{Callback, RuntimeType};
use crate::declaration::{DeclarationResolver, NamedField};
use crate::error::{Error, Result, Section};
use crate::options::ParseOptions;
use crate::schema::{Schema, SchemaGenerator};
use log::debug;
use serde::{Deserialize, Serialize};

/// Named, schema-bearing description of one parameter or result value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    /// Display name, from the declared field
    pub name: String,
    /// Short text from the field's doc comment
    pub summary: String,
    /// Full description of the value's type
    pub description: String,
    /// Always true; this model has no optional parameters
    pub required: bool,
    /// The value's schema
    pub schema: Schema,
}

/// Provenance pointer to the handler's declaration site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    pub description: String,
    pub url: String,
}

/// One documented RPC method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    /// Method name as registered
    pub name: String,
    /// Leading doc-comment paragraph of the declaration
    pub summary: String,
    /// Rendered signature of the callback
    pub description: String,
    /// Declaration file and line, for provenance only
    #[serde(rename = "externalDocs")]
    pub external_docs: ExternalDocs,
    /// Parameter descriptors in positional order
    pub params: Vec<ContentDescriptor>,
    /// The single result descriptor
    pub result: ContentDescriptor,
    /// Whether the declaration carries a deprecation marker
    pub deprecated: bool,
}

/// Placeholder result for handlers that declare no return value.
fn null_descriptor() -> ContentDescriptor {
    ContentDescriptor {
        name: "null".to_string(),
        summary: String::new(),
        description: "null".to_string(),
        required: true,
        schema: Schema::null(),
    }
}

/// Builds [`Method`] records from registered callbacks.
pub struct MethodBuilder<'a> {
    resolver: &'a DeclarationResolver,
    schemas: &'a SchemaGenerator,
}

impl<'a> MethodBuilder<'a> {
    pub fn new(resolver: &'a DeclarationResolver, schemas: &'a SchemaGenerator) -> Self {
        Self { resolver, schemas }
    }

    /// Builds the method description for one handler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonDocumentable`] for callbacks without a source
    /// declaration (callers skip those), and a fatal error for unresolvable
    /// declarations, schema-mutation failures, or positional arity
    /// mismatches. A failure never aborts other handlers' builds.
    pub fn build_method(
        &self,
        opts: &ParseOptions,
        name: &str,
        callback: &Callback,
    ) -> Result<Method> {
        debug!("Building method description: {}", name);
        let decl = self.resolver.resolve(name, callback)?;

        let params = self.collect(opts, name, callback.param_types(), &decl.params, true)?;
        let mut results = self.collect(opts, name, callback.return_types(), &decl.returns, false)?;

        if results.is_empty() {
            results.push(null_descriptor());
        }
        // The document model supports exactly one logical result value;
        // descriptors past the first are built (and mutated) but dropped.
        let result = results.swap_remove(0);

        Ok(Method {
            name: name.to_string(),
            summary: decl.summary.clone(),
            description: format!("`{}`", callback.signature()),
            external_docs: ExternalDocs {
                description: format!("line={}", decl.line),
                url: format!("file://{}", decl.file.display()),
            },
            params,
            result,
            deprecated: decl.deprecated,
        })
    }

    /// Pairs runtime types with declared fields position by position and
    /// runs the hook chain over each descriptor.
    fn collect(
        &self,
        opts: &ParseOptions,
        method: &str,
        types: &[RuntimeType],
        fields: &[NamedField],
        is_param: bool,
    ) -> Result<Vec<ContentDescriptor>> {
        // Bounded zip: more runtime types than declared fields means the
        // two metadata sources no longer describe the same function.
        if types.len() > fields.len() {
            return Err(Error::ArityMismatch {
                method: method.to_string(),
                section: if is_param { Section::Params } else { Section::Results },
                runtime: types.len(),
                declared: fields.len(),
            });
        }

        let mut out = Vec::new();
        for (index, (ty, field)) in types.iter().zip(fields).enumerate() {
            let mut descriptor = self.content_descriptor(opts, method, ty, field)?;

            if let Some(skip) = &opts.skip_fn {
                if skip(is_param, index, &descriptor) {
                    continue;
                }
            }
            for mutation in &opts.descriptor_mutations {
                mutation(is_param, index, &mut descriptor);
            }
            out.push(descriptor);
        }
        Ok(out)
    }

    /// Builds the descriptor for one (runtime type, declared field) pair.
    fn content_descriptor(
        &self,
        opts: &ParseOptions,
        method: &str,
        ty: &RuntimeType,
        field: &NamedField,
    ) -> Result<ContentDescriptor> {
        let mut schema = self.schemas.convert(ty);
        for mutation in &opts.schema_mutations {
            mutation(&mut schema).map_err(|e| Error::SchemaMutation {
                method: method.to_string(),
                message: e.to_string(),
            })?;
        }

        Ok(ContentDescriptor {
            name: field.name.clone(),
            summary: field.comment.clone(),
            description: ty.render(),
            required: true,
            schema,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse_source_str;
    use crate::type_resolver::TypeResolver;
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const SERVICE: &str = r#"
pub struct Context;
pub struct RpcError;

/// Adds two numbers.
///
/// # Arguments
///
/// * `ctx` - Request context.
/// * `a` - Left operand.
/// * `b` - Right operand.
///
/// # Returns
///
/// The sum of the operands.
pub fn add(ctx: Context, a: i64, b: i64) -> Result<i64, RpcError> {
    unimplemented!()
}

/// Broadcasts a payload to peers.
pub fn broadcast(payload: String) {}

#[deprecated]
/// Old addition entry point.
pub fn legacy_add(a: i64, b: i64) -> i64 {
    a + b
}
"#;

    struct Fixture {
        resolver: DeclarationResolver,
        schemas: SchemaGenerator,
    }

    impl Fixture {
        fn new() -> Self {
            let source = parse_source_str(Path::new("svc.rs"), SERVICE).unwrap();
            let resolver = DeclarationResolver::new(std::slice::from_ref(&source));
            let schemas = SchemaGenerator::new(TypeResolver::new(&[source]));
            Self { resolver, schemas }
        }

        fn builder(&self) -> MethodBuilder {
            MethodBuilder::new(&self.resolver, &self.schemas)
        }
    }

    fn add_callback() -> Callback {
        Callback::new(
            vec![
                RuntimeType::new("Context"),
                RuntimeType::new("i64"),
                RuntimeType::new("i64"),
            ],
            vec![RuntimeType::new("i64"), RuntimeType::new("RpcError")],
        )
        .with_source("svc.rs", "add")
    }

    fn broadcast_callback() -> Callback {
        Callback::new(vec![RuntimeType::new("String")], vec![]).with_source("svc.rs", "broadcast")
    }

    #[test]
    fn test_params_keep_positional_order() {
        let fixture = Fixture::new();
        let method = fixture
            .builder()
            .build_method(&ParseOptions::new(), "add", &add_callback())
            .unwrap();

        let names: Vec<&str> = method.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["ctx", "a", "b"]);
        assert_eq!(method.params[1].summary, "Left operand.");
        assert!(method.params.iter().all(|p| p.required));
    }

    #[test]
    fn test_result_is_first_return_position() {
        let fixture = Fixture::new();
        let method = fixture
            .builder()
            .build_method(&ParseOptions::new(), "add", &add_callback())
            .unwrap();

        // The error return is computed but not emitted as the result
        assert_eq!(method.result.name, "i64");
        assert_eq!(method.result.summary, "The sum of the operands.");
        assert_eq!(method.result.schema.schema_type.as_deref(), Some("integer"));
    }

    #[test]
    fn test_method_metadata_fields() {
        let fixture = Fixture::new();
        let method = fixture
            .builder()
            .build_method(&ParseOptions::new(), "add", &add_callback())
            .unwrap();

        assert_eq!(method.name, "add");
        assert_eq!(method.summary, "Adds two numbers.");
        assert_eq!(
            method.description,
            "`fn(Context, i64, i64) -> (i64, RpcError)`"
        );
        assert_eq!(method.external_docs.url, "file://svc.rs");
        assert_eq!(method.external_docs.description, "line=16");
        assert!(!method.deprecated);
    }

    #[test]
    fn test_zero_returns_get_null_placeholder_result() {
        let fixture = Fixture::new();
        let method = fixture
            .builder()
            .build_method(&ParseOptions::new(), "broadcast", &broadcast_callback())
            .unwrap();

        assert_eq!(method.result.name, "null");
        assert_eq!(method.result.schema, Schema::null());
    }

    #[test]
    fn test_all_results_skipped_get_null_placeholder() {
        let fixture = Fixture::new();
        let opts = ParseOptions::new().with_skip(|is_param, _, _| !is_param);
        let method = fixture
            .builder()
            .build_method(&opts, "add", &add_callback())
            .unwrap();

        assert_eq!(method.params.len(), 3);
        assert_eq!(method.result.name, "null");
    }

    #[test]
    fn test_skip_drops_position_without_placeholder() {
        let fixture = Fixture::new();
        let opts = ParseOptions::new().with_skip(|is_param, index, _| is_param && index == 0);
        let method = fixture
            .builder()
            .build_method(&opts, "add", &add_callback())
            .unwrap();

        let names: Vec<&str> = method.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_context_skip_scenario() {
        // The dialect convention: drop a leading context argument,
        // recognized by its type description.
        let fixture = Fixture::new();
        let opts = ParseOptions::new().with_skip(|is_param, index, cd| {
            is_param && index == 0 && cd.description.to_lowercase().contains("context")
        });
        let method = fixture
            .builder()
            .build_method(&opts, "add", &add_callback())
            .unwrap();

        let names: Vec<&str> = method.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(method.result.name, "i64");
    }

    #[test]
    fn test_descriptor_mutations_compose_in_order() {
        let fixture = Fixture::new();
        let opts = ParseOptions::new()
            .with_descriptor_mutation(|_, _, cd| cd.description.push_str(" first"))
            .with_descriptor_mutation(|_, _, cd| cd.description.push_str(" second"));
        let method = fixture
            .builder()
            .build_method(&opts, "add", &add_callback())
            .unwrap();

        assert!(method.params[0].description.ends_with("first second"));
        assert!(method.result.description.ends_with("first second"));
    }

    #[test]
    fn test_schema_mutation_applies_before_descriptor_hooks() {
        let fixture = Fixture::new();
        let opts = ParseOptions::new()
            .with_schema_mutation(|schema| {
                schema.format = None;
                Ok(())
            })
            .with_skip(|_, _, cd| cd.schema.format.is_some());
        let method = fixture
            .builder()
            .build_method(&opts, "add", &add_callback())
            .unwrap();

        // The mutation cleared every format, so the skip never fires
        assert_eq!(method.params.len(), 3);
        assert!(method.params.iter().all(|p| p.schema.format.is_none()));
    }

    #[test]
    fn test_failing_schema_mutation_aborts_build() {
        let fixture = Fixture::new();
        let opts =
            ParseOptions::new().with_schema_mutation(|_| Err(anyhow!("rejected by policy")));
        let err = fixture
            .builder()
            .build_method(&opts, "add", &add_callback())
            .unwrap_err();

        assert!(!err.is_non_documentable());
        assert!(err.to_string().contains("rejected by policy"));
        assert!(err.to_string().contains("add"));
    }

    #[test]
    fn test_synthesized_callback_is_non_documentable() {
        let fixture = Fixture::new();
        let callback = Callback::new(vec![], vec![RuntimeType::new("u64")]);
        let err = fixture
            .builder()
            .build_method(&ParseOptions::new(), "generated", &callback)
            .unwrap_err();

        assert!(err.is_non_documentable());
    }

    #[test]
    fn test_param_arity_mismatch_is_loud() {
        let fixture = Fixture::new();
        // Registered with one more parameter than the declaration has
        let callback = Callback::new(
            vec![
                RuntimeType::new("Context"),
                RuntimeType::new("i64"),
                RuntimeType::new("i64"),
                RuntimeType::new("i64"),
            ],
            vec![],
        )
        .with_source("svc.rs", "add");

        let err = fixture
            .builder()
            .build_method(&ParseOptions::new(), "add", &callback)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::ArityMismatch {
                section: Section::Params,
                runtime: 4,
                declared: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_return_arity_mismatch_is_loud() {
        let fixture = Fixture::new();
        let callback = Callback::new(
            vec![RuntimeType::new("String")],
            vec![RuntimeType::new("u64")],
        )
        .with_source("svc.rs", "broadcast");

        let err = fixture
            .builder()
            .build_method(&ParseOptions::new(), "broadcast", &callback)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::ArityMismatch {
                section: Section::Results,
                runtime: 1,
                declared: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_fewer_runtime_types_than_fields_is_allowed() {
        let fixture = Fixture::new();
        // Only the value side registered; the declared error field is unused
        let callback = Callback::new(
            vec![
                RuntimeType::new("Context"),
                RuntimeType::new("i64"),
                RuntimeType::new("i64"),
            ],
            vec![RuntimeType::new("i64")],
        )
        .with_source("svc.rs", "add");

        let method = fixture
            .builder()
            .build_method(&ParseOptions::new(), "add", &callback)
            .unwrap();
        assert_eq!(method.result.name, "i64");
    }

    #[test]
    fn test_deprecated_flag_carried_over() {
        let fixture = Fixture::new();
        let callback = Callback::new(
            vec![RuntimeType::new("i64"), RuntimeType::new("i64")],
            vec![RuntimeType::new("i64")],
        )
        .with_source("svc.rs", "legacy_add");

        let method = fixture
            .builder()
            .build_method(&ParseOptions::new(), "legacy_add", &callback)
            .unwrap();
        assert!(method.deprecated);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let fixture = Fixture::new();
        let opts = ParseOptions::new()
            .with_skip(|is_param, index, _| is_param && index == 0)
            .with_descriptor_mutation(|_, _, cd| cd.summary.push('!'));

        let first = fixture
            .builder()
            .build_method(&opts, "add", &add_callback())
            .unwrap();
        let second = fixture
            .builder()
            .build_method(&opts, "add", &add_callback())
            .unwrap();

        assert_eq!(first, second);
    }
}
