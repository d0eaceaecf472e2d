//! OpenRPC document assembly.
//!
//! The assembler aggregates per-handler [`Method`] records into one
//! document, deduplicates the component schemas their types share, and
//! applies the per-handler error policy: non-documentable handlers are
//! silently excluded, while any other build failure aborts assembly and
//! surfaces the failing handler's error.

use crate::callback::RuntimeType;
use crate::declaration::DeclarationResolver;
use crate::error::Result;
use crate::method::{ExternalDocs, Method, MethodBuilder};
use crate::options::ParseOptions;
use crate::registry::ServiceRegistry;
use crate::schema::{Schema, SchemaGenerator};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The OpenRPC specification version emitted in documents
pub const OPENRPC_VERSION: &str = "1.3.2";

/// Document info section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Components section holding shared schemas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Components {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<BTreeMap<String, Schema>>,
}

/// Complete OpenRPC document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRpcDocument {
    /// OpenRPC specification version
    pub openrpc: String,
    /// API info
    pub info: Info,
    /// Documented methods, in name order
    pub methods: Vec<Method>,
    /// Shared schema components
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    /// Document-level external documentation
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
}

/// OpenRPC document builder
pub struct DocumentBuilder {
    info: Info,
    external_docs: Option<ExternalDocs>,
    options: ParseOptions,
}

impl DocumentBuilder {
    /// Create a new DocumentBuilder with default info
    pub fn new() -> Self {
        Self {
            info: Info {
                title: "Generated API".to_string(),
                version: "1.0.0".to_string(),
                description: Some("OpenRPC documentation generated from Rust code".to_string()),
            },
            external_docs: None,
            options: ParseOptions::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Set document-level external documentation
    pub fn with_external_docs(mut self, description: String, url: String) -> Self {
        self.external_docs = Some(ExternalDocs { description, url });
        self
    }

    /// Set the hook options every method build runs with
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Assembles the document for every registered handler.
    ///
    /// Handlers whose build fails as non-documentable are skipped; any
    /// other per-handler failure is returned as this call's error.
    pub fn build(
        &self,
        registry: &ServiceRegistry,
        resolver: &DeclarationResolver,
        schemas: &SchemaGenerator,
    ) -> Result<OpenRpcDocument> {
        let builder = MethodBuilder::new(resolver, schemas);
        let mut methods = Vec::new();
        let mut schema_roots: Vec<&RuntimeType> = Vec::new();

        for (name, callback) in registry.iter() {
            match builder.build_method(&self.options, name, callback) {
                Ok(method) => {
                    methods.push(method);
                    schema_roots.extend(callback.param_types());
                    schema_roots.extend(callback.return_types());
                }
                Err(e) if e.is_non_documentable() => {
                    debug!("Skipping undocumentable method: {}", name);
                }
                Err(e) => return Err(e),
            }
        }

        let shared = schemas.components(&schema_roots);
        let components = if shared.is_empty() {
            None
        } else {
            Some(Components {
                schemas: Some(shared),
            })
        };

        debug!("Assembled document with {} methods", methods.len());
        Ok(OpenRpcDocument {
            openrpc: OPENRPC_VERSION.to_string(),
            info: self.info.clone(),
            methods,
            components,
            external_docs: self.external_docs.clone(),
        })
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
