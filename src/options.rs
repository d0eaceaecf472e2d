//! Hook configuration for method building.
//!
//! [`ParseOptions`] bundles the extension points a caller can supply to
//! customize how descriptors are collected, so RPC dialects with their own
//! conventions (say, a leading cancellation-context argument) configure
//! the builder instead of forking it. The value is immutable and carries
//! no build-local state; the hooks are `Send + Sync`, so one instance may
//! be shared across concurrent method builds as long as the hook bodies
//! themselves tolerate concurrent invocation.

use crate::method::ContentDescriptor;
use crate::schema::Schema;
use std::sync::Arc;

/// Drops a parameter or result descriptor at a given position.
///
/// `is_param` is true for parameter positions and false for result
/// positions; the same predicate sees both, so a caller that only wants to
/// skip parameters must branch on the flag. Whether skipping a *result*
/// descriptor is ever wanted in practice is unclear, but the single-
/// predicate shape is kept rather than restricting it to parameters.
pub type SkipFn = Arc<dyn Fn(bool, usize, &ContentDescriptor) -> bool + Send + Sync>;

/// In-place rewrite of a surviving descriptor's fields.
pub type DescriptorMutationFn = Arc<dyn Fn(bool, usize, &mut ContentDescriptor) + Send + Sync>;

/// Rewrite of a schema value before it is attached to a descriptor.
///
/// A mutation error aborts the descriptor's construction and fails the
/// whole method build.
pub type SchemaMutationFn = Arc<dyn Fn(&mut Schema) -> anyhow::Result<()> + Send + Sync>;

/// Extension hooks applied while building a method description.
#[derive(Clone, Default)]
pub struct ParseOptions {
    /// Optional skip predicate, evaluated per position after schema
    /// mutation and before descriptor mutation
    pub skip_fn: Option<SkipFn>,
    /// Descriptor mutators, applied in registration order to every
    /// surviving descriptor
    pub descriptor_mutations: Vec<DescriptorMutationFn>,
    /// Schema mutators, applied in registration order to every generated
    /// schema exactly once
    pub schema_mutations: Vec<SchemaMutationFn>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the skip predicate
    pub fn with_skip<F>(mut self, f: F) -> Self
    where
        F: Fn(bool, usize, &ContentDescriptor) -> bool + Send + Sync + 'static,
    {
        self.skip_fn = Some(Arc::new(f));
        self
    }

    /// Appends a content-descriptor mutator
    pub fn with_descriptor_mutation<F>(mut self, f: F) -> Self
    where
        F: Fn(bool, usize, &mut ContentDescriptor) + Send + Sync + 'static,
    {
        self.descriptor_mutations.push(Arc::new(f));
        self
    }

    /// Appends a schema mutator
    pub fn with_schema_mutation<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Schema) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.schema_mutations.push(Arc::new(f));
        self
    }
}

impl std::fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ParseOptions")
            .field("skip_fn", &self.skip_fn.is_some())
            .field("descriptor_mutations", &self.descriptor_mutations.len())
            .field("schema_mutations", &self.schema_mutations.len())
            .finish()
    }
}
