//! Schema conversion for runtime types.
//!
//! Converts [`RuntimeType`] descriptors into JSON-Schema-shaped values for
//! content descriptors. Named struct and enum types resolve through the
//! [`TypeResolver`] into `#/components/schemas/...` references; the full
//! component schemas are materialized separately so that conversion itself
//! stays a pure function and method builds can run in parallel.

use crate::callback::RuntimeType;
use crate::type_resolver::{Primitive, TypeDef, TypeResolver};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A JSON Schema value attached to a content descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, null, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Enum values for enum types
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Reference to a component schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "double")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Schema {
    fn empty() -> Self {
        Self {
            schema_type: None,
            properties: None,
            required: None,
            items: None,
            enum_values: None,
            reference: None,
            format: None,
        }
    }

    /// A schema with only a type name set
    pub fn of_type(name: &str) -> Self {
        Self {
            schema_type: Some(name.to_string()),
            ..Self::empty()
        }
    }

    /// The null-type schema used for the placeholder result descriptor
    pub fn null() -> Self {
        Self::of_type("null")
    }

    /// A `$ref` to a named component schema
    pub fn component_ref(name: &str) -> Self {
        Self {
            reference: Some(format!("#/components/schemas/{}", name)),
            ..Self::empty()
        }
    }
}

/// Schema generator - converts runtime types to schemas.
pub struct SchemaGenerator {
    resolver: TypeResolver,
}

impl SchemaGenerator {
    pub fn new(resolver: TypeResolver) -> Self {
        Self { resolver }
    }

    /// Converts one runtime type to its schema.
    ///
    /// `Option<T>` converts as its inner type (optionality lives on the
    /// descriptor level, where every field of this model is required),
    /// `Vec<T>` as an array, primitives via the type/format table, and
    /// named types that resolve in source as component references. Unknown
    /// names fall back to an object placeholder.
    pub fn convert(&self, ty: &RuntimeType) -> Schema {
        if ty.is_option {
            return self.convert(&ty.generic_args[0]);
        }
        if ty.is_vec {
            let mut schema = Schema::of_type("array");
            schema.items = Some(Box::new(self.convert(&ty.generic_args[0])));
            return schema;
        }
        if let Some(primitive) = TypeResolver::primitive(&ty.name) {
            return primitive_schema(primitive);
        }
        if ty.name == "()" {
            return Schema::null();
        }
        if self.resolver.resolve(&ty.name).is_some() {
            return Schema::component_ref(&ty.name);
        }

        debug!("Unknown type: {}, using object placeholder", ty.name);
        Schema::of_type("object")
    }

    /// Materializes the component schemas referenced by the given types.
    ///
    /// Recursively follows struct fields so that nested named types end up
    /// in the map exactly once, keyed and ordered by name.
    pub fn components(&self, roots: &[&RuntimeType]) -> BTreeMap<String, Schema> {
        let mut out = BTreeMap::new();
        for root in roots {
            self.collect_named(root, &mut out);
        }
        out
    }

    fn collect_named(&self, ty: &RuntimeType, out: &mut BTreeMap<String, Schema>) {
        if ty.is_option || ty.is_vec {
            self.collect_named(&ty.generic_args[0], out);
            return;
        }
        if TypeResolver::primitive(&ty.name).is_some() || out.contains_key(&ty.name) {
            return;
        }
        let Some(def) = self.resolver.resolve(&ty.name) else {
            return;
        };

        out.insert(ty.name.clone(), self.definition_schema(def));

        // Follow field types after inserting, so cycles terminate
        if let TypeDef::Struct(fields) = def {
            for field in fields {
                if !field.skip {
                    self.collect_named(&field.ty, out);
                }
            }
        }
    }

    fn definition_schema(&self, def: &TypeDef) -> Schema {
        match def {
            TypeDef::Struct(fields) => {
                let mut properties = BTreeMap::new();
                let mut required = Vec::new();

                for field in fields {
                    if field.skip {
                        continue;
                    }
                    properties.insert(field.name.clone(), self.convert(&field.ty));
                    if !field.ty.is_option {
                        required.push(field.name.clone());
                    }
                }

                let mut schema = Schema::of_type("object");
                schema.properties = Some(properties);
                schema.required = if required.is_empty() {
                    None
                } else {
                    Some(required)
                };
                schema
            }
            TypeDef::Enum(variants) => {
                let mut schema = Schema::of_type("string");
                schema.enum_values = Some(variants.clone());
                schema
            }
        }
    }
}

fn primitive_schema(primitive: Primitive) -> Schema {
    let (schema_type, format) = match primitive {
        Primitive::String | Primitive::Char => ("string", None),
        Primitive::I8 | Primitive::I16 | Primitive::I32 => ("integer", Some("int32")),
        Primitive::I64 | Primitive::I128 => ("integer", Some("int64")),
        Primitive::U8 | Primitive::U16 | Primitive::U32 => ("integer", Some("int32")),
        Primitive::U64 | Primitive::U128 => ("integer", Some("int64")),
        Primitive::F32 => ("number", Some("float")),
        Primitive::F64 => ("number", Some("double")),
        Primitive::Bool => ("boolean", None),
    };

    let mut schema = Schema::of_type(schema_type);
    schema.format = format.map(|s| s.to_string());
    schema
}
