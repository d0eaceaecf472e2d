//! Named-type resolution from parsed sources.
//!
//! The resolver indexes every struct and enum definition found in the
//! loaded sources and lowers `syn` types into [`RuntimeType`] descriptors.
//! Schema generation uses the index to expand named types into component
//! schemas.

use crate::callback::RuntimeType;
use crate::source::SourceFile;
use log::debug;
use std::collections::HashMap;

/// A named type definition recovered from source.
#[derive(Debug, Clone)]
pub enum TypeDef {
    /// A struct with named fields
    Struct(Vec<FieldDef>),
    /// An enum, reduced to its variant names
    Enum(Vec<String>),
}

/// One named field of a struct definition.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name, after `#[serde(rename = "...")]` if present
    pub name: String,
    /// Lowered field type
    pub ty: RuntimeType,
    /// Whether the field is skipped by `#[serde(skip)]`
    pub skip: bool,
}

/// Primitive types with a direct schema mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
    F32,
    F64,
    Bool,
    Char,
}

/// Indexes struct and enum definitions across all loaded sources.
pub struct TypeResolver {
    definitions: HashMap<String, TypeDef>,
}

impl TypeResolver {
    /// Builds the index by walking every item of every source file.
    ///
    /// Definitions are extracted eagerly so the resolver does not need to
    /// keep the syntax trees alive.
    pub fn new(sources: &[SourceFile]) -> Self {
        let mut definitions = HashMap::new();

        for source in sources {
            for item in &source.ast.items {
                Self::index_item(item, &mut definitions);
            }
        }

        debug!("Indexed {} named type definitions", definitions.len());
        Self { definitions }
    }

    fn index_item(item: &syn::Item, definitions: &mut HashMap<String, TypeDef>) {
        match item {
            syn::Item::Struct(item_struct) => {
                let fields = Self::lower_struct_fields(item_struct);
                definitions.insert(item_struct.ident.to_string(), TypeDef::Struct(fields));
            }
            syn::Item::Enum(item_enum) => {
                let variants = item_enum
                    .variants
                    .iter()
                    .map(|v| v.ident.to_string())
                    .collect();
                definitions.insert(item_enum.ident.to_string(), TypeDef::Enum(variants));
            }
            syn::Item::Mod(item_mod) => {
                if let Some((_, items)) = &item_mod.content {
                    for nested in items {
                        Self::index_item(nested, definitions);
                    }
                }
            }
            _ => {}
        }
    }

    /// Looks up a definition by its bare type name.
    pub fn resolve(&self, name: &str) -> Option<&TypeDef> {
        self.definitions.get(name)
    }

    /// Parses a primitive type name into its schema category.
    pub fn primitive(name: &str) -> Option<Primitive> {
        match name {
            "String" | "str" => Some(Primitive::String),
            "i8" => Some(Primitive::I8),
            "i16" => Some(Primitive::I16),
            "i32" => Some(Primitive::I32),
            "i64" => Some(Primitive::I64),
            "i128" => Some(Primitive::I128),
            "u8" => Some(Primitive::U8),
            "u16" => Some(Primitive::U16),
            "u32" => Some(Primitive::U32),
            "u64" => Some(Primitive::U64),
            "u128" => Some(Primitive::U128),
            "f32" => Some(Primitive::F32),
            "f64" => Some(Primitive::F64),
            "bool" => Some(Primitive::Bool),
            "char" => Some(Primitive::Char),
            _ => None,
        }
    }

    fn lower_struct_fields(item_struct: &syn::ItemStruct) -> Vec<FieldDef> {
        let mut fields = Vec::new();

        if let syn::Fields::Named(named) = &item_struct.fields {
            for field in &named.named {
                let Some(ident) = &field.ident else { continue };
                let (rename, skip) = Self::serde_attrs(&field.attrs);
                fields.push(FieldDef {
                    name: rename.unwrap_or_else(|| ident.to_string()),
                    ty: lower_type(&field.ty),
                    skip,
                });
            }
        }

        fields
    }

    /// Extracts the `rename` and `skip` serde attributes of a field.
    fn serde_attrs(attrs: &[syn::Attribute]) -> (Option<String>, bool) {
        let mut rename = None;
        let mut skip = false;

        for attr in attrs {
            if !attr.path().is_ident("serde") {
                continue;
            }
            let Ok(meta_list) = attr.meta.require_list() else { continue };
            let tokens = meta_list.tokens.to_string();

            if let Some(value) = Self::rename_value(&tokens) {
                rename = Some(value);
            }
            if tokens.contains("skip") && !tokens.contains("skip_serializing_if") {
                skip = true;
            }
        }

        (rename, skip)
    }

    fn rename_value(tokens: &str) -> Option<String> {
        let after = &tokens[tokens.find("rename")? + "rename".len()..];
        let after = &after[after.find('=')? + 1..];
        let after = &after[after.find('"')? + 1..];
        let end = after.find('"')?;
        Some(after[..end].to_string())
    }
}

/// Lowers a `syn` type into a [`RuntimeType`] descriptor.
///
/// References are seen through; `Option` and `Vec` are recognized by their
/// last path segment. Types with no path form (trait objects, fn pointers)
/// lower to an `Unknown` placeholder.
pub fn lower_type(ty: &syn::Type) -> RuntimeType {
    match ty {
        syn::Type::Path(type_path) => lower_path(&type_path.path),
        syn::Type::Reference(reference) => lower_type(&reference.elem),
        syn::Type::Paren(paren) => lower_type(&paren.elem),
        syn::Type::Tuple(tuple) if tuple.elems.is_empty() => RuntimeType::new("()"),
        _ => RuntimeType::new("Unknown"),
    }
}

fn lower_path(path: &syn::Path) -> RuntimeType {
    let Some(segment) = path.segments.last() else {
        return RuntimeType::new("Unknown");
    };
    let name = segment.ident.to_string();

    let mut generic_args = Vec::new();
    if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
        for arg in &args.args {
            if let syn::GenericArgument::Type(inner) = arg {
                generic_args.push(lower_type(inner));
            }
        }
    }

    if name == "Option" && generic_args.len() == 1 {
        return RuntimeType::option(generic_args.remove(0));
    }
    if name == "Vec" && generic_args.len() == 1 {
        return RuntimeType::vec(generic_args.remove(0));
    }

    RuntimeType {
        name,
        generic_args,
        is_option: false,
        is_vec: false,
    }
}
