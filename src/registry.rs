//! The handler set a document is generated for.

use crate::callback::Callback;
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Name-keyed collection of registered callbacks.
///
/// Names are unique; iteration is name-ordered, which keeps document
/// assembly deterministic.
#[derive(Default)]
pub struct ServiceRegistry {
    callbacks: BTreeMap<String, Callback>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback under a method name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateMethod`] if the name is taken; the
    /// existing registration is left untouched.
    pub fn register(&mut self, name: impl Into<String>, callback: Callback) -> Result<()> {
        let name = name.into();
        if self.callbacks.contains_key(&name) {
            return Err(Error::DuplicateMethod(name));
        }
        self.callbacks.insert(name, callback);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Callback> {
        self.callbacks.get(name)
    }

    /// Iterates registrations in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Callback)> {
        self.callbacks.iter().map(|(name, cb)| (name.as_str(), cb))
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}
