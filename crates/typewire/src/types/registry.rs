// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record registry used to resolve [`TypeDescriptor::Reference`] back-edges.

use crate::error::{Error, Result};
use crate::types::{RecordDescriptor, TypeDescriptor};
use std::collections::HashMap;
use std::sync::Arc;

/// Trait for resolving record names to their definitions.
pub trait RecordRegistry {
    /// Look up a record by name.
    ///
    /// Returns `None` if the name is unknown.
    fn lookup(&self, name: &str) -> Option<&Arc<RecordDescriptor>>;
}

/// Simple [`HashMap`]-backed [`RecordRegistry`].
#[derive(Debug, Default, Clone)]
pub struct HashMapRecordRegistry {
    records: HashMap<String, Arc<RecordDescriptor>>,
}

impl HashMapRecordRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every named record reachable from `ty`.
    pub fn collect(ty: &TypeDescriptor) -> Result<Self> {
        let mut registry = Self::new();
        registry.collect_from(ty)?;
        Ok(registry)
    }

    /// Register a named record.
    ///
    /// Registering an identical definition twice is a no-op; a different
    /// definition under an existing name is rejected.
    pub fn register(&mut self, record: Arc<RecordDescriptor>) -> Result<bool> {
        if record.anonymous {
            return Ok(false);
        }
        match self.records.get(&record.name) {
            Some(existing) if Arc::ptr_eq(existing, &record) || **existing == *record => Ok(false),
            Some(_) => Err(Error::SchemaGeneration(format!(
                "record name `{}` is bound to two different definitions",
                record.name
            ))),
            None => {
                self.records.insert(record.name.clone(), record);
                Ok(true)
            }
        }
    }

    /// Walk `ty` and register every named record found.
    pub fn collect_from(&mut self, ty: &TypeDescriptor) -> Result<()> {
        match ty {
            TypeDescriptor::Primitive(_)
            | TypeDescriptor::Decimal
            | TypeDescriptor::Null
            | TypeDescriptor::Reference(_) => Ok(()),
            TypeDescriptor::Array(array) => self.collect_from(array.flatten().0),
            TypeDescriptor::Union(union) => union
                .members
                .iter()
                .try_for_each(|member| self.collect_from(member)),
            TypeDescriptor::Record(record) => {
                // Already seen: its fields were walked the first time.
                if !record.anonymous && !self.register(Arc::clone(record))? {
                    return Ok(());
                }
                record
                    .fields
                    .values()
                    .try_for_each(|field| self.collect_from(field))
            }
            TypeDescriptor::Map(inner) | TypeDescriptor::Table(inner) => self.collect_from(inner),
            TypeDescriptor::Tuple(tuple) => tuple
                .elements
                .iter()
                .try_for_each(|element| self.collect_from(element)),
        }
    }

    /// Resolve a reference or fail with a schema error.
    pub fn resolve(&self, name: &str) -> Result<&Arc<RecordDescriptor>> {
        self.lookup(name).ok_or_else(|| {
            Error::SchemaGeneration(format!("reference to undefined record `{}`", name))
        })
    }

    /// Number of registered records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordRegistry for HashMapRecordRegistry {
    fn lookup(&self, name: &str) -> Option<&Arc<RecordDescriptor>> {
        self.records.get(name)
    }
}
