// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::collections::HashMap;
use tracing::debug;

use crate::model::FieldMeta;

/// Field catalogs keyed by record type, filled on first use.
#[derive(Debug, Clone, Default)]
pub struct FieldCache {
    entries: HashMap<String, Vec<FieldMeta>>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, object_type: &str) -> Option<&[FieldMeta]> {
        self.entries.get(object_type).map(Vec::as_slice)
    }

    /// Returns the cached catalog or runs `load` once to populate it. A failed
    /// load leaves the cache untouched.
    pub fn get_or_load<F>(&mut self, object_type: &str, load: F) -> Result<&[FieldMeta]>
    where
        F: FnOnce() -> Result<Vec<String>>,
    {
        if self.entries.contains_key(object_type) {
            debug!(object_type, "field catalog cache hit");
        } else {
            let names = load()?;
            debug!(
                object_type,
                fields = names.len(),
                "field catalog cache miss"
            );
            self.entries.insert(
                object_type.to_owned(),
                names.into_iter().map(FieldMeta::from_name).collect(),
            );
        }

        Ok(self.get(object_type).unwrap_or_default())
    }

    pub fn invalidate(&mut self, object_type: &str) -> bool {
        self.entries.remove(object_type).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Catalog entries ordered for a field picker: by label, then raw name.
pub fn field_options(fields: &[FieldMeta]) -> Vec<FieldMeta> {
    let mut options = fields.to_vec();
    options.sort_by(|left, right| {
        left.label
            .to_lowercase()
            .cmp(&right.label.to_lowercase())
            .then_with(|| left.name.cmp(&right.name))
    });
    options
}
