// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use recordscope_app::{RawRow, RecordSource};
use recordscope_db::Store;
use tracing::debug;

pub struct DbRuntime<'a> {
    store: &'a Store,
}

impl<'a> DbRuntime<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }
}

impl RecordSource for DbRuntime<'_> {
    fn object_types(&mut self) -> Result<Vec<String>> {
        self.store.object_types()
    }

    fn field_names(&mut self, object_type: &str) -> Result<Vec<String>> {
        debug!(object_type, "reading field catalog");
        self.store.field_names(object_type)
    }

    fn fetch_records(
        &mut self,
        object_type: &str,
        fields: &[String],
        limit: usize,
    ) -> Result<Vec<RawRow>> {
        self.store.fetch_records(object_type, fields, limit)
    }
}
