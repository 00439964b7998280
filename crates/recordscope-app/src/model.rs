// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::RecordId;
use crate::label::format_label;

/// Field names surfaced in a record's collapsed view, matched case-insensitively.
pub const ESSENTIAL_FIELDS: [&str; 7] =
    ["Name", "Id", "Email", "Phone", "Status", "Type", "Industry"];

/// Records with more fields than this get the three-column layout.
pub const WIDE_LAYOUT_THRESHOLD: usize = 15;
pub const NARROW_COLUMNS: usize = 2;
pub const WIDE_COLUMNS: usize = 3;
pub const ESSENTIAL_COLUMNS: usize = NARROW_COLUMNS;

pub const fn layout_columns(field_count: usize) -> usize {
    if field_count > WIDE_LAYOUT_THRESHOLD {
        WIDE_COLUMNS
    } else {
        NARROW_COLUMNS
    }
}

pub fn is_essential_field(name: &str) -> bool {
    ESSENTIAL_FIELDS
        .iter()
        .any(|essential| essential.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub value: String,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: format_label(&name),
            name,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChunk {
    pub key: usize,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: RecordId,
    pub display_name: String,
    pub full_fields: Vec<Field>,
    pub essential_chunks: Vec<FieldChunk>,
    pub field_chunks: Vec<FieldChunk>,
    pub field_chunks_filtered: Vec<FieldChunk>,
    pub expanded: bool,
    pub field_search_term: String,
}

impl Record {
    /// Column count of the full-field layout chosen at projection time.
    pub fn column_count(&self) -> usize {
        self.field_chunks.len()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.full_fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }

    pub fn value(&self, name: &str) -> &str {
        self.field(name).map_or("", |field| field.value.as_str())
    }
}

/// One entry of a type's field catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldMeta {
    pub name: String,
    pub label: String,
}

impl FieldMeta {
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: format_label(&name),
            name,
        }
    }
}

/// A raw key/value row as handed over by a record source. `None` marks a null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<String, Option<String>>);

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        self.0.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, Some(value.into()));
        self
    }

    pub fn with_null(mut self, name: impl Into<String>) -> Self {
        self.insert(name, None);
        self
    }

    /// Missing keys and nulls both read as `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|value| value.as_deref())
    }

    /// Value coerced to text; missing and null become an empty string.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{RawRow, is_essential_field, layout_columns};

    #[test]
    fn layout_switches_to_three_columns_above_fifteen_fields() {
        assert_eq!(layout_columns(0), 2);
        assert_eq!(layout_columns(10), 2);
        assert_eq!(layout_columns(15), 2);
        assert_eq!(layout_columns(16), 3);
        assert_eq!(layout_columns(20), 3);
    }

    #[test]
    fn essential_match_ignores_case() {
        assert!(is_essential_field("EMAIL"));
        assert!(is_essential_field("industry"));
        assert!(!is_essential_field("BillingCity"));
    }

    #[test]
    fn raw_row_coerces_missing_and_null_to_empty() {
        let row = RawRow::new().with("Name", "Acme").with_null("Phone");
        assert_eq!(row.text("Name"), "Acme");
        assert_eq!(row.text("Phone"), "");
        assert_eq!(row.text("Missing"), "");
        assert_eq!(row.get("Phone"), None);
        assert_eq!(row.len(), 2);
    }
}
