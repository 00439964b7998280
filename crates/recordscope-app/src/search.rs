// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;

use crate::chunk::chunk;
use crate::model::{Field, Record};

/// Free-text search over display name, id, and field values.
///
/// Field names are not searched; see [`search_fields`] for that.
/// An empty query returns `source` unchanged.
pub fn apply_search(source: &[Arc<Record>], query: &str) -> Vec<Arc<Record>> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return source.to_vec();
    }

    source
        .iter()
        .filter(|record| record_matches(record, &needle))
        .cloned()
        .collect()
}

/// Fields of one record whose name, label, or value contains `query`.
pub fn search_fields(fields: &[Field], query: &str) -> Vec<Field> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return fields.to_vec();
    }

    fields
        .iter()
        .filter(|field| {
            contains_folded(&field.name, &needle)
                || contains_folded(&field.label, &needle)
                || contains_folded(&field.value, &needle)
        })
        .cloned()
        .collect()
}

/// Returns `record` with its filtered layout narrowed to the fields matching
/// `query`, re-chunked at the record's own column count. A blank query puts
/// back the original layout.
pub fn search_record_fields(record: &Record, query: &str) -> Record {
    let needle = normalize_query(query);
    let field_chunks_filtered = if needle.is_empty() {
        record.field_chunks.clone()
    } else {
        chunk(
            &search_fields(&record.full_fields, &needle),
            record.column_count(),
        )
    };

    Record {
        field_chunks_filtered,
        field_search_term: query.to_owned(),
        ..record.clone()
    }
}

pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

fn record_matches(record: &Record, needle: &str) -> bool {
    contains_folded(&record.display_name, needle)
        || contains_folded(record.id.as_str(), needle)
        || record
            .full_fields
            .iter()
            .any(|field| contains_folded(&field.value, needle))
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::{apply_search, search_fields, search_record_fields};
    use crate::model::{Field, FieldMeta, RawRow, Record};
    use crate::project::project;
    use std::sync::Arc;

    fn record(id: &str, name: &str, website: &str) -> Arc<Record> {
        let fields = ["Id", "Name", "Website"]
            .into_iter()
            .map(FieldMeta::from_name)
            .collect::<Vec<_>>();
        let row = RawRow::new()
            .with("Id", id)
            .with("Name", name)
            .with("Website", website);
        Arc::new(project(&row, &fields))
    }

    fn sample() -> Vec<Arc<Record>> {
        vec![
            record("001", "Globex", "globex.example"),
            record("002", "Acme Corp", "acme.example"),
            record("003", "Initech", "initech.example"),
        ]
    }

    #[test]
    fn empty_query_returns_source_in_order() {
        let source = sample();
        let result = apply_search(&source, "   ");
        assert_eq!(result.len(), 3);
        for (left, right) in result.iter().zip(&source) {
            assert!(Arc::ptr_eq(left, right));
        }
    }

    #[test]
    fn finds_the_single_matching_record() {
        let result = apply_search(&sample(), "  ACME ");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].display_name, "Acme Corp");
    }

    #[test]
    fn matches_identifier_and_values() {
        assert_eq!(apply_search(&sample(), "003").len(), 1);
        assert_eq!(apply_search(&sample(), ".example").len(), 3);
    }

    #[test]
    fn does_not_match_field_names() {
        assert!(apply_search(&sample(), "website").is_empty());
    }

    #[test]
    fn field_search_matches_name_label_and_value() {
        let fields = vec![
            Field::new("BillingCity", "Austin"),
            Field::new("Phone", "555-0100"),
            Field::new("Industry", "Retail"),
        ];
        let by_label = search_fields(&fields, "billing city");
        assert_eq!(by_label.len(), 1);
        assert_eq!(by_label[0].name, "BillingCity");

        let by_name = search_fields(&fields, "PHONE");
        assert_eq!(by_name[0].name, "Phone");

        let by_value = search_fields(&fields, "retail");
        assert_eq!(by_value[0].name, "Industry");

        assert_eq!(search_fields(&fields, "").len(), 3);
    }

    #[test]
    fn record_field_search_rechunks_and_restores() {
        let original = record("001", "Acme Corp", "acme.example");

        let narrowed = search_record_fields(&original, "web");
        assert_eq!(narrowed.field_search_term, "web");
        assert_eq!(narrowed.field_chunks_filtered.len(), original.column_count());
        let visible = narrowed
            .field_chunks_filtered
            .iter()
            .flat_map(|chunk| chunk.fields.iter().map(|field| field.name.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(visible, vec!["Website"]);
        assert_eq!(narrowed.field_chunks, original.field_chunks);

        let restored = search_record_fields(&narrowed, "  ");
        assert_eq!(restored.field_chunks_filtered, original.field_chunks);
        assert_eq!(restored.id, original.id);
    }
}
