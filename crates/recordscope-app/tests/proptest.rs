// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Property tests for the chunking, filtering, and search laws.

use proptest::prelude::*;
use recordscope_app::{
    Field, FieldMeta, Filter, FilterId, RawRow, Record, apply_filters, apply_search, chunk,
    project, search_record_fields,
};
use std::sync::Arc;

const FIELD_NAMES: [&str; 4] = ["Name", "Industry", "Status", "City"];

fn field_list() -> impl Strategy<Value = Vec<Field>> {
    prop::collection::vec(("[A-Za-z_]{1,12}", "[a-z0-9 ]{0,8}"), 0..40).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(name, value)| Field::new(name, value))
            .collect()
    })
}

fn record_strategy() -> impl Strategy<Value = Arc<Record>> {
    (
        "[0-9]{1,4}",
        prop::collection::vec("(Tech|Retail|Open|Closed|[a-z]{0,5})", 4),
    )
        .prop_map(|(id, values)| {
            let metas = FIELD_NAMES
                .into_iter()
                .map(FieldMeta::from_name)
                .collect::<Vec<_>>();
            let row = FIELD_NAMES
                .iter()
                .zip(values)
                .fold(RawRow::new().with("Id", id), |row, (name, value)| {
                    row.with(*name, value)
                });
            Arc::new(project(&row, &metas))
        })
}

fn filter_strategy() -> impl Strategy<Value = Filter> {
    (
        any::<u64>(),
        prop::sample::select(vec!["", "Name", "Industry", "Status", "City", "Missing"]),
        prop::sample::select(vec!["=", "!=", "LIKE", "eq", "like", "between"]),
        "(tech|open|[a-z]{0,2})",
    )
        .prop_map(|(id, field, op, value)| Filter::new(FilterId::new(id), field, op, value))
}

fn ids(records: &[Arc<Record>]) -> Vec<String> {
    records.iter().map(|record| record.id.to_string()).collect()
}

proptest! {
    /// Chunks partition the input in order, with exactly `columns` groups.
    #[test]
    fn chunk_partitions_in_order(fields in field_list(), columns in 1usize..6) {
        let chunks = chunk(&fields, columns);
        prop_assert_eq!(chunks.len(), columns);

        let size = fields.len().div_ceil(columns);
        let mut seen_short = false;
        for (key, group) in chunks.iter().enumerate() {
            prop_assert_eq!(group.key, key);
            prop_assert!(group.fields.len() <= size);
            if group.fields.len() < size {
                seen_short = true;
            } else {
                prop_assert!(!seen_short, "full chunk after a short one");
            }
        }

        let flattened = chunks
            .into_iter()
            .flat_map(|group| group.fields)
            .collect::<Vec<_>>();
        prop_assert_eq!(flattened, fields);
    }

    /// An empty filter list never changes the record set.
    #[test]
    fn no_filters_is_identity(records in prop::collection::vec(record_strategy(), 0..20)) {
        prop_assert_eq!(ids(&apply_filters(&records, &[])), ids(&records));
    }

    /// Adding a filter can only narrow the result.
    #[test]
    fn filters_narrow_monotonically(
        records in prop::collection::vec(record_strategy(), 0..20),
        filters in prop::collection::vec(filter_strategy(), 0..4),
        extra in filter_strategy(),
    ) {
        let base = apply_filters(&records, &filters);
        let mut more = filters.clone();
        more.push(extra);
        let narrowed = apply_filters(&records, &more);

        prop_assert!(narrowed.len() <= base.len());
        let base_ids = ids(&base);
        for id in ids(&narrowed) {
            prop_assert!(base_ids.contains(&id));
        }
    }

    /// A filter without a field never changes the result.
    #[test]
    fn inert_filter_is_neutral(
        records in prop::collection::vec(record_strategy(), 0..20),
        filters in prop::collection::vec(filter_strategy(), 0..4),
    ) {
        let mut with_inert = filters.clone();
        with_inert.push(Filter::inert(FilterId::new(0)));
        prop_assert_eq!(
            ids(&apply_filters(&records, &with_inert)),
            ids(&apply_filters(&records, &filters))
        );
    }

    /// Search never reorders and only returns records from its source.
    #[test]
    fn search_is_a_stable_subset(
        records in prop::collection::vec(record_strategy(), 0..20),
        query in "[a-zA-Z ]{0,4}",
    ) {
        let found = ids(&apply_search(&records, &query));
        let source = ids(&records);
        let mut cursor = 0usize;
        for id in &found {
            let offset = source[cursor..].iter().position(|candidate| candidate == id);
            prop_assert!(offset.is_some());
            cursor += offset.unwrap_or(0) + 1;
        }
        if query.trim().is_empty() {
            prop_assert_eq!(found, source);
        }
    }

    /// Searching one record's fields leaves its base layout untouched.
    #[test]
    fn field_search_keeps_base_layout(record in record_strategy(), query in "[a-z]{0,3}") {
        let searched = search_record_fields(&record, &query);
        prop_assert_eq!(&searched.field_chunks, &record.field_chunks);
        prop_assert_eq!(searched.field_chunks_filtered.len(), record.column_count());
        let restored = search_record_fields(&searched, "");
        prop_assert_eq!(restored.field_chunks_filtered, record.field_chunks.clone());
    }
}
