// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::HashSet;

use crate::chunk::chunk;
use crate::ids::RecordId;
use crate::model::{
    ESSENTIAL_COLUMNS, Field, FieldMeta, RawRow, Record, is_essential_field, layout_columns,
};

const ID_KEYS: [&str; 2] = ["Id", "id"];
const NAME_KEYS: [&str; 2] = ["Name", "name"];

/// Builds the record view model for one raw row.
///
/// Fields follow `fields` order. The identifier is read from `Id`, then `id`,
/// and the display name from `Name`, then `name`, then the identifier. Rows
/// without any identifier get an empty id; [`project_rows`] fills those in.
pub fn project(row: &RawRow, fields: &[FieldMeta]) -> Record {
    let full_fields = fields
        .iter()
        .map(|meta| Field {
            name: meta.name.clone(),
            label: meta.label.clone(),
            value: row.text(&meta.name).to_owned(),
        })
        .collect::<Vec<_>>();

    let essential = full_fields
        .iter()
        .filter(|field| is_essential_field(&field.name))
        .cloned()
        .collect::<Vec<_>>();

    let field_chunks = chunk(&full_fields, layout_columns(full_fields.len()));
    let id = first_present(row, &ID_KEYS).unwrap_or_default().to_owned();
    let display_name = first_present(row, &NAME_KEYS)
        .unwrap_or(id.as_str())
        .to_owned();

    Record {
        id: RecordId::new(id),
        display_name,
        essential_chunks: chunk(&essential, ESSENTIAL_COLUMNS),
        field_chunks_filtered: field_chunks.clone(),
        field_chunks,
        full_fields,
        expanded: false,
        field_search_term: String::new(),
    }
}

/// Projects a fetched page and makes every id in it unique.
///
/// Rows with no identifier are keyed `row-<n>` by position. A repeated id, or
/// a positional id that some row already carries, gets a `#<n>` suffix. The
/// first row holding a given source id keeps it unchanged.
pub fn project_rows(rows: &[RawRow], fields: &[FieldMeta]) -> Vec<Record> {
    let mut records = rows
        .iter()
        .map(|row| project(row, fields))
        .collect::<Vec<_>>();
    let source_ids = records
        .iter()
        .filter(|record| !record.id.is_empty())
        .map(|record| record.id.as_str().to_owned())
        .collect::<HashSet<_>>();

    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    for (position, record) in records.iter_mut().enumerate() {
        let positional = record.id.is_empty();
        let base = if positional {
            format!("row-{}", position + 1)
        } else {
            record.id.as_str().to_owned()
        };
        let taken = |id: &str| seen.contains(id) || (positional && source_ids.contains(id));

        let mut id = base.clone();
        let mut suffix = position + 1;
        while taken(&id) {
            id = format!("{base}#{suffix}");
            suffix += 1;
        }
        seen.insert(id.clone());

        if id != record.id.as_str() {
            record.id = RecordId::new(id);
        }
        if record.display_name.is_empty() {
            record.display_name = record.id.to_string();
        }
    }
    records
}

fn first_present<'a>(row: &'a RawRow, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| row.get(key))
        .find(|value| !value.is_empty())
}
