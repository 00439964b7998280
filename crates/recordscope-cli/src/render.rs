// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use recordscope_app::{FieldChunk, FieldMeta, Filter, Notification, Record, Session};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;

const COLUMN_GAP: &str = "    ";

#[derive(Debug, Serialize)]
struct ResultsView<'a> {
    object_type: Option<&'a str>,
    total: usize,
    filtered: usize,
    no_results: bool,
    search: &'a str,
    filters: &'a [Filter],
    records: Vec<&'a Record>,
}

pub fn results_json(session: &Session) -> Result<String> {
    let view = ResultsView {
        object_type: session.selected_type(),
        total: session.records().len(),
        filtered: session.filtered().len(),
        no_results: session.no_results(),
        search: session.search_query(),
        filters: session.filters(),
        records: session.displayed().iter().map(Arc::as_ref).collect(),
    };
    serde_json::to_string_pretty(&view).context("encode results as JSON")
}

pub fn write_results<W: Write>(out: &mut W, session: &Session) -> Result<()> {
    for record in session.displayed() {
        write_record(out, record)?;
    }
    writeln!(
        out,
        "{} of {} records shown",
        session.displayed().len(),
        session.records().len()
    )?;
    Ok(())
}

/// A record block: title line, then its grid. Expanded records show the
/// (possibly field-searched) full layout, others only the essentials.
pub fn write_record<W: Write>(out: &mut W, record: &Record) -> Result<()> {
    writeln!(out, "{} ({})", record.display_name, record.id)?;
    let chunks = if record.expanded {
        if !record.field_search_term.is_empty() {
            writeln!(out, "  fields matching {:?}", record.field_search_term)?;
        }
        &record.field_chunks_filtered
    } else {
        &record.essential_chunks
    };
    for line in grid_lines(chunks) {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}

pub fn write_object_types<W: Write>(out: &mut W, types: &[String]) -> Result<()> {
    for object_type in types {
        writeln!(out, "{object_type}")?;
    }
    Ok(())
}

pub fn write_field_options<W: Write>(out: &mut W, options: &[FieldMeta]) -> Result<()> {
    let width = options
        .iter()
        .map(|option| option.name.chars().count())
        .max()
        .unwrap_or(0);
    for option in options {
        writeln!(out, "{:<width$}  {}", option.name, option.label)?;
    }
    Ok(())
}

pub fn write_filters<W: Write>(out: &mut W, filters: &[Filter]) -> Result<()> {
    if filters.is_empty() {
        writeln!(out, "no filters")?;
    }
    for filter in filters {
        writeln!(out, "{filter}")?;
    }
    Ok(())
}

pub fn write_notification<W: Write>(out: &mut W, notification: &Notification) -> Result<()> {
    writeln!(
        out,
        "{}: {}",
        notification.kind.as_str(),
        notification.message
    )?;
    Ok(())
}

/// Lays chunks out side by side: chunk `n` is column `n`, padded to its
/// widest cell.
fn grid_lines(chunks: &[FieldChunk]) -> Vec<String> {
    let columns = chunks
        .iter()
        .map(|chunk| {
            chunk
                .fields
                .iter()
                .map(|field| format!("{}: {}", field.label, field.value))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let widths = columns
        .iter()
        .map(|cells| cells.iter().map(|cell| cell.chars().count()).max().unwrap_or(0))
        .collect::<Vec<_>>();
    let height = columns.iter().map(Vec::len).max().unwrap_or(0);

    (0..height)
        .map(|row| {
            let mut line = String::new();
            for (cells, width) in columns.iter().zip(&widths) {
                let Some(cell) = cells.get(row) else {
                    continue;
                };
                if !line.is_empty() {
                    line.push_str(COLUMN_GAP);
                }
                line.push_str(&format!("{cell:<width$}"));
            }
            line.trim_end().to_owned()
        })
        .collect()
}
