// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{Field, FieldChunk};

/// Splits `fields` into exactly `columns` contiguous groups of `ceil(len / columns)`.
///
/// Trailing groups come out shorter or empty when the fields run out, and an
/// empty input still yields `columns` empty groups so the grid keeps its shape.
/// A column count of zero is treated as one.
pub fn chunk(fields: &[Field], columns: usize) -> Vec<FieldChunk> {
    let columns = columns.max(1);
    let size = fields.len().div_ceil(columns);
    (0..columns)
        .map(|key| {
            let start = key.saturating_mul(size).min(fields.len());
            let end = start.saturating_add(size).min(fields.len());
            FieldChunk {
                key,
                fields: fields[start..end].to_vec(),
            }
        })
        .collect()
}
