// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ids::FilterId;
use crate::model::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    Eq,
    Ne,
    Like,
}

impl FilterOp {
    pub const ALL: [Self; 3] = [Self::Eq, Self::Ne, Self::Like];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Like => "LIKE",
        }
    }

    /// Accepts the canonical tags and their `eq`/`ne`/`like` aliases.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "=" | "eq" => Some(Self::Eq),
            "!=" | "ne" => Some(Self::Ne),
            "like" => Some(Self::Like),
            _ => None,
        }
    }

    fn matches(self, field_value: &str, test_value: &str) -> bool {
        match self {
            Self::Eq => field_value == test_value,
            Self::Ne => field_value != test_value,
            Self::Like => field_value.contains(test_value),
        }
    }
}

/// One field/operator/value predicate.
///
/// `op` is `None` when the operator text was not recognised; such a filter
/// rejects every record it is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub id: FilterId,
    pub field: String,
    pub op: Option<FilterOp>,
    pub value: String,
}

impl Filter {
    pub fn new(
        id: FilterId,
        field: impl Into<String>,
        operator: &str,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id,
            field: field.into(),
            op: FilterOp::parse(operator),
            value: value.into(),
        }
    }

    /// A freshly added row: no field chosen yet, so it filters nothing.
    pub fn inert(id: FilterId) -> Self {
        Self {
            id,
            field: String::new(),
            op: Some(FilterOp::Eq),
            value: String::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.field.is_empty()
    }

    fn passes(&self, values: &HashMap<String, String>) -> bool {
        let Some(op) = self.op else {
            return false;
        };
        let field_value = values
            .get(&self.field.to_lowercase())
            .map_or("", String::as_str);
        op.matches(field_value, &self.value.to_lowercase())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.op.map_or("?", FilterOp::as_str);
        write!(f, "#{} {} {} {:?}", self.id, self.field, op, self.value)
    }
}

/// Keeps the records that pass every active filter. Inactive filters are skipped.
pub fn apply_filters(records: &[Arc<Record>], filters: &[Filter]) -> Vec<Arc<Record>> {
    let active = filters
        .iter()
        .filter(|filter| filter.is_active())
        .collect::<Vec<_>>();
    if active.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| {
            let values = lowercase_values(record);
            active.iter().all(|filter| filter.passes(&values))
        })
        .cloned()
        .collect()
}

pub fn has_active_filters(filters: &[Filter]) -> bool {
    filters.iter().any(Filter::is_active)
}

fn lowercase_values(record: &Record) -> HashMap<String, String> {
    record
        .full_fields
        .iter()
        .map(|field| (field.name.to_lowercase(), field.value.to_lowercase()))
        .collect()
}
