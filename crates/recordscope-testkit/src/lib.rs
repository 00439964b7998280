// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use recordscope_app::RawRow;
use rusqlite::{Connection, params_from_iter};
use std::path::PathBuf;

pub const ACCOUNT_FIELDS: [&str; 8] = [
    "Id",
    "Name",
    "Industry",
    "Type",
    "Status",
    "Phone",
    "Email__c",
    "BillingCity",
];

const INDUSTRIES: [&str; 8] = [
    "Tech",
    "Retail",
    "Finance",
    "Healthcare",
    "Manufacturing",
    "Logistics",
    "Energy",
    "Education",
];

const ACCOUNT_TYPES: [&str; 4] = ["Customer", "Prospect", "Partner", "Reseller"];
const STATUSES: [&str; 4] = ["Active", "Pending", "Closed", "On Hold"];

const NAME_PREFIXES: [&str; 12] = [
    "Summit", "Apex", "Bright", "Cedar", "Harbor", "Granite", "Northwind", "Bluebird", "Ironwood",
    "Meadow", "Silverline", "Keystone",
];
const NAME_SUFFIXES: [&str; 6] = ["Labs", "Group", "Partners", "Works", "Systems", "Co"];

const CITIES: [&str; 10] = [
    "Austin",
    "Seattle",
    "Denver",
    "Madison",
    "Raleigh",
    "Pittsburgh",
    "Portland",
    "Boise",
    "Phoenix",
    "Nashville",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn chance(&mut self, one_in: usize) -> bool {
        self.int_n(one_in) == 0
    }
}

/// Seeded generator of raw record rows. The same seed always yields the same rows.
#[derive(Debug, Clone)]
pub struct RecordFaker {
    rng: DeterministicRng,
    next_id: u64,
}

impl RecordFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    /// An account row over [`ACCOUNT_FIELDS`]. Roughly one in six rows has a
    /// null phone so projection has gaps to fill.
    pub fn account(&mut self) -> RawRow {
        let name = format!(
            "{} {}",
            self.pick(&NAME_PREFIXES),
            self.pick(&NAME_SUFFIXES)
        );
        let email = format!(
            "info@{}.example",
            name.to_ascii_lowercase().replace(' ', "-")
        );
        let phone = (!self.rng.chance(6)).then(|| format!("555-{:04}", self.rng.int_n(10_000)));

        let mut row = RawRow::new()
            .with("Id", self.next_id("001"))
            .with("Name", name)
            .with("Industry", self.pick(&INDUSTRIES))
            .with("Type", self.pick(&ACCOUNT_TYPES))
            .with("Status", self.pick(&STATUSES))
            .with("Email__c", email)
            .with("BillingCity", self.pick(&CITIES));
        row.insert("Phone", phone);
        row
    }

    pub fn accounts(&mut self, count: usize) -> Vec<RawRow> {
        (0..count).map(|_| self.account()).collect()
    }

    /// A row with `field_count` generic fields (`Field_1__c`, ...) plus `Id`
    /// and `Name`, for exercising wide layouts.
    pub fn wide_row(&mut self, field_count: usize) -> RawRow {
        let id = self.next_id("a00");
        let name = format!("{} {}", self.pick(&NAME_PREFIXES), id);
        (1..=field_count).fold(
            RawRow::new().with("Id", id).with("Name", name),
            |row, index| {
                let value = format!("{}-{index}", self.pick(&CITIES).to_ascii_lowercase());
                row.with(wide_field_name(index), value)
            },
        )
    }

    fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}{:06}", self.next_id);
        self.next_id += 1;
        id
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

pub fn wide_field_name(index: usize) -> String {
    format!("Field_{index}__c")
}

pub fn wide_field_names(field_count: usize) -> Vec<String> {
    ["Id".to_owned(), "Name".to_owned()]
        .into_iter()
        .chain((1..=field_count).map(wide_field_name))
        .collect()
}

/// Creates `object_type` as a text table over `fields` and inserts `rows`.
pub fn seed_table(
    conn: &Connection,
    object_type: &str,
    fields: &[&str],
    rows: &[RawRow],
) -> Result<()> {
    if fields.is_empty() {
        bail!("seed table {object_type} needs at least one field");
    }
    let columns = fields
        .iter()
        .map(|field| format!("\"{field}\" TEXT"))
        .collect::<Vec<_>>()
        .join(", ");
    conn.execute_batch(&format!("CREATE TABLE \"{object_type}\" ({columns});"))
        .with_context(|| format!("create fixture table {object_type}"))?;

    let names = fields
        .iter()
        .map(|field| format!("\"{field}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; fields.len()].join(", ");
    let sql = format!("INSERT INTO \"{object_type}\" ({names}) VALUES ({placeholders})");
    for row in rows {
        conn.execute(&sql, params_from_iter(fields.iter().map(|field| row.get(field))))
            .with_context(|| format!("insert fixture row into {object_type}"))?;
    }
    Ok(())
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("records.db");
    Ok((dir, db_path))
}
