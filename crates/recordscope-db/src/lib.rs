// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod demo;

use anyhow::{Context, Result, anyhow, bail};
use recordscope_app::RawRow;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, params_from_iter};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const APP_NAME: &str = "recordscope";
pub const MAX_PAGE_SIZE: usize = 10_000;

const ID_COLUMN: &str = "id";

/// SQLite-backed record catalog: each user table is a record type, each
/// column a field, and each row a record.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    /// User tables sorted by name.
    pub fn object_types(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT name
                FROM sqlite_master
                WHERE type = 'table'
                  AND name NOT LIKE 'sqlite_%'
                ORDER BY name ASC
                ",
            )
            .context("prepare object types query")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("query object types")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect object types")
    }

    /// Column names of `object_type` in declaration order.
    pub fn field_names(&self, object_type: &str) -> Result<Vec<String>> {
        if !is_safe_identifier(object_type) {
            bail!("invalid record type name: {object_type:?}");
        }

        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info(\"{object_type}\")"))
            .with_context(|| format!("inspect columns for {object_type}"))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .with_context(|| format!("query column info for {object_type}"))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("collect columns for {object_type}"))?;
        if names.is_empty() {
            bail!("record type {object_type:?} does not exist");
        }
        Ok(names)
    }

    /// Reads up to `limit` rows of `object_type`, projecting `fields`.
    ///
    /// The table's id column is always read too, so rows stay addressable
    /// even when the caller did not select it. Every value comes back as text;
    /// SQL `NULL` becomes an absent value.
    pub fn fetch_records(
        &self,
        object_type: &str,
        fields: &[String],
        limit: usize,
    ) -> Result<Vec<RawRow>> {
        if fields.is_empty() {
            bail!("select at least one field to fetch {object_type} records");
        }
        let available = self.field_names(object_type)?;

        let mut columns = Vec::with_capacity(fields.len() + 1);
        for field in fields {
            let column = available
                .iter()
                .find(|name| name.eq_ignore_ascii_case(field))
                .ok_or_else(|| anyhow!("{object_type} has no field named {field:?}"))?;
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        if let Some(id) = available
            .iter()
            .find(|name| name.eq_ignore_ascii_case(ID_COLUMN))
            && !columns.contains(id)
        {
            columns.push(id.clone());
        }

        let projection = columns
            .iter()
            .map(|column| quote_identifier(column))
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let sql = format!(
            "SELECT {projection} FROM {} LIMIT ?",
            quote_identifier(object_type)?
        );
        let limit = i64::try_from(limit.clamp(1, MAX_PAGE_SIZE)).unwrap_or(i64::MAX);
        debug!(object_type, columns = columns.len(), limit, "fetching records");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .with_context(|| format!("prepare {object_type} record query"))?;
        let mut rows = stmt
            .query(params_from_iter([limit]))
            .with_context(|| format!("query {object_type} records"))?;

        let mut output = Vec::new();
        while let Some(row) = rows
            .next()
            .with_context(|| format!("scan {object_type} records"))?
        {
            let mut record = RawRow::new();
            for (index, column) in columns.iter().enumerate() {
                let value = row
                    .get_ref(index)
                    .map(value_ref_to_text)
                    .with_context(|| format!("read {object_type}.{column}"))?;
                record.insert(column.clone(), value);
            }
            output.push(record);
        }
        Ok(output)
    }

    /// Creates a text-typed table. A column named `Id` becomes the primary key.
    pub fn create_object_type(&self, object_type: &str, fields: &[&str]) -> Result<()> {
        if fields.is_empty() {
            bail!("record type {object_type:?} needs at least one field");
        }
        let columns = fields
            .iter()
            .map(|field| -> Result<String> {
                let quoted = quote_identifier(field)?;
                Ok(if field.eq_ignore_ascii_case(ID_COLUMN) {
                    format!("{quoted} TEXT PRIMARY KEY")
                } else {
                    format!("{quoted} TEXT")
                })
            })
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        self.conn
            .execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} ({columns});",
                quote_identifier(object_type)?
            ))
            .with_context(|| format!("create record type {object_type}"))
    }

    pub fn insert_record(&self, object_type: &str, row: &RawRow) -> Result<()> {
        if row.is_empty() {
            bail!("cannot insert an empty {object_type} record");
        }
        let names = row.keys().collect::<Vec<_>>();
        let columns = names
            .iter()
            .map(|name| quote_identifier(name))
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let placeholders = vec!["?"; names.len()].join(", ");
        let values = names.iter().map(|name| row.get(name)).collect::<Vec<_>>();

        self.conn
            .execute(
                &format!(
                    "INSERT INTO {} ({columns}) VALUES ({placeholders})",
                    quote_identifier(object_type)?
                ),
                params_from_iter(values),
            )
            .with_context(|| format!("insert {object_type} record"))?;
        Ok(())
    }

    pub fn seed_demo_data(&self) -> Result<()> {
        demo::seed(self)
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("RECORDSCOPE_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!(
            "cannot resolve data directory; set RECORDSCOPE_DB_PATH to a readable database path"
        )
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("records.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn value_ref_to_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(value) => Some(value.to_string()),
        ValueRef::Real(value) => Some(value.to_string()),
        ValueRef::Text(value) => Some(String::from_utf8_lossy(value).into_owned()),
        ValueRef::Blob(value) => Some(format!("<{} bytes>", value.len())),
    }
}

fn is_safe_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
}

fn quote_identifier(identifier: &str) -> Result<String> {
    if !is_safe_identifier(identifier) {
        bail!("invalid identifier: {identifier:?}");
    }
    Ok(format!("\"{identifier}\""))
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}
