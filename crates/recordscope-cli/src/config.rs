// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use recordscope_app::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_DEBOUNCE: &str = "300ms";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub fetch: Fetch,
    #[serde(default)]
    pub search: Search,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            fetch: Fetch::default(),
            search: Search::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fetch {
    pub page_size: Option<i64>,
}

impl Default for Fetch {
    fn default() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE as i64),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
    pub debounce: Option<String>,
}

impl Default for Search {
    fn default() -> Self {
        Self {
            debounce: Some(DEFAULT_DEBOUNCE.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("RECORDSCOPE_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!(
                "cannot resolve config directory; set RECORDSCOPE_CONFIG_PATH to the config file"
            )
        })?;

        let app_dir = config_root.join(recordscope_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [storage], [fetch], and [search]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            recordscope_db::validate_db_path(db_path)?;
        }

        if let Some(page_size) = self.fetch.page_size
            && !(1..=recordscope_db::MAX_PAGE_SIZE as i64).contains(&page_size)
        {
            bail!(
                "fetch.page_size in {} must be between 1 and {}, got {}",
                path.display(),
                recordscope_db::MAX_PAGE_SIZE,
                page_size
            );
        }

        if let Some(debounce) = &self.search.debounce {
            parse_duration(debounce)
                .with_context(|| format!("search.debounce in {}", path.display()))?;
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => recordscope_db::default_db_path(),
        }
    }

    pub fn page_size(&self) -> usize {
        self.fetch
            .page_size
            .and_then(|size| usize::try_from(size).ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn search_debounce(&self) -> Result<Duration> {
        parse_duration(self.search.debounce.as_deref().unwrap_or(DEFAULT_DEBOUNCE))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# recordscope config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/recordscope/records.db)\n# db_path = \"/absolute/path/to/records.db\"\n\n[fetch]\n# Rows read per fetch, 1..={}\npage_size = {}\n\n[search]\n# Quiet time before an interactive search runs\ndebounce = \"{}\"\n",
            path.display(),
            recordscope_db::MAX_PAGE_SIZE,
            DEFAULT_PAGE_SIZE,
            DEFAULT_DEBOUNCE,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 300ms or 1s)")
}
