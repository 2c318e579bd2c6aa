use std::{fs, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use shared::options::{parse_flag, GridOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub grid: GridOptions,
    pub viewport_height: u32,
    pub columns: u32,
    pub row_height: u32,
    pub history: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid: GridOptions::default(),
            viewport_height: 900,
            columns: 3,
            row_height: 320,
            history: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    viewport_height: Option<u32>,
    columns: Option<u32>,
    row_height: Option<u32>,
    history: Option<bool>,
    grid: Option<GridOptions>,
}

/// Defaults, then `path` if it exists, then `GRIDCTL__*` environment variables.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        merge_file_settings(&mut settings, &raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?;
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;

    settings
        .grid
        .validate()
        .context("grid options failed validation")?;
    Ok(settings)
}

pub(crate) fn merge_file_settings(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file_cfg.viewport_height {
        settings.viewport_height = v;
    }
    if let Some(v) = file_cfg.columns {
        settings.columns = v;
    }
    if let Some(v) = file_cfg.row_height {
        settings.row_height = v;
    }
    if let Some(v) = file_cfg.history {
        settings.history = v;
    }
    if let Some(grid) = file_cfg.grid {
        settings.grid = grid;
    }
    Ok(())
}

pub(crate) fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("GRIDCTL__PAGINATE") {
        settings.grid.paginate = parse_env_flag("GRIDCTL__PAGINATE", &v)?;
    }
    if let Some(v) = lookup("GRIDCTL__IS_HOME") {
        settings.grid.is_home = parse_env_flag("GRIDCTL__IS_HOME", &v)?;
    }
    if let Some(v) = lookup("GRIDCTL__HISTORY") {
        settings.history = parse_env_flag("GRIDCTL__HISTORY", &v)?;
    }
    if let Some(v) = lookup("GRIDCTL__PAGE_URL") {
        settings.grid.page_url = v;
    }
    if let Some(v) = lookup("GRIDCTL__FINISHED_MESSAGE") {
        settings.grid.finished_message = v;
    }
    if let Some(v) = lookup("GRIDCTL__SEARCH_DEBOUNCE_MS") {
        settings.grid.search_debounce_ms = v
            .trim()
            .parse()
            .with_context(|| format!("GRIDCTL__SEARCH_DEBOUNCE_MS must be a number, got '{v}'"))?;
    }
    if let Some(v) = lookup("GRIDCTL__VIEWPORT_HEIGHT") {
        settings.viewport_height = v
            .trim()
            .parse()
            .with_context(|| format!("GRIDCTL__VIEWPORT_HEIGHT must be a number, got '{v}'"))?;
    }
    Ok(())
}

fn parse_env_flag(key: &str, raw: &str) -> anyhow::Result<bool> {
    match parse_flag(raw) {
        Some(flag) => Ok(flag),
        None => bail!("{key} must be yes/no, got '{raw}'"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
