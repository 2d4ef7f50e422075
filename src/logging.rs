use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::config;

/// The terminal belongs to the UI, so log records go to a file.
pub fn resolve_log_file(cli_file: Option<PathBuf>) -> Result<PathBuf> {
    match cli_file {
        Some(path) if !path.as_os_str().is_empty() => Ok(path),
        _ => Ok(config::default_data_dir()?.join("bitsearch.log")),
    }
}

pub fn init(path: &Path, level: LevelFilter) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log dir: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file: {}", path.display()))?;
    let config = ConfigBuilder::new()
        .add_filter_allow_str("bitsearch")
        .set_time_format_rfc3339()
        .build();
    WriteLogger::init(level, config, file).context("logger already initialised")
}
