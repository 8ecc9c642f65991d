//! # Configuration State
//!
//! Configuration loaded at startup plus the options commands read from it.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command-line flags (`--db`, `--cumulative`)
//! 2. Environment variables (`STOCKBOOK_*`)
//! 3. Config file (`stockbook.toml`)
//! 4. Defaults
//!
//! Read-only after initialization.

use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

use stockbook_auth::StockbookConfig;
use stockbook_core::report::ReportOptions;

use crate::error::ApiError;

/// Application configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigState {
    pub config: StockbookConfig,
    pub report_options: ReportOptions,
}

impl ConfigState {
    pub fn new(config: StockbookConfig) -> Self {
        ConfigState {
            config,
            report_options: ReportOptions::default(),
        }
    }

    pub fn with_report_options(mut self, options: ReportOptions) -> Self {
        self.report_options = options;
        self
    }

    /// Resolves the SQLite file path.
    ///
    /// ## Platform-Specific Paths (relative settings)
    /// - **macOS**: `~/Library/Application Support/com.stockbook.stockbook/`
    /// - **Windows**: `%APPDATA%\stockbook\stockbook\data\`
    /// - **Linux**: `~/.local/share/stockbook/`
    ///
    /// Absolute paths are used as given.
    pub fn database_path(&self) -> Result<PathBuf, ApiError> {
        let configured = &self.config.storage.database_path;
        if configured.is_absolute() {
            return Ok(configured.clone());
        }

        let dirs = ProjectDirs::from("com", "stockbook", "stockbook")
            .ok_or_else(|| ApiError::internal("Could not determine app data directory"))?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .map_err(|e| ApiError::internal(format!("Could not create data directory: {}", e)))?;

        let path = data_dir.join(configured);
        debug!(?path, "Database path resolved");
        Ok(path)
    }
}
