//! # Data Loader
//!
//! Fetches a workbook from a local path or an HTTP(S) URL, reads one named sheet and
//! turns it into a [`Table`]. Failures never escape [`TableLoader::load`]: they are
//! logged and an empty table is returned, which every consumer treats as "data
//! unavailable".
use crate::error::BotError;
use crate::helpers::reader::SourceReader;
use crate::spreadsheet::xlsx::XlsxWorkbook;
use crate::table::Table;
use std::time::Duration;
use thiserror::Error;

/// Loading a sheet failed; the loader recovers from this by returning an empty table.
#[derive(Error, Debug)]
#[error("Load sheet '{sheet}' from '{location}' failed: {cause}")]
pub struct LoadError {
    pub location: String,
    pub sheet: String,
    #[source]
    pub cause: BotError,
}

/// Something that can produce a fresh table for a sheet.
pub trait TableLoader: Send + Sync {
    /// Loads `sheet` from `location`, normalizing `key_column` to trimmed text.
    /// Returns an empty table on any failure.
    fn load(&self, location: &str, sheet: &str, key_column: &str) -> Table;
}

/// Loads tables from `.xlsx` workbooks using a blocking HTTP client for remote sources.
pub struct DataLoader {
    client: reqwest::blocking::Client,
}

impl DataLoader {
    /// Creates a loader whose remote fetches give up after `timeout`.
    ///
    /// Must not be called from inside an async context; the blocking client owns its own runtime.
    pub fn new(timeout: Duration) -> Result<Self, BotError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("permit-bot/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Loads a sheet, reporting why it failed.
    ///
    /// # Arguments
    ///
    /// * `location` - Local path or HTTP(S) URL of the workbook
    /// * `sheet` - Name of the worksheet tab to read
    /// * `key_column` - Column whose values are normalized to trimmed text, if present
    pub fn try_load(&self, location: &str, sheet: &str, key_column: &str) -> Result<Table, LoadError> {
        self.read_table(location, sheet, key_column)
            .map_err(|cause| LoadError {
                location: location.to_owned(),
                sheet: sheet.to_owned(),
                cause,
            })
    }

    fn read_table(&self, location: &str, sheet: &str, key_column: &str) -> Result<Table, BotError> {
        if SourceReader::is_remote_url(location) {
            log::info!("Downloading workbook from {}", location);
        } else {
            log::info!("Reading workbook from local file {}", location);
        }
        let reader = SourceReader::open(location, &self.client)?;
        let mut workbook = XlsxWorkbook::open(reader)?;
        let cells = workbook.read_sheet(sheet)?;
        if cells.is_empty() {
            log::debug!("Sheet '{}' has no cells", cells.name);
        }
        let mut table = cells.into_table();
        table.normalize_text_column(key_column);
        Ok(table)
    }
}

impl TableLoader for DataLoader {
    fn load(&self, location: &str, sheet: &str, key_column: &str) -> Table {
        match self.try_load(location, sheet, key_column) {
            Ok(table) => {
                log::info!("Loaded {} rows from sheet '{}'", table.len(), sheet);
                table
            }
            Err(error) => {
                log::warn!("{}", error);
                Table::default()
            }
        }
    }
}
