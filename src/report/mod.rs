//! # Supplier Reports
//!
//! Splits the report sheet by supplier and renders one printable document per configured
//! supplier. Documents only ever touch the filesystem inside [`deliver_transient`], which
//! removes the file again whether or not delivery succeeded.
use crate::bot::delivery::ChatId;
use crate::bot::delivery::Delivery;
use crate::error::BotError;
use crate::messages;
use crate::table::Row;
use crate::table::TableStore;
use std::io::Write;
use std::sync::Arc;

mod render;

/// Sheet, columns and supplier list a report run works on.
#[derive(Clone, Debug)]
pub struct ReportSettings {
    pub sheet: String,
    pub group_column: String,
    pub groups: Vec<String>,
    pub date_column: String,
}

/// A rendered report ready for delivery.
#[derive(Clone, Debug)]
pub struct ReportDocument {
    pub group: String,
    pub file_name: String,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub enum ReportOutcome {
    /// The report table is empty
    Unavailable,
    /// The grouping column is absent from a loaded table
    MissingColumn(String),
    /// No rows belong to this group
    NoData(String),
    /// Rendering this group failed; other groups are unaffected
    Failed(String, BotError),
    Rendered(ReportDocument),
}

#[derive(Clone)]
pub struct ReportGenerator {
    store: Arc<TableStore>,
    settings: ReportSettings,
}

impl ReportGenerator {
    pub fn new(store: Arc<TableStore>, settings: ReportSettings) -> Self {
        Self { store, settings }
    }

    pub fn groups(&self) -> &[String] {
        &self.settings.groups
    }

    /// Produces one outcome per configured group, in configured order.
    ///
    /// An empty table or a missing grouping column yields that single outcome instead.
    pub fn generate(&self) -> Vec<ReportOutcome> {
        let table = self.store.get(&self.settings.sheet);
        if table.is_empty() {
            return vec![ReportOutcome::Unavailable];
        }
        let Some(group_index) = table.column_index(&self.settings.group_column) else {
            log::error!(
                "Group column '{}' not found in sheet '{}', columns: {:?}",
                self.settings.group_column,
                self.settings.sheet,
                table.columns()
            );
            return vec![ReportOutcome::MissingColumn(self.settings.group_column.clone())];
        };
        let date_index = table.column_index(&self.settings.date_column);

        self.settings
            .groups
            .iter()
            .map(|group| {
                let rows: Vec<Row<'_>> = table.rows_matching(group_index, group).collect();
                if rows.is_empty() {
                    log::info!("No report rows for group '{}'", group);
                    return ReportOutcome::NoData(group.clone());
                }
                let title = format!("تقرير المورد: {}", group.trim());
                match render::render_group(&title, table.columns(), &rows, date_index) {
                    Ok(bytes) => ReportOutcome::Rendered(ReportDocument {
                        group: group.clone(),
                        file_name: file_name(group),
                        rows: rows.len(),
                        bytes,
                    }),
                    Err(e) => {
                        log::error!("Render report for group '{}' failed: {}", group, e);
                        ReportOutcome::Failed(group.clone(), e)
                    }
                }
            })
            .collect()
    }
}

/// File name for a group's document; path separators and control characters become `_`.
pub fn file_name(group: &str) -> String {
    let stem: String = group
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if stem.is_empty() {
        "report.xlsx".to_owned()
    } else {
        format!("{}.xlsx", stem)
    }
}

/// Writes the document to a temporary file, hands its path to `delivery` and removes the
/// file again on every exit path.
pub async fn deliver_transient<D: Delivery + ?Sized>(delivery: &D, chat: ChatId, document: &ReportDocument) -> Result<(), BotError> {
    let mut artifact = tempfile::Builder::new()
        .prefix("report-")
        .suffix(".xlsx")
        .tempfile()?;
    artifact.write_all(&document.bytes)?;
    artifact.flush()?;

    let caption = messages::report_caption(&document.group, document.rows);
    let result = delivery
        .send_document(chat, artifact.path(), &document.file_name, &caption)
        .await;

    if let Err(e) = artifact.close() {
        log::warn!("Remove temporary report for '{}' failed: {}", document.group, e);
    }
    result
}
