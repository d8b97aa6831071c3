//! Command line and environment configuration.
use crate::lookup::LookupSettings;
use crate::refresh::TrackedSheet;
use crate::report::ReportSettings;
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Clone, Debug)]
#[command(name = "permit-bot")]
#[command(about = "Telegram bot answering permit lookups and supplier reports from a spreadsheet", long_about = None)]
#[command(version)]
pub struct Config {
    /// Telegram bot token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Workbook location: an http(s) URL or a local path
    #[arg(long, env = "EXCEL_FILE")]
    pub source: String,

    /// Sheet used for permit lookups
    #[arg(long, env = "MAIN_SHEET", default_value = "الادخال")]
    pub main_sheet: String,

    /// Sheet used for supplier reports
    #[arg(long, env = "REPORT_SHEET", default_value = "التقرير")]
    pub report_sheet: String,

    /// Column matched against lookup queries
    #[arg(long, env = "LOOKUP_COLUMN", default_value = "رقم الاذن")]
    pub lookup_column: String,

    /// Columns shown in a lookup reply, in order
    #[arg(
        long,
        env = "DISPLAY_COLUMNS",
        value_delimiter = ',',
        default_value = "العميل,المشروع,رقم الطلب,سعر الأذن,المورد,التاريخ"
    )]
    pub display_columns: Vec<String>,

    /// Column rendered as a DD-MM-YYYY date
    #[arg(long, env = "DATE_COLUMN", default_value = "التاريخ")]
    pub date_column: String,

    /// Column holding the supplier of a report row
    #[arg(long, env = "GROUP_COLUMN", default_value = "المورد")]
    pub group_column: String,

    /// Suppliers that get a report, in order
    #[arg(long, env = "REPORT_GROUPS", value_delimiter = ',')]
    pub report_groups: Vec<String>,

    /// Seconds between timed refreshes
    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_interval_secs: u64,

    /// Seconds before a workbook download is abandoned
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 20, value_parser = clap::value_parser!(u64).range(1..))]
    pub fetch_timeout_secs: u64,

    /// Long-poll timeout for Telegram updates, in seconds
    #[arg(long, env = "POLL_TIMEOUT_SECS", default_value_t = 30)]
    pub poll_timeout_secs: u64,

    /// Telegram Bot API root
    #[arg(long, env = "TELEGRAM_API_URL", default_value = "https://api.telegram.org")]
    pub api_url: String,
}

impl Config {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    /// Sheets reloaded by every refresh, each with the column normalized to text.
    pub fn tracked_sheets(&self) -> Vec<TrackedSheet> {
        vec![
            TrackedSheet::new(&self.main_sheet, &self.lookup_column),
            TrackedSheet::new(&self.report_sheet, &self.group_column),
        ]
    }

    pub fn lookup_settings(&self) -> LookupSettings {
        LookupSettings {
            sheet: self.main_sheet.clone(),
            key_column: self.lookup_column.clone(),
            display_columns: clean_list(&self.display_columns),
            date_column: self.date_column.clone(),
        }
    }

    pub fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            sheet: self.report_sheet.clone(),
            group_column: self.group_column.clone(),
            groups: clean_list(&self.report_groups),
            date_column: self.date_column.clone(),
        }
    }
}

/// Trims comma-separated entries and drops blank ones.
fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["permit-bot", "--token", "1:x", "--source", "data.xlsx"]).unwrap();
        assert_eq!(config.main_sheet, "الادخال");
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(20));

        let lookup = config.lookup_settings();
        assert_eq!(lookup.key_column, "رقم الاذن");
        assert_eq!(
            lookup.display_columns,
            vec!["العميل", "المشروع", "رقم الطلب", "سعر الأذن", "المورد", "التاريخ"]
        );
        assert!(config.report_settings().groups.is_empty());
        assert_eq!(
            config.tracked_sheets(),
            vec![TrackedSheet::new("الادخال", "رقم الاذن"), TrackedSheet::new("التقرير", "المورد")]
        );
    }

    #[test]
    fn comma_separated_lists_are_trimmed() {
        let config = Config::try_parse_from([
            "permit-bot",
            "--token", "1:x",
            "--source", "data.xlsx",
            "--report-groups", " A , B ,, C",
            "--display-columns", "العميل, التاريخ",
        ])
        .unwrap();
        assert_eq!(config.report_settings().groups, vec!["A", "B", "C"]);
        assert_eq!(config.lookup_settings().display_columns, vec!["العميل", "التاريخ"]);
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        let result = Config::try_parse_from([
            "permit-bot",
            "--token", "1:x",
            "--source", "data.xlsx",
            "--refresh-interval-secs", "0",
        ]);
        assert!(result.is_err());
    }
}
