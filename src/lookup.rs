//! # Lookup
//!
//! Answers a free-text permit number with the display columns of the first row whose
//! key matches it exactly after trimming.
use crate::messages;
use crate::table::TableStore;
use crate::table::Value;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// Day first: `05/03/2024`, `5-3-2024`, `05.03.24`, optionally followed by a time.
static DAY_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})(?:[ T]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?)?$")
        .expect("Hardcode regex pattern")
});

/// Year first: `2024-03-05`, `2024/3/5`, optionally followed by a time.
static YEAR_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})[/.\-](\d{1,2})[/.\-](\d{1,2})(?:[ T]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?)?$")
        .expect("Hardcode regex pattern")
});

/// Columns and sheet the lookup works on.
#[derive(Clone, Debug)]
pub struct LookupSettings {
    pub sheet: String,
    pub key_column: String,
    pub display_columns: Vec<String>,
    pub date_column: String,
}

/// Result of resolving one query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupOutcome {
    /// `(column, formatted value)` pairs in display order
    Found(Vec<(String, String)>),
    NotFound,
    /// The table is empty, either never loaded or the last load failed
    Unavailable,
    /// The key column is absent from a loaded table
    MissingColumn(String),
}

impl LookupOutcome {
    pub fn into_reply(self) -> String {
        match self {
            LookupOutcome::Found(fields) => fields
                .iter()
                .map(|(column, value)| format!("{}: {}", column, value))
                .collect::<Vec<_>>()
                .join("\n"),
            LookupOutcome::NotFound => messages::NOT_FOUND.to_owned(),
            LookupOutcome::Unavailable => messages::DATA_UNAVAILABLE.to_owned(),
            LookupOutcome::MissingColumn(column) => messages::missing_column(&column),
        }
    }
}

pub struct LookupEngine {
    store: Arc<TableStore>,
    settings: LookupSettings,
}

impl LookupEngine {
    pub fn new(store: Arc<TableStore>, settings: LookupSettings) -> Self {
        Self { store, settings }
    }

    /// Reply for a query, or None when the trimmed query is empty.
    pub fn lookup(&self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        Some(self.resolve(query).into_reply())
    }

    /// Resolves a query against the table currently published for the lookup sheet.
    pub fn resolve(&self, query: &str) -> LookupOutcome {
        let table = self.store.get(&self.settings.sheet);
        if table.is_empty() {
            return LookupOutcome::Unavailable;
        }
        let Some(key_index) = table.column_index(&self.settings.key_column) else {
            log::error!(
                "Lookup column '{}' not found in sheet '{}', columns: {:?}",
                self.settings.key_column,
                self.settings.sheet,
                table.columns()
            );
            return LookupOutcome::MissingColumn(self.settings.key_column.clone());
        };
        let Some(row) = table.rows_matching(key_index, query).next() else {
            return LookupOutcome::NotFound;
        };
        let fields: Vec<(String, String)> = self
            .settings
            .display_columns
            .iter()
            .filter_map(|column| {
                row.get(column).map(|value| {
                    let is_date = *column == self.settings.date_column;
                    (column.clone(), format_value(value, is_date))
                })
            })
            .collect();
        if fields.is_empty() {
            log::error!(
                "None of the display columns {:?} found in sheet '{}', columns: {:?}",
                self.settings.display_columns,
                self.settings.sheet,
                table.columns()
            );
            return LookupOutcome::MissingColumn(self.settings.display_columns.join("، "));
        }
        LookupOutcome::Found(fields)
    }
}

/// Renders a cell for display. Date columns use `DD-MM-YYYY` when the value parses as a date.
pub fn format_value(value: &Value, is_date_column: bool) -> String {
    if is_date_column {
        let date = match value {
            Value::Date(date) => Some(*date),
            Value::Text(text) => parse_day_first(text),
            _ => None,
        };
        if let Some(date) = date {
            return date.format("%d-%m-%Y").to_string();
        }
    }
    value.to_string()
}

/// Parses a date written day first, falling back to month first when the day-first
/// reading is not a valid calendar date. Year-first ISO forms are accepted as well.
/// Any time of day is ignored.
pub fn parse_day_first(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Some(captures) = YEAR_FIRST.captures(text) {
        let year = captures[1].parse().ok()?;
        let month = captures[2].parse().ok()?;
        let day = captures[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    let captures = DAY_FIRST.captures(text)?;
    let first: u32 = captures[1].parse().ok()?;
    let second: u32 = captures[2].parse().ok()?;
    let year = expand_year(&captures[3])?;
    NaiveDate::from_ymd_opt(year, second, first).or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}

/// Two-digit years below 70 are in the 2000s, the rest in the 1900s.
fn expand_year(text: &str) -> Option<i32> {
    let year: i32 = text.parse().ok()?;
    Some(match text.len() {
        2 if year < 70 => 2000 + year,
        2 => 1900 + year,
        _ => year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;

    const KEY: &str = "رقم الاذن";
    const CLIENT: &str = "العميل";
    const DATE: &str = "التاريخ";

    fn engine(table: Table, display: &[&str]) -> LookupEngine {
        let store = Arc::new(TableStore::new());
        store.publish("main", table);
        LookupEngine::new(
            store,
            LookupSettings {
                sheet: "main".to_owned(),
                key_column: KEY.to_owned(),
                display_columns: display.iter().map(|it| it.to_string()).collect(),
                date_column: DATE.to_owned(),
            },
        )
    }

    fn sample() -> Table {
        Table::with_rows(
            vec![KEY.to_owned(), CLIENT.to_owned(), DATE.to_owned()],
            vec![
                vec!["123".into(), "Ali".into(), "05/03/2024".into()],
                vec!["124".into(), "Omar".into(), "not a date".into()],
                vec!["123".into(), "Second".into(), Value::Empty],
            ],
        )
    }

    #[test]
    fn lookup_formats_display_columns() {
        let engine = engine(sample(), &[CLIENT, DATE]);
        assert_eq!(engine.lookup("123").unwrap(), "العميل: Ali\nالتاريخ: 05-03-2024");
    }

    #[test]
    fn lookup_trims_query_and_skips_absent_columns() {
        let engine = engine(sample(), &["المشروع", CLIENT, DATE]);
        assert_eq!(engine.lookup("  124 ").unwrap(), "العميل: Omar\nالتاريخ: not a date");
    }

    #[test]
    fn empty_query_gets_no_reply() {
        let engine = engine(sample(), &[CLIENT]);
        assert_eq!(engine.lookup(""), None);
        assert_eq!(engine.lookup("   \n"), None);
    }

    #[test]
    fn unknown_key_is_not_found() {
        let engine = engine(sample(), &[CLIENT]);
        assert_eq!(engine.resolve("999"), LookupOutcome::NotFound);
        assert_eq!(engine.lookup("999").unwrap(), messages::NOT_FOUND);
    }

    #[test]
    fn empty_table_is_unavailable() {
        let engine = engine(Table::default(), &[CLIENT]);
        assert_eq!(engine.lookup("123").unwrap(), messages::DATA_UNAVAILABLE);

        let headers_only = Table::new(vec![KEY.to_owned()]);
        let engine = self::engine(headers_only, &[CLIENT]);
        assert_eq!(engine.resolve("123"), LookupOutcome::Unavailable);
    }

    #[test]
    fn missing_key_column_names_the_column() {
        let table = Table::with_rows(vec![CLIENT.to_owned()], vec![vec!["Ali".into()]]);
        let engine = engine(table, &[CLIENT]);
        assert_eq!(engine.resolve("123"), LookupOutcome::MissingColumn(KEY.to_owned()));
        assert_eq!(engine.lookup("123").unwrap(), "❌ مش لاقي العمود 'رقم الاذن'.");
    }

    #[test]
    fn absent_display_columns_are_reported() {
        let engine = engine(sample(), &["المشروع", "الكمية"]);
        assert_eq!(engine.resolve("123"), LookupOutcome::MissingColumn("المشروع، الكمية".to_owned()));
        assert_eq!(engine.lookup("123").unwrap(), messages::missing_column("المشروع، الكمية"));
    }

    #[test]
    fn lookup_is_deterministic() {
        let engine = engine(sample(), &[CLIENT, DATE]);
        let first = engine.lookup("123");
        for _ in 0..10 {
            assert_eq!(engine.lookup("123"), first);
        }
    }

    #[test]
    fn date_values_and_text_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_value(&Value::Date(date), true), "05-03-2024");
        assert_eq!(format_value(&Value::Date(date), false), "2024-03-05");
        assert_eq!(format_value(&"5-3-2024".into(), true), "05-03-2024");
        assert_eq!(format_value(&"05.03.24".into(), true), "05-03-2024");
        assert_eq!(format_value(&"2024-03-05 14:30:00".into(), true), "05-03-2024");
        assert_eq!(format_value(&"2024/03/05".into(), true), "05-03-2024");
        assert_eq!(format_value(&"05/03/2024".into(), false), "05/03/2024");
        assert_eq!(format_value(&Value::Empty, true), "");
        assert_eq!(format_value(&Value::Number(45356.0), true), "45356");
    }

    #[test]
    fn unparsable_dates_keep_raw_text() {
        assert_eq!(format_value(&"قريبا".into(), true), "قريبا");
        assert_eq!(format_value(&"32/13/2024".into(), true), "32/13/2024");
        assert_eq!(parse_day_first("2024-02-30"), None);
    }

    #[test]
    fn day_first_falls_back_to_month_first() {
        assert_eq!(parse_day_first("03/25/2024"), NaiveDate::from_ymd_opt(2024, 3, 25));
        assert_eq!(parse_day_first("03/04/2024"), NaiveDate::from_ymd_opt(2024, 4, 3));
    }

    #[test]
    fn two_digit_years() {
        assert_eq!(parse_day_first("01/01/69"), NaiveDate::from_ymd_opt(2069, 1, 1));
        assert_eq!(parse_day_first("01/01/70"), NaiveDate::from_ymd_opt(1970, 1, 1));
    }

    #[test]
    fn formatted_dates_parse_back() {
        let mut date = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
        for _ in 0..400 {
            let rendered = format_value(&Value::Date(date), true);
            assert_eq!(parse_day_first(&rendered), Some(date));
            date = date.succ_opt().unwrap();
        }
    }
}
