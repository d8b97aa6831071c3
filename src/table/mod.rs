//! # Tables
//!
//! In-memory representation of one worksheet: ordered column names and ordered rows,
//! each row holding exactly one [`Value`] per column. Tables are built by the loader,
//! published into the [`TableStore`] and never mutated after publication.
use chrono::NaiveDate;
use std::fmt::Display;

pub mod store;

pub use store::TableStore;

/// A single cell value after loading.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Missing cell, rendered as the empty string
    #[default]
    Empty,
    /// Text value
    Text(String),
    /// Numeric value
    Number(f64),
    /// Calendar date
    Date(NaiveDate),
}

impl Value {
    /// Returns true for missing cells and blank text.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Renders the value as text and trims it.
    pub fn to_trimmed_text(&self) -> Value {
        Value::Text(self.to_string().trim().to_owned())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Text(text) => write!(f, "{}", text),
            // Whole numbers read from a workbook print without a trailing ".0"
            Value::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                write!(f, "{}", *number as i64)
            }
            Value::Number(number) => write!(f, "{}", number),
            Value::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

/// An ordered sequence of rows sharing one column set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// A borrowed view of one table row.
#[derive(Copy, Clone, Debug)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl Table {
    /// Creates a table with the given columns and no rows.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates a table from columns and rows, padding or truncating rows to the column count.
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Appends a row; missing trailing cells become [`Value::Empty`].
    pub fn push_row(&mut self, mut values: Vec<Value>) {
        values.resize(self.columns.len(), Value::Empty);
        self.rows.push(values);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// A table with zero rows is treated as "unavailable" by every consumer.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates rows in their original order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    /// Rows whose value in `column` equals `needle` after trimming both sides.
    pub fn rows_matching<'a>(&'a self, column: usize, needle: &'a str) -> impl Iterator<Item = Row<'a>> + 'a {
        let needle = needle.trim();
        self.rows()
            .filter(move |row| row.values[column].to_string().trim() == needle)
    }

    /// Converts every value of a column to trimmed text. Does nothing if the column is absent.
    pub fn normalize_text_column(&mut self, name: &str) {
        if let Some(index) = self.column_index(name) {
            for row in &mut self.rows {
                row[index] = row[index].to_trimmed_text();
            }
        }
    }
}

impl<'a> Row<'a> {
    /// Value of a named column, or None if the table has no such column.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|column| column == name)
            .map(|index| &self.values[index])
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn rows_share_column_set() {
        let table = Table::with_rows(
            columns(&["a", "b", "c"]),
            vec![vec!["1".into()], vec!["1".into(), "2".into(), "3".into(), "4".into()]],
        );
        assert_eq!(table.len(), 2);
        for row in table.rows() {
            assert_eq!(row.values().len(), 3);
        }
        assert_eq!(table.rows().next().unwrap().get("c"), Some(&Value::Empty));
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Empty.to_string(), "");
        assert_eq!(Value::Number(123.0).to_string(), "123");
        assert_eq!(Value::Number(12.5).to_string(), "12.5");
        assert_eq!(Value::Number(-4.0).to_string(), "-4");
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2024-03-05");
    }

    #[test]
    fn normalize_text_column_trims_and_stringifies() {
        let mut table = Table::with_rows(
            columns(&["key", "other"]),
            vec![
                vec![Value::Number(123.0), Value::Number(1.0)],
                vec![" 77 ".into(), Value::Empty],
                vec![Value::Empty, Value::Empty],
            ],
        );
        table.normalize_text_column("key");
        let keys: Vec<&Value> = table.rows().map(|row| row.get("key").unwrap()).collect();
        assert_eq!(keys, vec![&Value::from("123"), &Value::from("77"), &Value::from("")]);
        assert_eq!(table.rows().next().unwrap().get("other"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn rows_matching_uses_trimmed_exact_match() {
        let table = Table::with_rows(
            columns(&["supplier"]),
            vec![vec!["A ".into()], vec!["AB".into()], vec!["A".into()]],
        );
        assert_eq!(table.rows_matching(0, "A").count(), 2);
        assert_eq!(table.rows_matching(0, "B").count(), 0);
    }

    #[test]
    fn missing_column_lookup() {
        let table = Table::with_rows(columns(&["a"]), vec![vec!["x".into()]]);
        assert!(!table.has_column("b"));
        assert!(table.rows().next().unwrap().get("b").is_none());
    }
}
