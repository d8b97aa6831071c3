use crate::spreadsheet::reference::index_to_reference;
use crate::table::Value;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;

/// Types of cell data in a worksheet.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Literal text, escapes and bracketed sections (colors, locales) are ignored.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_bracket = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }

    fn is_1904(&self) -> bool {
        matches!(
            self,
            Self::NumberDateTime1904 | Self::NumberDate1904 | Self::NumberTime1904
        )
    }
}

/// Represents a single cell in a worksheet with position, type, and raw value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as string; shared strings are already resolved
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Converts the raw cell into a table value.
    ///
    /// Date serials become [`Value::Date`] when they carry no time of day; datetimes and
    /// times render as ISO-like text. Numbers that fail to parse are kept as text.
    pub(crate) fn to_value(&self) -> Value {
        match self.kind {
            CellType::Empty => Value::Empty,
            CellType::Boolean => Value::Text(if self.value == "1" { "TRUE" } else { "FALSE" }.to_owned()),
            CellType::Number => match self.value.trim().parse::<f64>() {
                Ok(number) => Value::Number(number),
                Err(_) => Value::Text(self.value.to_owned()),
            },
            CellType::NumberDate1900 | CellType::NumberDate1904
            | CellType::NumberDateTime1900 | CellType::NumberDateTime1904 => {
                match serial_to_datetime(&self.value, self.kind.is_1904()) {
                    Some(datetime) if datetime.time() == chrono::NaiveTime::MIN => Value::Date(datetime.date()),
                    Some(datetime) => Value::Text(datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
                    None => Value::Text(self.value.to_owned()),
                }
            }
            CellType::NumberTime1900 | CellType::NumberTime1904 => {
                match serial_to_datetime(&self.value, self.kind.is_1904()) {
                    Some(datetime) => Value::Text(datetime.format("%H:%M:%S").to_string()),
                    None => Value::Text(self.value.to_owned()),
                }
            }
            CellType::IsoDateTime => iso_to_value(&self.value),
            CellType::InlineString | CellType::SharedString | CellType::Error => {
                Value::Text(self.value.to_owned())
            }
        }
    }
}

/// First serial past 9999-12-31 in the 1900 date system
const MAX_DATE_SERIAL: f64 = 2_958_466.0;

/// Converts an Excel date serial to a timestamp.
/// Handles the Lotus 1-2-3 leap year bug for the 1900 epoch.
fn serial_to_datetime(value: &str, is_1904: bool) -> Option<NaiveDateTime> {
    let serial = value.trim().parse::<f64>().ok()?;
    // Excel stops at 9999-12-31; larger serials display as "####"
    if !serial.is_finite() || !(0.0..MAX_DATE_SERIAL).contains(&serial) {
        return None;
    }
    let days = serial.trunc() as i64;
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let milliseconds = (serial.fract() * 86_400_000f64).round() as i64;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let delta = Duration::try_days(days.checked_add(offset)?)?
        .checked_add(&Duration::try_milliseconds(milliseconds)?)?;
    epoch.checked_add_signed(delta)
}

/// Converts an ISO 8601 date or datetime string (cell type "d") to a value.
fn iso_to_value(value: &str) -> Value {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Value::Date(date);
    }
    match NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(datetime) if datetime.time() == chrono::NaiveTime::MIN => Value::Date(datetime.date()),
        Ok(datetime) => Value::Text(datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
        Err(_) => Value::Text(value.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell {
            row: 0,
            col: 0,
            kind,
            value: value.to_owned(),
        }
    }

    fn date(year: i32, month: u32, day: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    #[test]
    fn custom_number_formats() {
        assert_eq!(CellType::parse_custom_number_format("dd/mm/yyyy", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("dd/mm/yyyy hh:mm", true), CellType::NumberDateTime1904);
        assert_eq!(CellType::parse_custom_number_format("hh:mm:ss", false), CellType::NumberTime1900);
        assert_eq!(CellType::parse_custom_number_format("#,##0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("\"days\" 0", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[Red]0.00", false), CellType::Number);
    }

    #[test]
    fn builtin_number_formats() {
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate1900));
        assert_eq!(CellType::parse_builtin_number_format_id("22", true), Some(CellType::NumberDateTime1904));
        assert_eq!(CellType::parse_builtin_number_format_id("0", false), None);
    }

    #[test]
    fn date_serials() {
        assert_eq!(cell(CellType::NumberDate1900, "45356").to_value(), date(2024, 3, 5));
        assert_eq!(cell(CellType::NumberDate1900, "1").to_value(), date(1900, 1, 1));
        assert_eq!(cell(CellType::NumberDate1904, "0").to_value(), date(1904, 1, 1));
        assert_eq!(
            cell(CellType::NumberDateTime1900, "45356.5").to_value(),
            Value::from("2024-03-05 12:00:00")
        );
        assert_eq!(cell(CellType::NumberTime1900, "0.75").to_value(), Value::from("18:00:00"));
        assert_eq!(cell(CellType::NumberDate1900, "n/a").to_value(), Value::from("n/a"));
    }

    #[test]
    fn out_of_range_serials_keep_raw_text() {
        assert_eq!(cell(CellType::NumberDate1900, "1e20").to_value(), Value::from("1e20"));
        assert_eq!(cell(CellType::NumberDateTime1904, "9.2e18").to_value(), Value::from("9.2e18"));
        assert_eq!(cell(CellType::NumberTime1900, "3000000").to_value(), Value::from("3000000"));
        assert_eq!(cell(CellType::NumberDate1900, "-1").to_value(), Value::from("-1"));
        assert_eq!(cell(CellType::NumberDate1900, "2958465").to_value(), date(9999, 12, 31));
    }

    #[test]
    fn scalar_cells() {
        assert_eq!(cell(CellType::Number, "123").to_value(), Value::Number(123.0));
        assert_eq!(cell(CellType::Number, "1.5E-3").to_value(), Value::Number(0.0015));
        assert_eq!(cell(CellType::Boolean, "1").to_value(), Value::from("TRUE"));
        assert_eq!(cell(CellType::Error, "#N/A").to_value(), Value::from("#N/A"));
        assert_eq!(cell(CellType::SharedString, "Ali").to_value(), Value::from("Ali"));
        assert_eq!(cell(CellType::Empty, "").to_value(), Value::Empty);
    }

    #[test]
    fn iso_cells() {
        assert_eq!(cell(CellType::IsoDateTime, "2024-03-05").to_value(), date(2024, 3, 5));
        assert_eq!(cell(CellType::IsoDateTime, "2024-03-05T00:00:00").to_value(), date(2024, 3, 5));
        assert_eq!(
            cell(CellType::IsoDateTime, "2024-03-05T08:30:00").to_value(),
            Value::from("2024-03-05 08:30:00")
        );
    }

    #[test]
    fn reference_of_cell() {
        let cell = Cell { row: 4, col: 1, kind: CellType::Number, value: "1".to_owned() };
        assert_eq!(cell.reference(), "B5");
    }
}
