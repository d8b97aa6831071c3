use crate::spreadsheet::cell::Cell;
use crate::table::Table;
use crate::table::Value;
use std::collections::HashMap;
use std::collections::HashSet;

/// Cells read from one worksheet, in the order they appear in the worksheet XML.
pub(crate) struct Sheet {
    /// Sheet name
    pub(crate) name: String,
    /// All non-empty cells in the sheet
    pub(crate) cells: Vec<Cell>,
    /// Actual data range (determined from cell data)
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    /// Returns true if the sheet contains no cells.
    pub(crate) fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Adds a cell to the sheet, updating the data range.
    pub(super) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    /// Updates the actual data range boundaries based on cell positions.
    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|lower| row < lower).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|upper| upper < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|lower| col < lower).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|upper| upper < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Builds a table from the sheet.
    ///
    /// The first non-empty row is the header. Blank header cells are named
    /// `Unnamed: <index>` and repeated names get a `.1`, `.2` suffix. Data rows that
    /// contain no value at all are skipped; every other missing cell becomes
    /// [`Value::Empty`].
    pub(crate) fn into_table(self) -> Table {
        let (Some(header_row), Some(row_upper), Some(col_lower), Some(col_upper)) = (
            self.row_lower_bound,
            self.row_upper_bound,
            self.col_lower_bound,
            self.col_upper_bound,
        ) else {
            return Table::default();
        };
        let width = col_upper - col_lower + 1;

        let mut grid: HashMap<usize, Vec<Value>> = HashMap::new();
        for cell in &self.cells {
            let value = cell.to_value();
            if value == Value::Empty {
                continue;
            }
            let row = grid.entry(cell.row).or_insert_with(|| vec![Value::Empty; width]);
            row[cell.col - col_lower] = value;
        }

        let header = grid.remove(&header_row).unwrap_or_else(|| vec![Value::Empty; width]);
        let mut table = Table::new(header_names(header));
        for row in (header_row + 1)..=row_upper {
            if let Some(values) = grid.remove(&row) {
                if values.iter().any(|value| !value.is_blank()) {
                    table.push_row(values);
                }
            }
        }
        table
    }
}

/// Turns header cells into unique column names.
fn header_names(header: Vec<Value>) -> Vec<String> {
    let mut seen = HashSet::<String>::new();
    header
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let name = value.to_string().trim().to_owned();
            let base = if name.is_empty() {
                format!("Unnamed: {}", index)
            } else {
                name
            };
            let mut candidate = base.clone();
            let mut suffix = 0usize;
            while seen.contains(&candidate) {
                suffix += 1;
                candidate = format!("{}.{}", base, suffix);
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}
