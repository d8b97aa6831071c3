//! Print-ready `.xlsx` layout for one supplier report.
use crate::error::BotError;
use crate::lookup::format_value;
use crate::table::Row;
use crate::table::Value;
use rust_xlsxwriter::Format;
use rust_xlsxwriter::FormatAlign;
use rust_xlsxwriter::FormatBorder;
use rust_xlsxwriter::Workbook;
use rust_xlsxwriter::Worksheet;

const SHEET_NAME: &str = "Report";

/// Paper size code for A4 in the Excel page setup
const PAPER_A4: u8 = 9;

const MIN_COLUMN_WIDTH: usize = 8;
const MAX_COLUMN_WIDTH: usize = 50;

/// Renders the rows of one group into a workbook held in memory.
///
/// # Arguments
/// * `title` - Text of the title row above the table
/// * `columns` - Column names, written as the header row
/// * `rows` - Body rows, written in the given order
/// * `date_column` - Index of the column rendered with the day-first date rule, if any
///
/// # Returns
/// The `.xlsx` file contents
pub(super) fn render_group(title: &str, columns: &[String], rows: &[Row<'_>], date_column: Option<usize>) -> Result<Vec<u8>, BotError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    set_page_layout(worksheet)?;

    let title_format = Format::new()
        .set_bold()
        .set_font_size(14)
        .set_align(FormatAlign::Center);
    let header_format = Format::new()
        .set_bold()
        .set_background_color("#D9D9D9")
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);
    let body_format = Format::new().set_border(FormatBorder::Thin);

    let last_col = columns.len().saturating_sub(1) as u16;
    if last_col > 0 {
        worksheet.merge_range(0, 0, 0, last_col, title, &title_format)?;
    } else {
        worksheet.write_string_with_format(0, 0, title, &title_format)?;
    }

    let mut widths: Vec<usize> = columns.iter().map(|name| name.chars().count()).collect();
    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(1, col as u16, name, &header_format)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_num = (index + 2) as u32;
        for (col, value) in row.values().iter().enumerate() {
            let col_num = col as u16;
            match value {
                Value::Number(number) => {
                    worksheet.write_number_with_format(row_num, col_num, *number, &body_format)?;
                }
                Value::Empty => {
                    worksheet.write_blank(row_num, col_num, &body_format)?;
                }
                other => {
                    let text = format_value(other, date_column == Some(col));
                    widths[col] = widths[col].max(text.chars().count());
                    worksheet.write_string_with_format(row_num, col_num, &text, &body_format)?;
                }
            }
        }
    }

    for (col, width) in widths.into_iter().enumerate() {
        let width = width.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH) + 2;
        worksheet.set_column_width(col as u16, width as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn set_page_layout(worksheet: &mut Worksheet) -> Result<(), BotError> {
    worksheet
        .set_paper_size(PAPER_A4)
        .set_landscape()
        .set_right_to_left(true)
        .set_print_gridlines(true)
        .set_print_fit_to_pages(1, 0)
        .set_header("&R&D")
        .set_footer("&CPage &P of &N");
    // Header row repeats on every printed page
    worksheet.set_repeat_rows(1, 1)?;
    Ok(())
}
