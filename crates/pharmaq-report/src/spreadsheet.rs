//! Spreadsheet export of the report table.

use rust_xlsxwriter::{Format, FormatBorder, Workbook};

use pharmaq_core::types::ReportTable;

use crate::error::ReportError;

/// Name of the single worksheet.
pub const SHEET_NAME: &str = "Consolidated Report";
/// Suggested download file name.
pub const FILE_NAME: &str = "Consolidated_Pharma_Report.xlsx";
/// MIME type of the workbook.
pub const MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
/// Longest string a worksheet cell can hold, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Serialize `table` into an xlsx workbook held in memory.
///
/// One sheet: a header row of column names, then one row per report row in
/// insertion order. Every cell is written as a string.
pub fn to_xlsx(table: &ReportTable) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header_format)?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let excel_row = row_idx as u32 + 1;
        for (col, value) in row.cells().enumerate() {
            let cell = clamp_cell(value);
            if cell.len() < value.len() {
                tracing::warn!(
                    society = %row.society,
                    column = col,
                    chars = value.chars().count(),
                    "Cell exceeds worksheet limit; truncated"
                );
            }
            worksheet.write_string(excel_row, col as u16, cell)?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(rows = table.len(), bytes = bytes.len(), "Report exported to xlsx");
    Ok(bytes)
}

/// Cut `value` to at most [`MAX_CELL_CHARS`] characters on a char boundary.
fn clamp_cell(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}
