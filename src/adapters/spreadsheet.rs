//! Spreadsheet document source
//!
//! Reads `.xlsx`, `.xlsm`, `.xls` and `.ods` workbooks through `calamine`.
//! The first row is a header; column A holds the document name and column B
//! the document content.

use crate::domain::{PiiEvalError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

/// File extensions handled by [`read_document_rows`]
pub const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// One data row of the document sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based row number as shown in a spreadsheet application
    pub row_number: usize,
    pub name: String,
    pub content: String,
}

/// True when the path has a spreadsheet extension
pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SPREADSHEET_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read (name, content) rows from a worksheet
///
/// Uses the named sheet when given, otherwise the first one. Completely
/// empty rows are skipped.
///
/// # Errors
///
/// Returns `PiiEvalError::Load` if the workbook cannot be opened or the
/// sheet does not exist.
pub fn read_document_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<SheetRow>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        PiiEvalError::Load(format!(
            "Failed to open spreadsheet {}: {}",
            path.display(),
            e
        ))
    })?;

    let range: Range<Data> = match sheet {
        Some(name) => workbook.worksheet_range(name).map_err(|e| {
            PiiEvalError::Load(format!(
                "Failed to read sheet '{}' in {}: {}",
                name,
                path.display(),
                e
            ))
        })?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| {
                PiiEvalError::Load(format!("Spreadsheet {} has no sheets", path.display()))
            })??,
    };

    Ok(rows_from_range(&range))
}

/// Data rows of `range`, addressed by absolute sheet position
///
/// `calamine` trims leading empty rows and columns from the used range, so
/// sheet row 1 (the header) and columns A/B are looked up by absolute cell
/// position rather than by offset into the range.
fn rows_from_range(range: &Range<Data>) -> Vec<SheetRow> {
    let (Some((first_row, _)), Some((last_row, _))) = (range.start(), range.end()) else {
        return Vec::new();
    };

    (first_row.max(1)..=last_row)
        .filter_map(|row| {
            let name = cell_text(range.get_value((row, 0)));
            let content = cell_text(range.get_value((row, 1)));
            if name.is_empty() && content.is_empty() {
                return None;
            }
            Some(SheetRow {
                row_number: row as usize + 1,
                name,
                content,
            })
        })
        .collect()
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        Some(Data::Empty) | None => String::new(),
        Some(value) => value.to_string().trim().to_string(),
    }
}
