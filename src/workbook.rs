//! Excel workbook I/O for the collection sheet.
//!
//! One sheet holds the collection in a fixed 8-column schema with the
//! header in row 1; cells I1/J1 of the same row are reserved for the
//! "TOTAL VALUE" aggregate and never parsed as row data. All cell
//! coercion happens here, once, at load time.

use std::fs::OpenOptions;
use std::path::Path;
use std::time::Duration;

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;

use crate::error::{CollectionError, Result};
use crate::models::{
    parse_date, parse_flag, parse_quantity, CollectionRow, Price, DATE_FORMAT, NOT_FOUND_LABEL,
};

/// Fixed column schema of the collection sheet.
pub const EXPECTED_COLUMNS: [&str; 8] = [
    "Run",
    "Name",
    "Set",
    "Set #",
    "Quantity",
    "Price",
    "Total Price",
    "Last Updated",
];

/// Label in cell I1 marking the aggregate value in J1.
pub const TOTAL_LABEL: &str = "TOTAL VALUE";

/// Retry policy for acquiring write access to a locked workbook file.
#[derive(Debug, Clone, Copy)]
pub struct LockRetry {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for LockRetry {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(3),
        }
    }
}

/// Load the collection rows from a named sheet.
///
/// Fails before any row is parsed when the sheet is missing or has fewer
/// columns than the schema. Extra columns beyond the schema (including
/// the reserved aggregate cells) are ignored with a warning. Rows with an
/// empty name and any stray legacy "TOTAL VALUE" row are skipped.
pub fn load_sheet(path: &Path, sheet_name: &str) -> Result<Vec<CollectionRow>> {
    let mut workbook = open_workbook::<Xlsx<_>, _>(path)
        .map_err(|e| CollectionError::WorkbookRead(e.to_string()))?;

    let available = workbook.sheet_names().to_vec();
    if !available.iter().any(|s| s == sheet_name) {
        return Err(CollectionError::SheetNotFound {
            sheet: sheet_name.to_string(),
            available,
        });
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| CollectionError::WorkbookRead(e.to_string()))?;

    let width = range.width();
    if width < EXPECTED_COLUMNS.len() {
        return Err(CollectionError::ColumnMismatch {
            expected: EXPECTED_COLUMNS.len(),
            found: width,
        });
    }
    if width > EXPECTED_COLUMNS.len() {
        log::warn!(
            "Found {} columns but expected {}; using the first {}",
            width,
            EXPECTED_COLUMNS.len(),
            EXPECTED_COLUMNS.len()
        );
    }

    let mut rows = Vec::new();

    for cells in range.rows().skip(1) {
        let name = cell_to_string(cells.get(1));
        if name.is_empty() {
            continue;
        }
        if name.trim().eq_ignore_ascii_case(TOTAL_LABEL) {
            // Legacy layout kept the aggregate in a data row
            continue;
        }

        rows.push(CollectionRow {
            include: cell_to_flag(cells.get(0)),
            name,
            set_code: cell_to_optional_string(cells.get(2)),
            set_number: cell_to_optional_string(cells.get(3)),
            quantity: cell_to_quantity(cells.get(4)),
            price: cell_to_price(cells.get(5)),
            total_price: cell_to_price(cells.get(6)),
            last_updated: cell_to_date(cells.get(7)),
        });
    }

    Ok(rows)
}

/// Write the full row set and the recomputed aggregate back to the sheet.
///
/// The destination file is probed for exclusive write access first,
/// retrying per `lock_retry`; exhausting the retries is fatal. The
/// workbook's other sheets are read back and rewritten in place, so a
/// run only ever replaces the target sheet's data; cell formatting is
/// not carried over.
pub fn save_sheet(
    path: &Path,
    sheet_name: &str,
    rows: &[CollectionRow],
    total_value: f64,
    lock_retry: LockRetry,
) -> Result<()> {
    wait_for_write_access(path, lock_retry)?;

    let existing = read_existing_sheets(path)?;

    let mut workbook = Workbook::new();
    let mut target_written = false;

    for (name, range) in &existing {
        let worksheet = workbook.add_worksheet();
        if name == sheet_name {
            write_collection_sheet(worksheet, sheet_name, rows, total_value)
                .map_err(|e| CollectionError::WorkbookWrite(e.to_string()))?;
            target_written = true;
        } else {
            worksheet
                .set_name(name)
                .map_err(|e| CollectionError::WorkbookWrite(e.to_string()))?;
            copy_sheet_cells(worksheet, range)
                .map_err(|e| CollectionError::WorkbookWrite(e.to_string()))?;
        }
    }

    if !target_written {
        let worksheet = workbook.add_worksheet();
        write_collection_sheet(worksheet, sheet_name, rows, total_value)
            .map_err(|e| CollectionError::WorkbookWrite(e.to_string()))?;
    }

    workbook
        .save(path)
        .map_err(|e| CollectionError::WorkbookWrite(e.to_string()))?;

    log::info!("Wrote {} rows to '{}'", rows.len(), path.display());
    Ok(())
}

/// Read every sheet of an existing workbook, in workbook order. A file
/// that does not exist yet reads as no sheets.
fn read_existing_sheets(path: &Path) -> Result<Vec<(String, calamine::Range<Data>)>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut workbook = open_workbook::<Xlsx<_>, _>(path)
        .map_err(|e| CollectionError::WorkbookRead(e.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names().to_vec() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| CollectionError::WorkbookRead(e.to_string()))?;
        sheets.push((name, range));
    }
    Ok(sheets)
}

fn write_collection_sheet(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    sheet_name: &str,
    rows: &[CollectionRow],
    total_value: f64,
) -> std::result::Result<(), rust_xlsxwriter::XlsxError> {
    worksheet.set_name(sheet_name)?;

    for (col, header) in EXPECTED_COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    // Reserved aggregate cells I1/J1
    worksheet.write_string(0, 8, TOTAL_LABEL)?;
    worksheet.write_number(0, 9, total_value)?;

    for (i, row) in rows.iter().enumerate() {
        write_row(worksheet, (i + 1) as u32, row)?;
    }

    Ok(())
}

/// Rewrite another sheet's cell values verbatim into the fresh workbook.
fn copy_sheet_cells(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    range: &calamine::Range<Data>,
) -> std::result::Result<(), rust_xlsxwriter::XlsxError> {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    for (r, cells) in range.rows().enumerate() {
        for (c, cell) in cells.iter().enumerate() {
            let row_idx = start_row + r as u32;
            let col_idx = (start_col + c as u32) as u16;
            match cell {
                Data::String(s) => {
                    worksheet.write_string(row_idx, col_idx, s.as_str())?;
                }
                Data::Float(f) => {
                    worksheet.write_number(row_idx, col_idx, *f)?;
                }
                Data::Int(i) => {
                    worksheet.write_number(row_idx, col_idx, *i as f64)?;
                }
                Data::Bool(b) => {
                    worksheet.write_boolean(row_idx, col_idx, *b)?;
                }
                Data::DateTime(dt) => {
                    worksheet.write_number(row_idx, col_idx, dt.as_f64())?;
                }
                Data::DateTimeIso(s) | Data::DurationIso(s) => {
                    worksheet.write_string(row_idx, col_idx, s.as_str())?;
                }
                Data::Empty | Data::Error(_) => {}
            }
        }
    }

    Ok(())
}

fn write_row(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    r: u32,
    row: &CollectionRow,
) -> std::result::Result<(), rust_xlsxwriter::XlsxError> {
    worksheet.write_boolean(r, 0, row.include)?;
    worksheet.write_string(r, 1, row.name.as_str())?;
    if let Some(ref set) = row.set_code {
        worksheet.write_string(r, 2, set.as_str())?;
    }
    if let Some(ref cn) = row.set_number {
        worksheet.write_string(r, 3, cn.as_str())?;
    }
    worksheet.write_number(r, 4, row.quantity as f64)?;
    write_price(worksheet, r, 5, row.price)?;
    write_price(worksheet, r, 6, row.total_price)?;
    if let Some(date) = row.last_updated {
        worksheet.write_string(r, 7, date.format(DATE_FORMAT).to_string())?;
    }
    Ok(())
}

fn write_price(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    r: u32,
    col: u16,
    price: Price,
) -> std::result::Result<(), rust_xlsxwriter::XlsxError> {
    match price {
        Price::Known(v) => worksheet.write_number(r, col, v)?,
        Price::NotFound => worksheet.write_string(r, col, NOT_FOUND_LABEL)?,
    };
    Ok(())
}

/// Block until the file accepts an exclusive append handle, polling with
/// a fixed delay. A file that does not exist yet is fine; the writer
/// creates it.
fn wait_for_write_access(path: &Path, lock_retry: LockRetry) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    for attempt in 1..=lock_retry.max_attempts {
        match OpenOptions::new().append(true).open(path) {
            Ok(_) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                log::warn!(
                    "File '{}' is locked, waiting ({}/{})",
                    path.display(),
                    attempt,
                    lock_retry.max_attempts
                );
                std::thread::sleep(lock_retry.delay);
            }
            Err(e) => return Err(CollectionError::Io(e)),
        }
    }

    Err(CollectionError::FileLocked {
        path: path.display().to_string(),
        attempts: lock_retry.max_attempts,
    })
}

// ── Cell coercions ───────────────────────────────────────────────────

fn cell_to_string(cell: Option<&Data>) -> String {
    match cell {
        Some(Data::String(s)) => s.trim().to_string(),
        Some(Data::Float(f)) => {
            // Collector numbers and set codes read back as floats when
            // they look numeric
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn cell_to_optional_string(cell: Option<&Data>) -> Option<String> {
    let s = cell_to_string(cell);
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn cell_to_flag(cell: Option<&Data>) -> bool {
    match cell {
        Some(Data::Bool(b)) => *b,
        Some(Data::Float(f)) => *f != 0.0,
        Some(Data::Int(i)) => *i != 0,
        Some(Data::String(s)) => parse_flag(s),
        _ => false,
    }
}

fn cell_to_quantity(cell: Option<&Data>) -> u32 {
    match cell {
        Some(Data::Float(f)) if *f >= 0.0 => *f as u32,
        Some(Data::Int(i)) if *i >= 0 => *i as u32,
        Some(Data::String(s)) => parse_quantity(s),
        _ => 1,
    }
}

fn cell_to_price(cell: Option<&Data>) -> Price {
    match cell {
        Some(Data::Float(f)) if *f >= 0.0 => Price::Known(*f),
        Some(Data::Int(i)) if *i >= 0 => Price::Known(*i as f64),
        Some(Data::String(s)) => Price::parse_cell(s),
        _ => Price::NotFound,
    }
}

fn cell_to_date(cell: Option<&Data>) -> Option<NaiveDate> {
    match cell {
        Some(Data::String(s)) => parse_date(s),
        Some(Data::DateTime(dt)) => excel_serial_to_date(dt.as_f64()),
        Some(Data::Float(f)) => excel_serial_to_date(*f),
        Some(Data::DateTimeIso(s)) => {
            NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d").ok()
        }
        _ => None,
    }
}

/// Excel stores dates as days since 1899-12-30.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial as i64))
}

#[cfg(test)]
#[path = "workbook_tests.rs"]
mod tests;
