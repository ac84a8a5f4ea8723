#![cfg(not(tarpaulin_include))]

use crate::config::SchemaConfig;
use crate::csv_codec::encode_csv;
use crate::error::{MissingSource, Result};
use std::fs;
use std::path::Path;

/// Convert a normalized table to CSV text
///
/// The table's first row is the header row. Quoting follows the config's
/// forced-quote columns on top of the usual comma/quote/newline rule.
///
/// # Arguments
/// * `table` - Header row followed by the selected, reformatted rows
/// * `config` - Schema supplying output header order and forced-quote columns
///
/// # Returns
/// * `String` - CSV content without a trailing newline
pub fn to_csv(table: &[Vec<String>], config: &SchemaConfig) -> String {
    encode_csv(
        table,
        &config.force_quote_fields,
        &config.output_header_row(),
    )
}

/// Convert a normalized table to XLSX format
///
/// Every cell is written as a string so list fields keep their ` ; ` form.
///
/// # Arguments
/// * `table` - Header row followed by data rows
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content as bytes or an error
#[cfg(feature = "excel")]
pub fn to_xlsx(table: &[Vec<String>]) -> Result<Vec<u8>> {
    use rust_xlsxwriter::{Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    for (r, row) in table.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(r as u32, c as u16, value)?;
            }
        }
    }

    workbook.push_worksheet(worksheet);
    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

/// Write a normalized table in one operation, choosing the format by extension
///
/// `.xlsx` produces a workbook and `.csv` (or no extension) produces CSV text.
/// Nothing is written when the extension is not supported.
pub fn save_table(path: impl AsRef<Path>, table: &[Vec<String>], config: &SchemaConfig) -> Result<()> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") | None => fs::write(path, to_csv(table, config))?,
        #[cfg(feature = "excel")]
        Some("xlsx") => fs::write(path, to_xlsx(table)?)?,
        Some(ext) => return Err(MissingSource::UnsupportedExtension(ext.to_string()).into()),
    }
    Ok(())
}
