use crate::config::SchemaConfig;
use crate::csv_codec::{DecodedCsv, decode_csv};
use crate::downloader::{save_table, to_csv};
use crate::error::{MissingSource, Result};
use crate::loader::{is_workbook, load_table};
use crate::reformat::normalize_table;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a submission sheet, normalize it and write the result.
///
/// Everything happens in memory before the single write, so a failed run
/// leaves no output file behind. Returns the number of data rows written.
pub fn convert_file(input: &Path, output: &Path, config: &SchemaConfig) -> Result<usize> {
    let raw = load_table(input)?;
    let table = normalize_table(&raw.header, &raw.rows, config)?;
    save_table(output, &table, config)?;
    info!(
        "Successfully selected, formatted, and saved data. Output: {}",
        output.display()
    );
    Ok(table.len() - 1)
}

/// Where `convert` writes when no output path is given.
pub fn default_output_path(input: &Path) -> PathBuf {
    if has_extension(input, "csv") {
        let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
        input.with_file_name(format!("{}.normalized.csv", stem))
    } else {
        input.with_extension("csv")
    }
}

/// Open a file the way the record viewer does.
///
/// CSV files are decoded as they are, keyed by their own header line.
/// Workbooks are first normalized with `config` and turned into CSV text,
/// then decoded from that text against the configured output columns.
pub fn import_records(input: &Path, config: &SchemaConfig) -> Result<DecodedCsv> {
    let (text, expected) = if is_workbook(input) {
        let raw = load_table(input)?;
        let table = normalize_table(&raw.header, &raw.rows, config)?;
        (to_csv(&table, config), Some(config.output_header_row()))
    } else if !input.exists() {
        return Err(MissingSource::FileNotFound(input.to_path_buf()).into());
    } else if has_extension(input, "csv") {
        (fs::read_to_string(input)?, None)
    } else {
        let ext = input.extension().and_then(|e| e.to_str()).unwrap_or_default();
        return Err(MissingSource::UnsupportedExtension(ext.to_string()).into());
    };
    Ok(decode_csv(&text, expected.as_deref()))
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
}
