#![cfg(not(tarpaulin_include))]

use crate::csv_codec::parse_rows;
use crate::error::{MissingSource, Result};
use log::info;
use std::fs;
use std::path::Path;

/// Rows of one sheet as text, header row split off.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    fn from_rows(mut rows: Vec<Vec<String>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(MissingSource::EmptySheet.into());
        }
        let header = rows.remove(0);
        Ok(RawTable { header, rows })
    }
}

/// Load a raw table from a CSV file
///
/// The first non-blank line is the header row. Quoted cells may span lines.
///
/// # Arguments
/// * `filepath` - Path to the CSV file to load
///
/// # Returns
/// * `Result<RawTable>` - The header row and data rows, or `EmptySheet` when there are none
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<RawTable> {
    let text = fs::read_to_string(filepath)?;
    RawTable::from_rows(parse_rows(&text))
}

/// Load the first worksheet of a workbook
///
/// Works for every format the workbook reader knows (xlsx, xlsm, xlsb, xls, ods).
/// Numbers that hold whole values are written without a fractional part, and
/// empty cells become empty text.
///
/// # Arguments
/// * `filepath` - Path to the workbook to load
///
/// # Returns
/// * `Result<RawTable>` - The loaded sheet, or `NoSheets` / `EmptySheet`
///
/// # Examples
/// ```no_run
/// use tech_csv::loader::from_excel;
///
/// match from_excel("tech_data.xlsx") {
///     Ok(table) => println!("Loaded {} submissions", table.rows.len()),
///     Err(e) => eprintln!("Error loading workbook: {}", e),
/// }
/// ```
#[cfg(feature = "excel")]
pub fn from_excel(filepath: impl AsRef<Path>) -> Result<RawTable> {
    use calamine::{Reader, open_workbook_auto};

    let mut workbook = open_workbook_auto(filepath)?;

    // Get the first worksheet
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(MissingSource::NoSheets)?;
    info!("Reading data from sheet: \"{}\"", sheet_name);

    let range = workbook.worksheet_range(&sheet_name)?;
    if range.is_empty() {
        return Err(MissingSource::EmptySheet.into());
    }

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    RawTable::from_rows(rows)
}

#[cfg(feature = "excel")]
fn cell_text(cell: &calamine::Data) -> String {
    use calamine::Data;

    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

/// Whether a path names a workbook rather than CSV text.
pub fn is_workbook(path: &Path) -> bool {
    matches!(
        extension_of(path).as_deref(),
        Some("xlsx") | Some("xlsm") | Some("xlsb") | Some("xls") | Some("ods")
    )
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Detect file type and load the appropriate format
///
/// # Arguments
/// * `filepath` - Path to the file to load
///
/// # Returns
/// * `Result<RawTable>` - The loaded table, `FileNotFound` when the path does not exist
///
/// # Examples
/// ```no_run
/// use tech_csv::loader::load_table;
///
/// match load_table("tech_data.xlsx") {
///     Ok(table) => println!("{} columns", table.header.len()),
///     Err(e) => eprintln!("Error loading file: {}", e),
/// }
/// ```
pub fn load_table(filepath: impl AsRef<Path>) -> Result<RawTable> {
    let path = filepath.as_ref();
    if !path.exists() {
        return Err(MissingSource::FileNotFound(path.to_path_buf()).into());
    }
    info!("Attempting to read file: {}", path.display());

    match extension_of(path).as_deref() {
        Some("csv") => from_csv(path),
        #[cfg(feature = "excel")]
        Some(_) if is_workbook(path) => from_excel(path),
        Some(ext) => Err(MissingSource::UnsupportedExtension(ext.to_string()).into()),
        None => Err(MissingSource::UnsupportedExtension(String::new()).into()),
    }
}
