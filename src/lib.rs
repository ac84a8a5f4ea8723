/*!
# Technology Submission Normalizer

Turns the spreadsheet export of a technology-submission form into a tidy CSV,
and opens such CSV (or the raw spreadsheet) as records for a document template.

## Overview

Submissions arrive as one row per technology with free-text list answers,
links and image references mixed in. The normalizer keeps only the columns
the template needs, rewrites list answers into a single ` ; `-joined form,
extracts usable URLs, and writes CSV with a quoting convention that keeps
list columns unambiguous.

## Pipeline

- **loader**: reads the first sheet of a workbook, or CSV text, into raw rows
- **reformat**: resolves output columns by header name and reformats list cells
- **csv_codec**: encodes the normalized table, and decodes CSV back into records
- **downloader**: writes the table as CSV or XLSX in a single write
- **convert**: the end-to-end run, and the record viewer's import path
- **session**: selection, captured edits, QR links and image overrides for the viewer

## Configuration

Column layouts live in a [`SchemaConfig`](config::SchemaConfig) value. Two presets
cover the batch export and the viewer import; any other layout can be loaded
from a JSON file.

## Errors

- A missing output header is a configuration error and stops the run
- A missing input file, a workbook without sheets or an empty sheet stops the run
- CSV lines with the wrong number of fields are skipped and reported
- Image and link items without a usable URL are dropped quietly
*/

pub mod config;
pub mod convert;
pub mod csv_codec;
pub mod downloader;
pub mod error;
pub mod loader;
pub mod record;
pub mod reformat;
pub mod session;

pub use config::{HeaderMatch, SchemaConfig};
pub use csv_codec::{DecodedCsv, RowShapeWarning, decode_csv, encode_csv};
pub use error::{Error, MissingSource, Result};
pub use record::Record;
pub use reformat::{format_multi_item_cell, select_and_reformat};
pub use session::Session;
