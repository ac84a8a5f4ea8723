use crate::config::{HeaderMatch, SchemaConfig, first_line};
use crate::error::{Error, Result};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

lazy_static! {
    static ref DRIVE_ID_REGEX: Regex =
        Regex::new(r"(?:open\?id=|/d/)([A-Za-z0-9_-]{25,})").unwrap();
    static ref URL_REGEX: Regex = Regex::new(r"(?i)https?://\S+").unwrap();
}

const DIRECT_VIEW_URL: &str = "https://drive.google.com/uc?export=view&id=";
const ITEM_SEPARATOR: &str = " ; ";

/// Find the column of every output header.
///
/// The sheet's own header row is searched first; the configured canonical
/// order is the fallback for sheets whose labels were reworded.
pub fn resolve_columns(raw_header_row: &[String], config: &SchemaConfig) -> Result<Vec<usize>> {
    config
        .output_headers
        .iter()
        .map(|wanted| {
            let key = first_line(wanted);
            find_header(raw_header_row, key, config.header_match)
                .or_else(|| find_header(&config.header_list, key, config.header_match))
                .ok_or_else(|| Error::Configuration {
                    header: key.to_string(),
                })
        })
        .collect()
}

fn find_header(candidates: &[String], key: &str, mode: HeaderMatch) -> Option<usize> {
    if let Some(i) = candidates.iter().position(|c| c.trim() == key) {
        return Some(i);
    }
    if mode == HeaderMatch::Exact || key.is_empty() {
        return None;
    }
    candidates
        .iter()
        .position(|c| first_line(c) == key)
        .or_else(|| candidates.iter().position(|c| c.trim().starts_with(key)))
}

/// Pick the output columns out of every raw row and tidy the list fields.
///
/// Rows shorter than the header row yield empty cells for the missing
/// columns.
pub fn select_and_reformat(
    raw_header_row: &[String],
    raw_data_rows: &[Vec<String>],
    config: &SchemaConfig,
) -> Result<Vec<Vec<String>>> {
    let columns = resolve_columns(raw_header_row, config)?;

    let rows = raw_data_rows
        .iter()
        .map(|raw| {
            columns
                .iter()
                .zip(&config.output_headers)
                .map(|(&col, header)| {
                    let cell = raw.get(col).map(String::as_str).unwrap_or("");
                    if config.is_multi_item(header) {
                        format_multi_item_cell(cell, header, config)
                    } else if cell.trim().is_empty() {
                        String::new()
                    } else {
                        cell.to_string()
                    }
                })
                .collect()
        })
        .collect();

    Ok(rows)
}

/// Header row followed by the selected rows, ready for the encoder.
pub fn normalize_table(
    raw_header_row: &[String],
    raw_data_rows: &[Vec<String>],
    config: &SchemaConfig,
) -> Result<Vec<Vec<String>>> {
    let mut table = Vec::with_capacity(raw_data_rows.len() + 1);
    table.push(config.output_header_row());
    table.extend(select_and_reformat(raw_header_row, raw_data_rows, config)?);
    Ok(table)
}

/// Render a list-valued cell as ` ; `-joined items.
///
/// Image fields keep only usable image URLs. The related-links field keeps
/// only the first URL of every item. Everything else splits on `;` when
/// one is present and on line breaks otherwise.
pub fn format_multi_item_cell(value: &str, field_name: &str, config: &SchemaConfig) -> String {
    if value.trim().is_empty() {
        return String::new();
    }
    let text = value.replace("\r\n", "\n");

    if field_name.trim().starts_with(config.image_field_prefix.as_str()) {
        return text
            .split(',')
            .filter_map(image_link)
            .collect::<Vec<_>>()
            .join(ITEM_SEPARATOR);
    }

    let items = split_items(&text);

    if first_line(field_name) == config.related_links_field {
        return items
            .iter()
            .filter_map(|item| {
                let url = URL_REGEX.find(item).map(|m| m.as_str().to_string());
                if url.is_none() {
                    debug!("dropping related link without a URL: {:?}", item);
                }
                url
            })
            .collect::<Vec<_>>()
            .join(ITEM_SEPARATOR);
    }

    items.join(ITEM_SEPARATOR)
}

/// A `;` anywhere marks an explicit list, so wrapped lines inside an item
/// are joined rather than split.
fn split_items(text: &str) -> Vec<String> {
    if text.contains(';') {
        text.split(';')
            .map(|item| item.replace('\n', " ").trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    } else {
        text.split('\n')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

fn image_link(piece: &str) -> Option<String> {
    let piece = piece.trim();
    if piece.is_empty() {
        return None;
    }
    if let Some(caps) = DRIVE_ID_REGEX.captures(piece) {
        return Some(format!("{}{}", DIRECT_VIEW_URL, &caps[1]));
    }
    if piece.starts_with("http") {
        return Some(piece.to_string());
    }
    debug!("dropping unusable image reference: {:?}", piece);
    None
}
