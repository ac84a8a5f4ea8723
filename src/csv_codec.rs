use crate::config::contains_field;
use crate::record::Record;
use log::warn;
use std::fmt;
use std::mem;

/// Serialize a table whose first row is the header row.
///
/// A cell is wrapped in quotes, with inner quotes doubled, when it holds a
/// comma, a line break or a quote. Data cells (never the header row) of the
/// columns named in `force_quote_fields` are always wrapped. Rows are
/// separated by `\n` and no trailing newline is written.
///
/// # Arguments
/// * `rows` - Header row followed by data rows
/// * `force_quote_fields` - Columns whose data cells are always quoted
/// * `output_header_order` - Column names by position, used to find each cell's field
///
/// # Examples
/// ```
/// use tech_csv::csv_codec::encode_csv;
///
/// let header = vec!["Title".to_string(), "Theme".to_string()];
/// let rows = vec![header.clone(), vec!["Pump, solar".to_string(), "Health".to_string()]];
/// let text = encode_csv(&rows, &["Theme".to_string()], &header);
/// assert_eq!(text, "Title,Theme\n\"Pump, solar\",\"Health\"");
/// ```
pub fn encode_csv(
    rows: &[Vec<String>],
    force_quote_fields: &[String],
    output_header_order: &[String],
) -> String {
    let mut csv_content = String::new();

    for (r, row) in rows.iter().enumerate() {
        if r > 0 {
            csv_content.push('\n');
        }
        for (c, value) in row.iter().enumerate() {
            if c > 0 {
                csv_content.push(',');
            }
            let forced = r > 0
                && output_header_order
                    .get(c)
                    .is_some_and(|h| contains_field(force_quote_fields, h));

            if forced || value.contains(',') || value.contains('"') || value.contains('\n') {
                let escaped = value.replace('"', "\"\"");
                csv_content.push('"');
                csv_content.push_str(&escaped);
                csv_content.push('"');
            } else {
                csv_content.push_str(value);
            }
        }
    }

    csv_content
}

/// A data line that was dropped because its field count was wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowShapeWarning {
    /// 1-based line on which the record starts.
    pub line: usize,
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for RowShapeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "skipping line {}: column count mismatch, expected {}, got {}",
            self.line, self.expected, self.found
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedCsv {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
    pub warnings: Vec<RowShapeWarning>,
    /// Expected columns the file's header line does not name.
    pub missing_headers: Vec<String>,
}

struct RawRecord {
    line: usize,
    fields: Vec<String>,
    blank: bool,
}

/// Split CSV text into records.
///
/// A `"` opens a quoted section only as the first character of a field;
/// anywhere else it is literal text. Quote state carries across line
/// breaks, so a quoted cell may contain raw newlines. `""` inside quotes
/// is a literal quote.
fn tokenize(text: &str) -> Vec<RawRecord> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut line = 1;
    let mut start_line = 1;
    let mut has_content = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if at_field_start => {
                has_content = true;
                in_quotes = true;
                at_field_start = false;
            }
            ',' if !in_quotes => {
                has_content = true;
                at_field_start = true;
                fields.push(mem::take(&mut current_field));
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(mem::take(&mut current_field));
                records.push(RawRecord {
                    line: start_line,
                    fields: mem::take(&mut fields),
                    blank: !has_content,
                });
                line += 1;
                start_line = line;
                has_content = false;
                at_field_start = true;
            }
            '\n' => {
                line += 1;
                current_field.push('\n');
            }
            _ => {
                if !c.is_whitespace() {
                    has_content = true;
                }
                at_field_start = false;
                current_field.push(c);
            }
        }
    }

    if !current_field.is_empty() || !fields.is_empty() || has_content {
        fields.push(current_field);
        records.push(RawRecord {
            line: start_line,
            fields,
            blank: !has_content,
        });
    }

    records
}

/// Parse CSV text into raw rows, skipping blank lines.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    tokenize(text)
        .into_iter()
        .filter(|r| !r.blank)
        .map(|r| r.fields)
        .collect()
}

/// Decode CSV text into records keyed by the header line.
///
/// Lines whose field count differs from the header are skipped and
/// reported; decoding never fails. When `expected_header_order` names a
/// column the file lacks, it is listed in `missing_headers` and logged.
/// Extra or reordered columns are fine. Records are always keyed by the
/// file's own headers.
pub fn decode_csv(text: &str, expected_header_order: Option<&[String]>) -> DecodedCsv {
    let mut raw = tokenize(text).into_iter().filter(|r| !r.blank);

    let Some(header_record) = raw.next() else {
        return DecodedCsv::default();
    };
    let headers: Vec<String> = header_record
        .fields
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let missing_headers: Vec<String> = expected_header_order
        .unwrap_or_default()
        .iter()
        .filter(|h| !headers.contains(h))
        .cloned()
        .collect();
    if !missing_headers.is_empty() {
        warn!(
            "CSV is missing expected columns: {}; records are keyed by the file's headers",
            missing_headers.join(", ")
        );
    }

    let mut decoded = DecodedCsv {
        headers,
        missing_headers,
        ..Default::default()
    };

    for record in raw {
        if record.fields.len() == decoded.headers.len() {
            decoded
                .records
                .push(Record::from_pairs(&decoded.headers, record.fields));
        } else {
            let warning = RowShapeWarning {
                line: record.line,
                expected: decoded.headers.len(),
                found: record.fields.len(),
            };
            warn!("{}", warning);
            decoded.warnings.push(warning);
        }
    }

    decoded
}
