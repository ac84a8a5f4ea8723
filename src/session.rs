use crate::config::SchemaConfig;
use crate::csv_codec::encode_csv;
use crate::error::{Error, Result};
use crate::record::Record;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

pub const QR_CODES_FIELD: &str = "QRCodes";
const NOT_AVAILABLE: &str = "N/A";

/// Fewer images than this are shown next to the features list.
const INLINE_IMAGE_LIMIT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Csv,
    Uploaded,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisplayImage {
    pub url: String,
    pub source: ImageSource,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImagePlacement {
    Inline,
    EndOfDocument,
}

/// Everything the document template shows for one record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TemplateView {
    pub title: String,
    pub trl_level: String,
    pub innovators: String,
    pub docket: String,
    pub patent_status: String,
    pub description: String,
    pub lists: Vec<(String, Vec<String>)>,
    pub images: Vec<DisplayImage>,
    pub image_placement: ImagePlacement,
    pub qr_links: Vec<String>,
    pub pdf_file_name: String,
}

const LIST_SECTIONS: [&str; 6] = [
    "Advantages",
    "Applications",
    "UseCases",
    "TechnicalSpecifications",
    "Domain",
    "Theme",
];

/// Records opened in the viewer plus the edits made to them.
///
/// Image changes are kept beside the records, per row index: images that
/// came from the CSV are hidden, uploaded ones are removed outright.
#[derive(Clone, Debug, Default)]
pub struct Session {
    records: Vec<Record>,
    current: Option<usize>,
    uploaded_images: HashMap<usize, Vec<String>>,
    removed_csv_images: HashMap<usize, Vec<String>>,
}

impl Session {
    pub fn new(records: Vec<Record>) -> Self {
        Session {
            records,
            ..Default::default()
        }
    }

    /// Replace the records; selection and image overrides start over.
    pub fn load(&mut self, records: Vec<Record>) {
        *self = Session::new(records);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&Record> {
        self.current.and_then(|i| self.records.get(i))
    }

    pub fn select(&mut self, index: usize) -> Result<&Record> {
        if index >= self.records.len() {
            return Err(Error::RecordOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        self.current = Some(index);
        Ok(&self.records[index])
    }

    pub fn clear_selection(&mut self) {
        self.current = None;
    }

    fn current_mut(&mut self) -> Result<(usize, &mut Record)> {
        let index = self.current.ok_or(Error::NoRecordSelected)?;
        let record = self
            .records
            .get_mut(index)
            .ok_or(Error::NoRecordSelected)?;
        Ok((index, record))
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let (_, record) = self.current_mut()?;
        record.set(name, value);
        Ok(())
    }

    /// Store an edited list; blank items are dropped and the rest joined with `;`.
    pub fn set_list_field(&mut self, name: &str, items: &[String]) -> Result<()> {
        let joined = items
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .collect::<Vec<_>>()
            .join(";");
        self.set_field(name, joined)
    }

    /// Store innovators edited in their `, `-separated display form.
    pub fn set_innovators_display(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        let value = if text.is_empty() || text == NOT_AVAILABLE {
            String::new()
        } else {
            text.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(";")
        };
        self.set_field("Innovators", value)
    }

    pub fn add_qr_link(&mut self, link: &str) -> Result<()> {
        let link = link.trim();
        let (_, record) = self.current_mut()?;
        if link.is_empty() {
            return Err(Error::EmptyLink);
        }
        let mut links = list_items(record.text(QR_CODES_FIELD));
        if links.iter().any(|l| l == link) {
            return Err(Error::DuplicateLink(link.to_string()));
        }
        links.push(link.to_string());
        record.set(QR_CODES_FIELD, links.join(";"));
        Ok(())
    }

    pub fn remove_qr_link(&mut self, link: &str) -> Result<()> {
        let link = link.trim();
        let (_, record) = self.current_mut()?;
        let links: Vec<String> = list_items(record.text(QR_CODES_FIELD))
            .into_iter()
            .filter(|l| l != link)
            .collect();
        record.set(QR_CODES_FIELD, links.join(";"));
        Ok(())
    }

    pub fn add_uploaded_images(&mut self, urls: &[String]) -> Result<()> {
        let (index, _) = self.current_mut()?;
        self.uploaded_images
            .entry(index)
            .or_default()
            .extend(urls.iter().cloned());
        Ok(())
    }

    pub fn remove_image(&mut self, url: &str, source: ImageSource) -> Result<()> {
        let (index, _) = self.current_mut()?;
        match source {
            ImageSource::Csv => {
                let removed = self.removed_csv_images.entry(index).or_default();
                if !removed.iter().any(|u| u == url) {
                    removed.push(url.to_string());
                }
            }
            ImageSource::Uploaded => {
                if let Some(uploaded) = self.uploaded_images.get_mut(&index) {
                    uploaded.retain(|u| u != url);
                }
            }
        }
        Ok(())
    }

    /// Images shown for a record: CSV images not hidden, then uploads.
    pub fn images(&self, index: usize) -> Vec<DisplayImage> {
        let Some(record) = self.records.get(index) else {
            return Vec::new();
        };
        let removed = self.removed_csv_images.get(&index);

        let csv_images = record
            .text("Images")
            .split([',', ';'])
            .map(str::trim)
            .filter(|url| is_displayable_image(url))
            .filter(|url| !removed.is_some_and(|r| r.iter().any(|u| u == url)))
            .map(|url| DisplayImage {
                url: url.to_string(),
                source: ImageSource::Csv,
            });

        let uploaded = self
            .uploaded_images
            .get(&index)
            .into_iter()
            .flatten()
            .map(|url| DisplayImage {
                url: url.clone(),
                source: ImageSource::Uploaded,
            });

        csv_images.chain(uploaded).collect()
    }

    pub fn pdf_file_name(&self) -> Result<String> {
        let record = self.current().ok_or(Error::NoRecordSelected)?;
        Ok(pdf_file_name(record))
    }

    pub fn template_view(&self) -> Result<TemplateView> {
        let index = self.current.ok_or(Error::NoRecordSelected)?;
        let record = self.current().ok_or(Error::NoRecordSelected)?;
        let images = self.images(index);

        Ok(TemplateView {
            title: or_default(record.text("Title"), "Technology Title"),
            trl_level: or_default(record.text("TRLLevel"), NOT_AVAILABLE),
            innovators: innovators_display(record),
            docket: or_default(record.text("Docket"), NOT_AVAILABLE),
            patent_status: or_default(record.text("PatentStatus"), NOT_AVAILABLE),
            description: or_default(record.text("DetailedDescription"), NOT_AVAILABLE),
            lists: LIST_SECTIONS
                .iter()
                .map(|name| (name.to_string(), list_items(record.text(name))))
                .collect(),
            image_placement: image_placement(images.len()),
            images,
            qr_links: list_items(record.text(QR_CODES_FIELD)),
            pdf_file_name: pdf_file_name(record),
        })
    }

    /// Encode every record with the config's columns and quoting.
    pub fn to_csv(&self, config: &SchemaConfig) -> String {
        let header = config.output_header_row();
        let mut table = Vec::with_capacity(self.records.len() + 1);
        table.push(header.clone());
        table.extend(self.records.iter().map(|r| r.values_in(&header)));
        debug!("encoding {} session records", self.records.len());
        encode_csv(&table, &config.force_quote_fields, &header)
    }
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn is_displayable_image(url: &str) -> bool {
    !url.is_empty() && (url.starts_with("http") || url.starts_with("./") || url.starts_with('/'))
}

/// Split a stored list on `;`. `N/A` counts as no items.
pub fn list_items(value: &str) -> Vec<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return Vec::new();
    }
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn innovators_display(record: &Record) -> String {
    let names = list_items(record.text("Innovators"));
    if names.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        names.join(", ")
    }
}

pub fn image_placement(count: usize) -> ImagePlacement {
    if count < INLINE_IMAGE_LIMIT {
        ImagePlacement::Inline
    } else {
        ImagePlacement::EndOfDocument
    }
}

pub fn pdf_file_name(record: &Record) -> String {
    let title = match record.text("Title") {
        "" => "Untitled",
        t => t,
    };
    let safe: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.pdf", safe)
}
