use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::Path;
use tech_csv::config::SchemaConfig;
use tech_csv::convert::{convert_file, import_records};
use tech_csv::downloader::save_table;
use tech_csv::loader::{from_excel, load_table};
use tech_csv::session::{ImageSource, Session};
use tech_csv::{Error, MissingSource};
use tempfile::tempdir;

fn write_workbook(path: &Path, rows: &[Vec<String>]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                sheet.write_string(r as u32, c as u16, value).unwrap();
            }
        }
    }
    workbook.save(path).unwrap();
}

/// A submission row laid out in `header` order, blank except for `values`.
fn submission(header: &[String], values: &[(&str, &str)]) -> Vec<String> {
    header
        .iter()
        .map(|h| {
            let name = h.split('\n').next().unwrap().trim();
            values
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
                .unwrap_or_default()
        })
        .collect()
}

fn solar_pump(header: &[String]) -> Vec<String> {
    submission(
        header,
        &[
            ("Timestamp", "2024-05-01 10:00"),
            ("Title", "Solar Pump"),
            ("Theme", "Health;Water"),
            ("Domain", "Agriculture"),
            ("PatentStatus", "Filed"),
            ("TRLLevel", "4"),
            ("Innovators", "Ada Lovelace\nGrace Hopper"),
            ("DetailedDescription", "Pumps water, using sun."),
            ("RelatedLinks", "Site: https://pump.org/x; none"),
            (
                "Images",
                "https://drive.google.com/open?id=ABCDEFGHIJKLMNOPQRSTUVWXY1, junk",
            ),
        ],
    )
}

#[test]
fn workbook_converts_to_normalized_csv() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tech_data.xlsx");
    let output = dir.path().join("tech_final.csv");
    let config = SchemaConfig::export_script();

    let header = config.header_list.clone();
    write_workbook(&input, &[header.clone(), solar_pump(&header)]);

    let written = convert_file(&input, &output, &config).unwrap();
    assert_eq!(written, 1);

    let text = fs::read_to_string(&output).unwrap();
    let expected = [
        "Title,Theme,Domain,PatentStatus,TRLLevel,Innovators,DetailedDescription,Advantages,Applications,UseCases,RelatedLinks,TechnicalSpecifications,Images",
        "Solar Pump,\"Health ; Water\",\"Agriculture\",Filed,4,\"Ada Lovelace ; Grace Hopper\",\"Pumps water, using sun.\",\"\",\"\",\"\",\"https://pump.org/x\",\"\",\"https://drive.google.com/uc?export=view&id=ABCDEFGHIJKLMNOPQRSTUVWXY1\"",
    ]
    .join("\n");
    assert_eq!(text, expected);
}

#[test]
fn missing_input_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("absent.xlsx");
    let output = dir.path().join("out.csv");

    let err = convert_file(&input, &output, &SchemaConfig::export_script()).unwrap_err();
    assert!(matches!(
        err,
        Error::MissingSource(MissingSource::FileNotFound(_))
    ));
    assert!(!output.exists());
}

#[test]
fn schema_mismatch_aborts_before_writing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, "Title,Theme\nPump,Health").unwrap();

    let mut config = SchemaConfig::viewer_import();
    config.output_headers.push("Docket".to_string());

    let err = convert_file(&input, &output, &config).unwrap_err();
    match err {
        Error::Configuration { header } => assert_eq!(header, "Docket"),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(!output.exists());
}

#[test]
fn empty_sources_are_reported() {
    let dir = tempdir().unwrap();

    let csv = dir.path().join("empty.csv");
    fs::write(&csv, "\n\n").unwrap();
    assert!(matches!(
        load_table(&csv),
        Err(Error::MissingSource(MissingSource::EmptySheet))
    ));

    let xlsx = dir.path().join("empty.xlsx");
    write_workbook(&xlsx, &[]);
    assert!(matches!(
        load_table(&xlsx),
        Err(Error::MissingSource(MissingSource::EmptySheet))
    ));

    let txt = dir.path().join("notes.txt");
    fs::write(&txt, "x").unwrap();
    assert!(matches!(
        load_table(&txt),
        Err(Error::MissingSource(MissingSource::UnsupportedExtension(_)))
    ));
}

#[test]
fn ragged_workbook_rows_become_empty_cells() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("short.xlsx");
    let output = dir.path().join("short.csv");
    let config = SchemaConfig::export_script();

    let header = config.header_list.clone();
    let short = vec![
        "2024-05-01".to_string(),
        "Ada".to_string(),
        "Org".to_string(),
        "ada@example.org".to_string(),
        "Tiny".to_string(),
    ];
    write_workbook(&input, &[header, short]);

    convert_file(&input, &output, &config).unwrap();
    let text = fs::read_to_string(&output).unwrap();
    let data = text.lines().nth(1).unwrap();
    assert_eq!(data, "Tiny,\"\",\"\",,,\"\",,\"\",\"\",\"\",\"\",\"\",\"\"");
}

#[test]
fn converted_csv_decodes_back_to_the_same_values() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    let output = dir.path().join("clean.csv");
    let config = SchemaConfig::export_script();

    let header: Vec<String> = config
        .header_list
        .iter()
        .map(|h| h.split('\n').next().unwrap().to_string())
        .collect();
    let mut row = solar_pump(&header);
    let description = header.iter().position(|h| h == "DetailedDescription").unwrap();
    row[description] = "First paragraph.\nSecond \"quoted\" paragraph.".to_string();
    let raw = tech_csv::encode_csv(&[header.clone(), row], &[], &header);
    fs::write(&input, raw).unwrap();

    convert_file(&input, &output, &config).unwrap();
    let decoded = import_records(&output, &config).unwrap();

    assert!(decoded.warnings.is_empty());
    assert_eq!(decoded.records.len(), 1);
    let record = &decoded.records[0];
    assert_eq!(
        record.get("DetailedDescription"),
        Some("First paragraph.\nSecond \"quoted\" paragraph.")
    );
    assert_eq!(record.get("Innovators"), Some("Ada Lovelace ; Grace Hopper"));
    assert_eq!(record.get("RelatedLinks"), Some("https://pump.org/x"));
}

#[test]
fn export_csv_opens_with_viewer_preset() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tech_data.xlsx");
    let output = dir.path().join("tech_final.csv");
    let export = SchemaConfig::export_script();

    let header = export.header_list.clone();
    write_workbook(&input, &[header.clone(), solar_pump(&header)]);
    convert_file(&input, &output, &export).unwrap();

    let decoded = import_records(&output, &SchemaConfig::viewer_import()).unwrap();
    assert_eq!(decoded.headers, export.output_header_row());
    assert!(decoded.missing_headers.is_empty());
    assert!(decoded.warnings.is_empty());
    assert_eq!(decoded.records[0].get("Title"), Some("Solar Pump"));
}

#[test]
fn workbook_opens_in_viewer_session() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("viewer.xlsx");
    let config = SchemaConfig::viewer_import();

    let header = config.header_list.clone();
    let row = submission(
        &header,
        &[
            ("Title", "Water Filter"),
            ("Innovators", "Ada\nGrace"),
            ("Images", "https://img.org/a.png, https://img.org/b.png"),
            ("QRCodes", "https://q.org/1\nhttps://q.org/2"),
        ],
    );
    write_workbook(&input, &[header, row]);

    let decoded = import_records(&input, &config).unwrap();
    assert_eq!(decoded.headers, config.output_header_row());
    assert!(decoded.missing_headers.is_empty());

    let mut session = Session::new(decoded.records);
    session.select(0).unwrap();
    session
        .remove_image("https://img.org/a.png", ImageSource::Csv)
        .unwrap();
    session.add_qr_link("https://q.org/3").unwrap();

    let view = session.template_view().unwrap();
    assert_eq!(view.title, "Water Filter");
    assert_eq!(view.innovators, "Ada, Grace");
    assert_eq!(view.images.len(), 1);
    assert_eq!(view.images[0].url, "https://img.org/b.png");
    assert_eq!(
        view.qr_links,
        vec!["https://q.org/1", "https://q.org/2", "https://q.org/3"]
    );
    assert_eq!(view.pdf_file_name, "Water_Filter.pdf");
}

#[test]
fn normalized_table_saves_as_workbook() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("clean.xlsx");
    let config = SchemaConfig::export_script();

    let table = vec![
        config.output_header_row(),
        vec!["Solar Pump".to_string(), "Health ; Water".to_string()],
    ];
    save_table(&output, &table, &config).unwrap();

    let back = from_excel(&output).unwrap();
    assert_eq!(back.header, config.output_header_row());
    assert_eq!(back.rows[0][0], "Solar Pump");
    assert_eq!(back.rows[0][1], "Health ; Water");
}
