use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::path::{Path, PathBuf};
use tech_csv::config::SchemaConfig;
use tech_csv::convert::{convert_file, default_output_path, import_records};
use tech_csv::session::{ImageSource, Session};

#[derive(Parser)]
#[command(name = "tech-csv")]
#[command(about = "Normalize technology submission sheets into CSV and inspect the records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// Batch export layout (13 columns, tolerant header lookup)
    Export,
    /// Viewer layout (adds QRCodes, exact header lookup)
    Viewer,
}

#[derive(clap::Args)]
struct SchemaArgs {
    /// Built-in column layout
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// JSON schema file; overrides --preset
    #[arg(long)]
    config: Option<PathBuf>,
}

impl SchemaArgs {
    fn load(&self, fallback: Preset) -> tech_csv::Result<SchemaConfig> {
        if let Some(path) = &self.config {
            return SchemaConfig::from_json_file(path);
        }
        Ok(match self.preset.unwrap_or(fallback) {
            Preset::Export => SchemaConfig::export_script(),
            Preset::Viewer => SchemaConfig::viewer_import(),
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Select and reformat submission columns, writing CSV (or .xlsx)
    Convert {
        /// Workbook or CSV to read
        input: PathBuf,

        /// Output path; defaults to the input name with a .csv extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        schema: SchemaArgs,
    },

    /// Decode a CSV (or import a workbook) and print its records
    Inspect {
        input: PathBuf,

        /// Print records as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        schema: SchemaArgs,
    },

    /// Open one record as the document template would show it
    Show {
        input: PathBuf,

        /// Zero-based record index
        #[arg(short, long)]
        record: usize,

        #[arg(long = "add-qr")]
        add_qr: Vec<String>,

        #[arg(long = "remove-qr")]
        remove_qr: Vec<String>,

        /// Hide an image that came from the file
        #[arg(long = "remove-image")]
        remove_image: Vec<String>,

        /// Print the template view as JSON
        #[arg(long)]
        json: bool,

        /// Write all records, with edits, back to CSV
        #[arg(long)]
        save: Option<PathBuf>,

        #[command(flatten)]
        schema: SchemaArgs,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("{}", failure_message(e.as_ref()));
        std::process::exit(1);
    }
}

/// Final report for a failed run; printed even when logging is off.
fn failure_message(e: &dyn std::error::Error) -> String {
    format!("Error: {}", e)
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Convert {
            input,
            output,
            schema,
        } => {
            let config = schema.load(Preset::Export)?;
            let output = output.unwrap_or_else(|| default_output_path(&input));
            let rows = convert_file(&input, &output, &config)?;
            info!("Wrote {} records", rows);
        }
        Commands::Inspect {
            input,
            json,
            schema,
        } => {
            let config = schema.load(Preset::Viewer)?;
            let decoded = import_records(&input, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&decoded.records)?);
            } else {
                for (i, record) in decoded.records.iter().enumerate() {
                    println!(
                        "[{}] {} | TRL {} | {}",
                        i,
                        or_na(record.text("Title")),
                        or_na(record.text("TRLLevel")),
                        tech_csv::session::innovators_display(record)
                    );
                }
            }
            if !decoded.warnings.is_empty() {
                info!("{} line(s) skipped", decoded.warnings.len());
            }
        }
        Commands::Show {
            input,
            record,
            add_qr,
            remove_qr,
            remove_image,
            json,
            save,
            schema,
        } => {
            let config = schema.load(Preset::Viewer)?;
            let decoded = import_records(&input, &config)?;
            let mut session = Session::new(decoded.records);
            session.select(record)?;

            for link in &add_qr {
                session.add_qr_link(link)?;
            }
            for link in &remove_qr {
                session.remove_qr_link(link)?;
            }
            for url in &remove_image {
                session.remove_image(url, ImageSource::Csv)?;
            }

            let view = session.template_view()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_view(&view);
            }

            if let Some(path) = save {
                write_session(&session, &config, &path)?;
            }
        }
    }
    Ok(())
}

fn or_na(value: &str) -> &str {
    if value.is_empty() { "N/A" } else { value }
}

fn print_view(view: &tech_csv::session::TemplateView) {
    println!("{}", view.title);
    println!("  TRL:            {}", view.trl_level);
    println!("  Innovators:     {}", view.innovators);
    println!("  Docket:         {}", view.docket);
    println!("  Patent status:  {}", view.patent_status);
    println!("  Description:    {}", view.description);
    for (name, items) in &view.lists {
        println!("  {}:", name);
        for item in items {
            println!("    - {}", item);
        }
    }
    println!("  Images ({:?}):", view.image_placement);
    for image in &view.images {
        println!("    - {}", image.url);
    }
    println!("  QR codes:");
    for link in &view.qr_links {
        println!("    - {}", link);
    }
    println!("  PDF: {}", view.pdf_file_name);
}

fn write_session(session: &Session, config: &SchemaConfig, path: &Path) -> std::io::Result<()> {
    std::fs::write(path, session.to_csv(config))?;
    info!("Saved {} records to {}", session.len(), path.display());
    Ok(())
}
