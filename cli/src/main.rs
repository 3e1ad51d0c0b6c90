//! tabxl CLI - PDF tables to translated Excel workbooks

mod google;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use tabxl::{
    ExtractOptions, Layout, PageSelection, PdftotextSource, Pipeline, PipelineOptions, Session,
    SessionEvent,
};

use google::GoogleWebTranslator;

#[derive(Parser)]
#[command(name = "tabxl")]
#[command(version)]
#[command(about = "Extract PDF tables into translated Excel workbooks", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output XLSX file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert PDF tables to an XLSX workbook
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output XLSX file (defaults to the input name with .xlsx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Translate cell text into this language (e.g. "en", "es", "ja")
        #[arg(short, long, value_name = "LANG")]
        target_lang: Option<String>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Column display width
        #[arg(long, default_value = "35")]
        width: f64,

        /// Disable wrap-text alignment
        #[arg(long)]
        no_wrap: bool,

        /// Translate cells in parallel
        #[arg(long)]
        parallel: bool,

        /// Cache repeated translations
        #[arg(long)]
        cache: bool,
    },

    /// Print extracted tables as JSON without writing a workbook
    Dump {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// List supported target languages
    Languages,

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            target_lang,
            pages,
            width,
            no_wrap,
            parallel,
            cache,
        }) => cmd_convert(
            &input,
            output.as_deref(),
            target_lang.as_deref(),
            pages.as_deref(),
            width,
            no_wrap,
            parallel,
            cache,
        ),
        Some(Commands::Dump {
            input,
            pages,
            compact,
        }) => cmd_dump(&input, pages.as_deref(), compact),
        Some(Commands::Languages) => {
            cmd_languages();
            Ok(())
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert without translation if input is provided
            if let Some(input) = cli.input {
                cmd_convert(
                    &input,
                    cli.output.as_deref(),
                    None,
                    None,
                    35.0,
                    false,
                    false,
                    false,
                )
            } else {
                println!("{}", "Usage: tabxl <FILE> [OUTPUT]".yellow());
                println!("       tabxl --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    target_lang: Option<&str>,
    pages: Option<&str>,
    width: f64,
    no_wrap: bool,
    parallel: bool,
    cache: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_path = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| input.with_extension("xlsx"));

    let options = PipelineOptions::new()
        .with_extraction(extract_options(pages)?)
        .with_layout(Layout {
            wrap_text: !no_wrap,
            column_width: width,
        })
        .with_parallel_translation(parallel)
        .with_translation_cache(cache);

    // The confirmation gate: a target language is an explicit
    // confirmation, its absence an explicit opt-out.
    let mut session = Session::new();
    session.handle(SessionEvent::FileUploaded)?;
    match target_lang {
        Some(lang) => {
            session.handle(SessionEvent::TranslationToggled(true))?;
            session.handle(SessionEvent::LanguageConfirmed(lang.to_string()))?;
        }
        None => {
            session.handle(SessionEvent::ProceedWithoutTranslation)?;
        }
    }
    let mode = session.begin_processing()?;

    let mut pipeline =
        Pipeline::new(Box::new(PdftotextSource::new())).with_options(options);
    if target_lang.is_some() {
        let translator = Arc::new(GoogleWebTranslator::new());
        pipeline = pipeline.with_translator(translator.clone(), translator);
    }

    let pb = spinner();
    pb.set_message(match target_lang {
        Some(lang) => format!("Extracting and translating to {lang}..."),
        None => "Extracting tables...".to_string(),
    });

    let pdf = fs::read(input)?;
    let result = pipeline.run(&pdf, &mode)?;
    session.handle(SessionEvent::ProcessingFinished)?;

    fs::write(&output_path, &result.bytes)?;
    pb.finish_and_clear();

    println!(
        "{} {} sheet(s) written to {}",
        "Done!".green().bold(),
        result.sheet_names.len(),
        output_path.display()
    );
    for name in &result.sheet_names {
        println!("  - {name}");
    }
    if let Some(stats) = result.translation {
        println!(
            "  translated {} cell(s), {} already in target language, {} kept after failures",
            stats.translated,
            stats.skipped_same_language,
            stats.detection_failures + stats.translation_failures,
        );
    }
    Ok(())
}

fn cmd_dump(
    input: &Path,
    pages: Option<&str>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = PipelineOptions::new().with_extraction(extract_options(pages)?);
    let pipeline = Pipeline::new(Box::new(PdftotextSource::new())).with_options(options);

    let pdf = fs::read(input)?;
    let tables = pipeline.extract_tables(&pdf)?;
    println!("{}", tabxl::tables_to_json(&tables, !compact)?);
    Ok(())
}

fn cmd_languages() {
    println!("{}", "Supported target languages:".bold());
    for (code, name) in tabxl::translate::supported_languages() {
        println!("  {:6} {}", code.cyan(), name);
    }
}

fn cmd_version() {
    println!("tabxl {}", env!("CARGO_PKG_VERSION"));
    if PdftotextSource::is_available() {
        println!("pdftotext: {}", "available".green());
    } else {
        println!("pdftotext: {}", "not found".red());
    }
}

fn extract_options(pages: Option<&str>) -> Result<ExtractOptions, String> {
    let selection = match pages {
        Some(spec) => PageSelection::parse(spec)?,
        None => PageSelection::All,
    };
    Ok(ExtractOptions::new().with_pages(selection))
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
