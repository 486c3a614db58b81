//! Convert a MARC file into a KBART inventory file.
//!
//! # Usage
//!
//! ```sh
//! marc2kbart records.mrc -o holdings.tsv
//! marc2kbart https://example.org/marc/collection.mrc -f xlsx -o holdings.xlsx
//! gzip -dc records.mrc.gz | marc2kbart -f csv > holdings.csv
//! ```
//!
//! The input may be a local path, `-` for stdin, or an `http(s)` URL.
//! Gzip-compressed input is detected and decompressed automatically.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, ValueEnum};
use flate2::read::GzDecoder;
use marc_kbart::convert::{convert_bytes, ConvertConfig};
use marc_kbart::OutputFormat;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const DEFAULT_XLSX_OUTPUT: &str = "output.xlsx";

/// Convert MARC records into a KBART holdings file.
#[derive(Debug, Parser)]
#[command(name = "marc2kbart", version, about)]
struct Cli {
    /// MARC file path, `-` for stdin, or an http(s) URL.
    #[arg(value_name = "INPUT", default_value = "-")]
    input: String,
    /// Output file (defaults to stdout for csv/tsv, output.xlsx for xlsx).
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Output format; inferred from the output extension when omitted.
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,
    /// Map records on a single thread.
    #[arg(long)]
    sequential: bool,
    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Tsv,
    Xlsx,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Tsv => OutputFormat::Tsv,
            FormatArg::Xlsx => OutputFormat::Xlsx,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = resolve_format(cli.format, cli.output.as_deref());
    let marc = maybe_decompress(load_input(&cli.input)?)?;
    if marc.is_empty() {
        bail!("input is empty: {}", cli.input);
    }

    let config = ConvertConfig::default()
        .with_format(format)
        .with_parallel(!cli.sequential);
    let converted = convert_bytes(&marc, &config)
        .with_context(|| format!("Error processing MARC file {}", cli.input))?;

    let output = match cli.output {
        Some(path) => Some(path),
        None if !format.is_text() => Some(PathBuf::from(DEFAULT_XLSX_OUTPUT)),
        None => None,
    };
    write_output(output.as_deref(), &converted.bytes)?;

    info!(rows = converted.rows, %format, "wrote KBART file");
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn resolve_format(explicit: Option<FormatArg>, output: Option<&Path>) -> OutputFormat {
    explicit.map(OutputFormat::from).unwrap_or_else(|| {
        output
            .and_then(Path::extension)
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .unwrap_or_default()
    })
}

fn load_input(input: &str) -> anyhow::Result<Vec<u8>> {
    if input == "-" {
        let mut buffer = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .context("Failed to read MARC data from stdin")?;
        return Ok(buffer);
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        return fetch(input);
    }
    if input.contains("://") {
        bail!("Invalid URL format: {input}. Please provide an http(s) URL for the MARC file.");
    }

    std::fs::read(input).with_context(|| format!("Failed to open input file '{input}'"))
}

fn fetch(url: &str) -> anyhow::Result<Vec<u8>> {
    debug!(url, "fetching MARC file");
    let response = reqwest::blocking::get(url)
        .and_then(reqwest::blocking::Response::error_for_status)
        .with_context(|| format!("Error fetching MARC file from {url}"))?;
    let body = response
        .bytes()
        .with_context(|| format!("Error reading MARC file body from {url}"))?;
    debug!(bytes = body.len(), "fetched MARC file");
    Ok(body.to_vec())
}

fn maybe_decompress(data: Vec<u8>) -> anyhow::Result<Vec<u8>> {
    if !data.starts_with(&GZIP_MAGIC) {
        return Ok(data);
    }
    let mut decoded = Vec::new();
    GzDecoder::new(data.as_slice())
        .read_to_end(&mut decoded)
        .context("Failed to decompress gzip input")?;
    debug!(
        compressed = data.len(),
        decompressed = decoded.len(),
        "decompressed gzip input"
    );
    Ok(decoded)
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file '{}'", path.display()))?;
            let mut writer = BufWriter::new(file);
            writer.write_all(bytes)?;
            writer.flush()?;
            info!(path = %path.display(), "output written");
        },
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        },
    }
    Ok(())
}
