use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

mod config;
mod extract;

#[derive(Parser)]
#[command(name = "pdftext")]
#[command(about = "Print the plain text of a PDF file")]
#[command(version)]
struct Cli {
    /// PDF file to read (falls back to config, then $PDFTEXT_PATH)
    path: Option<PathBuf>,
}

fn init_logging() {
    // stdout is reserved for the extracted text
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Write the text and a trailing newline. A reader that hung up early
/// (`pdftext doc.pdf | head`) is not an error.
fn write_text<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    match writeln!(out, "{}", text).and_then(|_| out.flush()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let path = config::input_path(cli.path)?;
    let content = extract::read_pdf(&path)?;

    write_text(&mut io::stdout().lock(), &content)?;

    Ok(())
}
