//! gen-epub-book - Generate an ePub book from a plaintext descriptor

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use log::info;

use gen_epub_book::descriptor::DescriptorParser;
use gen_epub_book::export::EpubPacker;
use gen_epub_book::io::{HttpFetcher, LocalFs, Resolver};

#[derive(Parser)]
#[command(name = "gen-epub-book")]
#[command(version, about = "Generate an ePub book from a simple plaintext descriptor", long_about = None)]
#[command(disable_version_flag = true)]
#[command(after_help = "EXAMPLES:
    gen-epub-book book/book.epupp out/book.epub       Pack a book
    gen-epub-book -S = book/book.epupp book.epub      Use `Key = Value` lines")]
struct Cli {
    /// Descriptor file to read
    #[arg(value_name = "IN_FILE", value_parser = existing_file)]
    in_file: PathBuf,

    /// ePub file to write
    #[arg(value_name = "OUT_FILE")]
    out_file: PathBuf,

    /// Separator between keys and values
    #[arg(short = 'S', long, value_name = "SEP", default_value = ":")]
    separator: String,

    /// Accept any ISO8601/RFC2822 date, not only RFC3339
    #[arg(short = 'D', long)]
    free_date: bool,

    /// Timeout for each remote fetch, in seconds
    #[arg(short, long, value_name = "SECONDS", default_value_t = 30)]
    timeout: u64,

    /// Suppress warnings
    #[arg(short, long)]
    quiet: bool,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,
}

fn existing_file(path: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("descriptor file \"{}\" does not exist", path.display()))
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => {
                    eprintln!("\n{}", Cli::command().render_help());
                    ExitCode::FAILURE
                }
            };
        }
    };

    let level = if cli.quiet { "error" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match generate(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn generate(cli: &Cli) -> gen_epub_book::Result<()> {
    let text = fs::read_to_string(&cli.in_file)?;
    let root = relative_root(&cli.in_file);

    let book = DescriptorParser::new(&LocalFs)
        .with_separator(cli.separator.as_str())
        .with_free_date(cli.free_date)
        .parse(&text, &root)?;

    let fetcher = HttpFetcher::new(Duration::from_secs(cli.timeout));
    let mut epub = Cursor::new(Vec::new());
    EpubPacker::new().export(&book, &Resolver::new(&LocalFs, &fetcher), &mut epub)?;

    if let Some(parent) = cli.out_file.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(&cli.out_file, epub.into_inner())?;

    info!("Wrote {}", cli.out_file.display());
    Ok(())
}

/// Directory local paths in the descriptor are relative to.
fn relative_root(in_file: &Path) -> String {
    let root = in_file
        .parent()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();
    if root.is_empty() { ".".to_string() } else { root }
}
