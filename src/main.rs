use std::path::PathBuf;

use clap::{Parser, Subcommand};
use locale_sheet_sync::auth::{CredentialProvider, FileCredentialProvider};
use locale_sheet_sync::config::SyncConfig;
use locale_sheet_sync::io::{ValueInputMode, WorkbookStore};
use locale_sheet_sync::model::LanguageSet;
use locale_sheet_sync::reconcile::ReconcileLayout;
use locale_sheet_sync::sync;
use locale_sheet_sync::{Result, ToolError};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose).and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let (args, direction) = match cli.command {
        Command::Export(args) => (args, Direction::Export),
        Command::Import(args) => (args, Direction::Import),
    };

    let config = args.into_config()?;
    config.validate()?;

    if let Some(credentials) = &config.credentials {
        let token = config
            .token
            .clone()
            .unwrap_or_else(|| PathBuf::from("token.json"));
        FileCredentialProvider::new(credentials, token).authorize()?;
    }

    let mut store = WorkbookStore::new(&config.workbook).with_header(config.header());
    match direction {
        Direction::Export => {
            let report = sync::export(&config, &mut store)?;
            if report.initial_population {
                info!(rows = report.written, "locale files exported to an empty sheet");
            } else {
                info!(
                    rows = report.written,
                    added = report.summary.added,
                    updated = report.summary.updated,
                    need_translation = report.summary.need_translation,
                    "locale files exported"
                );
            }
        }
        Direction::Import => {
            let report = sync::import(&config, &mut store)?;
            for (language, applied) in &report.applied {
                info!(language, applied, "locale file updated");
            }
        }
    }
    Ok(())
}

enum Direction {
    Export,
    Import,
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Synchronise per-language JSON locale files with a translation sheet."
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Flatten the locale files and merge them into the sheet.
    Export(SyncArgs),
    /// Write the sheet back into the locale files.
    Import(SyncArgs),
}

#[derive(clap::Args)]
struct SyncArgs {
    /// JSON configuration file; flags given on the command line win.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding one `<language>.json` file per language.
    #[arg(long)]
    locales: Option<PathBuf>,

    /// Workbook holding the translation sheet.
    #[arg(long)]
    workbook: Option<PathBuf>,

    /// Sheet range in A1 notation, e.g. `kefu!A2:G`.
    #[arg(long)]
    range: Option<String>,

    /// Comma separated language codes in column order.
    #[arg(long, value_parser = parse_languages)]
    languages: Option<LanguageSet>,

    /// Number of leading languages compared during export.
    #[arg(long)]
    checked_languages: Option<usize>,

    /// How values are stored in the sheet.
    #[arg(long, value_enum)]
    input_mode: Option<ValueInputMode>,

    /// OAuth client secret file.
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Stored OAuth token, `token.json` by default.
    #[arg(long)]
    token: Option<PathBuf>,
}

fn parse_languages(value: &str) -> std::result::Result<LanguageSet, String> {
    value.parse().map_err(|error: ToolError| error.to_string())
}

impl SyncArgs {
    fn into_config(self) -> Result<SyncConfig> {
        let mut config = match &self.config {
            Some(path) => SyncConfig::load(path)?,
            None => SyncConfig::default(),
        };

        if let Some(locales) = self.locales {
            config.locales_dir = locales;
        }
        if let Some(workbook) = self.workbook {
            config.workbook = workbook;
        }
        if let Some(range) = self.range {
            config.range = range;
        }
        if let Some(languages) = self.languages {
            config.languages = languages;
        }
        if let Some(checked) = self.checked_languages {
            config.layout = ReconcileLayout::checking(checked);
        }
        if let Some(mode) = self.input_mode {
            config.input_mode = mode;
        }
        if let Some(credentials) = self.credentials {
            config.credentials = Some(credentials);
        }
        if let Some(token) = self.token {
            config.token = Some(token);
        }
        Ok(config)
    }
}
