use chrono::Local;
use clap::{Parser, ValueEnum};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{self, Event as CEvent};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use insightview::config::Config;
use insightview::core::{ExportEndpoint, InputSource, InsightError};
use insightview::services::{ConversionOutcome, ConvertService, ExportService};
use insightview::tui::{App, AppSettings};
use insightview::{ConversionBackend, HttpBackend, InsightSession};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde_json::Value;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Terminal viewer for insight JSON, backed by a conversion server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON files to load on startup; `-` reads stdin. Several files are merged.
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Conversion server base URL (overrides server_url)
    #[arg(long = "server", value_name = "URL")]
    server: Option<String>,
    /// Print summary counts as JSON and exit
    #[arg(long = "stats")]
    stats: bool,
    /// Convert, download the spreadsheet to PATH and exit
    #[arg(long = "export", value_name = "PATH")]
    export: Option<PathBuf>,
    /// Use the CSV route for --export
    #[arg(long = "csv", requires = "export")]
    csv: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    insightview::logging::init_with(None, args.logging.map(Into::into))?;

    let config = Config::from_path(args.config.as_ref())?.with_server_override(args.server.clone());
    config.validate()?;
    info!("Using conversion server {}", config.server_url);
    let backend = Arc::new(HttpBackend::new(&config.server_url, config.request_timeout())?);

    let input = read_inputs(&args.files);

    if args.stats || args.export.is_some() {
        return run_headless(&args, backend.as_ref(), input);
    }

    let mut app = App::new(backend, AppSettings::from_config(&config));
    match input {
        Ok(Some((text, source))) => app.submit_text(&text, source),
        Ok(None) => {}
        Err(e) => app.show_error(e.to_string()),
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    if let Err(e) = &res {
        error!("Error: {e}");
    }
    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if event::poll(Duration::from_millis(50))?
            && let CEvent::Key(key) = event::read()?
        {
            app.handle_key_event(key)?;
        }
        app.tick(Instant::now());

        if app.should_quit() {
            return Ok(());
        }
    }
}

/// Load FILES into one document. `None` when nothing was given.
fn read_inputs(files: &[PathBuf]) -> Result<Option<(String, InputSource)>, InsightError> {
    match files {
        [] => Ok(None),
        [single] => read_one(single).map(Some),
        [first, ..] => {
            let mut documents = Vec::with_capacity(files.len());
            for path in files {
                let (text, source) = read_one(path)?;
                let document: Value = serde_json::from_str(text.trim())
                    .map_err(|e| InsightError::input(format!("Error reading file: {source}: {e}")))?;
                documents.push(document);
            }
            let merged = ConvertService::merge_documents(documents);
            Ok(Some((merged.to_string(), source_for(first))))
        }
    }
}

fn read_one(path: &Path) -> Result<(String, InputSource), InsightError> {
    let source = source_for(path);
    let text = match source {
        InputSource::Stdin => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).map(|_| buf)
        }
        _ => std::fs::read_to_string(path),
    }
    .map_err(|e| InsightError::input(format!("Error reading file: {e}")))?;
    Ok((text, source))
}

fn source_for(path: &Path) -> InputSource {
    if path.as_os_str() == "-" {
        InputSource::Stdin
    } else {
        InputSource::File(path.to_path_buf())
    }
}

fn run_headless(
    args: &Args,
    backend: &dyn ConversionBackend,
    input: Result<Option<(String, InputSource)>, InsightError>,
) -> Result<()> {
    let (text, source) = input?.ok_or_else(|| eyre!("--stats and --export need at least one input file"))?;

    let mut session = InsightSession::new();
    if session.convert_blocking(backend, &text, &source)? != ConversionOutcome::Applied {
        return Err(eyre!(session.error().unwrap_or("Conversion failed").to_string()));
    }

    if args.stats {
        println!("{}", serde_json::to_string_pretty(&session.stats())?);
    }

    if let Some(target) = &args.export {
        let endpoint = if args.csv {
            ExportEndpoint::DownloadCsv
        } else {
            ExportEndpoint::Download
        };
        let filename = target.file_name().map(|n| n.to_string_lossy().into_owned());
        let request = session.export_request(endpoint, filename.as_deref(), Local::now().date_naive())?;
        let file = backend
            .download(request.endpoint, &request.body)
            .map_err(|e| eyre!("Error downloading file: {e}"))?;
        let saved = ExportService::save(target, &file.bytes)?;
        println!("Saved {}", saved.display());
    }
    Ok(())
}
