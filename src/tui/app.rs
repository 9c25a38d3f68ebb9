use crate::config::Config;
use crate::core::{ExportEndpoint, InputSource, InsightCollection, InsightError, RequestToken};
use crate::services::debounce::Debouncer;
use crate::services::session::NOTHING_TO_DOWNLOAD_MESSAGE;
use crate::services::{
    ConversionBackend, ConversionOutcome, ExportFile, ExportRequest, ExportService, InsightSession,
    PendingConversion,
};
use crate::tui::components::insight_panel::error_paragraph;
use crate::tui::components::{
    FlashKind, HelpDialog, InsightPanel, PromptDialog, PromptPurpose, SearchBar, StatusBar, TabBar,
};
use crate::tui::{
    Action, Component, Focusable, InputOutcome, KeyBindings, RenderContext, TextInput, Theme,
};
use chrono::{Local, NaiveDate};
use color_eyre::Result;
use crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Results coming back from worker threads
#[derive(Debug)]
pub enum AppEvent {
    Converted {
        token: RequestToken,
        result: Result<InsightCollection, InsightError>,
    },
    Downloaded {
        path: PathBuf,
        result: Result<ExportFile, InsightError>,
    },
}

/// Everything the app takes from configuration
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub search_debounce: Duration,
    pub export_dir: PathBuf,
    pub theme: Theme,
    pub keybindings: KeyBindings,
}

impl AppSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            search_debounce: config.search_debounce(),
            export_dir: config.export_dir.clone(),
            theme: Theme::by_name(&config.theme),
            keybindings: KeyBindings::load_or_default(config.keybindings_path.as_deref()),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            search_debounce: crate::services::debounce::DEFAULT_SEARCH_DEBOUNCE,
            export_dir: PathBuf::from("."),
            theme: Theme::default(),
            keybindings: KeyBindings::default(),
        }
    }
}

/// Application state
///
/// Owns the session and routes keys to components. Remote calls run on
/// worker threads and report back through a channel drained on every tick.
pub struct App {
    session: InsightSession,
    backend: Arc<dyn ConversionBackend>,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    debouncer: Debouncer<String>,

    tab_bar: TabBar,
    panel: InsightPanel,
    search_bar: SearchBar,
    status_bar: StatusBar,
    prompt: Option<PromptDialog>,
    help: Option<HelpDialog>,

    keybindings: KeyBindings,
    theme: Theme,
    export_dir: PathBuf,
    should_quit: bool,
}

impl App {
    pub fn new(backend: Arc<dyn ConversionBackend>, settings: AppSettings) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            session: InsightSession::new(),
            backend,
            events_tx,
            events_rx,
            debouncer: Debouncer::new(settings.search_debounce),
            tab_bar: TabBar::new(),
            panel: InsightPanel::new(),
            search_bar: SearchBar::new(),
            status_bar: StatusBar::new(),
            prompt: None,
            help: None,
            keybindings: settings.keybindings,
            theme: settings.theme,
            export_dir: settings.export_dir,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &InsightSession {
        &self.session
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_bar.flash_message()
    }

    pub fn is_prompt_open(&self) -> bool {
        self.prompt.is_some()
    }

    /// Raise the error banner from outside the key loop
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.session.show_error(message);
    }

    /// Validate and send raw JSON for conversion
    pub fn submit_text(&mut self, text: &str, source: InputSource) {
        match self.session.prepare_conversion(text, &source) {
            Ok(pending) => self.spawn_conversion(pending),
            Err(e) => debug!("Input rejected: {e}"),
        }
    }

    pub fn open_file(&mut self, path: &Path) {
        match self.session.prepare_file(path) {
            Ok(pending) => self.spawn_conversion(pending),
            Err(e) => debug!("File rejected: {e}"),
        }
    }

    fn spawn_conversion(&mut self, pending: PendingConversion) {
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        info!("Sending conversion {}", pending.token);
        std::thread::spawn(move || {
            let result = backend.convert(&pending.payload);
            if tx
                .send(AppEvent::Converted {
                    token: pending.token,
                    result,
                })
                .is_err()
            {
                debug!("Conversion {} finished after shutdown", pending.token);
            }
        });
    }

    fn spawn_download(&mut self, request: ExportRequest) {
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        let path = self.export_dir.join(&request.filename);
        info!("Requesting {} export to {}", request.endpoint, path.display());
        self.status_bar
            .flash(format!("Exporting {}…", request.filename), FlashKind::Info);
        std::thread::spawn(move || {
            let result = backend.download(request.endpoint, &request.body);
            if tx.send(AppEvent::Downloaded { path, result }).is_err() {
                debug!("Download finished after shutdown");
            }
        });
    }

    /// Drain finished work, fire a due search, expire old messages
    pub fn tick(&mut self, now: Instant) {
        loop {
            match self.events_rx.try_recv() {
                Ok(event) => self.handle_event(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if let Some(term) = self.debouncer.poll(now) {
            self.apply_search(&term);
        }
        self.status_bar.expire(now);
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Converted { token, result } => {
                if self.session.complete_conversion(token, result) == ConversionOutcome::Applied {
                    self.panel.reset_scroll();
                    let term = self.search_bar.value().to_string();
                    if !term.is_empty() {
                        self.apply_search(&term);
                    }
                    let count = self.session.stats().count;
                    self.status_bar
                        .flash(format!("Loaded {count} insights"), FlashKind::Success);
                }
            }
            AppEvent::Downloaded { path, result } => {
                let saved = result.and_then(|file| ExportService::save(&path, &file.bytes));
                match saved {
                    Ok(path) => self
                        .status_bar
                        .flash(format!("Saved {}", path.display()), FlashKind::Success),
                    Err(e) => {
                        warn!("Export to {} failed: {e}", path.display());
                        self.session.show_error(format!("Error downloading file: {e}"));
                    }
                }
            }
        }
    }

    fn apply_search(&mut self, term: &str) {
        self.session.search(term);
        self.panel.reset_scroll();
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        if let Some(prompt) = &mut self.prompt {
            match prompt.handle_key(key) {
                InputOutcome::Submitted(value) => {
                    let purpose = prompt.purpose();
                    self.prompt = None;
                    self.complete_prompt(purpose, &value);
                }
                InputOutcome::Cancelled => self.prompt = None,
                InputOutcome::Edited | InputOutcome::Ignored => {}
            }
            return Ok(());
        }

        if self.search_bar.is_focused() {
            match self.search_bar.handle_key(key) {
                InputOutcome::Edited => {
                    let term = self.search_bar.value().to_string();
                    self.debouncer.push(term, Instant::now());
                }
                InputOutcome::Submitted(term) => {
                    self.debouncer.cancel();
                    self.apply_search(&term);
                }
                InputOutcome::Cancelled | InputOutcome::Ignored => {}
            }
            return Ok(());
        }

        if let Some(action) = self.keybindings.get_action(&key) {
            self.handle_action(action)?;
        }
        Ok(())
    }

    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        if let Some(help) = &mut self.help {
            if matches!(action, Action::ToggleHelp | Action::Cancel | Action::Quit) {
                self.help = None;
            } else {
                help.handle_action(action)?;
            }
            return Ok(());
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleHelp => self.help = Some(HelpDialog::new()),
            Action::Cancel | Action::DismissError => {
                if self.session.error().is_some() {
                    self.session.dismiss_error();
                }
            }
            Action::NextTab => {
                if self.session.next_tab() {
                    self.panel.reset_scroll();
                }
            }
            Action::PrevTab => {
                if self.session.previous_tab() {
                    self.panel.reset_scroll();
                }
            }
            Action::Search => {
                self.search_bar.handle_action(action)?;
            }
            Action::ClearSearch => {
                self.search_bar.handle_action(action)?;
                self.debouncer.cancel();
                self.apply_search("");
            }
            Action::OpenFile => {
                self.prompt = Some(PromptDialog::new(PromptPurpose::OpenFile, ""));
            }
            Action::PasteJson => match ExportService::read_clipboard() {
                Ok(text) => self.submit_text(&text, InputSource::Pasted),
                Err(e) => self.session.show_error(e.to_string()),
            },
            Action::Export => self.open_export_prompt(PromptPurpose::ServerExport(ExportEndpoint::Download)),
            Action::ExportCsv => self.open_export_prompt(PromptPurpose::LocalCsv),
            Action::CopyMarkdown => {
                let copied = self
                    .session
                    .markdown()
                    .and_then(|md| ExportService::copy_to_clipboard(&md));
                match copied {
                    Ok(()) => self
                        .status_bar
                        .flash("Copied insight as Markdown", FlashKind::Success),
                    Err(e) => self.session.show_error(e.to_string()),
                }
            }
            Action::Confirm => {}
            _ => {
                if self.session.results_visible() {
                    self.panel.handle_action(action)?;
                }
            }
        }
        Ok(())
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn open_export_prompt(&mut self, purpose: PromptPurpose) {
        if !self.session.has_data() {
            self.session.show_error(NOTHING_TO_DOWNLOAD_MESSAGE);
            return;
        }
        let default = self.session.default_export_filename(Self::today());
        let initial = match purpose {
            PromptPurpose::LocalCsv => csv_filename(&default),
            _ => default,
        };
        self.prompt = Some(PromptDialog::new(purpose, initial));
    }

    fn complete_prompt(&mut self, purpose: PromptPurpose, value: &str) {
        match purpose {
            PromptPurpose::OpenFile => {
                let path = value.trim();
                if !path.is_empty() {
                    self.open_file(Path::new(path));
                }
            }
            PromptPurpose::ServerExport(endpoint) => {
                match self.session.export_request(endpoint, Some(value), Self::today()) {
                    Ok(request) => self.spawn_download(request),
                    Err(e) => self.session.show_error(e.to_string()),
                }
            }
            PromptPurpose::LocalCsv => {
                let Some(panel) = self.session.active_panel() else {
                    self.session.show_error(NOTHING_TO_DOWNLOAD_MESSAGE);
                    return;
                };
                let name = match value.trim() {
                    "" => csv_filename(&ExportService::fallback_filename(Self::today())),
                    name => name.to_string(),
                };
                let path = self.export_dir.join(name);
                match ExportService::save_csv(&path, &panel) {
                    Ok(path) => self
                        .status_bar
                        .flash(format!("Saved {}", path.display()), FlashKind::Success),
                    Err(e) => self.session.show_error(format!("Error writing file: {e}")),
                }
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // tabs
                Constraint::Length(3), // search
                Constraint::Min(0),    // panel
                Constraint::Length(1), // status
            ])
            .split(area);

        let ctx = RenderContext {
            session: &self.session,
            theme: &self.theme,
            keybindings: &self.keybindings,
        };

        self.tab_bar.render(frame, chunks[0], &ctx);
        self.search_bar.render(frame, chunks[1], &ctx);
        match self.session.error() {
            Some(message) => {
                let dismiss = self.keybindings.hint(Action::DismissError);
                frame.render_widget(error_paragraph(message, &dismiss, &self.theme), chunks[2]);
            }
            None => self.panel.render(frame, chunks[2], &ctx),
        }
        self.status_bar.render(frame, chunks[3], &ctx);

        if let Some(prompt) = &mut self.prompt {
            let dialog_area = Self::centered_rect(60, 5, area);
            prompt.render(frame, dialog_area, &ctx);
        }
        if let Some(help) = &mut self.help {
            let help_area = Self::centered_rect(70, area.height.saturating_sub(4), area);
            help.render(frame, help_area, &ctx);
        }
    }

    /// Rectangle `percent_w` wide and `height` rows tall, centered in `area`
    fn centered_rect(percent_w: u16, height: u16, area: Rect) -> Rect {
        let width = (area.width * percent_w) / 100;
        let height = height.min(area.height);
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }
}

fn csv_filename(name: &str) -> String {
    Path::new(name).with_extension("csv").to_string_lossy().into_owned()
}
