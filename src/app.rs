use crossterm::event::{KeyCode, KeyEvent};
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::chart::{Bar, ChartRenderer};
use crate::config::AppConfig;
use crate::feed::client::FeedClient;
use crate::feed::schema::{DuplicatesResponse, FeedSchema, FrequenciesResponse, KeyVal, PeopleResponse, Person};
use crate::feed::{Feed, FeedError, FeedKind};
use crate::theme::Theme;

/// How long a status message stays in the info line
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Outcome of one fetch, delivered back to the UI loop
#[derive(Debug)]
pub enum FeedEvent {
    People(Result<Vec<Person>, FeedError>),
    Frequencies(Result<Vec<KeyVal>, FeedError>),
    Duplicates(Result<Vec<Value>, FeedError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App {
    pub section: FeedKind,
    pub popup: Popup,

    // One binder per region
    pub people: Feed<Person>,
    pub frequencies: Feed<KeyVal>,
    pub duplicates: Feed<Value>,

    // Chart derived from the frequencies payload, rebuilt on every update
    pub chart: ChartRenderer,
    pub bars: Vec<Bar>,

    // Scroll offset per region, indexed like FeedKind::ALL
    pub scroll: [usize; 3],

    pub theme: Theme,
    pub autoload: bool,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    client: FeedClient,
    events_tx: UnboundedSender<FeedEvent>,
    events_rx: UnboundedReceiver<FeedEvent>,
}

fn section_index(kind: FeedKind) -> usize {
    match kind {
        FeedKind::People => 0,
        FeedKind::Frequencies => 1,
        FeedKind::Duplicates => 2,
    }
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let endpoints = &config.endpoints;

        Self {
            section: FeedKind::People,
            popup: Popup::None,

            people: Feed::new(FeedKind::People, endpoints.path(FeedKind::People)),
            frequencies: Feed::new(FeedKind::Frequencies, endpoints.path(FeedKind::Frequencies)),
            duplicates: Feed::new(FeedKind::Duplicates, endpoints.path(FeedKind::Duplicates)),

            chart: ChartRenderer::new(config.chart.bar_height),
            bars: Vec::new(),

            scroll: [0; 3],

            theme: Theme::from_config(&config.theme),
            autoload: config.autoload,

            status_message: None,
            status_message_time: None,

            client: FeedClient::new(config.base_url.clone()),
            events_tx,
            events_rx,
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Kick off the initial fetches if the config asks for them
    pub fn start(&mut self) {
        if self.autoload {
            tracing::info!("Loading all feeds from {}", self.client.base_url());
            self.activate_all();
        } else {
            self.set_status("Press R to load all feeds");
        }
    }

    /// Set a status message (auto-clears after a few seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn activate_all(&mut self) {
        for kind in FeedKind::ALL {
            self.activate(kind);
        }
    }

    /// Send one request for `kind`; the result arrives through the event channel
    pub fn activate(&mut self, kind: FeedKind) {
        match kind {
            FeedKind::People => {
                self.people.mark_pending();
                self.spawn_fetch::<PeopleResponse, _>(self.people.endpoint().to_string(), FeedEvent::People);
            }
            FeedKind::Frequencies => {
                self.frequencies.mark_pending();
                self.spawn_fetch::<FrequenciesResponse, _>(
                    self.frequencies.endpoint().to_string(),
                    FeedEvent::Frequencies,
                );
            }
            FeedKind::Duplicates => {
                self.duplicates.mark_pending();
                self.spawn_fetch::<DuplicatesResponse, _>(
                    self.duplicates.endpoint().to_string(),
                    FeedEvent::Duplicates,
                );
            }
        }
    }

    fn spawn_fetch<S, F>(&self, endpoint: String, wrap: F)
    where
        S: FeedSchema + Send + 'static,
        F: FnOnce(Result<Vec<S::Item>, FeedError>) -> FeedEvent + Send + 'static,
    {
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.fetch::<S>(&endpoint).await;
            if tx.send(wrap(result)).is_err() {
                tracing::debug!("Dashboard closed before {} fetch finished", S::KIND);
            }
        });
    }

    /// Apply one fetch outcome to its feed
    pub fn handle_event(&mut self, event: FeedEvent) {
        let (kind, outcome) = match event {
            FeedEvent::People(result) => (
                FeedKind::People,
                self.people.apply(result).map(|_| self.people.payload().len()),
            ),
            FeedEvent::Frequencies(result) => {
                let outcome = self.frequencies.apply(result).map(|_| self.frequencies.payload().len());
                if outcome.is_ok() {
                    self.bars = self.chart.render(self.frequencies.payload());
                }
                (FeedKind::Frequencies, outcome)
            }
            FeedEvent::Duplicates(result) => (
                FeedKind::Duplicates,
                self.duplicates.apply(result).map(|_| self.duplicates.payload().len()),
            ),
        };

        match outcome {
            Ok(items) => {
                tracing::info!(feed = %kind, items, "Feed updated");
                self.clamp_scroll(kind);
            }
            Err(e) => {
                tracing::warn!(feed = %kind, "Feed fetch failed: {}", e);
                self.set_status(format!("{} failed: {}", kind.title(), e));
            }
        }
    }

    /// Apply whatever fetches have finished since the last call
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    pub fn tick(&mut self) {
        self.drain_events();

        if let Some(shown_at) = self.status_message_time {
            if shown_at.elapsed() >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Number of rows a region can scroll through
    pub fn row_count(&self, kind: FeedKind) -> usize {
        match kind {
            FeedKind::People => self.people.payload().len(),
            FeedKind::Frequencies => self.bars.len(),
            FeedKind::Duplicates => self.duplicates.payload().len(),
        }
    }

    pub fn scroll_of(&self, kind: FeedKind) -> usize {
        self.scroll[section_index(kind)]
    }

    pub fn is_pending(&self, kind: FeedKind) -> bool {
        match kind {
            FeedKind::People => self.people.is_pending(),
            FeedKind::Frequencies => self.frequencies.is_pending(),
            FeedKind::Duplicates => self.duplicates.is_pending(),
        }
    }

    fn clamp_scroll(&mut self, kind: FeedKind) {
        let max = self.row_count(kind).saturating_sub(1);
        let offset = &mut self.scroll[section_index(kind)];
        *offset = (*offset).min(max);
    }

    fn move_down(&mut self) {
        let kind = self.section;
        self.scroll[section_index(kind)] += 1;
        self.clamp_scroll(kind);
    }

    fn move_up(&mut self) {
        let offset = &mut self.scroll[section_index(self.section)];
        *offset = offset.saturating_sub(1);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.popup == Popup::Help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Enter | KeyCode::Char('q')
            ) {
                self.popup = Popup::None;
            }
            return;
        }

        match key.code {
            // Navigation between regions (People → Frequencies → Duplicates)
            KeyCode::Tab => {
                self.section = match self.section {
                    FeedKind::People => FeedKind::Frequencies,
                    FeedKind::Frequencies => FeedKind::Duplicates,
                    FeedKind::Duplicates => FeedKind::People,
                };
            }
            KeyCode::BackTab => {
                self.section = match self.section {
                    FeedKind::People => FeedKind::Duplicates,
                    FeedKind::Frequencies => FeedKind::People,
                    FeedKind::Duplicates => FeedKind::Frequencies,
                };
            }

            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),

            // Refresh
            KeyCode::Char('r') => {
                let kind = self.section;
                self.activate(kind);
                self.set_status(format!("Refreshing {}", kind.title()));
            }
            KeyCode::Char('R') => {
                self.activate_all();
                self.set_status("Refreshing all feeds");
            }
            KeyCode::Char('1') => self.activate(FeedKind::People),
            KeyCode::Char('2') => self.activate(FeedKind::Frequencies),
            KeyCode::Char('3') => self.activate(FeedKind::Duplicates),

            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,

            _ => {}
        }
    }
}
