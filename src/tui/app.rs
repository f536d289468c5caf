//! Application state and event loop

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::Widget,
    DefaultTerminal, Frame,
};

use crate::services::{DataLoaderService, LoadResult, UpdateEvent, WatchOptions, WatchService};
use crate::types::RankedListing;

use super::theme::Theme;
use super::widgets::{
    detail::DetailView,
    help::HelpPopup,
    listings::ListingsView,
    spinner::{LoadingStage, Spinner},
};

/// Outcome of one background load
type LoadOutcome = Result<Box<LoadResult>, String>;

/// Application state
pub enum AppState {
    /// Loading data with spinner animation
    Loading {
        spinner_frame: usize,
        stage: LoadingStage,
    },
    /// Ready with loaded data
    Ready { data: Box<LoadResult> },
    /// Error state
    Error { message: String },
}

/// Which screen is shown once data is ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Ranking,
    Detail,
}

/// Main application
pub struct App {
    state: AppState,
    theme: Theme,
    should_quit: bool,
    view: View,
    selected: usize,
    show_help: bool,
    /// A reload is running; the previous ranking stays on screen
    reloading: bool,
    reload_requested: bool,
    /// Last failed reload, shown until the next successful one
    last_error: Option<String>,
}

impl App {
    /// Create a new app in loading state
    pub fn new(theme: Theme) -> Self {
        Self {
            state: AppState::Loading {
                spinner_frame: 0,
                stage: LoadingStage::Fetching,
            },
            theme,
            should_quit: false,
            view: View::default(),
            selected: 0,
            show_help: false,
            reloading: false,
            reload_requested: false,
            last_error: None,
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                if self.show_help {
                    self.show_help = false;
                } else if self.view == View::Detail {
                    self.view = View::Ranking;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.reload_requested = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(self.last_index());
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.selected = 0;
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = self.last_index();
            }
            KeyCode::Enter | KeyCode::Tab => {
                if self.selected_entry().is_some() {
                    self.view = match self.view {
                        View::Ranking => View::Detail,
                        View::Detail => View::Ranking,
                    };
                }
            }
            _ => {}
        }
    }

    /// Number of ranked listings currently displayed
    fn listing_count(&self) -> usize {
        match &self.state {
            AppState::Ready { data } => data.ranked.len(),
            _ => 0,
        }
    }

    fn last_index(&self) -> usize {
        self.listing_count().saturating_sub(1)
    }

    fn selected_entry(&self) -> Option<&RankedListing> {
        match &self.state {
            AppState::Ready { data } => data.ranked.get(self.selected),
            _ => None,
        }
    }

    /// Consume a pending manual reload request
    pub fn take_reload_request(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }

    /// Mark a reload as started. Ready data stays visible; an error screen
    /// goes back to the spinner.
    pub fn begin_reload(&mut self) {
        match self.state {
            AppState::Ready { .. } => self.reloading = true,
            AppState::Error { .. } => {
                self.state = AppState::Loading {
                    spinner_frame: 0,
                    stage: LoadingStage::Refreshing,
                };
            }
            AppState::Loading { .. } => {}
        }
    }

    /// Apply a load result. The selection follows the same listing id
    /// across reloads; a failed reload keeps the previous ranking.
    fn apply_load(&mut self, result: LoadOutcome) {
        self.reloading = false;
        match result {
            Ok(data) => {
                let previous_id = self.selected_entry().map(|e| e.card.id.clone());
                self.selected = previous_id
                    .and_then(|id| data.ranked.iter().position(|e| e.card.id == id))
                    .unwrap_or(self.selected)
                    .min(data.ranked.len().saturating_sub(1));
                if data.ranked.is_empty() {
                    self.view = View::Ranking;
                }
                self.last_error = None;
                self.state = AppState::Ready { data };
            }
            Err(message) => {
                if matches!(self.state, AppState::Ready { .. }) {
                    self.last_error = Some(message);
                } else {
                    self.state = AppState::Error { message };
                }
            }
        }
    }

    /// Status text for the ranking title line
    fn status(&self) -> Option<String> {
        if self.reloading {
            Some("reloading…".to_string())
        } else {
            self.last_error
                .as_ref()
                .map(|e| format!("reload failed: {}", e))
        }
    }

    /// Update spinner animation
    pub fn tick(&mut self) {
        if let AppState::Loading {
            spinner_frame,
            stage,
        } = &self.state
        {
            self.state = AppState::Loading {
                spinner_frame: Spinner::next_frame(*spinner_frame),
                stage: *stage,
            };
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Draw the application
    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.state {
            AppState::Loading {
                spinner_frame,
                stage,
            } => {
                Spinner::new(*spinner_frame, *stage, self.theme).render(area, buf);
            }
            AppState::Ready { data } => {
                match (self.view, data.ranked.get(self.selected)) {
                    (View::Detail, Some(entry)) => {
                        DetailView::new(entry, data.ranked.len(), self.theme).render(area, buf);
                    }
                    _ => {
                        let status = self.status();
                        ListingsView::new(data, self.selected, self.theme)
                            .with_status(status.as_deref())
                            .render(area, buf);
                    }
                }

                if self.show_help {
                    let popup_area = HelpPopup::centered_area(area);
                    HelpPopup::new(self.theme).render(popup_area, buf);
                }
            }
            AppState::Error { message } => {
                let y = area.y + area.height / 2;
                let text = format!("Error: {}", message);
                let x = area.x + (area.width.saturating_sub(text.chars().count() as u16)) / 2;
                buf.set_string(x, y, &text, Style::default().fg(self.theme.error()));

                let hint = "r: retry  q: quit";
                let x = area.x + (area.width.saturating_sub(hint.len() as u16)) / 2;
                if y + 2 < area.y + area.height {
                    buf.set_string(x, y + 2, hint, Style::default().fg(self.theme.muted()));
                }
            }
        }
    }
}

/// Run the TUI application
pub fn run(loader: DataLoaderService, options: WatchOptions) -> anyhow::Result<()> {
    // Must happen before raw mode
    let theme = Theme::detect();
    let (_watch, updates) = WatchService::new(loader.source_handle(), options).spawn()?;

    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, App::new(theme), &loader, &updates);
    ratatui::restore();
    result
}

/// Load on a background thread, sending the outcome back to the UI loop
fn spawn_load(loader: &DataLoaderService, tx: &Sender<LoadOutcome>) {
    let loader = loader.clone();
    let tx = tx.clone();
    thread::spawn(move || {
        let result = loader.load().map(Box::new).map_err(|e| e.to_string());
        let _ = tx.send(result);
    });
}

fn run_app(
    terminal: &mut DefaultTerminal,
    mut app: App,
    loader: &DataLoaderService,
    updates: &Receiver<UpdateEvent>,
) -> anyhow::Result<()> {
    let (data_tx, data_rx) = mpsc::channel();
    spawn_load(loader, &data_tx);
    let mut in_flight = true;
    let mut reload_pending = false;

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        // Check for data loading completion (non-blocking)
        if let Ok(result) = data_rx.try_recv() {
            in_flight = false;
            app.apply_load(result);
        }

        // Bursts of update events collapse into one reload
        while let Ok(update) = updates.try_recv() {
            tracing::debug!(?update, "update event");
            reload_pending = true;
        }
        if app.take_reload_request() {
            reload_pending = true;
        }
        if reload_pending && !in_flight {
            app.begin_reload();
            spawn_load(loader, &data_tx);
            in_flight = true;
            reload_pending = false;
        }

        // Poll for events with 100ms timeout for spinner animation
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        } else {
            app.tick();
        }
    }

    Ok(())
}
