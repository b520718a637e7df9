//! Top-level application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. Every edit of the query
//! text is pushed into the [`TermSubject`]; each frame drains whatever the
//! pipeline has delivered since the last one.

use crate::{
    event::{self, AppEvent, Direction},
    theme::Theme,
    widgets::{
        help::HelpPopup,
        query_bar::{QueryBar, QueryBarState},
        results::{ResultList, ResultsState},
        status_bar::{SearchStatus, StatusBar},
    },
};
use crossterm::{
    event::{self as ct_event, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use lookahead_core::{
    config::Config, PipelineOptions, SearchEvent, SearchEvents, Term, TermSubject,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout},
    Frame, Terminal,
};
use std::{io, time::Duration};
use tokio::sync::mpsc::error::TryRecvError;

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    QueryBar,
    Results,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub query: QueryBarState,
    pub results: ResultsState,
    pub focus: Focus,
    pub theme: Theme,
    pub config: Config,
    pub options: PipelineOptions,
    pub show_help: bool,
    pub quit: bool,
    /// Outcome of the last settled query, or a source failure.
    settled: SearchStatus,
    /// Term `settled` belongs to.
    settled_term: Option<Term>,
}

impl AppState {
    pub fn new(config: Config, theme: Theme, options: PipelineOptions) -> Self {
        Self {
            query: QueryBarState::default(),
            results: ResultsState::default(),
            focus: Focus::QueryBar,
            theme,
            config,
            options,
            show_help: false,
            quit: false,
            settled: SearchStatus::Idle,
            settled_term: None,
        }
    }

    /// Status to display for the current query text.
    ///
    /// The query is pending while its text differs from the last settled
    /// term, unless the pipeline would never dispatch it.
    pub fn status(&self) -> SearchStatus {
        if matches!(self.settled, SearchStatus::Stopped(_)) {
            return self.settled.clone();
        }
        let term = if self.options.trim {
            self.query.query.trim()
        } else {
            self.query.query.as_str()
        };
        let below_min = term.chars().count() < self.options.min_len;
        let untouched = self.settled_term.is_none() && term.is_empty();
        if below_min || untouched || self.settled_term.as_deref() == Some(term) {
            self.settled.clone()
        } else {
            SearchStatus::Pending
        }
    }

    /// Right-aligned summary shown in the query bar.
    pub fn summary(&self) -> String {
        format!(
            "{} · {}ms",
            self.options.strategy,
            self.options.debounce.as_millis()
        )
    }
}

// ---------------------------------------------------------------------------
// State transitions
// ---------------------------------------------------------------------------

/// Apply one key event. Returns the new query text when it changed, which the
/// caller pushes into the term source.
pub fn handle(s: &mut AppState, event: AppEvent) -> Option<Term> {
    // Help popup intercepts all events; only close keys pass through.
    if s.show_help {
        match event {
            AppEvent::Char('?') | AppEvent::Help | AppEvent::Escape => {
                tracing::debug!("help popup closed");
                s.show_help = false;
            }
            AppEvent::Quit => s.quit = true,
            _ => {}
        }
        return None;
    }

    match event {
        AppEvent::Quit => {
            tracing::debug!("quit");
            s.quit = true;
            None
        }
        AppEvent::Help => {
            tracing::debug!("help popup opened");
            s.show_help = true;
            None
        }
        AppEvent::FocusNext => {
            s.focus = match s.focus {
                Focus::QueryBar => Focus::Results,
                Focus::Results => Focus::QueryBar,
            };
            tracing::debug!(focus = ?s.focus, "focus cycle");
            None
        }
        AppEvent::QueryFocus => {
            s.focus = Focus::QueryBar;
            None
        }
        AppEvent::Escape => {
            if s.focus == Focus::QueryBar {
                s.focus = Focus::Results;
            }
            None
        }
        AppEvent::Resize(_, _) => None,

        // Up/down always drive the result selection, even while typing.
        AppEvent::Nav(dir @ (Direction::Up | Direction::Down)) => {
            s.results.handle(&AppEvent::Nav(dir));
            None
        }

        AppEvent::Enter => match s.focus {
            Focus::Results => {
                let picked = s.results.selected_item()?.to_string();
                tracing::debug!(term = %picked, "suggestion accepted");
                s.focus = Focus::QueryBar;
                if picked == s.query.query {
                    return None;
                }
                s.query.set(picked.clone());
                Some(picked)
            }
            Focus::QueryBar => {
                if s.results.selected_item().is_some() {
                    s.focus = Focus::Results;
                }
                None
            }
        },

        // Clearing works from either pane.
        AppEvent::ClearQuery => s
            .query
            .handle(&AppEvent::ClearQuery)
            .then(|| s.query.query.clone()),

        other => match s.focus {
            Focus::QueryBar => s.query.handle(&other).then(|| s.query.query.clone()),
            Focus::Results => {
                s.results.handle(&other);
                None
            }
        },
    }
}

/// Fold one pipeline event into the state.
pub fn apply_search_event(s: &mut AppState, event: SearchEvent) {
    match event {
        SearchEvent::Results(set) => {
            s.settled = SearchStatus::Ready {
                generation: set.generation,
                count: set.len(),
                elapsed: set.elapsed,
            };
            s.settled_term = Some(set.term.clone());
            s.results.replace(set);
        }
        SearchEvent::QueryFailed(failure) => {
            tracing::warn!(term = %failure.term, error = %failure.error, "query failed");
            s.settled = SearchStatus::Failed {
                term: failure.term.clone(),
                error: failure.error,
            };
            s.settled_term = Some(failure.term);
        }
        SearchEvent::SourceFailed(err) => {
            tracing::error!(error = %err, "search stopped");
            s.settled = SearchStatus::Stopped(err);
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    state: AppState,
    subject: Option<TermSubject>,
    events: SearchEvents,
}

impl App {
    pub fn new(state: AppState, subject: TermSubject, events: SearchEvents) -> Self {
        Self {
            state,
            subject: Some(subject),
            events,
        }
    }

    /// Set up the terminal, run the event loop, and restore the terminal on exit.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        // Completing the source lets the pipeline wind down.
        if let Some(subject) = self.subject.take() {
            subject.complete();
        }

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.drain_search_events();

            {
                let s = &self.state;
                terminal.draw(|frame| draw(frame, s))?;
            }

            if self.state.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(16))? {
                let raw = ct_event::read()?;
                let app_event = match raw {
                    Event::Key(key) if key.kind != crossterm::event::KeyEventKind::Press => None,
                    Event::Key(_) if self.state.focus == Focus::QueryBar && !self.state.show_help => {
                        event::to_app_event_insert(raw)
                    }
                    other => event::to_app_event(other),
                };
                if let Some(ev) = app_event {
                    tracing::debug!(focus = ?self.state.focus, event = ?ev, "key event");
                    if let Some(term) = handle(&mut self.state, ev) {
                        self.push_term(term);
                    }
                }
            }
        }
        Ok(())
    }

    fn push_term(&mut self, term: Term) {
        let Some(subject) = &self.subject else {
            return;
        };
        if !subject.next(term) {
            tracing::debug!("pipeline gone; dropping input");
            self.subject = None;
        }
    }

    fn drain_search_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => apply_search_event(&mut self.state, event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.subject = None;
                    break;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    // Vertical: 3-line query bar | results | 1-line status
    let vert = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .split(area);

    let summary = state.summary();
    let query_focused = state.focus == Focus::QueryBar;
    let query_bar = QueryBar::new(&state.query, query_focused, &summary, &state.theme);
    let cursor = query_bar.cursor_position(vert[0]);
    frame.render_widget(query_bar, vert[0]);

    frame.render_widget(
        ResultList::new(&state.results, state.focus == Focus::Results, &state.theme),
        vert[1],
    );

    let status = state.status();
    frame.render_widget(
        StatusBar::new(&status, &state.theme)
            .show_latency(state.config.ui.show_latency)
            .show_generation(state.config.ui.show_generation),
        vert[2],
    );

    if state.show_help {
        frame.render_widget(HelpPopup::new(&state.theme), area);
        return;
    }

    if query_focused {
        frame.set_cursor_position(cursor);
    }
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lookahead_core::{QueryError, QueryFailure, ResultSet, SourceError};
    use pretty_assertions::assert_eq;

    fn state() -> AppState {
        AppState::new(Config::defaults(), Theme::load_default(), PipelineOptions::default())
    }

    fn type_str(s: &mut AppState, text: &str) -> Vec<Term> {
        text.chars()
            .filter_map(|c| handle(s, AppEvent::Char(c)))
            .collect()
    }

    fn results(term: &str, generation: u64, items: &[&str]) -> SearchEvent {
        SearchEvent::Results(ResultSet {
            term: term.to_string(),
            generation,
            items: items.iter().map(|s| s.to_string()).collect(),
            elapsed: Duration::from_millis(12),
        })
    }

    #[test]
    fn every_edit_emits_the_full_query() {
        let mut s = state();
        assert_eq!(type_str(&mut s, "ang"), ["a", "an", "ang"]);
        assert_eq!(handle(&mut s, AppEvent::Backspace), Some("an".to_string()));
        assert_eq!(handle(&mut s, AppEvent::ClearQuery), Some(String::new()));
    }

    #[test]
    fn cursor_moves_do_not_emit() {
        let mut s = state();
        type_str(&mut s, "ab");
        assert_eq!(handle(&mut s, AppEvent::Nav(Direction::Left)), None);
        assert_eq!(handle(&mut s, AppEvent::Nav(Direction::Right)), None);
    }

    #[test]
    fn status_is_pending_until_the_current_term_settles() {
        let mut s = state();
        assert_eq!(s.status(), SearchStatus::Idle);

        type_str(&mut s, "ang");
        assert_eq!(s.status(), SearchStatus::Pending);

        apply_search_event(&mut s, results("ang", 1, &["Angular"]));
        assert_eq!(
            s.status(),
            SearchStatus::Ready {
                generation: 1,
                count: 1,
                elapsed: Duration::from_millis(12),
            }
        );

        // Backspace then retype lands on the settled term again.
        handle(&mut s, AppEvent::Backspace);
        assert_eq!(s.status(), SearchStatus::Pending);
        handle(&mut s, AppEvent::Char('g'));
        assert!(matches!(s.status(), SearchStatus::Ready { .. }));
    }

    #[test]
    fn failure_keeps_previous_results() {
        let mut s = state();
        type_str(&mut s, "an");
        apply_search_event(&mut s, results("an", 1, &["Angular", "Ansible"]));
        type_str(&mut s, "x");
        apply_search_event(
            &mut s,
            SearchEvent::QueryFailed(QueryFailure {
                term: "anx".to_string(),
                generation: 2,
                error: QueryError::Status(500),
            }),
        );
        assert_eq!(s.results.items().len(), 2);
        assert!(matches!(s.status(), SearchStatus::Failed { .. }));
    }

    #[test]
    fn source_failure_sticks() {
        let mut s = state();
        apply_search_event(
            &mut s,
            SearchEvent::SourceFailed(SourceError::Input("closed".to_string())),
        );
        type_str(&mut s, "more");
        assert!(matches!(s.status(), SearchStatus::Stopped(_)));
    }

    #[test]
    fn accepting_a_suggestion_replaces_the_query() {
        let mut s = state();
        type_str(&mut s, "ang");
        apply_search_event(&mut s, results("ang", 1, &["Angular", "AngularJS"]));

        assert_eq!(handle(&mut s, AppEvent::Enter), None);
        assert_eq!(s.focus, Focus::Results);
        handle(&mut s, AppEvent::Nav(Direction::Down));
        assert_eq!(handle(&mut s, AppEvent::Enter), Some("AngularJS".to_string()));
        assert_eq!(s.query.query, "AngularJS");
        assert_eq!(s.focus, Focus::QueryBar);
    }

    #[test]
    fn help_swallows_input() {
        let mut s = state();
        handle(&mut s, AppEvent::Help);
        assert!(s.show_help);
        assert_eq!(handle(&mut s, AppEvent::Char('a')), None);
        assert!(s.query.query.is_empty());
        handle(&mut s, AppEvent::Escape);
        assert!(!s.show_help);
    }

    #[test]
    fn min_len_queries_are_never_pending() {
        let mut s = state();
        s.options.min_len = 3;
        type_str(&mut s, "an");
        assert_eq!(s.status(), SearchStatus::Idle);
    }

    #[test]
    fn summary_names_strategy_and_debounce() {
        assert_eq!(state().summary(), "switch · 400ms");
    }
}
