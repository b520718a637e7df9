//! Status line widget: one row at the bottom of the screen.
//!
//! Shows the state of the search pipeline: whether a query is outstanding,
//! the generation and latency of the last result, and the last failure.
//! Keybinding hints are right-aligned in the same row.

use crate::theme::Theme;
use lookahead_core::{QueryError, SourceError};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use std::time::Duration;

/// What the status line reports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    /// Nothing typed yet.
    #[default]
    Idle,
    /// The query text changed and no result for it has arrived yet.
    Pending,
    /// A result set arrived.
    Ready {
        generation: u64,
        count: usize,
        elapsed: Duration,
    },
    /// The query for `term` failed. Earlier results stay on screen.
    Failed { term: String, error: QueryError },
    /// The input source failed; the pipeline has stopped.
    Stopped(SourceError),
}

pub struct StatusBar<'a> {
    status: &'a SearchStatus,
    show_latency: bool,
    show_generation: bool,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(status: &'a SearchStatus, theme: &'a Theme) -> Self {
        Self {
            status,
            show_latency: true,
            show_generation: true,
            theme,
        }
    }

    pub fn show_latency(mut self, show: bool) -> Self {
        self.show_latency = show;
        self
    }

    pub fn show_generation(mut self, show: bool) -> Self {
        self.show_generation = show;
        self
    }

    fn message(&self) -> (String, Style) {
        match self.status {
            SearchStatus::Idle => ("ready".to_string(), self.theme.status_info),
            SearchStatus::Pending => ("searching…".to_string(), self.theme.status_pending),
            SearchStatus::Ready {
                generation,
                count,
                elapsed,
            } => {
                let mut msg = format!("{count} results");
                if self.show_generation {
                    msg.push_str(&format!("  #{generation}"));
                }
                if self.show_latency {
                    msg.push_str(&format!("  {}ms", elapsed.as_millis()));
                }
                (msg, self.theme.status_info)
            }
            SearchStatus::Failed { term, error } => (
                format!("query \"{term}\" failed: {error}"),
                self.theme.status_error,
            ),
            SearchStatus::Stopped(err) => (
                format!("search stopped: {err}"),
                self.theme.status_error,
            ),
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (msg, style) = self.message();
        Paragraph::new(Line::from(Span::styled(format!(" {msg}"), style))).render(area, buf);

        let hint = " Tab:focus  Ctrl+c:quit  ?:help ";
        let hint_x = area.right().saturating_sub(hint.len() as u16);
        buf.set_string(
            hint_x,
            area.y,
            hint,
            Style::default().add_modifier(Modifier::DIM),
        );
    }
}
