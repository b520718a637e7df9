//! Result list widget: the suggestions for the most recent current term.
//!
//! # Navigation (when focused)
//!
//! | Key | Action |
//! |-----|--------|
//! | `↑` / `k` | Move selection up |
//! | `↓` / `j` | Move selection down |
//! | `Enter` | Accept the selected suggestion (handled by the app shell) |
//!
//! The span of each item that matches the term is drawn in
//! [`Theme::result_matched`].

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use lookahead_core::ResultSet;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{
        Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ResultsState {
    /// The last result set delivered by the pipeline, if any.
    pub current: Option<ResultSet>,
    /// Index into `current.items` of the highlighted row.
    pub selected: usize,
}

impl ResultsState {
    /// Replace the displayed results. The selection resets to the top.
    pub fn replace(&mut self, set: ResultSet) {
        tracing::debug!(term = %set.term, generation = set.generation, count = set.len(), "results: replaced");
        self.current = Some(set);
        self.selected = 0;
    }

    pub fn items(&self) -> &[String] {
        self.current.as_ref().map(|s| s.items.as_slice()).unwrap_or(&[])
    }

    /// The highlighted suggestion, if there is one.
    pub fn selected_item(&self) -> Option<&str> {
        self.items().get(self.selected).map(String::as_str)
    }

    pub fn handle(&mut self, event: &AppEvent) {
        let total = self.items().len();
        if total == 0 {
            return;
        }
        match event {
            AppEvent::Nav(Direction::Up) => {
                self.selected = self.selected.saturating_sub(1);
            }
            AppEvent::Nav(Direction::Down) => {
                if self.selected + 1 < total {
                    self.selected += 1;
                }
            }
            _ => {}
        }
    }

    /// First row of the visible window for a viewport of `height` rows.
    fn window_start(&self, height: usize) -> usize {
        let height = height.max(1);
        (self.selected + 1).saturating_sub(height)
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct ResultList<'a> {
    state: &'a ResultsState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> ResultList<'a> {
    pub fn new(state: &'a ResultsState, focused: bool, theme: &'a Theme) -> Self {
        Self { state, focused, theme }
    }
}

impl Widget for ResultList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border_unfocused
        };

        let title = match &self.state.current {
            Some(set) => format!("Results for \"{}\" ({})", set.term, set.len()),
            None => "Results".to_string(),
        };
        let block = Block::bordered().title(title).border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let height = inner.height as usize;

        let Some(set) = &self.state.current else {
            Paragraph::new(Line::from(Span::styled("start typing to search", self.theme.result_empty)))
                .render(inner, buf);
            return;
        };
        if set.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                format!("no matches for \"{}\"", set.term),
                self.theme.result_empty,
            )))
            .render(inner, buf);
            return;
        }

        let total = set.items.len();
        let start = self.state.window_start(height);
        let end = (start + height).min(total);

        let lines: Vec<Line<'static>> = set.items[start..end]
            .iter()
            .enumerate()
            .map(|(row, item)| {
                let line = highlight_match(item, &set.term, self.theme);
                if start + row == self.state.selected {
                    line.patch_style(self.theme.result_selected)
                } else {
                    line
                }
            })
            .collect();

        let text_area = Rect { width: inner.width.saturating_sub(1), ..inner };
        let sb_area = Rect {
            x: inner.right().saturating_sub(1),
            width: 1,
            ..inner
        };

        Paragraph::new(lines).render(text_area, buf);

        if total > height {
            let mut sb_state = ScrollbarState::new(total)
                .position(start)
                .viewport_content_length(height);
            StatefulWidget::render(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(None)
                    .end_symbol(None),
                sb_area,
                buf,
                &mut sb_state,
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Item rendering
// ---------------------------------------------------------------------------

/// Split `item` around the first case-insensitive occurrence of `term`.
///
/// Returns `(before, matched, after)`, or `None` when the term does not occur
/// or lowercasing changes byte offsets (non-ASCII case folding).
pub fn match_span<'s>(item: &'s str, term: &str) -> Option<(&'s str, &'s str, &'s str)> {
    let needle = term.trim();
    if needle.is_empty() {
        return None;
    }
    let lower_item = item.to_lowercase();
    if lower_item.len() != item.len() {
        return None;
    }
    let lower_needle = needle.to_lowercase();
    let start = lower_item.find(&lower_needle)?;
    let end = start + lower_needle.len();
    if !item.is_char_boundary(start) || !item.is_char_boundary(end) {
        return None;
    }
    Some((&item[..start], &item[start..end], &item[end..]))
}

fn highlight_match(item: &str, term: &str, theme: &Theme) -> Line<'static> {
    match match_span(item, term) {
        Some((before, matched, after)) => Line::from(vec![
            Span::raw(format!(" {before}")),
            Span::styled(matched.to_string(), theme.result_matched),
            Span::raw(after.to_string()),
        ]),
        None => Line::from(format!(" {item}")),
    }
}
