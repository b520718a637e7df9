//! Headless replay of a scripted typing session.
//!
//! A script is a list of `<offset-ms> <term>` lines, offsets measured from the
//! start of the replay. Blank lines and lines starting with `#` are ignored.
//! A line with no term (`300`) is an empty query. Spaces between the offset
//! and the term are alignment; wrap the term in double quotes to keep
//! surrounding whitespace (`450 " ang"`).
//!
//! ```text
//! # fast typing, then a pause
//! 0   A
//! 50  An
//! 100 Ang
//! ```
//!
//! [`run`] feeds the terms into a pipeline on schedule, keeps the source open
//! for the settle period after the last line, then completes it and collects
//! every event the pipeline delivers.

use anyhow::{bail, Context};
use lookahead_core::{term_channel, Pipeline, PipelineOptions, QueryBackend, SearchEvent, Term};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// One scheduled input-change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub at: Duration,
    pub term: Term,
}

/// Parse a replay script. Offsets must not decrease.
pub fn parse_script(src: &str) -> anyhow::Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    let mut last = Duration::ZERO;

    for (idx, raw) in src.lines().enumerate() {
        let lineno = idx + 1;
        let trimmed = raw.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (offset, term) = match trimmed.split_once(char::is_whitespace) {
            Some((offset, term)) => (offset, term),
            None => (trimmed, ""),
        };
        let ms: u64 = offset
            .trim_end()
            .parse()
            .with_context(|| format!("line {lineno}: bad offset {offset:?}"))?;
        let at = Duration::from_millis(ms);
        if at < last {
            bail!("line {lineno}: offset {ms}ms is earlier than the previous line");
        }
        last = at;

        lines.push(ScriptLine {
            at,
            term: strip_alignment(term).to_string(),
        });
    }

    Ok(lines)
}

fn strip_alignment(term: &str) -> &str {
    let rest = term.trim_start_matches([' ', '\t']);
    match rest.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        Some(quoted) => quoted,
        None => rest,
    }
}

/// How replay output is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per event.
    #[default]
    Text,
    /// One JSON object per event.
    Jsonl,
}

/// One delivered event, stamped with its offset from the start of the replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayRecord {
    pub at_ms: u64,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<Term>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplayRecord {
    fn new(at: Duration, event: SearchEvent) -> Self {
        let at_ms = at.as_millis() as u64;
        match event {
            SearchEvent::Results(set) => Self {
                at_ms,
                kind: "results",
                term: Some(set.term),
                generation: Some(set.generation),
                items: set.items,
                elapsed_ms: Some(set.elapsed.as_millis() as u64),
                error: None,
            },
            SearchEvent::QueryFailed(failure) => Self {
                at_ms,
                kind: "query_failed",
                term: Some(failure.term),
                generation: Some(failure.generation),
                items: Vec::new(),
                elapsed_ms: None,
                error: Some(failure.error.to_string()),
            },
            SearchEvent::SourceFailed(err) => Self {
                at_ms,
                kind: "source_failed",
                term: None,
                generation: None,
                items: Vec::new(),
                elapsed_ms: None,
                error: Some(err.to_string()),
            },
        }
    }

    /// Render this record in `format`.
    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Jsonl => Ok(serde_json::to_string(self)?),
            OutputFormat::Text => Ok(self.render_text()),
        }
    }

    fn render_text(&self) -> String {
        let term = self.term.as_deref().unwrap_or_default();
        let generation = self.generation.unwrap_or_default();
        match self.kind {
            "results" => format!(
                "{:>6}ms  #{generation} {term:?} -> [{}] ({}ms)",
                self.at_ms,
                self.items.join(", "),
                self.elapsed_ms.unwrap_or_default()
            ),
            "query_failed" => format!(
                "{:>6}ms  #{generation} {term:?} failed: {}",
                self.at_ms,
                self.error.as_deref().unwrap_or_default()
            ),
            _ => format!(
                "{:>6}ms  source failed: {}",
                self.at_ms,
                self.error.as_deref().unwrap_or_default()
            ),
        }
    }
}

/// Replay `script` against `backend` and collect every delivered event.
pub async fn run(
    script: Vec<ScriptLine>,
    backend: Arc<dyn QueryBackend>,
    options: PipelineOptions,
    settle: Duration,
) -> Vec<ReplayRecord> {
    let start = Instant::now();
    let (subject, terms) = term_channel();
    let mut events = Pipeline::builder()
        .options(options)
        .spawn_shared(terms, backend);

    tokio::spawn(async move {
        for line in script {
            tokio::time::sleep_until(start + line.at).await;
            tracing::debug!(term = %line.term, at = ?line.at, "replay: input changed");
            if !subject.next(line.term) {
                return;
            }
        }
        tokio::time::sleep(settle).await;
        tracing::debug!("replay: source complete");
        subject.complete();
    });

    let mut records = Vec::new();
    while let Some(event) = events.recv().await {
        records.push(ReplayRecord::new(start.elapsed(), event));
    }
    records
}
