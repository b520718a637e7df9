//! lookahead TUI: ratatui front end for the instant-search pipeline.

pub mod app;
pub mod event;
pub mod theme;
pub mod widgets;

pub use app::App;

use lookahead_core::{config::Config, term_channel, Pipeline, PipelineOptions, QueryBackend};
use std::sync::Arc;

/// Start the TUI against `backend`.
///
/// The pipeline runs on a background tokio runtime; the terminal loop stays on
/// the calling thread.
pub fn run(
    config: Config,
    backend: Arc<dyn QueryBackend>,
    options: PipelineOptions,
) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    let (subject, terms) = term_channel();
    let events = {
        let _guard = rt.enter();
        Pipeline::builder()
            .options(options.clone())
            .spawn_shared(terms, backend)
    };
    tracing::info!(?options, "search pipeline started");

    let theme = theme::Theme::load_default();
    let state = app::AppState::new(config, theme, options);
    let result = App::new(state, subject, events).run();

    rt.shutdown_background();
    result
}
