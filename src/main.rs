use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use lookahead::{replay, BackendSpec, OutputFormat};
use lookahead_core::{config::Config, PipelineOptions, Strategy};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "lookahead", about = "Instant search in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    search: SearchArgs,

    /// Write debug logs to /tmp/lookahead-debug.log (tail -f to inspect).
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive search box (the default).
    Tui,
    /// Feed a scripted typing session through the pipeline and print what it
    /// delivers.
    Replay {
        /// Script of `<offset-ms> <term>` lines; `-` reads stdin.
        #[arg(default_value = "-")]
        script: String,
        /// How long the source stays open after the last line.
        /// Defaults to the debounce period plus 100ms.
        #[arg(long)]
        settle_ms: Option<u64>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Newline-separated catalog to search instead of the built-in demo list.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Suggestion endpoint queried as `<URL>?q=<term>`.
    #[arg(long, global = true, conflicts_with = "catalog")]
    http: Option<String>,
    /// Quiet period before a term is searched.
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,
    /// `switch` drops superseded queries, `merge` delivers all of them.
    #[arg(long, global = true)]
    strategy: Option<Strategy>,
    /// Maximum catalog matches per query.
    #[arg(long, global = true)]
    limit: Option<usize>,
    /// Simulated backend latency.
    #[arg(long, global = true, default_value_t = 0)]
    latency_ms: u64,
    /// Extra per-term latency spread on top of --latency-ms.
    #[arg(long, global = true, default_value_t = 0)]
    jitter_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/lookahead-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("lookahead debug log started; tail -f /tmp/lookahead-debug.log");
    }

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "config: falling back to defaults");
        Config::defaults()
    });
    let options = pipeline_options(&config, &cli.search);
    let backend = BackendSpec {
        catalog: cli.search.catalog.clone(),
        http: cli.search.http.clone(),
        latency: Duration::from_millis(cli.search.latency_ms),
        jitter: Duration::from_millis(cli.search.jitter_ms),
        limit: cli.search.limit.unwrap_or(config.catalog.limit),
    }
    .build()?;

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => lookahead_tui::run(config, backend, options),
        Command::Replay {
            script,
            settle_ms,
            format,
        } => {
            let src = read_script(&script)?;
            let lines = replay::parse_script(&src)?;
            let settle = settle_ms
                .map(Duration::from_millis)
                .unwrap_or(options.debounce + Duration::from_millis(100));

            let rt = tokio::runtime::Runtime::new()?;
            let records = rt.block_on(replay::run(lines, backend, options, settle));

            let mut out = std::io::stdout().lock();
            for record in &records {
                writeln!(out, "{}", record.render(format)?)?;
            }
            Ok(())
        }
    }
}

/// Config-file options with CLI overrides applied.
fn pipeline_options(config: &Config, args: &SearchArgs) -> PipelineOptions {
    let mut options = config.search.pipeline_options();
    if let Some(ms) = args.debounce_ms {
        options.debounce = Duration::from_millis(ms);
    }
    if let Some(strategy) = args.strategy {
        options.strategy = strategy;
    }
    options
}

fn read_script(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut src = String::new();
        std::io::stdin()
            .read_to_string(&mut src)
            .context("reading script from stdin")?;
        Ok(src)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading script {path}"))
    }
}
