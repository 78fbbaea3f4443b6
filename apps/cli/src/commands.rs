//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use tracing::info;
use url::Url;

use seenlist_core::{GenerateConfig, GenerateResult, ProgressReporter, TitleOutcome};
use seenlist_shared::{
    AppConfig, PipelineConfig, TmdbConfig, init_config, load_config, load_config_from,
    resolve_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// seenlist — turn the Scott Hasn't Seen wiki into a Radarr list.
#[derive(Parser)]
#[command(
    name = "seenlist",
    version,
    about = "Scrape the Scott Hasn't Seen wiki and build a Radarr-importable movie list.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.seenlist/seenlist.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scrape, resolve on TMDB, and write the Radarr list.
    Generate {
        /// Directory to write the JSON list into.
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Wiki page to scrape.
        #[arg(long)]
        wiki_url: Option<String>,

        /// Maximum concurrent TMDB resolutions.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Pause after each resolution before freeing its slot, in ms.
        #[arg(long)]
        rate_limit_ms: Option<u64>,

        /// Only write `<stem>.json`, no timestamped snapshot.
        #[arg(long)]
        no_snapshot: bool,
    },

    /// Print the titles that would be resolved, without calling TMDB.
    Extract {
        /// Read HTML from a local file instead of fetching the wiki.
        #[arg(long, conflicts_with = "wiki_url")]
        file: Option<PathBuf>,

        /// Wiki page to scrape.
        #[arg(long)]
        wiki_url: Option<String>,

        /// Print entries as JSON lines.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "seenlist=info",
        1 => "seenlist=debug",
        _ => "seenlist=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Generate {
            out_dir,
            wiki_url,
            concurrency,
            rate_limit_ms,
            no_snapshot,
        } => {
            let overrides = GenerateOverrides {
                out_dir,
                wiki_url,
                concurrency,
                rate_limit_ms,
                no_snapshot,
            };
            cmd_generate(config, overrides).await
        }
        Command::Extract {
            file,
            wiki_url,
            json,
        } => cmd_extract(&config, file.as_deref(), wiki_url, json).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&config).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// `generate` flags that override the config file.
struct GenerateOverrides {
    out_dir: Option<PathBuf>,
    wiki_url: Option<String>,
    concurrency: Option<usize>,
    rate_limit_ms: Option<u64>,
    no_snapshot: bool,
}

async fn cmd_generate(mut config: AppConfig, overrides: GenerateOverrides) -> Result<()> {
    // Validate API key before doing anything
    let api_key = resolve_api_key(&config)?;

    if let Some(url) = overrides.wiki_url {
        config.source.wiki_url = url;
    }
    if let Some(n) = overrides.concurrency {
        if n == 0 {
            return Err(eyre!("--concurrency must be at least 1"));
        }
        config.pipeline.concurrency = n;
    }
    if let Some(ms) = overrides.rate_limit_ms {
        config.pipeline.rate_limit_ms = ms;
    }
    if let Some(dir) = overrides.out_dir {
        config.output.dir = dir;
    }
    if overrides.no_snapshot {
        config.output.timestamped = false;
    }

    let generate_config = GenerateConfig {
        wiki_url: config.source.url()?,
        tmdb: TmdbConfig::new(&config, api_key),
        pipeline: PipelineConfig::from(&config),
        output: config.output.clone(),
        fetch_timeout: Duration::from_secs(config.pipeline.timeout_secs),
    };

    info!(
        url = %generate_config.wiki_url,
        concurrency = generate_config.pipeline.concurrency,
        out_dir = %generate_config.output.dir.display(),
        "generating Radarr list"
    );

    let reporter = CliProgress::new();
    let result = seenlist_core::generate(&generate_config, &reporter).await?;

    // Print summary
    println!();
    println!("  Summary:");
    println!("  Titles:     {}", result.titles_found);
    println!("  Successful: {}", result.succeeded);
    println!("  Failed:     {}", result.failed);
    println!("  Total:      {}", result.entries.len());
    if result.written.is_empty() {
        println!("  No movies found to save");
    }
    for path in &result.written {
        println!("  Saved:      {}", path.display());
    }
    println!("  Time:       {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_extract(
    config: &AppConfig,
    file: Option<&Path>,
    wiki_url: Option<String>,
    json: bool,
) -> Result<()> {
    let html = match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| eyre!("cannot read '{}': {e}", path.display()))?,
        None => {
            let raw = wiki_url.unwrap_or_else(|| config.source.wiki_url.clone());
            let url = Url::parse(&raw).map_err(|e| eyre!("invalid URL '{raw}': {e}"))?;
            let client =
                seenlist_wiki::build_client(Duration::from_secs(config.pipeline.timeout_secs))?;
            seenlist_wiki::fetch_document(&client, &url).await?
        }
    };

    let doc = Html::parse_document(&html);
    let entries = seenlist_wiki::extract_entries(&doc);
    info!(count = entries.len(), "extracted titles");

    for entry in &entries {
        if json {
            println!("{}", serde_json::to_string(entry)?);
        } else {
            match &entry.air_date {
                Some(date) => println!("{}\t{date}", entry.title),
                None => println!("{}", entry.title),
            }
        }
    }

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn title_resolved(&self, title: &str, outcome: TitleOutcome, current: usize, total: usize) {
        let mark = match outcome {
            TitleOutcome::Resolved => "✓",
            TitleOutcome::MissingImdbId | TitleOutcome::Failed => "✗",
        };
        self.spinner
            .set_message(format!("Resolving [{current}/{total}] {mark} {title}"));
    }

    fn done(&self, _result: &GenerateResult) {
        self.spinner.finish_and_clear();
    }
}
