use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use phantom_common::observability::init_logging;
use phantom_config::{default_config_path, PhantomConfig, PhantomConfigLoader};

mod commands;

/// Human-like pointer and keyboard automation over WebDriver.
#[derive(Debug, Parser)]
#[command(name = "phantom", version, about)]
struct Cli {
    /// Configuration file; `phantom.yaml` in the working directory and the
    /// user config directory are read when present.
    #[arg(long, short, env = "PHANTOM_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a pointer path offline and print it as JSON.
    Path(commands::PathArgs),
    /// Open a page and click an element.
    Click {
        url: String,
        selector: String,
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// Open a page, focus an element and type into it.
    Type {
        url: String,
        selector: String,
        text: String,
        /// Per-character typo probability.
        #[arg(long)]
        mistakes: Option<f64>,
    },
    /// Open a page and wheel-scroll it.
    Scroll {
        url: String,
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        dx: f64,
        #[arg(long, allow_hyphen_values = true)]
        dy: f64,
    },
    /// Open a page and let the pointer drift idly.
    Wander {
        url: String,
        #[arg(long, default_value_t = 10)]
        seconds: u64,
    },
    /// Print the effective cursor defaults as YAML.
    Defaults,
}

fn load_config(explicit: Option<&PathBuf>) -> Result<PhantomConfig> {
    let mut loader = PhantomConfigLoader::new();
    if let Some(user) = default_config_path() {
        loader = loader.with_optional_file(user);
    }
    loader = loader.with_optional_file("phantom.yaml");
    if let Some(path) = explicit {
        loader = loader.with_file(path);
    }
    Ok(loader.load()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_ref())?;
    let log_path = init_logging(cfg.logging.clone().into())?;
    tracing::info!(target: "phantom", log = %log_path.display(), command = ?cli.command, "starting");

    match cli.command {
        Command::Path(args) => commands::print_path(&args, &cfg),
        Command::Click {
            url,
            selector,
            count,
        } => commands::click(&cfg, &url, &selector, count).await,
        Command::Type {
            url,
            selector,
            text,
            mistakes,
        } => commands::type_text(&cfg, &url, &selector, &text, mistakes).await,
        Command::Scroll { url, dx, dy } => commands::scroll(&cfg, &url, dx, dy).await,
        Command::Wander { url, seconds } => commands::wander(&cfg, &url, seconds).await,
        Command::Defaults => commands::print_defaults(&cfg),
    }
}
