use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use tn::api::ContentApiClient;
use tn::app::App;
use tn::browser::Browser;
use tn::config::Config;
use tn::keybindings::KeybindingRegistry;
use tn::snapshot::DiskSnapshot;

#[derive(Parser, Debug)]
#[command(
    name = "tn",
    about = "Browse TabNews from the terminal",
    disable_version_flag = true
)]
struct Args {
    /// Print version information and exit
    #[arg(short = 'v', long)]
    version: bool,

    /// Config file (default: ~/.config/tn/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not load or save the article cache file this session
    #[arg(long)]
    no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("{}", tn::version_text());
        return Ok(());
    }

    // Logs go to stderr so they never land in the alternate screen
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match args.config.or_else(Config::default_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let client = ContentApiClient::new(&config.api_base_url)
        .with_context(|| format!("Invalid API base URL '{}'", config.api_base_url))?;
    let mut browser = Browser::new(client, config.page_size);

    if config.persist_cache && !args.no_cache {
        browser = browser.with_snapshot(DiskSnapshot::new(&config.cache_file));
        let restored = browser.restore_snapshot();
        tracing::info!(articles = restored, "Restored article cache");
    }

    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
    }

    let mut app = App::new(browser, keybindings, config.site_url);
    tn::ui::run(&mut app).await?;

    Ok(())
}
