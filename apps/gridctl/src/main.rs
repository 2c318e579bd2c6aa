use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use grid_core::{FilterBar, GridCoordinator, GridDependencies};
use shared::protocol::GridEvent;
use tokio::io::{AsyncReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod fixtures;
mod script;

use config::load_settings;
use fixtures::{FixedViewport, FixturePageLoader, Fixtures, RowLayout, UrlLocation};
use script::{parse_script, Command};

const SETTLE_ATTEMPTS: usize = 200;
const SETTLE_INTERVAL: Duration = Duration::from_millis(10);

/// Replays an interaction script against a filterable post grid.
#[derive(Parser, Debug)]
struct Args {
    /// JSON fixtures: `items`, optional `pages` and `buttons`.
    #[arg(long)]
    fixtures: PathBuf,
    #[arg(long, default_value = "gridctl.toml")]
    config: PathBuf,
    /// URL fragment present when the page loads, e.g. `#billing`.
    #[arg(long, default_value = "")]
    fragment: String,
    /// Preset search value from a deep link.
    #[arg(long)]
    preset_search: Option<String>,
    /// Script file; reads stdin when omitted.
    #[arg(long)]
    script: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(&args.config)?;
    let fixtures = Fixtures::load(&args.fixtures).await?;
    let source = read_script(args.script.as_ref()).await?;
    let commands = parse_script(&source)?;

    let location = Arc::new(UrlLocation::new(&settings.grid.page_url, settings.history)?);
    let grid = GridCoordinator::new_with_dependencies(
        settings.grid.clone(),
        fixtures.items.clone(),
        FilterBar::new(fixtures.filter_buttons()),
        GridDependencies {
            layout: Arc::new(RowLayout::new(settings.columns, settings.row_height)),
            loader: Arc::new(FixturePageLoader::new(
                settings.grid.clone(),
                fixtures.pages.clone(),
            )),
            location: location.clone(),
            viewport: Arc::new(FixedViewport(settings.viewport_height)),
        },
    );

    let mut events = grid.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match &event {
                GridEvent::LoaderFailed(report) => {
                    warn!(message = %report.message, "page load failed")
                }
                GridEvent::NextPageRequested { loader_gif } => {
                    info!(loader_gif = loader_gif.as_deref(), "loading more posts")
                }
                GridEvent::PagesExhausted { message } => info!(%message, "no more pages"),
                _ => debug!(?event, "grid event"),
            }
        }
    });

    let visible = grid
        .initialize(&args.fragment, args.preset_search.as_deref())
        .await;
    info!(visible = visible.len(), "grid initialized");

    for command in commands {
        run_command(&grid, command).await?;
    }
    grid.flush_search().await;
    settle(&grid).await;

    let snapshot = grid.snapshot().await;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    info!(url = %location.current(), "final location");
    Ok(())
}

async fn run_command(grid: &Arc<GridCoordinator>, command: Command) -> Result<()> {
    match command {
        Command::Filter(filter) => {
            grid.apply_filter(filter).await;
        }
        Command::Button(index) => {
            if grid.press_filter_button(index).await.is_none() {
                warn!(index, "no filter button at index");
            }
        }
        Command::Search(text) => grid.apply_search(text).await,
        Command::Wait(delay) => tokio::time::sleep(delay).await,
        Command::Toggle(item_id) => match grid.toggle_expand(item_id).await {
            Ok(card) => println!("{}", serde_json::to_string(&card)?),
            Err(err) => warn!(%err, "toggle ignored"),
        },
        Command::Resize => {
            grid.relayout().await;
        }
        Command::More => {
            grid.ensure_enough_items().await;
        }
        Command::Show => {
            let snapshot = grid.snapshot().await;
            println!("{}", serde_json::to_string(&snapshot)?);
        }
    }
    Ok(())
}

/// Waits for an in-flight page request to land so the final snapshot is complete.
async fn settle(grid: &Arc<GridCoordinator>) {
    for _ in 0..SETTLE_ATTEMPTS {
        if !grid.snapshot().await.page_request_in_flight {
            return;
        }
        tokio::time::sleep(SETTLE_INTERVAL).await;
    }
    warn!("page request still in flight at exit");
}

async fn read_script(path: Option<&PathBuf>) -> Result<String> {
    let mut source = String::new();
    match path {
        Some(path) => {
            source = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read script '{}'", path.display()))?;
        }
        None => {
            BufReader::new(tokio::io::stdin())
                .read_to_string(&mut source)
                .await
                .context("failed to read script from stdin")?;
        }
    }
    Ok(source)
}
