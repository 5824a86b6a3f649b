//! Headless demo host for the gallery engine.
//!
//! Loads a catalog and configuration, runs the view/loader tasks for one
//! layout report, and optionally keeps a lightbox slideshow running until
//! Ctrl-C. Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use gallery_engine::catalog::{Catalog, CatalogQuery, SortOrder};
use gallery_engine::events::{LightboxCommand, LoaderEvent, ViewEvent};
use gallery_engine::metadata::MetadataStore;
use gallery_engine::signal::{ManualSignal, SignalSource};
use gallery_engine::tasks::{lightbox, loader, view};

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "gallery-engine", about = "Masonry gallery presentation engine")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Path to the YAML image catalog
    #[arg(long, value_name = "FILE", default_value = "catalog.yaml")]
    catalog: PathBuf,

    /// Viewport width driving the responsive column tiers
    #[arg(long, value_name = "PX", default_value_t = 1280.0)]
    viewport_width: f32,

    /// Show only images tagged with this category
    #[arg(long, value_name = "TAG")]
    category: Option<String>,

    /// Display order for the catalog
    #[arg(long, value_enum, default_value_t = SortArg::NewestFirst)]
    sort: SortArg,

    /// Open the lightbox and run a slideshow until Ctrl-C
    #[arg(long)]
    slideshow: bool,

    /// Override the slideshow interval (e.g. "1500ms", "5s")
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    slideshow_interval: Option<Duration>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    NewestFirst,
    OldestFirst,
    Title,
    Shuffled,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::NewestFirst => Self::NewestFirst,
            SortArg::OldestFirst => Self::OldestFirst,
            SortArg::Title => Self::Title,
            SortArg::Shuffled => Self::Shuffled,
        }
    }
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("gallery_engine={level}").parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = gallery_engine::config::Configuration::from_yaml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?
        .validated()
        .context("validating configuration")?;
    if let Some(interval) = cli.slideshow_interval {
        cfg.lightbox.slideshow_interval = interval;
    }

    let catalog = Catalog::from_yaml_file(&cli.catalog)
        .with_context(|| format!("loading catalog from {}", cli.catalog.display()))?;
    let query = CatalogQuery {
        category: cli.category.clone(),
        order: cli.sort.into(),
        shuffle_seed: cfg.shuffle_seed,
    };
    let images = query.apply(&catalog);
    info!(
        total = catalog.len(),
        shown = images.len(),
        category = cli.category.as_deref().unwrap_or("all"),
        "catalog loaded"
    );

    let store = Arc::new(MetadataStore::new(cfg.metadata_path.clone()));
    let cancel = CancellationToken::new();

    let (view_tx, view_rx) = mpsc::channel(64);
    let (grid_tx, mut grid_rx) = mpsc::channel(16);
    let (loader_tx, loader_rx) = mpsc::channel(64);
    let (slice_tx, mut slice_rx) = mpsc::channel(16);

    let view_task = tokio::spawn(view::run(
        cfg.layout.clone(),
        cfg.aspect.clone(),
        images.clone(),
        Arc::clone(&store),
        cli.viewport_width,
        cfg.loader.initial_batch.min(images.len()),
        view_rx,
        grid_tx,
        cancel.clone(),
    ));
    let loader_task = tokio::spawn(loader::run(
        cfg.loader.clone(),
        images.len(),
        loader_rx,
        slice_tx,
        cancel.clone(),
    ));

    // The proximity sensor port; this host fires it by hand.
    let proximity = ManualSignal::new();
    let _proximity_sub = proximity.subscribe(loader_tx.clone());

    // Bridge loader slices into view inputs, the way a host would.
    let bridge_view_tx = view_tx.clone();
    let bridge = tokio::spawn(async move {
        while let Some(slice) = slice_rx.recv().await {
            if bridge_view_tx
                .send(ViewEvent::VisibleCountChanged {
                    count: slice.visible_count,
                })
                .await
                .is_err()
            {
                break;
            }
        }
    });

    let first = grid_rx
        .recv()
        .await
        .context("view task ended before the first layout pass")?;
    info!(
        cells = first.items.len(),
        columns = first.column_count,
        total_height = first.total_height,
        "initial layout"
    );

    if images.len() > cfg.loader.initial_batch {
        let expected = (cfg.loader.initial_batch + cfg.loader.batch_size).min(images.len());
        proximity.emit(LoaderEvent::Proximity);
        while let Some(update) = grid_rx.recv().await {
            info!(
                cells = update.items.len(),
                total_height = update.total_height,
                "layout pass"
            );
            if update.items.len() >= expected {
                break;
            }
        }
    }

    if cli.slideshow && !images.is_empty() {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (update_tx, mut update_rx) = mpsc::channel(16);
        let opener = |url: &str| {
            info!(url, "share url built");
            true
        };
        let lightbox_task = tokio::spawn(lightbox::run(
            cfg.lightbox.clone(),
            cfg.page_url.clone(),
            command_rx,
            update_tx,
            opener,
            cancel.clone(),
        ));

        command_tx
            .send(LightboxCommand::Open {
                images: images.clone(),
                index: 0,
            })
            .await
            .ok();
        command_tx.send(LightboxCommand::ToggleSlideshow).await.ok();

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    break;
                }
                maybe_update = update_rx.recv() => {
                    match maybe_update {
                        Some(update) => match update.0 {
                            Some(snapshot) => info!(
                                index = snapshot.current_index,
                                total = snapshot.total,
                                src = %snapshot.image.src,
                                playing = snapshot.slideshow_playing,
                                "lightbox"
                            ),
                            None => info!("lightbox closed"),
                        },
                        None => break,
                    }
                }
                maybe_grid = grid_rx.recv() => {
                    if let Some(update) = maybe_grid {
                        info!(
                            cells = update.items.len(),
                            total_height = update.total_height,
                            "layout pass"
                        );
                    }
                }
            }
        }
        cancel.cancel();
        let _ = lightbox_task.await;
    } else {
        cancel.cancel();
    }

    drop(view_tx);
    drop(loader_tx);
    let _ = bridge.await;
    let _ = view_task.await;
    let _ = loader_task.await;
    Ok(())
}
