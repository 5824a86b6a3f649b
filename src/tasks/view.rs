//! Gallery view task: owns the displayed list, resolves ratios, and emits a
//! complete layout pass after every input change. Inputs arriving in quick
//! succession are drained into one snapshot so passes are never applied out
//! of order.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender, error::TryRecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::aspect::AspectRatioResolver;
use crate::catalog::GalleryImage;
use crate::config::{AspectOptions, LayoutOptions};
use crate::events::{GridUpdate, ViewEvent};
use crate::layout::{column_count_for_width, layout};
use crate::metadata::{MetadataMap, MetadataStore};

/// Run the view task until cancelled. The first pass fires immediately from
/// the initial inputs; afterwards each batch of [`ViewEvent`]s produces
/// exactly one [`GridUpdate`].
#[allow(clippy::too_many_arguments)]
pub async fn run(
    layout_opts: LayoutOptions,
    aspect_opts: AspectOptions,
    mut images: Vec<GalleryImage>,
    store: Arc<MetadataStore>,
    initial_viewport_width: f32,
    initial_visible_count: usize,
    mut events: Receiver<ViewEvent>,
    updates: Sender<GridUpdate>,
    cancel: CancellationToken,
) -> Result<()> {
    // One fetch per process lifetime; a failed read leaves an empty map and
    // every ratio falls through to the configured defaults.
    let metadata = store.load().await;
    let mut resolver = AspectRatioResolver::new(aspect_opts);

    let mut viewport_width = initial_viewport_width;
    let mut visible_count = initial_visible_count;
    let mut broken: BTreeSet<String> = BTreeSet::new();

    let pass = compute_pass(
        &layout_opts,
        &images,
        &mut resolver,
        metadata,
        viewport_width,
        visible_count,
        &broken,
    );
    if updates.send(pass).await.is_err() {
        return Ok(());
    }

    loop {
        let first = select! {
            _ = cancel.cancelled() => {
                debug!("cancel received; exiting view task");
                break;
            }
            maybe_ev = events.recv() => match maybe_ev {
                Some(ev) => ev,
                None => {
                    debug!("event channel closed; exiting view task");
                    break;
                }
            }
        };

        // Coalesce: drain whatever else is already queued, then lay out the
        // most recent complete input snapshot exactly once.
        let mut batch = vec![first];
        loop {
            match events.try_recv() {
                Ok(ev) => batch.push(ev),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        for event in batch {
            match event {
                ViewEvent::ViewportResized { width } => viewport_width = width,
                ViewEvent::VisibleCountChanged { count } => visible_count = count,
                ViewEvent::CatalogReplaced { images: replacement } => {
                    images = replacement;
                    broken.retain(|src| images.iter().any(|image| image.src == *src));
                }
                ViewEvent::CellFailed { src } => {
                    warn!(%src, "image load failed; keeping cell in place");
                    broken.insert(src);
                }
            }
        }

        let pass = compute_pass(
            &layout_opts,
            &images,
            &mut resolver,
            metadata,
            viewport_width,
            visible_count,
            &broken,
        );
        if updates.send(pass).await.is_err() {
            warn!("update channel closed; exiting view task");
            break;
        }
    }
    Ok(())
}

fn compute_pass(
    layout_opts: &LayoutOptions,
    images: &[GalleryImage],
    resolver: &mut AspectRatioResolver,
    metadata: &MetadataMap,
    viewport_width: f32,
    visible_count: usize,
    broken: &BTreeSet<String>,
) -> GridUpdate {
    let column_count = column_count_for_width(viewport_width, layout_opts.column_count);
    let visible = &images[..visible_count.min(images.len())];
    let result = layout(
        visible,
        |image| resolver.resolve(image, metadata),
        column_count,
        layout_opts.column_gap,
        viewport_width,
    );
    info!(
        cells = result.items.len(),
        column_count,
        total_height = result.total_height,
        "layout pass"
    );
    GridUpdate {
        items: result.items,
        total_height: result.total_height,
        column_count,
        broken: broken.clone(),
    }
}
