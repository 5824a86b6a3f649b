//! Incremental loader task: grows the visible slice of the catalog when the
//! host's proximity sentinel fires, debounced so fast scrolling does not
//! compound layout passes.

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::LoaderOptions;
use crate::events::{LoaderEvent, VisibleSlice};

/// Run the loader until cancelled. Emits the initial slice immediately, then
/// a new slice after each debounced proximity trigger or catalog reset.
/// Proximity events arriving while a bump is pending are no-ops.
pub async fn run(
    opts: LoaderOptions,
    mut total: usize,
    mut events: Receiver<LoaderEvent>,
    to_view: Sender<VisibleSlice>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut visible = opts.initial_batch.min(total);
    let mut pending: Option<Instant> = None;

    if send_slice(&to_view, visible, total).await.is_err() {
        return Ok(());
    }

    loop {
        select! {
            _ = cancel.cancelled() => {
                debug!("cancel received; exiting loader task");
                break;
            }

            // Debounce window elapsed; commit the pending bump.
            () = async { sleep_until(pending.unwrap()).await }, if pending.is_some() => {
                pending = None;
                visible = (visible + opts.batch_size).min(total);
                info!(visible, total, "visible slice grown");
                if send_slice(&to_view, visible, total).await.is_err() {
                    warn!("view channel closed");
                    break;
                }
            }

            maybe_ev = events.recv() => {
                match maybe_ev {
                    Some(LoaderEvent::Proximity) => {
                        if visible >= total {
                            debug!("proximity ignored; catalog exhausted");
                        } else if pending.is_some() {
                            debug!("proximity ignored; load already pending");
                        } else {
                            pending = Some(Instant::now() + opts.debounce);
                        }
                    }
                    Some(LoaderEvent::CatalogReplaced { total: new_total }) => {
                        total = new_total;
                        visible = opts.initial_batch.min(total);
                        pending = None;
                        info!(visible, total, "catalog replaced; visible slice reset");
                        if send_slice(&to_view, visible, total).await.is_err() {
                            warn!("view channel closed");
                            break;
                        }
                    }
                    None => {
                        debug!("event channel closed; exiting loader task");
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}

async fn send_slice(
    to_view: &Sender<VisibleSlice>,
    visible_count: usize,
    total: usize,
) -> Result<(), ()> {
    to_view
        .send(VisibleSlice {
            visible_count,
            has_more: visible_count < total,
        })
        .await
        .map_err(|_| ())
}
