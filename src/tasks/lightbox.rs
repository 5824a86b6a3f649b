//! Lightbox task: drives the open/slideshow state machine, the slideshow
//! tick, and the controls auto-hide timer. Every timer is a select branch
//! guarded by task-local state, so a state transition away from it drops the
//! pending tick on the floor.

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::LightboxOptions;
use crate::events::{Key, LightboxCommand, LightboxSnapshot, LightboxUpdate};
use crate::lightbox::LightboxState;
use crate::share::{ShareOpener, share_url};

/// Run the lightbox until cancelled. Emits a [`LightboxUpdate`] after every
/// observable change; share opens are fire-and-forget through `opener`.
pub async fn run(
    opts: LightboxOptions,
    page_url: String,
    mut commands: Receiver<LightboxCommand>,
    updates: Sender<LightboxUpdate>,
    mut opener: impl ShareOpener,
    cancel: CancellationToken,
) -> Result<()> {
    let mut state: Option<LightboxState> = None;
    let mut slideshow_deadline: Option<Instant> = None;
    let mut controls_deadline: Option<Instant> = None;
    let mut pointer_over_controls = false;

    loop {
        select! {
            _ = cancel.cancelled() => {
                debug!("cancel received; exiting lightbox task");
                break;
            }

            () = async { sleep_until(slideshow_deadline.unwrap()).await }, if slideshow_deadline.is_some() => {
                if let Some(open) = state.as_mut() {
                    open.next();
                    slideshow_deadline = Some(Instant::now() + opts.slideshow_interval);
                    info!(index = open.current_index(), "slideshow advanced");
                    if send_update(&updates, &state).await.is_err() {
                        break;
                    }
                } else {
                    slideshow_deadline = None;
                }
            }

            () = async { sleep_until(controls_deadline.unwrap()).await }, if controls_deadline.is_some() => {
                controls_deadline = None;
                if let Some(open) = state.as_mut() {
                    if !pointer_over_controls && open.controls_visible() {
                        open.set_controls_visible(false);
                        if send_update(&updates, &state).await.is_err() {
                            break;
                        }
                    }
                }
            }

            maybe_cmd = commands.recv() => {
                let Some(command) = maybe_cmd else {
                    debug!("command channel closed; exiting lightbox task");
                    break;
                };
                let changed = apply_command(
                    command,
                    &opts,
                    &page_url,
                    &mut state,
                    &mut slideshow_deadline,
                    &mut controls_deadline,
                    &mut pointer_over_controls,
                    &mut opener,
                );
                if changed && send_update(&updates, &state).await.is_err() {
                    warn!("update channel closed; exiting lightbox task");
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Apply one command; returns whether an update should be emitted.
#[allow(clippy::too_many_arguments)]
fn apply_command(
    command: LightboxCommand,
    opts: &LightboxOptions,
    page_url: &str,
    state: &mut Option<LightboxState>,
    slideshow_deadline: &mut Option<Instant>,
    controls_deadline: &mut Option<Instant>,
    pointer_over_controls: &mut bool,
    opener: &mut impl ShareOpener,
) -> bool {
    let command = match (command, state.is_some()) {
        // Keys only bind while open.
        (LightboxCommand::Key(_), false) => return false,
        (LightboxCommand::Key(Key::Right), true) => LightboxCommand::Next,
        (LightboxCommand::Key(Key::Left), true) => LightboxCommand::Prev,
        (LightboxCommand::Key(Key::Space), true) => LightboxCommand::ToggleSlideshow,
        (LightboxCommand::Key(Key::Escape), true) => LightboxCommand::Close,
        (other, _) => other,
    };

    match command {
        LightboxCommand::Open { images, index } => match LightboxState::open(images, index) {
            Some(opened) => {
                info!(index, total = opened.len(), "lightbox opened");
                *state = Some(opened);
                *slideshow_deadline = None;
                *pointer_over_controls = false;
                *controls_deadline = Some(Instant::now() + opts.controls_hide_delay);
                true
            }
            None => {
                warn!(index, "lightbox open rejected; index out of range");
                false
            }
        },
        LightboxCommand::Close => {
            if state.take().is_some() {
                *slideshow_deadline = None;
                *controls_deadline = None;
                *pointer_over_controls = false;
                info!("lightbox closed");
                true
            } else {
                false
            }
        }
        LightboxCommand::Next => {
            navigate(state, slideshow_deadline, opts, LightboxState::next)
        }
        LightboxCommand::Prev => {
            navigate(state, slideshow_deadline, opts, LightboxState::prev)
        }
        LightboxCommand::ToggleSlideshow => {
            let Some(open) = state.as_mut() else {
                return false;
            };
            if open.toggle_slideshow() {
                *slideshow_deadline = Some(Instant::now() + opts.slideshow_interval);
                info!("slideshow started");
            } else {
                *slideshow_deadline = None;
                info!("slideshow paused");
            }
            true
        }
        LightboxCommand::PointerMoved => {
            let Some(open) = state.as_mut() else {
                return false;
            };
            let was_visible = open.controls_visible();
            open.set_controls_visible(true);
            *controls_deadline = Some(Instant::now() + opts.controls_hide_delay);
            !was_visible
        }
        LightboxCommand::PointerEnteredControls => {
            let Some(open) = state.as_mut() else {
                return false;
            };
            *pointer_over_controls = true;
            *controls_deadline = None;
            let was_visible = open.controls_visible();
            open.set_controls_visible(true);
            !was_visible
        }
        LightboxCommand::PointerLeftControls => {
            if state.is_none() {
                return false;
            }
            *pointer_over_controls = false;
            *controls_deadline = Some(Instant::now() + opts.controls_hide_delay);
            false
        }
        LightboxCommand::Share(target) => {
            let Some(open) = state.as_ref() else {
                return false;
            };
            let url = share_url(target, page_url, open.current());
            if opener.open(&url) {
                debug!(%url, "share opened");
            } else {
                debug!(%url, "share open refused; ignoring");
            }
            false
        }
        LightboxCommand::Key(_) => false,
    }
}

/// Manual navigation. While the slideshow plays this resets its timer rather
/// than cancelling it, so playback continues from the new index.
fn navigate(
    state: &mut Option<LightboxState>,
    slideshow_deadline: &mut Option<Instant>,
    opts: &LightboxOptions,
    step: impl FnOnce(&mut LightboxState),
) -> bool {
    let Some(open) = state.as_mut() else {
        return false;
    };
    step(open);
    if open.is_slideshow_playing() {
        *slideshow_deadline = Some(Instant::now() + opts.slideshow_interval);
    }
    true
}

async fn send_update(
    updates: &Sender<LightboxUpdate>,
    state: &Option<LightboxState>,
) -> Result<(), ()> {
    let snapshot = state.as_ref().map(|open| LightboxSnapshot {
        image: open.current().clone(),
        current_index: open.current_index(),
        total: open.len(),
        slideshow_playing: open.is_slideshow_playing(),
        controls_visible: open.controls_visible(),
    });
    updates.send(LightboxUpdate(snapshot)).await.map_err(|_| ())
}
