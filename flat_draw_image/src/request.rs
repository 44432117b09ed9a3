// Copyright 2025 the Flat Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between image commands and the bitmap fetch pipeline.
//!
//! A [`BitmapFetcher`] turns an [`ImageSource`] into a [`BitmapRequest`]. The
//! request owns the subscription to the pipeline and the decoded pixels; the
//! command only asks it for the current [`DecodedBitmap`] on each draw.
//!
//! Completion is reported through a [`BitmapReadyNotifier`], which may be
//! used from any thread. Notifications are parked in a slot owned by the
//! command and applied on the render thread when the command drains it at a
//! frame boundary. A notifier stops working when its command detaches or
//! moves on to another source, so late completions are dropped.

use std::sync::{Arc, Weak};

use flat_draw_surface::{BitmapId, Size};
use parking_lot::Mutex;

use crate::{ImageSource, Invalidate};

/// A bitmap that the fetch pipeline has decoded and uploaded to the surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DecodedBitmap {
    /// Surface handle of the pixels.
    pub id: BitmapId,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl DecodedBitmap {
    /// Natural size of the bitmap.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// A live request for one image source.
///
/// Implementations own caching and eviction. Dropping the request must release
/// whatever it holds.
pub trait BitmapRequest {
    /// Begin or resume delivering notifications.
    ///
    /// If the bitmap is already resolved, implementations should notify again
    /// so a re-attached command picks it up.
    fn attach(&mut self);

    /// Stop delivering notifications and release resources held only for
    /// this request.
    fn detach(&mut self);

    /// The currently resolved bitmap, or `None` while pending or after a failure.
    fn bitmap(&self) -> Option<DecodedBitmap>;
}

/// Creates [`BitmapRequest`]s for image sources.
pub trait BitmapFetcher {
    /// Request type produced by this fetcher.
    type Request: BitmapRequest;

    /// Create a request for `source`. Completion must be reported through
    /// `notifier`.
    fn request(&self, source: &ImageSource, notifier: BitmapReadyNotifier) -> Self::Request;
}

#[derive(Debug, Default)]
struct SlotState {
    /// Bumped whenever the command switches sources.
    generation: u64,
    /// Set while the command is attached.
    invalidate: Option<Weak<dyn Invalidate>>,
    /// Latest undelivered notification. `Some(None)` is a failure.
    pending: Option<Option<DecodedBitmap>>,
}

/// Render-thread side of the notification handoff.
#[derive(Debug, Default)]
pub(crate) struct ReadySlot {
    state: Mutex<SlotState>,
}

impl ReadySlot {
    /// Invalidate all outstanding notifiers and hand out a new one.
    pub(crate) fn subscribe(self: &Arc<Self>) -> BitmapReadyNotifier {
        let generation = self.retire();
        BitmapReadyNotifier {
            slot: Arc::clone(self),
            generation,
        }
    }

    /// Invalidate all outstanding notifiers. Returns the new generation.
    pub(crate) fn retire(&self) -> u64 {
        let mut state = self.state.lock();
        state.generation += 1;
        state.pending = None;
        state.generation
    }

    /// Start accepting notifications; they will request frames from `invalidate`.
    pub(crate) fn open(&self, invalidate: Weak<dyn Invalidate>) {
        self.state.lock().invalidate = Some(invalidate);
    }

    /// Stop accepting notifications and drop any that were not applied yet.
    pub(crate) fn close(&self) {
        let mut state = self.state.lock();
        state.invalidate = None;
        state.pending = None;
    }

    /// Take the latest notification, if the slot is open.
    pub(crate) fn take(&self) -> Option<Option<DecodedBitmap>> {
        let mut state = self.state.lock();
        if state.invalidate.is_none() {
            return None;
        }
        state.pending.take()
    }
}

/// Handle used by the fetch pipeline to report completion.
///
/// Cheap to clone and usable from any thread.
#[derive(Clone, Debug)]
pub struct BitmapReadyNotifier {
    slot: Arc<ReadySlot>,
    generation: u64,
}

impl BitmapReadyNotifier {
    /// Report that the request resolved to `bitmap`, or failed when `None`.
    ///
    /// The notification replaces any earlier one that was not applied yet and
    /// asks the render loop for a frame. Returns `false` if it was dropped
    /// because the command is detached or no longer uses this request.
    pub fn notify(&self, bitmap: Option<DecodedBitmap>) -> bool {
        let invalidate = {
            let mut state = self.slot.state.lock();
            if state.generation != self.generation {
                tracing::trace!(
                    generation = self.generation,
                    current = state.generation,
                    "dropping bitmap notification for a replaced source"
                );
                return false;
            }
            let Some(invalidate) = state.invalidate.clone() else {
                tracing::trace!("dropping bitmap notification for a detached command");
                return false;
            };
            state.pending = Some(bitmap);
            invalidate
        };

        // Outside the lock: the scheduler may call back into the render loop.
        if let Some(invalidate) = invalidate.upgrade() {
            invalidate.invalidate();
        }
        true
    }

    /// Returns `true` if a notification sent now would be accepted.
    pub fn is_live(&self) -> bool {
        let state = self.slot.state.lock();
        state.generation == self.generation && state.invalidate.is_some()
    }
}
