// Copyright 2025 the Flat Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat Draw Reference Surface.
//!
//! This crate provides a small, stateful implementation of [`DrawSurface`]
//! for **op recording and clip-state tracing**.
//!
//! It is intentionally *not* a rasterizer:
//! - It does **not** produce pixels.
//! - It keeps a set of known bitmaps so that draws of unknown handles fail
//!   the way a real backend would.
//! - It is intended for tests and debugging that want to assert on emitted
//!   ops and on the clip state at the time each op is applied.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use flat_draw_surface::{
    Affine, BitmapId, DrawSurface, ImagePaint, Rect, Size, SurfaceError, SurfaceOp,
};

/// Snapshot of the clip state inside the surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClipSnapshot {
    /// Number of saved clip states.
    pub depth: usize,
    /// Current effective clip, or `None` when unclipped.
    pub clip: Option<Rect>,
}

/// Event recorded by the reference surface.
#[derive(Clone, Debug)]
pub struct Event {
    /// Operation that was applied.
    pub op: SurfaceOp,
    /// Clip state after a clip op, or at the time of drawing.
    pub state: ClipSnapshot,
}

/// Simple reference implementation of a draw surface.
///
/// Bitmaps must be registered with [`RefSurface::insert_bitmap`] before they
/// can be drawn.
#[derive(Default, Debug)]
pub struct RefSurface {
    bitmaps: Vec<Option<Size>>,
    events: Vec<Event>,
    state: ClipSnapshot,
    saved: Vec<Option<Rect>>,
    pending_failure: Option<SurfaceError>,
}

impl RefSurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bitmap of the given pixel size and return its handle.
    pub fn insert_bitmap(&mut self, width: u32, height: u32) -> BitmapId {
        let id = u32::try_from(self.bitmaps.len())
            .expect("RefSurface: too many bitmaps for u32 BitmapId");
        self.bitmaps
            .push(Some(Size::new(f64::from(width), f64::from(height))));
        BitmapId(id)
    }

    /// Forget a bitmap. Later draws of `id` fail with [`SurfaceError::UnknownBitmap`].
    pub fn remove_bitmap(&mut self, id: BitmapId) {
        if let Some(slot) = self.bitmaps.get_mut(id.0 as usize) {
            *slot = None;
        }
    }

    /// Size of a registered bitmap.
    pub fn bitmap_size(&self, id: BitmapId) -> Option<Size> {
        self.bitmaps.get(id.0 as usize).copied().flatten()
    }

    /// Make the next [`DrawSurface::draw_bitmap`] call fail with `error`.
    pub fn fail_next_draw(&mut self, error: SurfaceError) {
        self.pending_failure = Some(error);
    }

    /// Returns a slice of recorded events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Returns the recorded ops in order.
    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.events.iter().map(|e| e.op.clone()).collect()
    }

    /// Returns the draw events only.
    pub fn draws(&self) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| matches!(e.op, SurfaceOp::DrawBitmap { .. }))
            .collect()
    }

    /// Current clip state.
    pub fn clip_state(&self) -> &ClipSnapshot {
        &self.state
    }

    /// Clears all recorded events but keeps bitmaps and clip state.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn record(&mut self, op: SurfaceOp) {
        self.events.push(Event {
            op,
            state: self.state.clone(),
        });
    }
}

impl DrawSurface for RefSurface {
    fn save_clip(&mut self) {
        self.saved.push(self.state.clip);
        self.state.depth = self.saved.len();
        self.record(SurfaceOp::SaveClip);
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.state.clip = Some(match self.state.clip {
            Some(current) => current.intersect(rect),
            None => rect,
        });
        self.record(SurfaceOp::ClipRect(rect));
    }

    fn restore_clip(&mut self) {
        // Unbalanced restores are tolerated and leave the surface unclipped.
        self.state.clip = self.saved.pop().flatten();
        self.state.depth = self.saved.len();
        self.record(SurfaceOp::RestoreClip);
    }

    fn clip_depth(&self) -> usize {
        self.saved.len()
    }

    fn draw_bitmap(
        &mut self,
        bitmap: BitmapId,
        transform: Affine,
        paint: &ImagePaint,
    ) -> Result<(), SurfaceError> {
        if let Some(err) = self.pending_failure.take() {
            return Err(err);
        }
        if self.bitmap_size(bitmap).is_none() {
            return Err(SurfaceError::UnknownBitmap(bitmap));
        }
        self.record(SurfaceOp::DrawBitmap {
            bitmap,
            transform,
            paint: paint.clone(),
        });
        Ok(())
    }
}
