// Copyright 2025 the Flat Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat Draw Surface: the drawing target consumed by flat draw commands.
//!
//! Draw commands in a flat rendering layer do not talk to a concrete renderer.
//! They emit a very small set of operations against a [`DrawSurface`]:
//!
//! - save the current clip state ([`DrawSurface::save_clip`]),
//! - intersect the clip with an axis-aligned rectangle ([`DrawSurface::clip_rect`]),
//! - restore the most recently saved clip state ([`DrawSurface::restore_clip`]),
//! - paint a bitmap through an affine transform with an optional colour
//!   filter ([`DrawSurface::draw_bitmap`]).
//!
//! Concrete surfaces (a GPU scene, a CPU rasterizer, a recording used in
//! tests) implement the trait; commands stay backend-agnostic.
//!
//! # Scoped clipping
//!
//! Clip save/restore must stay balanced even when painting fails or panics.
//! [`ClipScope`] saves and clips on construction and restores on drop, and
//! [`DrawSurfaceExt::with_clip_rect`] wraps it for closure-style use:
//!
//! ```ignore
//! # use flat_draw_surface::*;
//! # use kurbo::{Affine, Rect};
//! # fn demo(surface: &mut dyn DrawSurface, bitmap: BitmapId) -> Result<(), SurfaceError> {
//! let paint = ImagePaint::default();
//! surface.with_clip_rect(Rect::new(0.0, 0.0, 50.0, 50.0), |s| {
//!     s.draw_bitmap(bitmap, Affine::scale(2.0), &paint)
//! })
//! # }
//! ```
//!
//! # Tinting
//!
//! The only colour filter is a uniform tint composited with `SrcAtop`, so the
//! tint colour replaces the colour of opaque pixels while keeping the bitmap's
//! alpha. See [`ColorFilter::tint`] and [`argb_to_color`].

#![no_std]

extern crate alloc;

use alloc::string::String;
use core::ops::{Deref, DerefMut};

pub use kurbo::{Affine, Rect, Size, Vec2};
pub use peniko::{BlendMode, Color, Compose, ImageSampler, Mix};

/// Identifier for a decoded bitmap owned by the surface backend.
///
/// Handles are issued by whatever pipeline uploads decoded pixels to the
/// backend. Draw commands never own the pixels; they only carry the handle
/// for the duration of a draw call.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitmapId(pub u32);

/// Colour filter applied while painting a bitmap.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ColorFilter {
    /// Composite a uniform colour over the bitmap with the given blend mode.
    Tint {
        /// Tint colour.
        color: Color,
        /// Blend mode used to combine the tint with the bitmap.
        blend: BlendMode,
    },
}

impl ColorFilter {
    /// Create a `SrcAtop` tint filter.
    ///
    /// The tint covers the opaque pixels of the bitmap and leaves transparent
    /// pixels untouched.
    #[inline]
    pub fn tint(color: Color) -> Self {
        Self::Tint {
            color,
            blend: BlendMode::new(Mix::Normal, Compose::SrcAtop),
        }
    }

    /// Returns the tint colour.
    #[inline]
    pub fn color(&self) -> Color {
        match self {
            Self::Tint { color, .. } => *color,
        }
    }
}

/// Convert a packed `0xAARRGGBB` colour into a tint colour.
///
/// A packed value of `0` (fully transparent black) means "no tint" and maps to
/// `None`, matching how host frameworks encode an unset tint.
#[inline]
pub fn argb_to_color(argb: u32) -> Option<Color> {
    if argb == 0 {
        return None;
    }
    let [a, r, g, b] = argb.to_be_bytes();
    Some(Color::from_rgba8(r, g, b, a))
}

/// Paint state used for a single bitmap draw.
///
/// Each draw command owns its own paint; there is no shared, mutable paint
/// object between commands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImagePaint {
    /// Sampling parameters for the bitmap.
    pub sampler: ImageSampler,
    /// Optional colour filter.
    pub filter: Option<ColorFilter>,
}

impl ImagePaint {
    /// Returns a copy of this paint with `filter` installed.
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, filter: Option<ColorFilter>) -> Self {
        self.filter = filter;
        self
    }
}

/// A single operation issued against a [`DrawSurface`].
///
/// Surfaces that record (for tests or replay) store these.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceOp {
    /// Push the current clip state.
    SaveClip,
    /// Intersect the clip with a rectangle in surface coordinates.
    ClipRect(Rect),
    /// Pop the most recently saved clip state.
    RestoreClip,
    /// Paint a bitmap.
    DrawBitmap {
        /// Bitmap to paint.
        bitmap: BitmapId,
        /// Bitmap-to-surface transform.
        transform: Affine,
        /// Paint used for the draw.
        paint: ImagePaint,
    },
}

/// Errors reported by a surface while painting.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The bitmap handle does not refer to a live bitmap in this surface.
    #[error("bitmap {0:?} is not known to this surface")]
    UnknownBitmap(BitmapId),
    /// The backend failed to paint.
    #[error("surface backend failed: {0}")]
    Backend(String),
}

/// A 2D target for flat draw commands.
pub trait DrawSurface {
    /// Save the current clip state.
    ///
    /// Every call must be matched by a [`DrawSurface::restore_clip`].
    fn save_clip(&mut self);

    /// Intersect the current clip with `rect`.
    fn clip_rect(&mut self, rect: Rect);

    /// Restore the most recently saved clip state.
    fn restore_clip(&mut self);

    /// Number of clip states currently saved.
    fn clip_depth(&self) -> usize;

    /// Paint `bitmap` through `transform` using `paint`.
    fn draw_bitmap(
        &mut self,
        bitmap: BitmapId,
        transform: Affine,
        paint: &ImagePaint,
    ) -> Result<(), SurfaceError>;
}

/// A saved and clipped region of a [`DrawSurface`].
///
/// The clip is restored when the scope is dropped, including during unwinding.
/// The scope dereferences to the surface so drawing happens through it.
#[derive(Debug)]
pub struct ClipScope<'a, S: DrawSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: DrawSurface + ?Sized> ClipScope<'a, S> {
    /// Save the clip state of `surface` and intersect it with `rect`.
    pub fn new(surface: &'a mut S, rect: Rect) -> Self {
        surface.save_clip();
        surface.clip_rect(rect);
        Self { surface }
    }
}

impl<S: DrawSurface + ?Sized> Deref for ClipScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: DrawSurface + ?Sized> DerefMut for ClipScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: DrawSurface + ?Sized> Drop for ClipScope<'_, S> {
    fn drop(&mut self) {
        self.surface.restore_clip();
    }
}

/// Convenience helpers for [`DrawSurface`] callers.
///
/// Kept separate from [`DrawSurface`] so `&mut dyn DrawSurface` stays usable.
pub trait DrawSurfaceExt: DrawSurface {
    /// Run `f` with the clip intersected with `rect`, restoring it afterwards.
    ///
    /// The clip is restored whether `f` returns normally, returns an error, or
    /// panics.
    #[inline]
    fn with_clip_rect<R>(&mut self, rect: Rect, f: impl FnOnce(&mut Self) -> R) -> R {
        let mut scope = ClipScope::new(self, rect);
        f(&mut *scope)
    }
}

impl<S: DrawSurface + ?Sized> DrawSurfaceExt for S {}

/// Returns `true` if `transform` only scales and translates.
///
/// Bitmap transforms produced by fit computations never rotate or skew.
#[inline]
pub fn is_scale_translate(transform: Affine) -> bool {
    let c = transform.as_coeffs();
    c[1] == 0.0 && c[2] == 0.0
}
