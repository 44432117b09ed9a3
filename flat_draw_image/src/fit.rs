// Copyright 2025 the Flat Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scale-to-fit transform computation.
//!
//! Given a container rectangle and the natural size of an image,
//! [`compute_fit`] produces the bitmap-to-surface transform for a
//! [`ScaleType`]:
//!
//! - [`ScaleType::FillStretch`] scales each axis to the container and never clips.
//! - [`ScaleType::FitInside`] keeps images that already fit at scale `1`, and
//!   otherwise shrinks uniformly by the tighter axis. The result is centred
//!   and never overflows.
//! - [`ScaleType::FitCover`] scales uniformly by the looser axis so the
//!   container is covered, centred. Overflow is reported through
//!   [`Fit::needs_clip`].
//!
//! Transforms only scale and translate.

use flat_draw_surface::{Affine, Rect, Size, Vec2};

use crate::ScaleType;

/// Result of fitting an image into a container.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Fit {
    /// Bitmap-to-surface transform: scale, then translate.
    pub transform: Affine,
    /// Scale factor per axis. Equal on both axes except for
    /// [`ScaleType::FillStretch`].
    pub scale: Vec2,
    /// Offset of the scaled image from the container's top-left corner.
    ///
    /// Negative on an axis where the scaled image overflows.
    pub padding: Vec2,
    /// Whether drawing must be clipped to the container.
    pub needs_clip: bool,
}

/// Compute the transform that draws an image of `image` size into `bounds`.
///
/// Returns `None` when either the container or the image has a zero, negative
/// or non-finite dimension, since no meaningful transform exists.
pub fn compute_fit(bounds: Rect, image: Size, scale_type: ScaleType) -> Option<Fit> {
    let cw = bounds.width();
    let ch = bounds.height();
    let iw = image.width;
    let ih = image.height;

    if !([cw, ch, iw, ih].iter().all(|d| d.is_finite() && *d > 0.0)) {
        return None;
    }

    if scale_type == ScaleType::FillStretch {
        let scale = Vec2::new(cw / iw, ch / ih);
        return Some(Fit {
            transform: Affine::scale_non_uniform(scale.x, scale.y)
                .then_translate(Vec2::new(bounds.x0, bounds.y0)),
            scale,
            padding: Vec2::ZERO,
            needs_clip: false,
        });
    }

    let scale = match scale_type {
        ScaleType::FitInside if cw >= iw && ch >= ih => 1.0,
        ScaleType::FitInside => (cw / iw).min(ch / ih),
        _ => (cw / iw).max(ch / ih),
    };

    let padding = Vec2::new((cw - iw * scale) / 2.0, (ch - ih * scale) / 2.0);

    Some(Fit {
        transform: Affine::scale(scale)
            .then_translate(Vec2::new(bounds.x0 + padding.x, bounds.y0 + padding.y)),
        scale: Vec2::new(scale, scale),
        padding,
        needs_clip: padding.x < 0.0 || padding.y < 0.0,
    })
}
