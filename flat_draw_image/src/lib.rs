// Copyright 2025 the Flat Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat Draw Image: an image draw command for flat rendering layers.
//!
//! An [`ImageDrawCommand`] draws one image into one rectangle of a
//! [`DrawSurface`](flat_draw_surface::DrawSurface). It:
//!
//! - fits the image to its bounds according to a [`ScaleType`] (stretch,
//!   contain, or cover), clipping when a cover fit overflows,
//! - optionally tints the image with a `SrcAtop` colour filter,
//! - loads pixels lazily through a [`BitmapFetcher`], subscribing only while
//!   attached to the visible set,
//! - routes [`ImageLoadEvent`]s to its owning element.
//!
//! Layout, view diffing, and redraw scheduling belong to the embedder. The
//! embedder supplies bounds through [`DrawCommand::set_bounds`], a redraw
//! scheduler through [`AttachDetach::on_attached`], and a fetch pipeline
//! through [`BitmapFetcher`].
//!
//! # Frame loop
//!
//! ```ignore
//! use flat_draw_image::{AttachDetach, DrawCommand, DrawImage, ImageDrawCommand, ImageSource};
//!
//! let mut image = ImageDrawCommand::new(fetcher);
//! image.set_bounds(Rect::new(0.0, 0.0, 120.0, 80.0));
//! image.set_source(Some(ImageSource::new("https://example.com/cat.png")?));
//! image.on_attached(Arc::downgrade(&scheduler));
//!
//! // Each frame, on the render thread:
//! image.apply_pending();
//! if image.has_source() {
//!     image.draw(&mut surface)?;
//! }
//! ```
//!
//! # Threading
//!
//! Fetches complete wherever the pipeline runs. A [`BitmapReadyNotifier`]
//! parks the result and asks the scheduler for a frame; the command applies
//! it in [`DrawImage::apply_pending`], so transforms are only mutated on the
//! render thread. Notifications sent after [`AttachDetach::on_detached`], or
//! for a source that has since been replaced, are dropped.
//!
//! # Contract violations
//!
//! Drawing a detached command, drawing a command without a source, and
//! delivering a bitmap to a detached command are caller bugs and panic.
//! Pending or failed fetches are not errors: the draw is skipped.

mod command;
mod events;
mod fit;
mod lifecycle;
mod request;
mod source;

pub use command::{
    AttachDetach, DEFAULT_FADE_DURATION_MS, DrawCommand, DrawImage, ImageDrawCommand,
};
pub use events::{EventRoute, ImageEventSink, ImageLoadEvent};
pub use fit::{Fit, compute_fit};
pub use lifecycle::{Invalidate, Lifecycle};
pub use request::{BitmapFetcher, BitmapReadyNotifier, BitmapRequest, DecodedBitmap};
pub use source::{ImageSource, ImageSourceError, ScaleType};
