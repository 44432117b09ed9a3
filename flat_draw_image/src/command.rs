// Copyright 2025 the Flat Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw command traits and the pipeline-backed image command.

use std::fmt;
use std::sync::{Arc, Weak};

use flat_draw_surface::{
    Affine, Color, ColorFilter, DrawSurface, DrawSurfaceExt, ImagePaint, Rect, SurfaceError,
    is_scale_translate,
};

use crate::events::EventRoute;
use crate::fit::{Fit, compute_fit};
use crate::request::ReadySlot;
use crate::{
    BitmapFetcher, BitmapRequest, DecodedBitmap, ImageEventSink, ImageLoadEvent, ImageSource,
    Invalidate, Lifecycle, ScaleType,
};

/// Default fade-in duration for newly loaded images, in milliseconds.
pub const DEFAULT_FADE_DURATION_MS: u32 = 300;

/// A leaf command that paints into a rectangle of a [`DrawSurface`].
pub trait DrawCommand {
    /// Rectangle the command draws into, in surface coordinates.
    fn bounds(&self) -> Rect;

    /// Set the rectangle the command draws into.
    fn set_bounds(&mut self, bounds: Rect);

    /// Paint the command.
    fn draw(&self, surface: &mut dyn DrawSurface) -> Result<(), SurfaceError>;
}

/// Commands that follow the visibility of their element.
pub trait AttachDetach {
    /// The command became visible; `invalidate` schedules redraws until
    /// [`AttachDetach::on_detached`].
    fn on_attached(&mut self, invalidate: Weak<dyn Invalidate>);

    /// The command left the visible set.
    fn on_detached(&mut self);
}

/// Capabilities shared by image draw commands, whatever loads their pixels.
pub trait DrawImage: DrawCommand + AttachDetach {
    /// Returns `true` if an image source is assigned. Commands without a
    /// source must not be drawn.
    fn has_source(&self) -> bool;

    /// Assign a new source, or `None` to clear it.
    fn set_source(&mut self, source: Option<ImageSource>);

    /// Tint composited over the image's opaque pixels, or `None` for no tint.
    fn set_tint(&mut self, tint: Option<Color>);

    /// Set the scale type.
    fn set_scale_type(&mut self, scale_type: ScaleType);

    /// The scale type.
    fn scale_type(&self) -> ScaleType;

    /// Element id used to route [`ImageLoadEvent`]s; `0` drops them.
    fn set_element_id(&mut self, element_id: u32);

    /// Set the border width.
    fn set_border_width(&mut self, width: f32);

    /// The border width.
    fn border_width(&self) -> f32;

    /// Set the border corner radius.
    fn set_border_radius(&mut self, radius: f32);

    /// The border corner radius.
    fn border_radius(&self) -> f32;

    /// Set the border colour.
    fn set_border_color(&mut self, color: Color);

    /// The border colour.
    fn border_color(&self) -> Color;

    /// Set the fade-in duration in milliseconds.
    fn set_fade_duration(&mut self, millis: u32);

    /// Apply the latest bitmap notification, if any. Call on the render thread
    /// at a frame boundary. Returns `true` if a notification was applied.
    fn apply_pending(&mut self) -> bool;
}

/// Draws a local or remote image fetched through a [`BitmapFetcher`].
///
/// The command never holds decoded pixels: each draw asks the current
/// [`BitmapRequest`] for its bitmap, and skips it until that bitmap has been
/// applied. Notifications from the fetcher may arrive
/// on any thread; they are parked and applied by
/// [`DrawImage::apply_pending`] on the render thread.
pub struct ImageDrawCommand<F: BitmapFetcher> {
    fetcher: F,
    bounds: Rect,
    source: Option<ImageSource>,
    request: Option<F::Request>,
    slot: Arc<ReadySlot>,
    scale_type: ScaleType,
    paint: ImagePaint,
    fit: Option<Fit>,
    applied: Option<DecodedBitmap>,
    lifecycle: Lifecycle,
    route: EventRoute,
    border_width: f32,
    border_radius: f32,
    border_color: Color,
    fade_duration: u32,
}

impl<F: BitmapFetcher> ImageDrawCommand<F> {
    /// Create a command with no source that resolves sources with `fetcher`.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            bounds: Rect::ZERO,
            source: None,
            request: None,
            slot: Arc::default(),
            scale_type: ScaleType::default(),
            paint: ImagePaint::default(),
            fit: None,
            applied: None,
            lifecycle: Lifecycle::Detached,
            route: EventRoute::default(),
            border_width: 0.0,
            border_radius: 0.0,
            border_color: Color::TRANSPARENT,
            fade_duration: DEFAULT_FADE_DURATION_MS,
        }
    }

    /// The assigned source.
    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    /// The live request for the assigned source.
    pub fn request(&self) -> Option<&F::Request> {
        self.request.as_ref()
    }

    /// Returns `true` between [`AttachDetach::on_attached`] and
    /// [`AttachDetach::on_detached`].
    pub fn is_attached(&self) -> bool {
        self.lifecycle.is_attached()
    }

    /// Current attach state.
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Fit computed for the current bitmap, if any.
    pub fn fit(&self) -> Option<&Fit> {
        self.fit.as_ref()
    }

    /// Bitmap-to-surface transform, once a bitmap has been applied.
    pub fn transform(&self) -> Option<Affine> {
        self.fit.map(|fit| fit.transform)
    }

    /// Whether drawing is clipped to the bounds.
    pub fn needs_clip(&self) -> bool {
        self.fit.is_some_and(|fit| fit.needs_clip)
    }

    /// Paint used for draws.
    pub fn paint(&self) -> &ImagePaint {
        &self.paint
    }

    /// The current tint.
    pub fn tint(&self) -> Option<Color> {
        self.paint.filter.map(|filter| filter.color())
    }

    /// The element id events are routed to.
    pub fn element_id(&self) -> u32 {
        self.route.element_id()
    }

    /// Install or remove the receiver of [`ImageLoadEvent`]s.
    pub fn set_event_sink(&mut self, sink: Option<Arc<dyn ImageEventSink>>) {
        self.route.set_sink(sink);
    }

    /// The fade-in duration in milliseconds.
    pub fn fade_duration(&self) -> u32 {
        self.fade_duration
    }

    /// A bitmap became available, or failed when `None`.
    ///
    /// Requests a redraw and recomputes the transform. Normally reached through
    /// [`DrawImage::apply_pending`].
    ///
    /// # Panics
    ///
    /// Panics if the command is detached.
    pub fn on_bitmap_ready(&mut self, bitmap: Option<DecodedBitmap>) {
        assert!(
            self.lifecycle.is_attached(),
            "bitmap delivered to a detached image command"
        );

        self.applied = bitmap;
        let Some(bitmap) = bitmap else {
            self.fit = None;
            tracing::debug!(element_id = self.route.element_id(), "image load failed");
            self.route.emit(ImageLoadEvent::Error);
            self.route.emit(ImageLoadEvent::LoadEnd);
            return;
        };

        self.lifecycle.invalidate();
        self.update_fit(bitmap);
        tracing::debug!(
            element_id = self.route.element_id(),
            width = bitmap.width,
            height = bitmap.height,
            needs_clip = self.needs_clip(),
            "bitmap applied"
        );
        self.route.emit(ImageLoadEvent::Load {
            width: bitmap.width,
            height: bitmap.height,
        });
        self.route.emit(ImageLoadEvent::LoadEnd);
    }

    fn update_fit(&mut self, bitmap: DecodedBitmap) {
        let had_fit = self.fit.is_some();
        self.fit = compute_fit(self.bounds, bitmap.size(), self.scale_type);
        debug_assert!(
            self.fit.is_none_or(|fit| is_scale_translate(fit.transform)),
            "image fits only scale and translate"
        );
        if self.fit.is_some() {
            return;
        }
        // Layout may collapse a view for several passes; only the loss is a warning.
        if had_fit {
            tracing::warn!(
                bounds = ?self.bounds,
                width = bitmap.width,
                height = bitmap.height,
                "degenerate image fit; nothing will be drawn"
            );
        } else {
            tracing::debug!(
                bounds = ?self.bounds,
                width = bitmap.width,
                height = bitmap.height,
                "degenerate image fit"
            );
        }
    }

    /// Recompute the fit against the last applied bitmap.
    fn refresh_fit(&mut self) {
        if let Some(bitmap) = self.applied {
            self.update_fit(bitmap);
        }
    }

    fn start_request(&mut self) {
        if let Some(request) = &mut self.request {
            request.attach();
            self.route.emit(ImageLoadEvent::LoadStart);
        }
    }
}

impl<F: BitmapFetcher> fmt::Debug for ImageDrawCommand<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageDrawCommand")
            .field("bounds", &self.bounds)
            .field("source", &self.source)
            .field("has_request", &self.request.is_some())
            .field("scale_type", &self.scale_type)
            .field("paint", &self.paint)
            .field("fit", &self.fit)
            .field("applied", &self.applied)
            .field("lifecycle", &self.lifecycle)
            .field("route", &self.route)
            .field("border_width", &self.border_width)
            .field("border_radius", &self.border_radius)
            .field("border_color", &self.border_color)
            .field("fade_duration", &self.fade_duration)
            .finish_non_exhaustive()
    }
}

impl<F: BitmapFetcher> DrawCommand for ImageDrawCommand<F> {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Rect) {
        if self.bounds == bounds {
            return;
        }
        self.bounds = bounds;
        self.refresh_fit();
    }

    /// # Panics
    ///
    /// Panics if the command is detached or has no source.
    fn draw(&self, surface: &mut dyn DrawSurface) -> Result<(), SurfaceError> {
        assert!(
            self.lifecycle.is_attached(),
            "image command drawn while detached"
        );
        let Some(request) = &self.request else {
            panic!("image command drawn without a source");
        };

        let Some(bitmap) = request.bitmap() else {
            tracing::trace!("bitmap pending; skipping draw");
            return Ok(());
        };
        if self.applied != Some(bitmap) {
            tracing::trace!(bitmap = bitmap.id.0, "bitmap not yet applied; skipping draw");
            return Ok(());
        }
        let Some(fit) = self.fit else {
            tracing::trace!("no usable fit; skipping draw");
            return Ok(());
        };

        if fit.needs_clip {
            surface.with_clip_rect(self.bounds, |s| {
                s.draw_bitmap(bitmap.id, fit.transform, &self.paint)
            })
        } else {
            surface.draw_bitmap(bitmap.id, fit.transform, &self.paint)
        }
    }
}

impl<F: BitmapFetcher> AttachDetach for ImageDrawCommand<F> {
    fn on_attached(&mut self, invalidate: Weak<dyn Invalidate>) {
        let was_attached = self.lifecycle.is_attached();
        self.slot.open(invalidate.clone());
        self.lifecycle = Lifecycle::Attached { invalidate };
        if was_attached {
            tracing::debug!("image command re-attached; scheduler replaced");
            return;
        }
        tracing::debug!(element_id = self.route.element_id(), "image command attached");
        self.start_request();
    }

    fn on_detached(&mut self) {
        if !self.lifecycle.is_attached() {
            return;
        }
        // Close first so completions racing with the detach are dropped.
        self.slot.close();
        self.lifecycle = Lifecycle::Detached;
        if let Some(request) = &mut self.request {
            request.detach();
        }
        tracing::debug!(element_id = self.route.element_id(), "image command detached");
    }
}

impl<F: BitmapFetcher> DrawImage for ImageDrawCommand<F> {
    fn has_source(&self) -> bool {
        self.request.is_some()
    }

    fn set_source(&mut self, source: Option<ImageSource>) {
        if self.source == source {
            return;
        }

        if let Some(mut old) = self.request.take() {
            if self.lifecycle.is_attached() {
                old.detach();
            }
        }
        self.fit = None;
        self.applied = None;

        match &source {
            Some(source) => {
                tracing::debug!(uri = source.uri(), "image source assigned");
                let notifier = self.slot.subscribe();
                self.request = Some(self.fetcher.request(source, notifier));
                if self.lifecycle.is_attached() {
                    self.start_request();
                }
            }
            None => {
                tracing::debug!("image source cleared");
                self.slot.retire();
            }
        }
        self.source = source;
    }

    fn set_tint(&mut self, tint: Option<Color>) {
        self.paint.filter = tint.map(ColorFilter::tint);
    }

    fn set_scale_type(&mut self, scale_type: ScaleType) {
        if self.scale_type == scale_type {
            return;
        }
        self.scale_type = scale_type;
        self.refresh_fit();
    }

    fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    fn set_element_id(&mut self, element_id: u32) {
        self.route.set_element_id(element_id);
    }

    fn set_border_width(&mut self, width: f32) {
        self.border_width = width;
    }

    fn border_width(&self) -> f32 {
        self.border_width
    }

    fn set_border_radius(&mut self, radius: f32) {
        self.border_radius = radius;
    }

    fn border_radius(&self) -> f32 {
        self.border_radius
    }

    fn set_border_color(&mut self, color: Color) {
        self.border_color = color;
    }

    fn border_color(&self) -> Color {
        self.border_color
    }

    fn set_fade_duration(&mut self, millis: u32) {
        self.fade_duration = millis;
    }

    fn apply_pending(&mut self) -> bool {
        if !self.lifecycle.is_attached() {
            return false;
        }
        match self.slot.take() {
            Some(bitmap) => {
                self.on_bitmap_ready(bitmap);
                true
            }
            None => false,
        }
    }
}
