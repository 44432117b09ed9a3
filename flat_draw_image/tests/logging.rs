// Copyright 2025 the Flat Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Log levels emitted by `ImageDrawCommand` while its fit degenerates.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{FakeFetcher, Scheduler, bitmap, handle, source};
use flat_draw_image::{AttachDetach, DrawCommand, DrawImage, ImageDrawCommand, ScaleType};
use flat_draw_surface::Rect;
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Metadata, Subscriber};

/// Subscriber that only counts `WARN` events.
#[derive(Clone, Default)]
struct WarnCounter(Arc<AtomicUsize>);

impl WarnCounter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Subscriber for WarnCounter {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _: &Id, _: &Record<'_>) {}

    fn record_follows_from(&self, _: &Id, _: &Id) {}

    fn event(&self, event: &Event<'_>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn enter(&self, _: &Id) {}

    fn exit(&self, _: &Id) {}
}

#[test]
fn collapsed_bounds_warn_once_per_lost_fit() {
    let counter = WarnCounter::default();
    tracing::subscriber::with_default(counter.clone(), || {
        let fetcher = FakeFetcher::default();
        let scheduler = Arc::new(Scheduler::default());
        let mut image = ImageDrawCommand::new(fetcher.clone());
        image.set_bounds(Rect::new(0.0, 0.0, 50.0, 50.0));
        image.set_scale_type(ScaleType::FitInside);
        image.set_source(Some(source("file:///a.png")));
        image.on_attached(handle(&scheduler));
        assert!(fetcher.last().resolve(bitmap(1, 20, 20)));
        assert!(image.apply_pending());
        assert!(image.fit().is_some());

        // Repeated layout passes while collapsed.
        image.set_bounds(Rect::new(0.0, 0.0, 0.0, 50.0));
        image.set_bounds(Rect::new(0.0, 0.0, 0.0, 40.0));
        image.set_scale_type(ScaleType::FitCover);
        assert_eq!(image.fit(), None);
        assert_eq!(counter.count(), 1);

        image.set_bounds(Rect::new(0.0, 0.0, 30.0, 30.0));
        assert!(image.fit().is_some());
        image.set_bounds(Rect::new(0.0, 0.0, 30.0, 0.0));
        assert_eq!(counter.count(), 2);
    });
}

#[test]
fn degenerate_first_fit_does_not_warn() {
    let counter = WarnCounter::default();
    tracing::subscriber::with_default(counter.clone(), || {
        let fetcher = FakeFetcher::default();
        let scheduler = Arc::new(Scheduler::default());
        let mut image = ImageDrawCommand::new(fetcher.clone());
        image.set_bounds(Rect::new(0.0, 0.0, 50.0, 50.0));
        image.set_source(Some(source("file:///a.png")));
        image.on_attached(handle(&scheduler));
        assert!(fetcher.last().resolve(bitmap(1, 0, 0)));
        assert!(image.apply_pending());

        assert_eq!(image.fit(), None);
        assert_eq!(counter.count(), 0);
    });
}
