// Copyright 2025 the Flat Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for image command integration tests.

#![allow(
    missing_docs,
    dead_code,
    reason = "Integration-test helper module; not every test binary uses every helper."
)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use flat_draw_image::{
    BitmapFetcher, BitmapReadyNotifier, BitmapRequest, DecodedBitmap, ImageEventSink,
    ImageLoadEvent, ImageSource, Invalidate,
};
use flat_draw_surface::BitmapId;
use parking_lot::Mutex;

/// Redraw scheduler that counts requests.
#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    frames: AtomicUsize,
}

impl Scheduler {
    pub(crate) fn frames(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }
}

impl Invalidate for Scheduler {
    fn invalidate(&self) {
        self.frames.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn handle(scheduler: &Arc<Scheduler>) -> Weak<dyn Invalidate> {
    Arc::downgrade(scheduler) as Weak<dyn Invalidate>
}

/// Event sink that records everything it receives.
#[derive(Debug, Default)]
pub(crate) struct EventLog {
    events: Mutex<Vec<(u32, ImageLoadEvent)>>,
}

impl EventLog {
    pub(crate) fn events(&self) -> Vec<(u32, ImageLoadEvent)> {
        self.events.lock().clone()
    }
}

impl ImageEventSink for EventLog {
    fn dispatch(&self, element_id: u32, event: ImageLoadEvent) {
        self.events.lock().push((element_id, event));
    }
}

#[derive(Debug, Default)]
struct RequestState {
    attaches: u32,
    detaches: u32,
    attached: bool,
    bitmap: Option<DecodedBitmap>,
}

/// Test-side view of one request created by [`FakeFetcher`].
#[derive(Debug)]
pub(crate) struct FakeRequestHandle {
    pub(crate) source: ImageSource,
    notifier: BitmapReadyNotifier,
    state: Mutex<RequestState>,
}

impl FakeRequestHandle {
    /// Resolve the request, as the pipeline would from a worker thread.
    pub(crate) fn resolve(&self, bitmap: DecodedBitmap) -> bool {
        self.state.lock().bitmap = Some(bitmap);
        self.notifier.notify(Some(bitmap))
    }

    /// Fail the request.
    pub(crate) fn fail(&self) -> bool {
        self.state.lock().bitmap = None;
        self.notifier.notify(None)
    }

    pub(crate) fn notifier(&self) -> BitmapReadyNotifier {
        self.notifier.clone()
    }

    pub(crate) fn attaches(&self) -> u32 {
        self.state.lock().attaches
    }

    pub(crate) fn detaches(&self) -> u32 {
        self.state.lock().detaches
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.state.lock().attached
    }
}

/// Request handed to the command.
#[derive(Debug)]
pub(crate) struct FakeRequest(Arc<FakeRequestHandle>);

impl BitmapRequest for FakeRequest {
    fn attach(&mut self) {
        let cached = {
            let mut state = self.0.state.lock();
            state.attaches += 1;
            state.attached = true;
            state.bitmap
        };
        // Re-deliver a cached result so a re-attached command sees it.
        if let Some(bitmap) = cached {
            self.0.notifier.notify(Some(bitmap));
        }
    }

    fn detach(&mut self) {
        let mut state = self.0.state.lock();
        state.detaches += 1;
        state.attached = false;
    }

    fn bitmap(&self) -> Option<DecodedBitmap> {
        self.0.state.lock().bitmap
    }
}

/// Fetcher that never loads anything on its own; tests resolve requests.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeFetcher {
    requests: Arc<Mutex<Vec<Arc<FakeRequestHandle>>>>,
}

impl FakeFetcher {
    pub(crate) fn requests(&self) -> Vec<Arc<FakeRequestHandle>> {
        self.requests.lock().clone()
    }

    pub(crate) fn last(&self) -> Arc<FakeRequestHandle> {
        self.requests
            .lock()
            .last()
            .cloned()
            .expect("fetcher created at least one request")
    }
}

impl BitmapFetcher for FakeFetcher {
    type Request = FakeRequest;

    fn request(&self, source: &ImageSource, notifier: BitmapReadyNotifier) -> FakeRequest {
        let handle = Arc::new(FakeRequestHandle {
            source: source.clone(),
            notifier,
            state: Mutex::new(RequestState::default()),
        });
        self.requests.lock().push(Arc::clone(&handle));
        FakeRequest(handle)
    }
}

pub(crate) fn source(uri: &str) -> ImageSource {
    ImageSource::new(uri).expect("valid test URI")
}

pub(crate) fn bitmap(id: u32, width: u32, height: u32) -> DecodedBitmap {
    DecodedBitmap {
        id: BitmapId(id),
        width,
        height,
    }
}
