// Copyright 2025 the Flat Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Load-lifecycle events routed to the element that owns an image command.

use std::fmt;
use std::sync::Arc;

/// Progress of an image load, as seen by the owning element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageLoadEvent {
    /// A fetch started for the current source.
    LoadStart,
    /// The bitmap resolved.
    Load {
        /// Width of the decoded bitmap in pixels.
        width: u32,
        /// Height of the decoded bitmap in pixels.
        height: u32,
    },
    /// The fetch failed.
    Error,
    /// The fetch finished, successfully or not.
    LoadEnd,
}

/// Receiver for [`ImageLoadEvent`]s.
pub trait ImageEventSink: Send + Sync {
    /// Deliver `event` to the element identified by `element_id`.
    ///
    /// `element_id` is never `0`.
    fn dispatch(&self, element_id: u32, event: ImageLoadEvent);
}

/// Routes events for one command to its element.
///
/// Events are dropped while the element id is `0` or no sink is installed.
#[derive(Clone, Default)]
pub struct EventRoute {
    element_id: u32,
    sink: Option<Arc<dyn ImageEventSink>>,
}

impl EventRoute {
    /// Element id events are routed to; `0` disables routing.
    pub fn element_id(&self) -> u32 {
        self.element_id
    }

    /// Change the element id.
    pub fn set_element_id(&mut self, element_id: u32) {
        self.element_id = element_id;
    }

    /// Install or remove the sink.
    pub fn set_sink(&mut self, sink: Option<Arc<dyn ImageEventSink>>) {
        self.sink = sink;
    }

    /// Send `event` if routing is enabled. Returns `true` if it was delivered.
    pub fn emit(&self, event: ImageLoadEvent) -> bool {
        if self.element_id == 0 {
            return false;
        }
        let Some(sink) = &self.sink else {
            return false;
        };
        sink.dispatch(self.element_id, event);
        true
    }
}

impl fmt::Debug for EventRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRoute")
            .field("element_id", &self.element_id)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(u32, ImageLoadEvent)>>);

    impl ImageEventSink for Recorder {
        fn dispatch(&self, element_id: u32, event: ImageLoadEvent) {
            self.0.lock().push((element_id, event));
        }
    }

    #[test]
    fn zero_element_id_drops_events() {
        let recorder = Arc::new(Recorder::default());
        let mut route = EventRoute::default();
        route.set_sink(Some(recorder.clone()));

        assert!(!route.emit(ImageLoadEvent::LoadStart));
        assert!(recorder.0.lock().is_empty());
    }

    #[test]
    fn missing_sink_drops_events() {
        let mut route = EventRoute::default();
        route.set_element_id(12);
        assert!(!route.emit(ImageLoadEvent::LoadEnd));
    }

    #[test]
    fn events_are_keyed_by_element_id() {
        let recorder = Arc::new(Recorder::default());
        let mut route = EventRoute::default();
        route.set_sink(Some(recorder.clone()));
        route.set_element_id(7);

        assert!(route.emit(ImageLoadEvent::Load {
            width: 3,
            height: 4
        }));
        route.set_element_id(9);
        assert!(route.emit(ImageLoadEvent::LoadEnd));

        assert_eq!(
            *recorder.0.lock(),
            vec![
                (
                    7,
                    ImageLoadEvent::Load {
                        width: 3,
                        height: 4
                    }
                ),
                (9, ImageLoadEvent::LoadEnd),
            ]
        );
    }
}
