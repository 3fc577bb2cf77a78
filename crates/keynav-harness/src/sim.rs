//! Simulated document the harness drives the dispatcher against.

use std::cell::Cell;
use std::rc::Rc;

use keynav_core::dispatcher::Host;
use keynav_core::frame_scheduler::FramePacer;
use keynav_core::hint_session::{HintTarget, TargetKind, VisibleHint};
use keynav_core::scroll_axis::ScrollPort;
use serde::Serialize;

/// Something the page did in response to the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PageEvent {
    Hints { labels: Vec<String>, typed: usize },
    HintsClosed,
    Activate { target: usize },
    Focus { target: usize },
    OpenTab { destination: String },
    Blur,
    Help { visible: bool },
}

/// Scroll offset clamped to `[0, max]` the way a browser clamps `scrollTop`.
#[derive(Debug, Clone, Default)]
pub struct ClampedOffset {
    value: Rc<Cell<f64>>,
    max: Rc<Cell<f64>>,
}

impl ClampedOffset {
    pub fn get(&self) -> f64 {
        self.value.get()
    }

    pub fn set_max(&self, max: f64) {
        self.max.set(max.max(0.0));
        self.value.set(self.value.get().min(self.max.get()));
    }
}

impl ScrollPort for ClampedOffset {
    fn offset(&self) -> f64 {
        self.value.get()
    }

    fn set_offset(&mut self, offset: f64) {
        self.value.set(offset.clamp(0.0, self.max.get()));
    }
}

/// Pacer that raises a flag the virtual clock polls.
#[derive(Debug, Clone, Default)]
pub struct FrameFlag(Rc<Cell<bool>>);

impl FrameFlag {
    /// Clear the flag, returning whether a frame was requested.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }

    pub fn is_pending(&self) -> bool {
        self.0.get()
    }
}

impl FramePacer for FrameFlag {
    fn request_frame(&mut self) {
        self.0.set(true);
    }
}

/// A page with fixed extents and an ordered list of targets.
#[derive(Debug)]
pub struct SimPage {
    viewport: f64,
    document: f64,
    targets: Vec<TargetKind>,
    events: Vec<PageEvent>,
    scroll_y: ClampedOffset,
}

impl SimPage {
    pub fn new(viewport: f64, document: f64, scroll_y: ClampedOffset) -> Self {
        let page = Self {
            viewport,
            document,
            targets: Vec::new(),
            events: Vec::new(),
            scroll_y,
        };
        page.update_bounds();
        page
    }

    pub fn set_viewport(&mut self, viewport: f64) {
        self.viewport = viewport;
        self.update_bounds();
    }

    pub fn set_document(&mut self, document: f64) {
        self.document = document;
        self.update_bounds();
    }

    pub fn add_target(&mut self, kind: TargetKind) {
        self.targets.push(kind);
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, PageEvent> {
        self.events.drain(..)
    }

    fn update_bounds(&self) {
        self.scroll_y.set_max(self.document - self.viewport);
    }
}

impl Host for SimPage {
    type Target = usize;

    fn viewport_extent(&self) -> f64 {
        self.viewport
    }

    fn document_extent(&self) -> f64 {
        self.document
    }

    fn discover_targets(&mut self) -> Vec<HintTarget<usize>> {
        self.targets
            .iter()
            .enumerate()
            .map(|(index, kind)| HintTarget::new(index, kind.clone()))
            .collect()
    }

    fn activate(&mut self, target: &usize) {
        self.events.push(PageEvent::Activate { target: *target });
    }

    fn focus(&mut self, target: &usize) {
        self.events.push(PageEvent::Focus { target: *target });
    }

    fn open_in_new_context(&mut self, destination: &str) {
        self.events.push(PageEvent::OpenTab {
            destination: destination.to_string(),
        });
    }

    fn blur_editable(&mut self) {
        self.events.push(PageEvent::Blur);
    }

    fn hints_changed(&mut self, hints: &[VisibleHint<'_, usize>]) {
        self.events.push(PageEvent::Hints {
            labels: hints.iter().map(|h| h.label.to_string()).collect(),
            typed: hints.first().map_or(0, |h| h.typed),
        });
    }

    fn hints_closed(&mut self) {
        self.events.push(PageEvent::HintsClosed);
    }

    fn help_visibility_changed(&mut self, visible: bool) {
        self.events.push(PageEvent::Help { visible });
    }
}
