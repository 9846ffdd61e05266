//! The raw input surface and the normalized events exposed to UI
//! callers.

use navigation::level::NavigationLevel;

/// What a raw pointer interaction landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickTarget {
    Area { name: String },
    Point { id: String },
    Empty,
}

/// Backend-agnostic raw input, already picked against the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Click(PickTarget),
    DoubleClick(PickTarget),
    Hover(PickTarget),
    Zoom(f64),
    Resize { width: u32, height: u32 },
}

/// Events surfaced to UI callers.
///
/// All of these fire synchronously inside the single-threaded loop;
/// click events always land before their debounced hover counterpart
/// settles.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    PointClick {
        id: String,
    },
    PointHover {
        id: Option<String>,
    },
    AreaClick {
        name: String,
    },
    /// Carries the level the descent goes to.
    AreaDoubleClick {
        name: String,
        next_level: NavigationLevel,
    },
    /// Carries the ids of overlay markers inside the hovered region;
    /// `name: None` means the pointer left all regions.
    AreaHover {
        name: Option<String>,
        points_inside: Vec<String>,
    },
    ZoomChanged(f64),
}

/// Ordered queue of emitted events, drained by the UI layer.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<MapEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: MapEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[MapEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.events)
    }
}
