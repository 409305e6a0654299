/// Positions and boxes on the globe.
pub mod coordinates;
/// Events reported by the rendering backend.
pub mod map_event;
/// The regions shown on the map.
pub mod region;
/// Capabilities the widget needs from a rendering backend.
pub mod surface;

pub mod animation;
pub mod idle_pan;
pub mod overlay;
pub mod selection;
pub mod state;
pub mod timer;

/// The egui rendering backend.
pub mod regionmap_egui;
/// The root controller tying everything together.
pub mod widget;

/// A recording backend for tests.
pub mod test_utils;
