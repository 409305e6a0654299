use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Identifies a layer registered with the rendering backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub String);

impl LayerId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  #[must_use]
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Display for LayerId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

/// Handle of a placed marker, handed out by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub u64);

/// Everything the rendering backend reports back to the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapEvent {
  /// Style and sources are ready, overlays can be installed.
  Load,
  /// All camera motion and tile loading has settled.
  Idle,
  DragStart,
  ZoomStart,
  PitchStart,
  RotateStart,
  MouseDown,
  TouchStart,
  Click(LayerId),
  MouseEnter(LayerId),
  MouseLeave(LayerId),
  /// A click on a marker element. Does not reach the map itself.
  MarkerClick(MarkerId),
}

impl MapEvent {
  /// Events caused by the user grabbing the map, which interrupt autonomous panning.
  #[must_use]
  pub fn is_user_interaction(&self) -> bool {
    matches!(
      self,
      MapEvent::DragStart
        | MapEvent::ZoomStart
        | MapEvent::PitchStart
        | MapEvent::RotateStart
        | MapEvent::MouseDown
        | MapEvent::TouchStart
    )
  }
}
