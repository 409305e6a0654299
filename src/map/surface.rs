use std::time::Duration;

use egui::Color32;

use super::{
  coordinates::{LngLat, LngLatBounds, PixelOffset},
  map_event::{LayerId, MapEvent, MarkerId},
};
use crate::boundary_loader::BoundaryGeometry;

/// Interpolation curve of a camera motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
  #[default]
  EaseOut,
  Linear,
}

impl Easing {
  /// Maps linear progress `t` in `[0, 1]` onto the curve.
  #[must_use]
  pub fn apply(self, t: f64) -> f64 {
    let t = t.clamp(0., 1.);
    match self {
      Easing::Linear => t,
      Easing::EaseOut => {
        let t = t - 1.;
        t * t * t + 1.
      }
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EaseTo {
  pub center: LngLat,
  pub duration: Duration,
  pub easing: Easing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyTo {
  pub center: LngLat,
  pub zoom: f64,
  pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBounds {
  pub bounds: LngLatBounds,
  /// Screen pixels kept free around the bounds.
  pub padding: f32,
  pub duration: Duration,
  pub max_zoom: f64,
}

/// Name of a data source registered with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId(pub String);

#[derive(Debug, Clone, PartialEq)]
pub enum LayerSource {
  /// A hosted vector tile dataset.
  Vector { url: String, source_layer: String },
  /// Geometry previously handed over with [`OverlayControl::add_source`].
  GeoJson(SourceId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
  Fill { color: Color32, opacity: f32 },
  Line { color: Color32, width: f32 },
}

/// Feature filter of a layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
  /// Keeps features whose `property` is one of `values`.
  In {
    property: String,
    values: Vec<String>,
  },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
  pub id: LayerId,
  pub source: LayerSource,
  pub paint: Paint,
  pub filter: Option<Filter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
  #[default]
  Center,
  Top,
  Bottom,
}

/// A floating label pinned to a geographic position.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
  pub position: LngLat,
  pub anchor: Anchor,
  pub offset: PixelOffset,
  pub label: String,
  pub background: Color32,
  /// Clicks on the marker are not forwarded to the map below it.
  pub stop_propagation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
  #[default]
  Default,
  Pointer,
}

/// Camera control of the rendering backend.
pub trait CameraControl {
  fn center(&self) -> LngLat;
  fn zoom(&self) -> f64;
  fn set_viewport(&mut self, center: LngLat, zoom: f64);
  fn ease_to(&mut self, motion: EaseTo);
  fn fly_to(&mut self, motion: FlyTo);
  fn fit_bounds(&mut self, motion: FitBounds);
  /// Re-reads the container size after its width changed.
  fn resize(&mut self);
}

/// Sources, layers and cursor of the rendering backend.
pub trait OverlayControl {
  fn add_source(&mut self, id: SourceId, geometry: BoundaryGeometry);
  fn remove_source(&mut self, id: &SourceId);
  fn add_layer(&mut self, layer: LayerSpec);
  fn remove_layer(&mut self, id: &LayerId);
  fn set_cursor(&mut self, cursor: Cursor);
}

pub trait MarkerControl {
  fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId;
  fn remove_marker(&mut self, id: MarkerId);
}

/// Events collected by the backend since the last call.
pub trait EventSource {
  fn drain_events(&mut self) -> Vec<MapEvent>;
}

/// Everything the widget needs from a rendering backend.
pub trait MapSurface: CameraControl + OverlayControl + MarkerControl + EventSource {}

impl<T> MapSurface for T where T: CameraControl + OverlayControl + MarkerControl + EventSource {}

#[cfg(test)]
mod tests {
  use super::*;
  use assert_approx_eq::assert_approx_eq;

  #[test]
  fn easing_end_points() {
    for easing in [Easing::Linear, Easing::EaseOut] {
      assert_approx_eq!(easing.apply(0.), 0.);
      assert_approx_eq!(easing.apply(1.), 1.);
      assert_approx_eq!(easing.apply(2.), 1.);
    }
    assert_approx_eq!(Easing::Linear.apply(0.25), 0.25);
    assert!(Easing::EaseOut.apply(0.25) > 0.25);
  }
}
