use std::collections::BTreeSet;

use crate::boundary_loader::BoundaryGeometry;

use super::{
  coordinates::LngLat,
  map_event::{LayerId, MapEvent, MarkerId},
  region::{DEFAULT_CENTER, DEFAULT_ZOOM},
  surface::{
    CameraControl, Cursor, EaseTo, EventSource, FitBounds, FlyTo, LayerSpec, MarkerControl,
    MarkerSpec, OverlayControl, SourceId,
  },
};

/// A call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
  SetViewport(LngLat, f64),
  EaseTo(EaseTo),
  FlyTo(FlyTo),
  FitBounds(FitBounds),
  Resize,
  AddSource(SourceId),
  RemoveSource(SourceId),
  AddLayer(LayerSpec),
  RemoveLayer(LayerId),
  SetCursor(Cursor),
  AddMarker(MarkerId, MarkerSpec),
  RemoveMarker(MarkerId),
}

/// A rendering backend that records every call and moves its camera instantly.
#[derive(Debug)]
pub struct RecordingSurface {
  pub calls: Vec<SurfaceCall>,
  pub cursor: Cursor,
  center: LngLat,
  zoom: f64,
  next_marker: u64,
  layers: BTreeSet<LayerId>,
  markers: Vec<MarkerId>,
  pending: Vec<MapEvent>,
}

impl Default for RecordingSurface {
  fn default() -> Self {
    Self::new()
  }
}

impl RecordingSurface {
  #[must_use]
  pub fn new() -> Self {
    Self {
      calls: Vec::new(),
      cursor: Cursor::Default,
      center: DEFAULT_CENTER,
      zoom: DEFAULT_ZOOM,
      next_marker: 0,
      layers: BTreeSet::new(),
      markers: Vec::new(),
      pending: Vec::new(),
    }
  }

  /// Queues an event for the next [`EventSource::drain_events`].
  pub fn push_event(&mut self, event: MapEvent) {
    self.pending.push(event);
  }

  /// Returns and forgets the calls recorded so far.
  pub fn take_calls(&mut self) -> Vec<SurfaceCall> {
    std::mem::take(&mut self.calls)
  }

  #[must_use]
  pub fn ease_tos(&self) -> Vec<EaseTo> {
    self
      .calls
      .iter()
      .filter_map(|c| match c {
        SurfaceCall::EaseTo(e) => Some(*e),
        _ => None,
      })
      .collect()
  }

  #[must_use]
  pub fn fly_tos(&self) -> Vec<FlyTo> {
    self
      .calls
      .iter()
      .filter_map(|c| match c {
        SurfaceCall::FlyTo(f) => Some(*f),
        _ => None,
      })
      .collect()
  }

  #[must_use]
  pub fn fit_bounds_calls(&self) -> Vec<FitBounds> {
    self
      .calls
      .iter()
      .filter_map(|c| match c {
        SurfaceCall::FitBounds(f) => Some(*f),
        _ => None,
      })
      .collect()
  }

  #[must_use]
  pub fn resize_count(&self) -> usize {
    self
      .calls
      .iter()
      .filter(|c| matches!(c, SurfaceCall::Resize))
      .count()
  }

  /// Layers currently installed.
  #[must_use]
  pub fn layers(&self) -> Vec<LayerId> {
    self.layers.iter().cloned().collect()
  }

  /// Markers currently installed, in creation order.
  #[must_use]
  pub fn markers(&self) -> &[MarkerId] {
    &self.markers
  }

  #[must_use]
  pub fn marker_spec(&self, id: MarkerId) -> Option<&MarkerSpec> {
    self.calls.iter().find_map(|c| match c {
      SurfaceCall::AddMarker(m, spec) if *m == id => Some(spec),
      _ => None,
    })
  }
}

impl CameraControl for RecordingSurface {
  fn center(&self) -> LngLat {
    self.center
  }

  fn zoom(&self) -> f64 {
    self.zoom
  }

  fn set_viewport(&mut self, center: LngLat, zoom: f64) {
    self.center = center;
    self.zoom = zoom;
    self.calls.push(SurfaceCall::SetViewport(center, zoom));
  }

  fn ease_to(&mut self, motion: EaseTo) {
    self.center = motion.center;
    self.calls.push(SurfaceCall::EaseTo(motion));
  }

  fn fly_to(&mut self, motion: FlyTo) {
    self.center = motion.center;
    self.zoom = motion.zoom;
    self.calls.push(SurfaceCall::FlyTo(motion));
  }

  fn fit_bounds(&mut self, motion: FitBounds) {
    self.center = motion.bounds.center();
    self.zoom = motion.max_zoom;
    self.calls.push(SurfaceCall::FitBounds(motion));
  }

  fn resize(&mut self) {
    self.calls.push(SurfaceCall::Resize);
  }
}

impl OverlayControl for RecordingSurface {
  fn add_source(&mut self, id: SourceId, _geometry: BoundaryGeometry) {
    self.calls.push(SurfaceCall::AddSource(id));
  }

  fn remove_source(&mut self, id: &SourceId) {
    self.calls.push(SurfaceCall::RemoveSource(id.clone()));
  }

  fn add_layer(&mut self, layer: LayerSpec) {
    self.layers.insert(layer.id.clone());
    self.calls.push(SurfaceCall::AddLayer(layer));
  }

  fn remove_layer(&mut self, id: &LayerId) {
    self.layers.remove(id);
    self.calls.push(SurfaceCall::RemoveLayer(id.clone()));
  }

  fn set_cursor(&mut self, cursor: Cursor) {
    self.cursor = cursor;
    self.calls.push(SurfaceCall::SetCursor(cursor));
  }
}

impl MarkerControl for RecordingSurface {
  fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId {
    let id = MarkerId(self.next_marker);
    self.next_marker += 1;
    self.markers.push(id);
    self.calls.push(SurfaceCall::AddMarker(id, marker));
    id
  }

  fn remove_marker(&mut self, id: MarkerId) {
    self.markers.retain(|m| *m != id);
    self.calls.push(SurfaceCall::RemoveMarker(id));
  }
}

impl EventSource for RecordingSurface {
  fn drain_events(&mut self) -> Vec<MapEvent> {
    std::mem::take(&mut self.pending)
  }
}
