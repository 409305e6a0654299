use std::time::Duration;

use log::{debug, error, info};

use super::{
  idle_pan::IdlePanController,
  map_event::MapEvent,
  overlay::{InstalledOverlays, install_boundary, install_overlays},
  region::{DEFAULT_CENTER, DEFAULT_ZOOM, RegionId, region, regions},
  selection::{Completion, SelectionMachine},
  state::InteractionState,
  surface::{Cursor, MapSurface},
};
use crate::boundary_loader::{BoundaryError, BoundaryGeometry};

/// The region map widget.
///
/// Owns the rendering surface and everything driving it. Time is virtual: the host calls
/// [`RegionMap::advance`] with the time elapsed since the widget was created and feeds
/// backend events through [`RegionMap::handle_event`] or [`RegionMap::pump`].
pub struct RegionMap<S: MapSurface> {
  surface: S,
  state: InteractionState,
  idle_pan: IdlePanController,
  selection: SelectionMachine,
  overlays: InstalledOverlays,
  now: Duration,
  viewport_width: f32,
  loaded: bool,
  torn_down: bool,
  pending_boundaries: Vec<(RegionId, BoundaryGeometry)>,
}

impl<S: MapSurface> RegionMap<S> {
  pub fn new(mut surface: S, viewport_width: f32) -> Self {
    surface.set_viewport(DEFAULT_CENTER, DEFAULT_ZOOM);
    Self {
      surface,
      state: InteractionState::Idle,
      idle_pan: IdlePanController::new(),
      selection: SelectionMachine::new(),
      overlays: InstalledOverlays::default(),
      now: Duration::ZERO,
      viewport_width,
      loaded: false,
      torn_down: false,
      pending_boundaries: Vec::new(),
    }
  }

  pub fn surface(&self) -> &S {
    &self.surface
  }

  pub fn surface_mut(&mut self) -> &mut S {
    &mut self.surface
  }

  pub fn state(&self) -> InteractionState {
    self.state
  }

  pub fn panel_width(&self) -> f32 {
    self.selection.panel_width()
  }

  pub fn now(&self) -> Duration {
    self.now
  }

  pub fn is_loaded(&self) -> bool {
    self.loaded
  }

  pub fn is_guarded(&self) -> bool {
    self.selection.is_guarded()
  }

  pub fn idle_pan(&self) -> &IdlePanController {
    &self.idle_pan
  }

  pub fn overlays(&self) -> &InstalledOverlays {
    &self.overlays
  }

  /// The earliest pending timer, if any.
  pub fn next_deadline(&self) -> Option<Duration> {
    match (self.selection.next_deadline(), self.idle_pan.next_deadline()) {
      (Some(a), Some(b)) => Some(a.min(b)),
      (a, b) => a.or(b),
    }
  }

  /// Moves the clock forward to `now`, firing every timer due on the way in deadline order.
  ///
  /// On equal deadlines the selection sequence goes first.
  pub fn advance(&mut self, now: Duration) {
    if now < self.now {
      debug!("Ignoring clock going backwards from {:?} to {now:?}.", self.now);
      return;
    }
    loop {
      let selection = self.selection.next_deadline().filter(|at| *at <= now);
      let idle = self.idle_pan.next_deadline().filter(|at| *at <= now);
      match (selection, idle) {
        (Some(s), Some(i)) if i < s => self.fire_idle_pan(i),
        (Some(s), _) => self.fire_selection(s),
        (None, Some(i)) => self.fire_idle_pan(i),
        (None, None) => break,
      }
    }
    self.now = now;
  }

  fn fire_selection(&mut self, at: Duration) {
    self.now = at;
    match self.selection.fire(at, &mut self.state, &mut self.surface) {
      Some(Completion::Opened(region)) => info!("Showing {region}."),
      Some(Completion::Closed) => {
        debug!("Selection closed, restarting the idle countdown.");
        self.idle_pan.rearm_idle(at, &mut self.state);
      }
      None => {}
    }
  }

  fn fire_idle_pan(&mut self, at: Duration) {
    self.now = at;
    self.idle_pan.fire(at, &mut self.state, &mut self.surface);
  }

  /// Handles all events the surface collected since the last call and returns their number.
  pub fn pump(&mut self) -> usize {
    let events = self.surface.drain_events();
    let count = events.len();
    for event in events {
      self.handle_event(event);
    }
    count
  }

  pub fn handle_event(&mut self, event: MapEvent) {
    if self.torn_down {
      return;
    }
    if event.is_user_interaction() {
      self.idle_pan.notify_user_interaction(&mut self.state);
      return;
    }
    match event {
      MapEvent::Load => self.on_load(),
      MapEvent::Idle => self.idle_pan.notify_map_idle(self.now, &mut self.state),
      MapEvent::Click(layer) => {
        if let Some(region) = self.overlays.region_for_layer(&layer) {
          self.select(region);
        }
      }
      MapEvent::MarkerClick(marker) => {
        if let Some(region) = self.overlays.region_for_marker(marker) {
          self.select(region);
        }
      }
      MapEvent::MouseEnter(layer) => {
        if self.overlays.region_for_layer(&layer).is_some() {
          self.surface.set_cursor(Cursor::Pointer);
        }
      }
      MapEvent::MouseLeave(layer) => {
        if self.overlays.region_for_layer(&layer).is_some() {
          self.surface.set_cursor(Cursor::Default);
        }
      }
      // Interactions are handled above.
      MapEvent::DragStart
      | MapEvent::ZoomStart
      | MapEvent::PitchStart
      | MapEvent::RotateStart
      | MapEvent::MouseDown
      | MapEvent::TouchStart => {}
    }
  }

  fn on_load(&mut self) {
    if self.loaded {
      debug!("Map loaded again, overlays are already installed.");
      return;
    }
    self.loaded = true;
    self.overlays = install_overlays(&mut self.surface, regions());
    for (id, geometry) in std::mem::take(&mut self.pending_boundaries) {
      install_boundary(&mut self.surface, &mut self.overlays, region(id), geometry);
    }
  }

  /// Opens the side panel for `region`. Returns `false` if the request was dropped.
  pub fn select(&mut self, region: RegionId) -> bool {
    if self.torn_down {
      return false;
    }
    if self.selection.is_guarded() {
      debug!("Dropping selection of {region}, {} in progress.", self.state);
      return false;
    }
    self.idle_pan.stop(&mut self.state);
    self
      .selection
      .open(region, self.now, self.viewport_width, &mut self.state)
  }

  /// Closes the side panel. Returns `false` if the request was dropped.
  pub fn close(&mut self) -> bool {
    if self.torn_down {
      return false;
    }
    self
      .selection
      .close(self.now, &mut self.state, &mut self.surface)
  }

  /// A modal popup covering the map opened or closed.
  pub fn set_popup_open(&mut self, open: bool) {
    if open {
      self.idle_pan.suspend(&mut self.state);
    } else {
      self.idle_pan.resume(self.now, &mut self.state);
    }
  }

  /// Width of the widget container, read when a panel animation starts.
  pub fn set_viewport_width(&mut self, width: f32) {
    self.viewport_width = width;
  }

  /// Hands over the result of fetching the boundary document of `region`.
  ///
  /// A failed fetch only loses that region's boundary overlay.
  pub fn provide_boundary(
    &mut self,
    id: RegionId,
    geometry: Result<BoundaryGeometry, BoundaryError>,
  ) {
    match geometry {
      Err(e) => error!("Boundary of {id} not available, leaving it out: {e}"),
      Ok(_) if self.torn_down => {}
      Ok(geometry) if self.loaded => {
        install_boundary(&mut self.surface, &mut self.overlays, region(id), geometry);
      }
      Ok(geometry) => self.pending_boundaries.push((id, geometry)),
    }
  }

  /// Cancels all timers, then removes markers and overlays from the surface.
  pub fn teardown(&mut self) {
    if self.torn_down {
      return;
    }
    self.idle_pan.stop(&mut self.state);
    self.selection.cancel();
    self.overlays.remove_all(&mut self.surface);
    self.pending_boundaries.clear();
    self.torn_down = true;
    info!("Region map torn down.");
  }
}
