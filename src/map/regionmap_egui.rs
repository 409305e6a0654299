use std::{collections::HashMap, time::Duration};

use egui::{
  Align2, Color32, CursorIcon, FontId, Painter, PointerButton, Pos2, Rect, Response, Sense, Shape,
  Stroke, Ui, Widget, pos2, vec2,
};
use geo_types::{LineString, Polygon};
use log::{debug, trace};

use super::{
  coordinates::{LngLat, LngLatBounds},
  map_event::{LayerId, MapEvent, MarkerId},
  region::{DEFAULT_CENTER, DEFAULT_ZOOM},
  surface::{
    Anchor, CameraControl, Cursor, EaseTo, Easing, EventSource, FitBounds, FlyTo, LayerSource,
    LayerSpec, MarkerControl, MarkerSpec, OverlayControl, Paint, SourceId,
  },
};
use crate::boundary_loader::BoundaryGeometry;

/// Edge length of the whole world in pixels at zoom 0.
const TILE_SIZE: f64 = 512.;
const MIN_ZOOM: f64 = 0.;
const MAX_ZOOM: f64 = 18.;
/// Zoom change per scrolled point.
const SCROLL_ZOOM: f64 = 1. / 200.;
const GRATICULE_STEP: usize = 30;

const BACKGROUND: Color32 = Color32::from_rgb(0x1B, 0x1F, 0x2A);
const GRATICULE: Color32 = Color32::from_rgb(0x2C, 0x33, 0x44);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Camera {
  center: LngLat,
  zoom: f64,
}

impl Camera {
  fn world_size(&self) -> f64 {
    TILE_SIZE * 2f64.powf(self.zoom)
  }

  #[allow(clippy::cast_possible_truncation)]
  fn project(&self, p: LngLat, rect: Rect) -> Pos2 {
    let (cx, cy) = self.center.to_mercator();
    let (x, y) = p.to_mercator();
    // Wraps around the antimeridian.
    let mut dx = x - cx;
    dx -= dx.round();
    let size = self.world_size();
    rect.center() + vec2((dx * size) as f32, ((y - cy) * size) as f32)
  }

  fn unproject(&self, pos: Pos2, rect: Rect) -> LngLat {
    let (cx, cy) = self.center.to_mercator();
    let size = self.world_size();
    let offset = pos - rect.center();
    let p = LngLat::from_mercator(
      cx + f64::from(offset.x) / size,
      cy + f64::from(offset.y) / size,
    );
    LngLat::new((p.lng + 180.).rem_euclid(360.) - 180., p.lat)
  }

  /// Linear in longitude, Mercator y and zoom.
  fn interpolate(from: Camera, to: Camera, t: f64) -> Camera {
    let (_, y0) = from.center.to_mercator();
    let (_, y1) = to.center.to_mercator();
    let lat = LngLat::from_mercator(0., y0 + (y1 - y0) * t).lat;
    Camera {
      center: LngLat::new(from.center.lng + (to.center.lng - from.center.lng) * t, lat),
      zoom: from.zoom + (to.zoom - from.zoom) * t,
    }
  }
}

#[derive(Debug, Clone, Copy)]
struct CameraMotion {
  from: Camera,
  to: Camera,
  start: Duration,
  duration: Duration,
  easing: Easing,
}

impl CameraMotion {
  fn at(&self, now: Duration) -> Camera {
    let elapsed = now.saturating_sub(self.start).as_secs_f64();
    let t = if self.duration.is_zero() {
      1.
    } else {
      elapsed / self.duration.as_secs_f64()
    };
    Camera::interpolate(self.from, self.to, self.easing.apply(t))
  }

  fn is_done(&self, now: Duration) -> bool {
    now >= self.start + self.duration
  }
}

/// A map rendering backend drawing with egui.
///
/// Boundary layers are drawn as polygons, labels as colored pills. Layers on the hosted
/// vector dataset are accepted but not drawn since no tile data is available here.
pub struct EguiMapSurface {
  camera: Camera,
  motion: Option<CameraMotion>,
  clock: Duration,
  rect: Rect,
  style_url: String,
  access_token: String,
  sources: HashMap<SourceId, BoundaryGeometry>,
  layers: Vec<LayerSpec>,
  markers: Vec<(MarkerId, MarkerSpec)>,
  marker_rects: Vec<(MarkerId, Rect)>,
  next_marker: u64,
  cursor: Cursor,
  hovered: Option<LayerId>,
  events: Vec<MapEvent>,
  loaded: bool,
  settled: bool,
}

impl EguiMapSurface {
  #[must_use]
  pub fn new(style_url: impl Into<String>, access_token: impl Into<String>) -> Self {
    Self {
      camera: Camera {
        center: DEFAULT_CENTER,
        zoom: DEFAULT_ZOOM,
      },
      motion: None,
      clock: Duration::ZERO,
      rect: Rect::NOTHING,
      style_url: style_url.into(),
      access_token: access_token.into(),
      sources: HashMap::new(),
      layers: Vec::new(),
      markers: Vec::new(),
      marker_rects: Vec::new(),
      next_marker: 0,
      cursor: Cursor::Default,
      hovered: None,
      events: Vec::new(),
      loaded: false,
      settled: false,
    }
  }

  /// Moves running camera motions forward to `now`.
  pub fn set_clock(&mut self, now: Duration) {
    self.clock = now;
    if let Some(motion) = self.motion
      && motion.is_done(now)
    {
      self.camera = motion.to;
      self.camera.center.lng = wrap_lng_near(self.camera.center.lng, 0.);
      self.motion = None;
    }
  }

  /// The style resource as requested from the styles API, authorized with the access token.
  #[must_use]
  pub fn style_request_url(&self) -> String {
    match self.style_url.strip_prefix("mapbox://styles/") {
      Some(style) => format!(
        "https://api.mapbox.com/styles/v1/{style}?access_token={}",
        self.access_token
      ),
      None => {
        let separator = if self.style_url.contains('?') { '&' } else { '?' };
        format!("{}{separator}access_token={}", self.style_url, self.access_token)
      }
    }
  }

  #[must_use]
  pub fn is_moving(&self) -> bool {
    self.motion.is_some()
  }

  #[must_use]
  pub fn layer_ids(&self) -> Vec<LayerId> {
    self.layers.iter().map(|l| l.id.clone()).collect()
  }

  #[must_use]
  pub fn marker_labels(&self) -> Vec<&str> {
    self.markers.iter().map(|(_, m)| m.label.as_str()).collect()
  }

  fn current(&self) -> Camera {
    self
      .motion
      .map_or(self.camera, |motion| motion.at(self.clock))
  }

  fn start_motion(&mut self, to: Camera, duration: Duration, easing: Easing) {
    let mut from = self.current();
    // Take the short way around the globe.
    from.center.lng = wrap_lng_near(from.center.lng, to.center.lng);
    self.motion = Some(CameraMotion {
      from,
      to,
      start: self.clock,
      duration,
      easing,
    });
    self.settled = false;
  }

  /// Stops a running motion where it is, e.g. when the user grabs the map.
  fn interrupt_motion(&mut self) {
    self.camera = self.current();
    self.motion = None;
    self.settled = false;
  }

  fn fit_zoom(&self, bounds: &LngLatBounds, padding: f32, max_zoom: f64) -> f64 {
    let (w, h) = bounds.mercator_extent();
    let width = f64::from((self.rect.width() - 2. * padding).max(1.));
    let height = f64::from((self.rect.height() - 2. * padding).max(1.));
    if !self.rect.is_positive() || w <= 0. || h <= 0. {
      return max_zoom;
    }
    let scale = (width / (w * TILE_SIZE)).min(height / (h * TILE_SIZE));
    scale.log2().clamp(MIN_ZOOM, max_zoom)
  }

  /// The topmost drawable layer under `pos`.
  fn layer_at(&self, pos: Pos2) -> Option<LayerId> {
    let camera = self.current();
    let p = camera.unproject(pos, self.rect);
    self
      .layers
      .iter()
      .rev()
      .find(|layer| match &layer.source {
        LayerSource::GeoJson(source) => self
          .sources
          .get(source)
          .is_some_and(|geometry| geometry.0.iter().any(|polygon| polygon_contains(polygon, p))),
        LayerSource::Vector { .. } => false,
      })
      .map(|layer| layer.id.clone())
  }

  fn marker_at(&self, pos: Pos2) -> Option<MarkerId> {
    self
      .marker_rects
      .iter()
      .rev()
      .find_map(|(id, rect)| rect.contains(pos).then_some(*id))
  }

  fn handle_input(&mut self, ui: &Ui, response: &Response) {
    let pointer = response.hover_pos();
    let marker = pointer.and_then(|p| self.marker_at(p));

    if response.clicked() {
      match marker {
        Some(marker) => self.events.push(MapEvent::MarkerClick(marker)),
        None => {
          if let Some(layer) = pointer.and_then(|p| self.layer_at(p)) {
            self.events.push(MapEvent::Click(layer));
          }
        }
      }
    }

    if marker.is_none() && response.hovered() && ui.input(|i| i.pointer.any_pressed()) {
      self.events.push(MapEvent::MouseDown);
      self.settled = false;
    }
    let touched = ui.input(|i| {
      i.events.iter().any(|e| {
        matches!(
          e,
          egui::Event::Touch {
            phase: egui::TouchPhase::Start,
            ..
          }
        )
      })
    });
    if touched && response.hovered() {
      self.events.push(MapEvent::TouchStart);
      self.settled = false;
    }

    if marker.is_none() && response.drag_started_by(PointerButton::Primary) {
      self.events.push(MapEvent::DragStart);
    }
    if response.dragged_by(PointerButton::Primary) {
      self.interrupt_motion();
      let center = self
        .camera
        .unproject(self.rect.center() - response.drag_delta(), self.rect);
      self.camera.center = center;
    }

    let scroll = ui.input(|i| i.smooth_scroll_delta.y);
    if response.hovered() && scroll != 0. {
      self.events.push(MapEvent::ZoomStart);
      self.interrupt_motion();
      self.camera.zoom =
        (self.camera.zoom + f64::from(scroll) * SCROLL_ZOOM).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    let hovered = match (marker, pointer) {
      (None, Some(p)) => self.layer_at(p),
      _ => None,
    };
    if hovered != self.hovered {
      if let Some(left) = self.hovered.take() {
        self.events.push(MapEvent::MouseLeave(left));
      }
      if let Some(entered) = hovered.clone() {
        self.events.push(MapEvent::MouseEnter(entered));
      }
      self.hovered = hovered;
    }

    if marker.is_some() || (self.cursor == Cursor::Pointer && response.hovered()) {
      ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
    }
  }

  fn draw(&mut self, painter: &Painter) {
    let rect = self.rect;
    let camera = self.current();
    painter.rect_filled(rect, 0., BACKGROUND);
    draw_graticule(painter, &camera, rect);

    for layer in &self.layers {
      let LayerSource::GeoJson(source) = &layer.source else {
        continue;
      };
      let Some(geometry) = self.sources.get(source) else {
        trace!("Layer {} has no source {}.", layer.id, source.0);
        continue;
      };
      for polygon in &geometry.0 {
        let points = ring_points(polygon.exterior(), &camera, rect);
        match layer.paint {
          Paint::Fill { color, opacity } => {
            painter.add(Shape::convex_polygon(
              points,
              with_opacity(color, opacity),
              Stroke::NONE,
            ));
          }
          Paint::Line { color, width } => {
            painter.add(Shape::closed_line(points, Stroke::new(width, color)));
          }
        }
      }
    }

    self.marker_rects.clear();
    for (id, marker) in &self.markers {
      let galley = painter.layout_no_wrap(marker.label.clone(), FontId::proportional(13.), Color32::WHITE);
      let size = galley.size() + vec2(16., 8.);
      let anchor = camera.project(marker.position, rect) + vec2(marker.offset.dx, marker.offset.dy);
      let pill = match marker.anchor {
        Anchor::Center => Rect::from_center_size(anchor, size),
        Anchor::Top => Rect::from_min_size(anchor - vec2(size.x / 2., 0.), size),
        Anchor::Bottom => Rect::from_min_size(anchor - vec2(size.x / 2., size.y), size),
      };
      painter.rect_filled(pill, 4., marker.background);
      painter.galley(pill.min + vec2(8., 4.), galley, Color32::WHITE);
      self.marker_rects.push((*id, pill));
    }

    painter.text(
      rect.right_bottom() - vec2(4., 4.),
      Align2::RIGHT_BOTTOM,
      &self.style_url,
      FontId::proportional(10.),
      Color32::GRAY,
    );
  }

  fn report_idle(&mut self, response: &Response) {
    if self.motion.is_some() || response.dragged() || response.is_pointer_button_down_on() {
      self.settled = false;
    } else if self.loaded && !self.settled {
      self.settled = true;
      self.events.push(MapEvent::Idle);
    }
  }
}

impl Widget for &mut EguiMapSurface {
  fn ui(self, ui: &mut Ui) -> Response {
    let size = ui.available_size();
    let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
    self.rect = rect;

    if !self.loaded {
      debug!("Map surface ready, style {}.", self.style_url);
      self.loaded = true;
      self.events.push(MapEvent::Load);
    }

    self.handle_input(ui, &response);
    if ui.is_rect_visible(rect) {
      let painter = ui.painter_at(rect);
      self.draw(&painter);
    }
    self.report_idle(&response);
    response
  }
}

impl CameraControl for EguiMapSurface {
  fn center(&self) -> LngLat {
    self.current().center
  }

  fn zoom(&self) -> f64 {
    self.current().zoom
  }

  fn set_viewport(&mut self, center: LngLat, zoom: f64) {
    self.motion = None;
    self.camera = Camera { center, zoom };
    self.settled = false;
  }

  fn ease_to(&mut self, motion: EaseTo) {
    let zoom = self.current().zoom;
    self.start_motion(
      Camera {
        center: motion.center,
        zoom,
      },
      motion.duration,
      motion.easing,
    );
  }

  fn fly_to(&mut self, motion: FlyTo) {
    self.start_motion(
      Camera {
        center: motion.center,
        zoom: motion.zoom,
      },
      motion.duration,
      Easing::EaseOut,
    );
  }

  fn fit_bounds(&mut self, motion: FitBounds) {
    let (x0, y0) = motion.bounds.sw.to_mercator();
    let (x1, y1) = motion.bounds.ne.to_mercator();
    let center = LngLat::from_mercator(f64::midpoint(x0, x1), f64::midpoint(y0, y1));
    let zoom = self.fit_zoom(&motion.bounds, motion.padding, motion.max_zoom);
    self.start_motion(Camera { center, zoom }, motion.duration, Easing::EaseOut);
  }

  fn resize(&mut self) {
    // The drawing area is read every frame.
    trace!("Resize requested, map area is {:?}.", self.rect);
  }
}

impl OverlayControl for EguiMapSurface {
  fn add_source(&mut self, id: SourceId, geometry: BoundaryGeometry) {
    self.sources.insert(id, geometry);
  }

  fn remove_source(&mut self, id: &SourceId) {
    self.sources.remove(id);
  }

  fn add_layer(&mut self, layer: LayerSpec) {
    if let LayerSource::Vector { url, .. } = &layer.source {
      debug!("Layer {} uses {url}, which is not drawn here.", layer.id);
    }
    self.layers.retain(|l| l.id != layer.id);
    self.layers.push(layer);
  }

  fn remove_layer(&mut self, id: &LayerId) {
    self.layers.retain(|l| l.id != *id);
    if self.hovered.as_ref() == Some(id) {
      self.hovered = None;
    }
  }

  fn set_cursor(&mut self, cursor: Cursor) {
    self.cursor = cursor;
  }
}

impl MarkerControl for EguiMapSurface {
  fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId {
    let id = MarkerId(self.next_marker);
    self.next_marker += 1;
    self.markers.push((id, marker));
    id
  }

  fn remove_marker(&mut self, id: MarkerId) {
    self.markers.retain(|(m, _)| *m != id);
    self.marker_rects.retain(|(m, _)| *m != id);
  }
}

impl EventSource for EguiMapSurface {
  fn drain_events(&mut self) -> Vec<MapEvent> {
    std::mem::take(&mut self.events)
  }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn with_opacity(color: Color32, opacity: f32) -> Color32 {
  let alpha = (opacity.clamp(0., 1.) * 255.).round() as u8;
  Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

fn ring_points(ring: &LineString<f64>, camera: &Camera, rect: Rect) -> Vec<Pos2> {
  ring
    .0
    .iter()
    .map(|c| camera.project(LngLat::new(c.x, c.y), rect))
    .collect()
}

#[allow(clippy::cast_precision_loss)]
fn draw_graticule(painter: &Painter, camera: &Camera, rect: Rect) {
  let stroke = Stroke::new(1., GRATICULE);
  for lng in (0..360).step_by(GRATICULE_STEP) {
    let lng = lng as f64 - 180.;
    let top = camera.project(LngLat::new(lng, 80.), rect);
    let bottom = camera.project(LngLat::new(lng, -80.), rect);
    painter.line_segment([top, bottom], stroke);
  }
  for lat in (0..=120).step_by(GRATICULE_STEP) {
    let y = camera.project(LngLat::new(camera.center.lng, lat as f64 - 60.), rect).y;
    painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
  }
}

/// `lng` shifted by whole turns to lie within 180 degrees of `reference`.
fn wrap_lng_near(lng: f64, reference: f64) -> f64 {
  reference + (lng - reference + 180.).rem_euclid(360.) - 180.
}

/// Even-odd test against the exterior ring minus the holes.
fn polygon_contains(polygon: &Polygon<f64>, p: LngLat) -> bool {
  ring_contains(polygon.exterior(), p) && !polygon.interiors().iter().any(|r| ring_contains(r, p))
}

fn ring_contains(ring: &LineString<f64>, p: LngLat) -> bool {
  let mut inside = false;
  for line in ring.lines() {
    let (a, b) = (line.start, line.end);
    if (a.y > p.lat) != (b.y > p.lat) && p.lng < (b.x - a.x) * (p.lat - a.y) / (b.y - a.y) + a.x {
      inside = !inside;
    }
  }
  inside
}
