use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Latitude limit of the Web Mercator projection.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// A WGS84 position, longitude first as the rendering backends expect it.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct LngLat {
  pub lng: f64,
  pub lat: f64,
}

impl LngLat {
  #[must_use]
  pub const fn new(lng: f64, lat: f64) -> Self {
    Self { lng, lat }
  }

  /// Same latitude, longitude shifted by `degrees`.
  #[must_use]
  pub fn shifted_lng(self, degrees: f64) -> Self {
    Self {
      lng: self.lng + degrees,
      lat: self.lat,
    }
  }

  /// Projects onto the unit Web Mercator square, x to the east and y to the south.
  #[must_use]
  pub fn to_mercator(self) -> (f64, f64) {
    let lat = self.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (self.lng + 180.) / 360.;
    let y = (1. - (lat.tan() + 1. / lat.cos()).ln() / PI) / 2.;
    (x, y)
  }

  #[must_use]
  pub fn from_mercator(x: f64, y: f64) -> Self {
    Self {
      lng: x * 360. - 180.,
      lat: f64::atan(f64::sinh(PI - y * 2. * PI)).to_degrees(),
    }
  }
}

/// South-west and north-east corner of a geographic box.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct LngLatBounds {
  pub sw: LngLat,
  pub ne: LngLat,
}

impl LngLatBounds {
  #[must_use]
  pub const fn new(sw: LngLat, ne: LngLat) -> Self {
    Self { sw, ne }
  }

  #[must_use]
  pub fn center(&self) -> LngLat {
    LngLat {
      lng: (self.sw.lng + self.ne.lng) / 2.,
      lat: (self.sw.lat + self.ne.lat) / 2.,
    }
  }

  #[must_use]
  pub fn contains(&self, p: LngLat) -> bool {
    (self.sw.lng..=self.ne.lng).contains(&p.lng) && (self.sw.lat..=self.ne.lat).contains(&p.lat)
  }

  /// Extent on the unit Mercator square as `(width, height)`.
  #[must_use]
  pub fn mercator_extent(&self) -> (f64, f64) {
    let (x0, y0) = self.sw.to_mercator();
    let (x1, y1) = self.ne.to_mercator();
    ((x1 - x0).abs(), (y1 - y0).abs())
  }
}

/// Screen-space displacement of a marker from its anchor, y pointing down.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct PixelOffset {
  pub dx: f32,
  pub dy: f32,
}

impl PixelOffset {
  #[must_use]
  pub const fn new(dx: f32, dy: f32) -> Self {
    Self { dx, dy }
  }
}
