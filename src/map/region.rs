use std::{fmt::Display, str::FromStr};

use egui::Color32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::coordinates::{LngLat, LngLatBounds, PixelOffset};

/// Where the camera rests when nothing is selected.
pub const DEFAULT_CENTER: LngLat = LngLat::new(78., 21.);
pub const DEFAULT_ZOOM: f64 = 2.;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionId {
  Usa,
  Greco,
  Indo,
  Dane,
  AboutMe,
}

impl RegionId {
  #[must_use]
  pub fn name(self) -> &'static str {
    match self {
      RegionId::Usa => "USA",
      RegionId::Greco => "GRECO",
      RegionId::Indo => "INDO",
      RegionId::Dane => "DANE",
      RegionId::AboutMe => "ABOUTME",
    }
  }

  /// Text shown on the floating label.
  #[must_use]
  pub fn label(self) -> &'static str {
    match self {
      RegionId::AboutMe => "ABOUT ME",
      other => other.name(),
    }
  }

  /// Prefix for layer and source ids.
  #[must_use]
  pub fn slug(self) -> &'static str {
    match self {
      RegionId::Usa => "usa",
      RegionId::Greco => "greco",
      RegionId::Indo => "indo",
      RegionId::Dane => "dane",
      RegionId::AboutMe => "aboutme",
    }
  }

  /// The personal region is a city block, everything else spans countries.
  #[must_use]
  pub fn max_fit_zoom(self) -> f64 {
    match self {
      RegionId::AboutMe => 12.,
      _ => 6.,
    }
  }

  #[must_use]
  pub fn all() -> &'static [RegionId] {
    &[
      RegionId::Usa,
      RegionId::Greco,
      RegionId::Indo,
      RegionId::Dane,
      RegionId::AboutMe,
    ]
  }
}

impl Display for RegionId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name())
  }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown region '{0}'.")]
pub struct UnknownRegion(pub String);

impl FromStr for RegionId {
  type Err = UnknownRegion;

  fn from_str(input: &str) -> Result<Self, Self::Err> {
    let normalized: String = input
      .chars()
      .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
      .collect::<String>()
      .to_uppercase();
    RegionId::all()
      .iter()
      .copied()
      .find(|id| id.name() == normalized)
      .ok_or_else(|| UnknownRegion(input.to_string()))
  }
}

/// A highlighted area of the map together with its label.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
  pub id: RegionId,
  /// ISO 3166-1 alpha-3 codes highlighted from the country boundary dataset.
  pub countries: &'static [&'static str],
  pub center: LngLat,
  pub color: Color32,
  pub bounds: LngLatBounds,
  /// Static asset path of a dedicated boundary document.
  pub boundary_geometry: Option<&'static str>,
  pub label_offset: Option<PixelOffset>,
}

impl Region {
  #[must_use]
  pub fn has_countries(&self) -> bool {
    !self.countries.is_empty()
  }

  #[must_use]
  pub fn label_offset(&self) -> PixelOffset {
    self.label_offset.unwrap_or_default()
  }

}

static REGIONS: [Region; 5] = [
  Region {
    id: RegionId::Usa,
    countries: &["USA"],
    center: LngLat::new(-95., 37.),
    color: Color32::from_rgb(0xFF, 0x6B, 0x6B),
    bounds: LngLatBounds::new(LngLat::new(-125., 24.), LngLat::new(-66., 49.)),
    boundary_geometry: None,
    label_offset: None,
  },
  Region {
    id: RegionId::Greco,
    countries: &[
      "ITA", "GRC", "TUR", "EGY", "LBY", "ISR", "JOR", "LBN", "SYR", "IRQ",
    ],
    center: LngLat::new(30., 35.),
    color: Color32::from_rgb(0x4E, 0xCD, 0xC4),
    bounds: LngLatBounds::new(LngLat::new(10., 25.), LngLat::new(50., 45.)),
    boundary_geometry: None,
    label_offset: None,
  },
  Region {
    id: RegionId::Indo,
    countries: &[
      "IRN", "AFG", "PAK", "IND", "BGD", "NPL", "LKA", "MMR", "THA", "KHM", "VNM", "MYS", "IDN",
      "CHN", "JPN",
    ],
    center: LngLat::new(100., 25.),
    color: Color32::from_rgb(0x45, 0xB7, 0xD1),
    bounds: LngLatBounds::new(LngLat::new(44., -10.), LngLat::new(145., 50.)),
    boundary_geometry: None,
    label_offset: None,
  },
  Region {
    id: RegionId::Dane,
    countries: &[],
    center: LngLat::new(-89.4, 43.07),
    color: Color32::from_rgb(0x96, 0xCE, 0xB4),
    bounds: LngLatBounds::new(LngLat::new(-89.9, 42.8), LngLat::new(-88.9, 43.4)),
    boundary_geometry: Some("/danecounty.geojson"),
    label_offset: Some(PixelOffset::new(0., -30.)),
  },
  Region {
    id: RegionId::AboutMe,
    countries: &[],
    center: LngLat::new(-89.4008, 43.0722),
    color: Color32::from_rgb(0xFF, 0xA0, 0x7A),
    bounds: LngLatBounds::new(LngLat::new(-89.5, 43.0), LngLat::new(-89.3, 43.15)),
    boundary_geometry: None,
    label_offset: Some(PixelOffset::new(0., 30.)),
  },
];

#[must_use]
pub fn regions() -> &'static [Region] {
  &REGIONS
}

#[must_use]
pub fn region(id: RegionId) -> &'static Region {
  REGIONS
    .iter()
    .find(|r| r.id == id)
    .unwrap_or_else(|| unreachable!("every region id has a registry entry"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  #[test]
  fn every_id_is_registered_once() {
    for id in RegionId::all() {
      assert_eq!(regions().iter().filter(|r| r.id == *id).count(), 1);
      assert_eq!(region(*id).id, *id);
    }
  }

  #[test]
  fn centers_lie_within_bounds() {
    for r in regions() {
      assert!(r.bounds.contains(r.center), "{} center outside bounds", r.id);
    }
  }

  #[test]
  fn only_dane_has_a_boundary_document() {
    let with_geometry: Vec<_> = regions()
      .iter()
      .filter(|r| r.boundary_geometry.is_some())
      .map(|r| r.id)
      .collect();
    assert_eq!(with_geometry, vec![RegionId::Dane]);
  }

  #[rstest]
  #[case("USA", RegionId::Usa)]
  #[case("greco", RegionId::Greco)]
  #[case("about me", RegionId::AboutMe)]
  #[case("about_me", RegionId::AboutMe)]
  #[case("Dane", RegionId::Dane)]
  fn parse_region_names(#[case] input: &str, #[case] expected: RegionId) {
    assert_eq!(input.parse::<RegionId>(), Ok(expected));
  }

  #[test]
  fn unknown_region_name() {
    assert_eq!(
      "atlantis".parse::<RegionId>(),
      Err(UnknownRegion("atlantis".to_string()))
    );
  }

  #[rstest]
  #[case(RegionId::AboutMe, 12.)]
  #[case(RegionId::Usa, 6.)]
  #[case(RegionId::Dane, 6.)]
  fn fit_zoom_limits(#[case] id: RegionId, #[case] zoom: f64) {
    assert!((id.max_fit_zoom() - zoom).abs() < f64::EPSILON);
  }

  #[test]
  fn color_tokens() {
    assert_eq!(region(RegionId::Usa).color, Color32::from_rgb(0xFF, 0x6B, 0x6B));
    assert_eq!(region(RegionId::AboutMe).color, Color32::from_rgb(0xFF, 0xA0, 0x7A));
  }
}
