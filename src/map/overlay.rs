use std::collections::BTreeMap;

use log::{debug, info};

use super::{
  map_event::{LayerId, MarkerId},
  region::{Region, RegionId},
  surface::{
    Anchor, Filter, LayerSource, LayerSpec, MarkerControl, MarkerSpec, OverlayControl, Paint,
    SourceId,
  },
};
use crate::boundary_loader::BoundaryGeometry;

/// Hosted vector dataset with one feature per country.
pub const COUNTRY_BOUNDARIES_URL: &str = "mapbox://mapbox.country-boundaries-v1";
pub const COUNTRY_BOUNDARIES_LAYER: &str = "country_boundaries";
pub const COUNTRY_CODE_PROPERTY: &str = "iso_3166_1_alpha_3";

const COUNTRY_FILL_OPACITY: f32 = 0.4;
const BOUNDARY_FILL_OPACITY: f32 = 0.5;
const OUTLINE_WIDTH: f32 = 2.;

/// Layers, sources and markers put onto the map, each mapped to the region it selects.
#[derive(Debug, Default)]
pub struct InstalledOverlays {
  layers: BTreeMap<LayerId, RegionId>,
  sources: Vec<SourceId>,
  markers: Vec<(MarkerId, RegionId)>,
}

impl InstalledOverlays {
  #[must_use]
  pub fn region_for_layer(&self, id: &LayerId) -> Option<RegionId> {
    self.layers.get(id).copied()
  }

  #[must_use]
  pub fn region_for_marker(&self, id: MarkerId) -> Option<RegionId> {
    self
      .markers
      .iter()
      .find_map(|(marker, region)| (*marker == id).then_some(*region))
  }

  #[must_use]
  pub fn marker_count(&self) -> usize {
    self.markers.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.layers.is_empty() && self.markers.is_empty() && self.sources.is_empty()
  }

  /// Takes everything off the map again, markers first.
  pub fn remove_all(&mut self, surface: &mut (impl OverlayControl + MarkerControl)) {
    for (marker, _) in self.markers.drain(..) {
      surface.remove_marker(marker);
    }
    for layer in std::mem::take(&mut self.layers).into_keys() {
      surface.remove_layer(&layer);
    }
    for source in self.sources.drain(..) {
      surface.remove_source(&source);
    }
  }

  fn add_layer(&mut self, surface: &mut impl OverlayControl, layer: LayerSpec, region: RegionId) {
    debug!("Adding layer {} for {region}", layer.id);
    self.layers.insert(layer.id.clone(), region);
    surface.add_layer(layer);
  }
}

/// Installs the country highlights and the floating labels of all `regions`.
///
/// Regions with a boundary document get their layers from [`install_boundary`] once the
/// document has been fetched.
pub fn install_overlays(
  surface: &mut (impl OverlayControl + MarkerControl),
  regions: &[Region],
) -> InstalledOverlays {
  let mut overlays = InstalledOverlays::default();
  for region in regions.iter().filter(|r| r.has_countries()) {
    install_country_layers(surface, &mut overlays, region);
  }
  for region in regions {
    install_label(surface, &mut overlays, region);
  }
  info!(
    "Installed {} layers and {} labels.",
    overlays.layers.len(),
    overlays.markers.len()
  );
  overlays
}

/// Installs fill and outline layers drawn from a fetched boundary document.
pub fn install_boundary(
  surface: &mut impl OverlayControl,
  overlays: &mut InstalledOverlays,
  region: &Region,
  geometry: BoundaryGeometry,
) {
  let source = SourceId(format!("{}-boundary", region.id.slug()));
  if overlays.sources.contains(&source) {
    debug!("Boundary of {} already installed.", region.id);
    return;
  }
  surface.add_source(source.clone(), geometry);
  overlays.sources.push(source.clone());

  let fill = LayerSpec {
    id: LayerId::new(format!("{}-boundary-fill", region.id.slug())),
    source: LayerSource::GeoJson(source.clone()),
    paint: Paint::Fill {
      color: region.color,
      opacity: BOUNDARY_FILL_OPACITY,
    },
    filter: None,
  };
  let outline = LayerSpec {
    id: LayerId::new(format!("{}-boundary-outline", region.id.slug())),
    source: LayerSource::GeoJson(source),
    paint: Paint::Line {
      color: region.color,
      width: OUTLINE_WIDTH,
    },
    filter: None,
  };
  overlays.add_layer(surface, fill, region.id);
  overlays.add_layer(surface, outline, region.id);
}

fn install_country_layers(
  surface: &mut impl OverlayControl,
  overlays: &mut InstalledOverlays,
  region: &Region,
) {
  let source = || LayerSource::Vector {
    url: COUNTRY_BOUNDARIES_URL.to_string(),
    source_layer: COUNTRY_BOUNDARIES_LAYER.to_string(),
  };
  let filter = || {
    Some(Filter::In {
      property: COUNTRY_CODE_PROPERTY.to_string(),
      values: region.countries.iter().map(ToString::to_string).collect(),
    })
  };

  let fill = LayerSpec {
    id: LayerId::new(format!("{}-countries", region.id.slug())),
    source: source(),
    paint: Paint::Fill {
      color: region.color,
      opacity: COUNTRY_FILL_OPACITY,
    },
    filter: filter(),
  };
  let outline = LayerSpec {
    id: LayerId::new(format!("{}-countries-outline", region.id.slug())),
    source: source(),
    paint: Paint::Line {
      color: region.color,
      width: OUTLINE_WIDTH,
    },
    filter: filter(),
  };
  overlays.add_layer(surface, fill, region.id);
  overlays.add_layer(surface, outline, region.id);
}

fn install_label(surface: &mut impl MarkerControl, overlays: &mut InstalledOverlays, region: &Region) {
  let marker = surface.add_marker(MarkerSpec {
    position: region.center,
    anchor: Anchor::Center,
    offset: region.label_offset(),
    label: region.id.label().to_string(),
    background: region.color,
    stop_propagation: true,
  });
  overlays.markers.push((marker, region.id));
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    boundary_loader::parse_boundary,
    map::{
      coordinates::PixelOffset,
      region::{region, regions},
      test_utils::{RecordingSurface, SurfaceCall},
    },
  };

  fn square() -> BoundaryGeometry {
    parse_boundary(
      br#"{"type": "Polygon", "coordinates": [[[-89.8, 42.8], [-89.0, 42.8], [-89.0, 43.3], [-89.8, 42.8]]]}"#,
    )
    .unwrap()
  }

  #[test]
  fn country_layers_for_populated_regions_only() {
    let mut surface = RecordingSurface::new();
    let overlays = install_overlays(&mut surface, regions());

    let layers: Vec<String> = surface.layers().iter().map(|l| l.0.clone()).collect();
    assert_eq!(
      layers,
      vec![
        "greco-countries",
        "greco-countries-outline",
        "indo-countries",
        "indo-countries-outline",
        "usa-countries",
        "usa-countries-outline",
      ]
    );
    assert_eq!(
      overlays.region_for_layer(&LayerId::new("indo-countries-outline")),
      Some(RegionId::Indo)
    );
    assert_eq!(overlays.region_for_layer(&LayerId::new("dane-boundary-fill")), None);
  }

  #[test]
  fn country_layers_are_filtered_by_country_code() {
    let mut surface = RecordingSurface::new();
    install_overlays(&mut surface, regions());

    let greco = surface
      .calls
      .iter()
      .find_map(|c| match c {
        SurfaceCall::AddLayer(layer) if layer.id.as_str() == "greco-countries" => Some(layer.clone()),
        _ => None,
      })
      .unwrap();
    let Some(Filter::In { property, values }) = greco.filter else {
      panic!("country layer without filter");
    };
    assert_eq!(property, COUNTRY_CODE_PROPERTY);
    assert_eq!(values.len(), 10);
    assert!(values.contains(&"GRC".to_string()));
    assert!(matches!(greco.paint, Paint::Fill { opacity, .. } if (opacity - 0.4).abs() < f32::EPSILON));
    assert!(matches!(greco.source, LayerSource::Vector { ref url, .. } if url == COUNTRY_BOUNDARIES_URL));
  }

  #[test]
  fn one_label_per_region() {
    let mut surface = RecordingSurface::new();
    let overlays = install_overlays(&mut surface, regions());

    assert_eq!(overlays.marker_count(), regions().len());
    for (marker, region) in surface.markers().iter().zip(regions()) {
      let spec = surface.marker_spec(*marker).unwrap();
      assert_eq!(spec.position, region.center);
      assert_eq!(spec.background, region.color);
      assert!(spec.stop_propagation);
      assert_eq!(spec.anchor, Anchor::Center);
      assert_eq!(overlays.region_for_marker(*marker), Some(region.id));
    }

    let about = surface.marker_spec(surface.markers()[4]).unwrap();
    assert_eq!(about.label, "ABOUT ME");
    assert_eq!(about.offset, PixelOffset::new(0., 30.));
    let usa = surface.marker_spec(surface.markers()[0]).unwrap();
    assert_eq!(usa.offset, PixelOffset::default());
  }

  #[test]
  fn boundary_layers_installed_once() {
    let mut surface = RecordingSurface::new();
    let mut overlays = install_overlays(&mut surface, regions());
    let dane = region(RegionId::Dane);

    install_boundary(&mut surface, &mut overlays, dane, square());
    install_boundary(&mut surface, &mut overlays, dane, square());

    let sources = surface
      .calls
      .iter()
      .filter(|c| matches!(c, SurfaceCall::AddSource(_)))
      .count();
    assert_eq!(sources, 1);
    assert_eq!(
      overlays.region_for_layer(&LayerId::new("dane-boundary-fill")),
      Some(RegionId::Dane)
    );
    assert_eq!(
      overlays.region_for_layer(&LayerId::new("dane-boundary-outline")),
      Some(RegionId::Dane)
    );
  }

  #[test]
  fn remove_all_clears_the_surface() {
    let mut surface = RecordingSurface::new();
    let mut overlays = install_overlays(&mut surface, regions());
    install_boundary(&mut surface, &mut overlays, region(RegionId::Dane), square());
    surface.take_calls();

    overlays.remove_all(&mut surface);
    assert!(overlays.is_empty());
    assert!(surface.layers().is_empty());
    assert!(surface.markers().is_empty());

    let first_layer_removal = surface
      .calls
      .iter()
      .position(|c| matches!(c, SurfaceCall::RemoveLayer(_)))
      .unwrap();
    let last_marker_removal = surface
      .calls
      .iter()
      .rposition(|c| matches!(c, SurfaceCall::RemoveMarker(_)))
      .unwrap();
    assert!(last_marker_removal < first_layer_removal);
    assert!(matches!(surface.calls.last(), Some(SurfaceCall::RemoveSource(_))));
  }
}
