use std::{fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use geo_types::{LineString, MultiPolygon, Polygon};
use log::{debug, warn};
use serde_json::Value;
use surf::{Config, Url};
use thiserror::Error;

/// Polygons outlining a region, in longitude/latitude.
pub type BoundaryGeometry = MultiPolygon<f64>;

#[derive(Error, Debug)]
pub enum BoundaryError {
  #[error("Boundary document {path} not available: {reason}")]
  NotAvailable { path: String, reason: String },
  #[error("Boundary document {path} answered with status {status}.")]
  Status { path: String, status: u16 },
  #[error("Boundary document is not valid JSON: {0}")]
  Parse(#[from] serde_json::Error),
  #[error("Unsupported GeoJSON: {0}")]
  Unsupported(String),
  #[error("Boundary document contains no polygon.")]
  Empty,
}

/// The interface of everything static assets can be loaded from.
pub trait AssetLoader {
  /// Loads the asset at the site-absolute `path`, e.g. `/danecounty.geojson`.
  async fn asset(&self, path: &str) -> Result<Vec<u8>, BoundaryError>;
}

/// Serves assets from a local directory.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetDirectory {
  root: PathBuf,
}

impl AssetDirectory {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

impl AssetLoader for AssetDirectory {
  async fn asset(&self, path: &str) -> Result<Vec<u8>, BoundaryError> {
    let file = self.root.join(path.trim_start_matches('/'));
    debug!("Reading asset {}", file.display());
    std::fs::read(&file).map_err(|e| BoundaryError::NotAvailable {
      path: file.display().to_string(),
      reason: e.to_string(),
    })
  }
}

/// Fetches assets from the web server hosting the site.
#[derive(Debug, Clone)]
pub struct AssetDownloader {
  base: Url,
  client: surf::Client,
}

impl AssetDownloader {
  pub fn new(base: Url) -> anyhow::Result<Self> {
    let client: surf::Client = Config::new()
      .set_timeout(Some(Duration::from_secs(5)))
      .try_into()
      .map_err(|e| anyhow::anyhow!("Failed to create http client: {e:?}"))?;
    Ok(Self { base, client })
  }

  fn url(&self, path: &str) -> Result<Url, BoundaryError> {
    self
      .base
      .join(path.trim_start_matches('/'))
      .map_err(|e| BoundaryError::NotAvailable {
        path: path.to_string(),
        reason: e.to_string(),
      })
  }
}

impl AssetLoader for AssetDownloader {
  async fn asset(&self, path: &str) -> Result<Vec<u8>, BoundaryError> {
    let url = self.url(path)?;
    debug!("Fetching asset {url}");
    let mut response =
      self
        .client
        .get(url.clone())
        .await
        .map_err(|e| BoundaryError::NotAvailable {
          path: url.to_string(),
          reason: e.to_string(),
        })?;
    if !response.status().is_success() {
      return Err(BoundaryError::Status {
        path: url.to_string(),
        status: response.status().into(),
      });
    }
    response
      .body_bytes()
      .await
      .map_err(|e| BoundaryError::NotAvailable {
        path: url.to_string(),
        reason: e.to_string(),
      })
  }
}

/// Where the site's static assets live: a base url or a local directory.
#[derive(Debug, Clone)]
pub enum AssetSource {
  Http(AssetDownloader),
  Directory(AssetDirectory),
}

impl AssetLoader for AssetSource {
  async fn asset(&self, path: &str) -> Result<Vec<u8>, BoundaryError> {
    match self {
      AssetSource::Http(downloader) => downloader.asset(path).await,
      AssetSource::Directory(directory) => directory.asset(path).await,
    }
  }
}

impl FromStr for AssetSource {
  type Err = anyhow::Error;

  fn from_str(root: &str) -> Result<Self, Self::Err> {
    if root.starts_with("http://") || root.starts_with("https://") {
      let mut base = Url::parse(root)?;
      if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
      }
      Ok(AssetSource::Http(AssetDownloader::new(base)?))
    } else {
      Ok(AssetSource::Directory(AssetDirectory::new(root)))
    }
  }
}

impl Display for AssetSource {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      AssetSource::Http(downloader) => write!(f, "{}", downloader.base),
      AssetSource::Directory(directory) => write!(f, "{}", directory.root.display()),
    }
  }
}

/// Loads and parses the boundary document at `path`.
pub async fn fetch_boundary(
  loader: &impl AssetLoader,
  path: &str,
) -> Result<BoundaryGeometry, BoundaryError> {
  let data = loader.asset(path).await?;
  parse_boundary(&data)
}

/// Collects all polygons of a `GeoJSON` document.
pub fn parse_boundary(data: &[u8]) -> Result<BoundaryGeometry, BoundaryError> {
  let value: Value = serde_json::from_slice(data)?;
  let mut polygons = Vec::new();
  collect_polygons(&value, &mut polygons)?;
  if polygons.is_empty() {
    return Err(BoundaryError::Empty);
  }
  Ok(MultiPolygon(polygons))
}

fn collect_polygons(value: &Value, polygons: &mut Vec<Polygon<f64>>) -> Result<(), BoundaryError> {
  let obj = value
    .as_object()
    .ok_or_else(|| BoundaryError::Unsupported("GeoJSON must be an object".to_string()))?;
  let geotype = obj
    .get("type")
    .and_then(Value::as_str)
    .ok_or_else(|| BoundaryError::Unsupported("missing 'type' field".to_string()))?;

  match geotype {
    "FeatureCollection" => {
      for feature in obj
        .get("features")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
      {
        if let Err(e) = collect_polygons(feature, polygons) {
          warn!("Skipping feature: {e}");
        }
      }
    }
    "Feature" => {
      let geometry = obj
        .get("geometry")
        .ok_or_else(|| BoundaryError::Unsupported("feature without geometry".to_string()))?;
      collect_polygons(geometry, polygons)?;
    }
    "Polygon" => polygons.push(parse_polygon(coordinates(obj)?)?),
    "MultiPolygon" => {
      for polygon in as_array(coordinates(obj)?)? {
        polygons.push(parse_polygon(polygon)?);
      }
    }
    other => return Err(BoundaryError::Unsupported(format!("geometry type {other}"))),
  }
  Ok(())
}

fn coordinates(obj: &serde_json::Map<String, Value>) -> Result<&Value, BoundaryError> {
  obj
    .get("coordinates")
    .ok_or_else(|| BoundaryError::Unsupported("geometry without coordinates".to_string()))
}

fn as_array(value: &Value) -> Result<&Vec<Value>, BoundaryError> {
  value
    .as_array()
    .ok_or_else(|| BoundaryError::Unsupported(format!("expected an array, got {value}")))
}

fn parse_polygon(value: &Value) -> Result<Polygon<f64>, BoundaryError> {
  let mut rings = as_array(value)?.iter().map(parse_ring);
  let exterior = rings
    .next()
    .ok_or_else(|| BoundaryError::Unsupported("polygon without rings".to_string()))??;
  let interiors = rings.collect::<Result<Vec<_>, _>>()?;
  Ok(Polygon::new(exterior, interiors))
}

fn parse_ring(value: &Value) -> Result<LineString<f64>, BoundaryError> {
  as_array(value)?
    .iter()
    .map(|position| match position.as_array().map(Vec::as_slice) {
      Some([lng, lat, ..]) => lng
        .as_f64()
        .zip(lat.as_f64())
        .ok_or_else(|| BoundaryError::Unsupported(format!("invalid position {position}"))),
      _ => Err(BoundaryError::Unsupported(format!(
        "invalid position {position}"
      ))),
    })
    .collect::<Result<Vec<(f64, f64)>, _>>()
    .map(LineString::from)
}

#[cfg(test)]
mod tests {
  use super::*;

  const DANE_FEATURE: &str = r#"{
    "type": "FeatureCollection",
    "features": [{
      "type": "Feature",
      "properties": { "name": "Dane" },
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[-89.8, 42.8], [-89.0, 42.8], [-89.0, 43.3], [-89.8, 43.3], [-89.8, 42.8]]]
      }
    }]
  }"#;

  #[test]
  fn feature_collection_with_polygon() {
    let geometry = parse_boundary(DANE_FEATURE.as_bytes()).unwrap();
    assert_eq!(geometry.0.len(), 1);
    assert_eq!(geometry.0[0].exterior().0.len(), 5);
    assert_eq!(geometry.0[0].exterior().0[1].x, -89.0);
  }

  #[test]
  fn bare_multipolygon_with_hole() {
    let data = r#"{
      "type": "MultiPolygon",
      "coordinates": [
        [[[0, 0], [4, 0], [4, 4], [0, 0]], [[1, 1], [2, 1], [2, 2], [1, 1]]],
        [[[10, 10], [11, 10], [11, 11], [10, 10]]]
      ]
    }"#;
    let geometry = parse_boundary(data.as_bytes()).unwrap();
    assert_eq!(geometry.0.len(), 2);
    assert_eq!(geometry.0[0].interiors().len(), 1);
  }

  #[test]
  fn features_without_polygons_are_skipped() {
    let data = r#"{
      "type": "FeatureCollection",
      "features": [
        { "type": "Feature", "geometry": { "type": "Point", "coordinates": [1, 2] } },
        { "type": "Feature", "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]] } }
      ]
    }"#;
    assert_eq!(parse_boundary(data.as_bytes()).unwrap().0.len(), 1);
  }

  #[test]
  fn errors() {
    assert!(matches!(
      parse_boundary(b"not json"),
      Err(BoundaryError::Parse(_))
    ));
    assert!(matches!(
      parse_boundary(br#"{"type": "FeatureCollection", "features": []}"#),
      Err(BoundaryError::Empty)
    ));
    assert!(matches!(
      parse_boundary(br#"{"type": "Point", "coordinates": [0, 0]}"#),
      Err(BoundaryError::Unsupported(_))
    ));
    assert!(matches!(
      parse_boundary(br#"{"type": "Polygon", "coordinates": [[["a", 0]]]}"#),
      Err(BoundaryError::Unsupported(_))
    ));
  }

  #[test]
  fn asset_source_from_str() {
    assert!(matches!(
      "https://example.org/site".parse::<AssetSource>().unwrap(),
      AssetSource::Http(_)
    ));
    assert!(matches!(
      "./public".parse::<AssetSource>().unwrap(),
      AssetSource::Directory(_)
    ));
  }

  #[test]
  fn downloader_joins_site_absolute_paths() {
    let AssetSource::Http(downloader) = "https://example.org/site".parse::<AssetSource>().unwrap()
    else {
      panic!("expected http source");
    };
    assert_eq!(
      downloader.url("/danecounty.geojson").unwrap().as_str(),
      "https://example.org/site/danecounty.geojson"
    );
  }

  #[tokio::test]
  async fn directory_loader() {
    let dir = std::env::temp_dir().join(format!("regionmap-assets-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("danecounty.geojson"), DANE_FEATURE).unwrap();

    let loader = AssetDirectory::new(&dir);
    let geometry = fetch_boundary(&loader, "/danecounty.geojson").await.unwrap();
    assert_eq!(geometry.0.len(), 1);

    let missing = fetch_boundary(&loader, "/missing.geojson").await;
    assert!(matches!(missing, Err(BoundaryError::NotAvailable { .. })));

    std::fs::remove_dir_all(&dir).unwrap();
  }
}
