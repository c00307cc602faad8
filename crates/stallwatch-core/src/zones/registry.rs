use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::geometry::{Point, Polygon};

/// Stall width and height of the built-in layout, in pixels
const DEFAULT_STALL_SIZE: (f64, f64) = (90.0, 110.0);
const DEFAULT_COLUMNS: [f64; 4] = [30.0, 140.0, 250.0, 360.0];
const DEFAULT_ROWS: [f64; 2] = [200.0, 330.0];

/// One parking stall
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    pub index: usize,
    pub polygon: Polygon,
}

impl Zone {
    pub fn new(index: usize, polygon: Polygon) -> Self {
        Self { index, polygon }
    }

    /// A zone needs at least three vertices to enclose anything
    pub fn is_valid(&self) -> bool {
        self.polygon.len() >= 3
    }
}

/// Where the layout held by a registry came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutSource {
    File(String),
    Inline,
    Default,
}

/// On-disk zone entry: `{"points": [[x, y], ...]}`
#[derive(Debug, Deserialize)]
struct ZoneEntry {
    points: Vec<Point>,
}

/// Immutable stall layout shared by every analysis pass
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
    source: LayoutSource,
}

impl ZoneRegistry {
    /// Build a registry from polygons, indexing them in order
    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        Self::with_source(polygons, LayoutSource::Inline)
    }

    fn with_source(polygons: Vec<Polygon>, source: LayoutSource) -> Self {
        let zones: Vec<Zone> = polygons
            .into_iter()
            .enumerate()
            .map(|(index, polygon)| Zone::new(index, polygon))
            .collect();

        for zone in zones.iter().filter(|zone| !zone.is_valid()) {
            warn!(
                "Zone #{} has {} vertices and will never report occupancy",
                zone.index + 1,
                zone.polygon.len()
            );
        }

        Self { zones, source }
    }

    /// The 8-stall layout used when no layout file is available
    pub fn default_layout() -> Self {
        let (width, height) = DEFAULT_STALL_SIZE;
        let polygons = DEFAULT_ROWS
            .iter()
            .flat_map(|&top| {
                DEFAULT_COLUMNS.iter().map(move |&left| {
                    vec![
                        Point::new(left, top),
                        Point::new(left + width, top),
                        Point::new(left + width, top + height),
                        Point::new(left, top + height),
                    ]
                })
            })
            .collect();

        Self::with_source(polygons, LayoutSource::Default)
    }

    /// Load a layout file, falling back to the default layout on any error
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(registry) => registry,
            Err(e) => {
                warn!("Zone layout {:?} unavailable ({:#}), using default zones", path, e);
                Self::default_layout()
            }
        }
    }

    /// Load a layout file
    pub fn try_load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read zone layout: {:?}", path))?;

        let mut registry = Self::from_json_str(&contents)
            .with_context(|| format!("Failed to parse zone layout: {:?}", path))?;
        registry.source = LayoutSource::File(path.display().to_string());

        info!("Loaded {} zones from {:?}", registry.len(), path);
        Ok(registry)
    }

    /// Parse a layout from its JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<ZoneEntry> =
            serde_json::from_str(json).context("Invalid zone layout JSON")?;
        let polygons = entries.into_iter().map(|entry| entry.points).collect();
        Ok(Self::from_polygons(polygons))
    }

    /// Wrap for sharing between pipelines
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn get(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn source(&self) -> &LayoutSource {
        &self.source
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Zone> {
        self.zones.iter()
    }
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::default_layout()
    }
}

impl<'a> IntoIterator for &'a ZoneRegistry {
    type Item = &'a Zone;
    type IntoIter = std::slice::Iter<'a, Zone>;

    fn into_iter(self) -> Self::IntoIter {
        self.zones.iter()
    }
}
