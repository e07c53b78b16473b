use crate::map::SpatialGrid;
use chrono::{DateTime, Utc};
use geojson::{FeatureCollection, Value};

/// Tooltip body for one country marker. Pre-formatted at layer build time
/// so hover rendering does no work beyond a lookup.
#[derive(Debug, Clone)]
pub struct Tooltip {
    pub country: String,
    pub cases: u64,
    pub deaths: u64,
    pub recovered: u64,
    /// Human-readable last-update time, or None when the source value
    /// was absent or zero (line omitted from the rendered block).
    pub updated: Option<String>,
}

/// A case marker: geographic position, abbreviated case-count label,
/// and tooltip content.
#[derive(Debug, Clone)]
pub struct CaseMarker {
    pub lon: f64,
    pub lat: f64,
    pub label: String,
    pub tooltip: Tooltip,
}

/// Marker layer built from the countries feature collection. Markers are
/// indexed in a spatial grid so hover hit tests stay O(1) regardless of
/// how many countries the dataset grows to.
pub struct CaseLayer {
    markers: Vec<CaseMarker>,
    grid: SpatialGrid<usize>,
}

impl CaseLayer {
    /// Grid cell size in degrees. Coarse is fine: a hover query touches
    /// at most a handful of cells.
    const CELL_DEGREES: f64 = 5.0;

    /// Build the layer from point features. Each feature contributes one
    /// marker; its label and tooltip are derived from the feature
    /// properties.
    pub fn from_features(collection: &FeatureCollection) -> Self {
        let mut markers = Vec::with_capacity(collection.features.len());
        let mut grid = SpatialGrid::new(Self::CELL_DEGREES);

        for feature in &collection.features {
            let Some(geometry) = feature.geometry.as_ref() else {
                continue;
            };
            let Value::Point(coords) = &geometry.value else {
                continue;
            };
            if coords.len() < 2 {
                continue;
            }
            let (lon, lat) = (coords[0], coords[1]);

            let props = feature.properties.as_ref();
            let country = props
                .and_then(|p| p.get("country"))
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown")
                .to_string();
            let cases = read_u64(props, "cases");
            let deaths = read_u64(props, "deaths");
            let recovered = read_u64(props, "recovered");
            let updated = props
                .and_then(|p| p.get("updated"))
                .and_then(|v| v.as_u64());

            let idx = markers.len();
            markers.push(CaseMarker {
                lon,
                lat,
                label: format_cases(cases),
                tooltip: Tooltip {
                    country,
                    cases,
                    deaths,
                    recovered,
                    updated: format_updated(updated),
                },
            });
            grid.insert(lon, lat, idx);
        }

        Self { markers, grid }
    }

    pub fn markers(&self) -> &[CaseMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Nearest marker within `radius_deg` degrees of the given position,
    /// for hover tooltips. Longitude distance is scaled by cos(lat) so
    /// the hit circle stays roughly round on screen away from the equator.
    pub fn hit_test(&self, lon: f64, lat: f64, radius_deg: f64) -> Option<&CaseMarker> {
        let cos_lat = lat.to_radians().cos().max(0.1);
        let mut best: Option<(f64, usize)> = None;

        for slot in self.grid.query_radius(lon, lat, radius_deg) {
            let Some(&idx) = self.grid.get(slot) else {
                continue;
            };
            let marker = &self.markers[idx];
            let dx = (marker.lon - lon) * cos_lat;
            let dy = marker.lat - lat;
            let dist_sq = dx * dx + dy * dy;
            if dist_sq <= radius_deg * radius_deg
                && best.map_or(true, |(d, _)| dist_sq < d)
            {
                best = Some((dist_sq, idx));
            }
        }

        best.map(|(_, idx)| &self.markers[idx])
    }
}

fn read_u64(props: Option<&geojson::JsonObject>, key: &str) -> u64 {
    props
        .and_then(|p| p.get(key))
        .and_then(|v| v.as_u64())
        .unwrap_or(0)
}

/// Abbreviate a case count for the marker label. Counts above 1000 drop
/// their last three decimal digits and gain a "k+" suffix: 12345 becomes
/// "12k+", and 1999 becomes "1k+" (string truncation, not rounding --
/// upstream behavior, kept as-is).
pub fn format_cases(cases: u64) -> String {
    let raw = cases.to_string();
    if cases > 1000 {
        format!("{}k+", &raw[..raw.len() - 3])
    } else {
        raw
    }
}

/// Render an epoch-milliseconds refresh time as a readable UTC string.
/// Absent or zero values yield None and the tooltip line is omitted.
pub fn format_updated(updated_ms: Option<u64>) -> Option<String> {
    let ms = updated_ms.filter(|&ms| ms > 0)?;
    let dt: DateTime<Utc> = DateTime::from_timestamp_millis(ms as i64)?;
    Some(dt.format("%b %-d, %Y, %H:%M UTC").to_string())
}
