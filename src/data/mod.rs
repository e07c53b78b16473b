use crate::map::MapRenderer;
use anyhow::Result;
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;

/// Load optional Natural Earth base-layer GeoJSON from a data directory.
/// Missing files are fine; the built-in outline covers the fallback.
pub fn load_base_layers(renderer: &mut MapRenderer, data_dir: &Path) -> Result<()> {
    for filename in ["ne_110m_coastline.json", "natural-earth.json"] {
        let path = data_dir.join(filename);
        if path.exists() {
            if let Err(e) = load_lines(&path, |line| renderer.add_coastline(line)) {
                tracing::warn!("failed to load {filename}: {e}");
            }
        }
    }

    let borders = data_dir.join("ne_50m_borders.json");
    if borders.exists() {
        if let Err(e) = load_lines(&borders, |line| renderer.add_border(line)) {
            tracing::warn!("failed to load borders: {e}");
        }
    }

    Ok(())
}

fn load_lines<F>(path: &Path, mut add_line: F) -> Result<()>
where
    F: FnMut(Vec<(f64, f64)>),
{
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;

    match &geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(geometry) = &feature.geometry {
                    collect_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(geometry) = &f.geometry {
                collect_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => collect_lines(geometry, &mut add_line),
    }

    Ok(())
}

/// Extract drawable polylines from a geometry. Polygons contribute their
/// exterior ring only; holes are invisible at terminal resolution.
fn collect_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(Vec<(f64, f64)>),
{
    let as_line = |coords: &[Vec<f64>]| coords.iter().map(|c| (c[0], c[1])).collect::<Vec<_>>();

    match &geometry.value {
        Value::LineString(coords) => add_line(as_line(coords)),
        Value::MultiLineString(lines) => {
            for coords in lines {
                add_line(as_line(coords));
            }
        }
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(as_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    add_line(as_line(exterior));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_lines(g, add_line);
            }
        }
        _ => {}
    }
}

/// Built-in simplified continent outlines, used when no GeoJSON data
/// directory is available. Enough context to place the markers.
pub fn builtin_world_outline(renderer: &mut MapRenderer) {
    // North America
    renderer.add_coastline(vec![
        (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0),
        (-125.0, 48.0), (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0),
        (-97.0, 25.0), (-97.0, 28.0), (-82.0, 24.0), (-80.0, 25.0),
        (-81.0, 31.0), (-75.0, 35.0), (-70.0, 41.0), (-67.0, 45.0),
        (-65.0, 47.0), (-55.0, 47.0), (-52.0, 47.0), (-55.0, 52.0),
        (-58.0, 55.0), (-64.0, 60.0), (-73.0, 62.0), (-80.0, 63.0),
        (-95.0, 62.0), (-110.0, 68.0), (-130.0, 70.0), (-145.0, 70.0),
        (-168.0, 65.0),
    ]);

    // South America
    renderer.add_coastline(vec![
        (-80.0, 10.0), (-75.0, 5.0), (-70.0, 5.0), (-60.0, 5.0),
        (-50.0, 0.0), (-35.0, -5.0), (-35.0, -10.0), (-38.0, -15.0),
        (-40.0, -22.0), (-48.0, -25.0), (-55.0, -34.0), (-58.0, -38.0),
        (-65.0, -42.0), (-68.0, -50.0), (-75.0, -52.0), (-75.0, -45.0),
        (-72.0, -40.0), (-72.0, -30.0), (-70.0, -20.0), (-70.0, -15.0),
        (-80.0, -5.0), (-80.0, 0.0), (-80.0, 10.0),
    ]);

    // Europe
    renderer.add_coastline(vec![
        (-10.0, 36.0), (-5.0, 36.0), (0.0, 38.0), (5.0, 43.0),
        (10.0, 44.0), (15.0, 45.0), (20.0, 40.0), (25.0, 37.0),
        (30.0, 40.0), (35.0, 42.0), (40.0, 43.0), (40.0, 55.0),
        (30.0, 60.0), (25.0, 65.0), (20.0, 70.0), (10.0, 71.0),
        (5.0, 62.0), (5.0, 58.0), (-5.0, 58.0), (-10.0, 52.0),
        (-5.0, 48.0), (-5.0, 43.0), (-10.0, 36.0),
    ]);

    // Africa, southern half
    renderer.add_coastline(vec![
        (-17.0, 15.0), (-15.0, 10.0), (-10.0, 5.0), (0.0, 5.0),
        (10.0, 5.0), (15.0, 0.0), (20.0, -5.0), (25.0, -10.0),
        (35.0, -20.0), (35.0, -25.0), (30.0, -30.0), (20.0, -35.0),
        (18.0, -35.0), (15.0, -30.0), (10.0, -15.0), (10.0, 0.0),
        (5.0, 5.0), (-5.0, 5.0), (-10.0, 10.0), (-17.0, 15.0),
    ]);

    // Africa, northern half and horn
    renderer.add_coastline(vec![
        (-17.0, 15.0), (-17.0, 20.0), (-15.0, 28.0), (-5.0, 35.0),
        (10.0, 37.0), (20.0, 33.0), (25.0, 32.0), (35.0, 30.0),
        (35.0, 20.0), (42.0, 12.0), (50.0, 12.0), (45.0, 5.0),
        (35.0, -5.0), (35.0, -20.0),
    ]);

    // Asia
    renderer.add_coastline(vec![
        (35.0, 42.0), (40.0, 43.0), (50.0, 40.0), (55.0, 37.0),
        (60.0, 25.0), (65.0, 25.0), (70.0, 20.0), (75.0, 15.0),
        (80.0, 8.0), (80.0, 15.0), (88.0, 22.0), (92.0, 22.0),
        (95.0, 16.0), (100.0, 14.0), (105.0, 10.0), (110.0, 20.0),
        (115.0, 22.0), (120.0, 22.0), (122.0, 25.0), (125.0, 30.0),
        (130.0, 35.0), (135.0, 35.0), (140.0, 40.0), (145.0, 45.0),
        (145.0, 50.0), (140.0, 55.0), (135.0, 55.0), (130.0, 52.0),
        (130.0, 43.0), (120.0, 40.0), (110.0, 45.0), (90.0, 50.0),
        (70.0, 55.0), (60.0, 55.0), (50.0, 50.0), (40.0, 43.0),
    ]);

    // Australia
    renderer.add_coastline(vec![
        (115.0, -20.0), (120.0, -18.0), (130.0, -12.0), (140.0, -12.0),
        (145.0, -15.0), (150.0, -25.0), (153.0, -30.0), (150.0, -35.0),
        (145.0, -38.0), (140.0, -38.0), (135.0, -35.0), (130.0, -32.0),
        (125.0, -32.0), (115.0, -35.0), (115.0, -25.0), (115.0, -20.0),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_outline_populates_renderer() {
        let mut renderer = MapRenderer::new();
        assert!(!renderer.has_data());
        builtin_world_outline(&mut renderer);
        assert!(renderer.has_data());
    }

    #[test]
    fn test_missing_data_dir_is_not_an_error() {
        let mut renderer = MapRenderer::new();
        let result = load_base_layers(&mut renderer, Path::new("does/not/exist"));
        assert!(result.is_ok());
        assert!(!renderer.has_data());
    }
}
