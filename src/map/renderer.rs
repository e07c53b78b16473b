use crate::braille::BrailleCanvas;
use crate::cases::CaseLayer;
use crate::map::geometry::{draw_circle, draw_line};
use crate::map::projection::Viewport;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Display settings for map layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_coastlines: bool,
    pub show_borders: bool,
    pub show_markers: bool,
    pub show_labels: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_coastlines: true,
            show_borders: true,
            show_markers: true,
            show_labels: true,
        }
    }
}

/// Rendered output, one braille canvas per color layer plus text labels
/// positioned in character coordinates. The UI composes these with
/// distinct styles.
pub struct MapLayers {
    pub base: BrailleCanvas,
    pub markers: BrailleCanvas,
    pub labels: Vec<(u16, u16, String)>,
}

/// Map renderer: base-layer polylines (coastlines, borders) plus the
/// attached case-marker layer.
pub struct MapRenderer {
    coastlines: Vec<LineString>,
    borders: Vec<LineString>,
    cases: Option<CaseLayer>,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            coastlines: Vec::new(),
            borders: Vec::new(),
            cases: None,
            settings: DisplaySettings::default(),
        }
    }

    /// Add a coastline polyline to the base layer
    pub fn add_coastline(&mut self, line: LineString) {
        self.coastlines.push(line);
    }

    /// Add a country-border polyline to the base layer
    pub fn add_border(&mut self, line: LineString) {
        self.borders.push(line);
    }

    /// Attach the fetched case layer. Replaces any previous layer.
    pub fn attach_cases(&mut self, layer: CaseLayer) {
        self.cases = Some(layer);
    }

    pub fn cases(&self) -> Option<&CaseLayer> {
        self.cases.as_ref()
    }

    /// Check if any base-layer data is loaded
    pub fn has_data(&self) -> bool {
        !self.coastlines.is_empty() || !self.borders.is_empty()
    }

    /// Render all layers for a canvas of the given character dimensions
    pub fn render(&self, char_width: usize, char_height: usize, viewport: &Viewport) -> MapLayers {
        let mut base = BrailleCanvas::new(char_width, char_height);
        let mut markers = BrailleCanvas::new(char_width, char_height);
        let mut labels = Vec::new();

        if self.settings.show_coastlines {
            for line in &self.coastlines {
                self.draw_linestring(&mut base, line, viewport);
            }
        }

        if self.settings.show_borders {
            for line in &self.borders {
                self.draw_linestring(&mut base, line, viewport);
            }
        }

        if self.settings.show_markers {
            if let Some(cases) = &self.cases {
                self.draw_markers(cases, &mut markers, &mut labels, viewport);
            }
        }

        MapLayers {
            base,
            markers,
            labels,
        }
    }

    fn draw_markers(
        &self,
        cases: &CaseLayer,
        canvas: &mut BrailleCanvas,
        labels: &mut Vec<(u16, u16, String)>,
        viewport: &Viewport,
    ) {
        let radius = if viewport.zoom > 6.0 { 2 } else { 1 };

        for marker in cases.markers() {
            let (px, py) = viewport.project(marker.lon, marker.lat);
            if !viewport.is_visible(px, py) {
                continue;
            }

            draw_circle(canvas, px, py, radius);

            // Label sits two character cells right of the marker
            if self.settings.show_labels && px >= 0 && py >= 0 {
                let char_x = (px / 2) as u16;
                let char_y = (py / 4) as u16;
                if let Some(label_x) = char_x.checked_add(2) {
                    labels.push((label_x, char_y, marker.label.clone()));
                }
            }
        }
    }

    /// Draw a linestring with viewport culling
    fn draw_linestring(&self, canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
        if line.len() < 2 {
            return;
        }

        let mut prev: Option<(i32, i32)> = None;

        for &(lon, lat) in line {
            let (px, py) = viewport.project(lon, lat);

            if let Some((prev_x, prev_y)) = prev {
                let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
                if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                    draw_line(canvas, prev_x, prev_y, px, py);
                }
            }

            prev = Some((px, py));
        }
    }

    pub fn toggle_borders(&mut self) {
        self.settings.show_borders = !self.settings.show_borders;
    }

    pub fn toggle_markers(&mut self) {
        self.settings.show_markers = !self.settings.show_markers;
    }

    pub fn toggle_labels(&mut self) {
        self.settings.show_labels = !self.settings.show_labels;
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{to_feature_collection, CountryInfo, CountryRecord};
    use geojson::JsonObject;

    fn layer_with(country: &str, lon: f64, lat: f64, cases: u64) -> CaseLayer {
        let record = CountryRecord {
            country: country.to_string(),
            cases,
            deaths: 0,
            recovered: 0,
            updated: None,
            country_info: CountryInfo {
                lat: Some(lat),
                long: Some(lon),
                extra: JsonObject::new(),
            },
            extra: JsonObject::new(),
        };
        CaseLayer::from_features(&to_feature_collection(&[record]))
    }

    #[test]
    fn test_marker_renders_with_label() {
        let mut renderer = MapRenderer::new();
        renderer.attach_cases(layer_with("France", 2.2, 46.2, 12345));

        let viewport = Viewport::new(2.2, 46.2, 2.0, 80, 80);
        let layers = renderer.render(40, 20, &viewport);

        assert!(!layers.markers.is_blank());
        assert_eq!(layers.labels.len(), 1);
        assert_eq!(layers.labels[0].2, "12k+");
    }

    #[test]
    fn test_markers_toggle_hides_layer() {
        let mut renderer = MapRenderer::new();
        renderer.attach_cases(layer_with("France", 2.2, 46.2, 100));
        renderer.toggle_markers();

        let viewport = Viewport::new(2.2, 46.2, 2.0, 80, 80);
        let layers = renderer.render(40, 20, &viewport);

        assert!(layers.markers.is_blank());
        assert!(layers.labels.is_empty());
    }

    #[test]
    fn test_offscreen_marker_culled() {
        let mut renderer = MapRenderer::new();
        renderer.attach_cases(layer_with("Japan", 138.3, 36.2, 100));

        // Viewport centered on the opposite hemisphere, zoomed in
        let viewport = Viewport::new(-77.0, 38.9, 10.0, 80, 80);
        let layers = renderer.render(40, 20, &viewport);

        assert!(layers.markers.is_blank());
    }

    #[test]
    fn test_no_layer_no_markers() {
        let renderer = MapRenderer::new();
        let viewport = Viewport::home(80, 80);
        let layers = renderer.render(40, 20, &viewport);
        assert!(layers.markers.is_blank());
        assert!(renderer.cases().is_none());
    }
}
