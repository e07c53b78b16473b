use crate::cases::{CaseLayer, CaseMarker};
use crate::map::{MapRenderer, Viewport};

/// State of the one-shot dataset fetch, surfaced in the status bar.
/// Failures deliberately collapse into `Done` with no layer: the map
/// stays usable with no markers and no error banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Fetching,
    Loaded(usize),
    Done,
}

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub map_renderer: MapRenderer,
    pub should_quit: bool,
    pub fetch_status: FetchStatus,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for hover lookups and the cursor marker
    pub mouse_pos: Option<(u16, u16)>,
}

impl App {
    /// Hover hit radius in braille pixels.
    const HOVER_RADIUS_PX: f64 = 6.0;

    pub fn new(width: usize, height: usize) -> Self {
        let (pixel_width, pixel_height) = Self::inner_pixels(width, height);
        Self {
            viewport: Viewport::home(pixel_width, pixel_height),
            map_renderer: MapRenderer::new(),
            should_quit: false,
            fetch_status: FetchStatus::Fetching,
            last_mouse: None,
            mouse_pos: None,
        }
    }

    /// Braille gives 2x4 resolution per character; subtract the map
    /// border (2 chars horizontal, 2 vertical plus the status bar).
    fn inner_pixels(width: usize, height: usize) -> (usize, usize) {
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3);
        (inner_width * 2, inner_height * 4)
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pixel_width, pixel_height) = Self::inner_pixels(width, height);
        self.viewport.width = pixel_width;
        self.viewport.height = pixel_height;
    }

    /// Attach the fetched marker layer to the map. An empty layer is
    /// dropped: an empty or unusable dataset renders nothing.
    pub fn attach_cases(&mut self, layer: CaseLayer) {
        if layer.is_empty() {
            self.fetch_status = FetchStatus::Done;
            return;
        }
        self.fetch_status = FetchStatus::Loaded(layer.len());
        self.map_renderer.attach_cases(layer);
    }

    /// Mark the fetch finished without data (failure or empty response)
    pub fn finish_fetch(&mut self) {
        if self.fetch_status == FetchStatus::Fetching {
            self.fetch_status = FetchStatus::Done;
        }
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = Self::cell_to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = Self::cell_to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
    }

    /// Reset the viewport to the home view, keeping any attached layer
    pub fn reset_view(&mut self) {
        self.viewport = Viewport::home(self.viewport.width, self.viewport.height);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Convert terminal cell coords to braille pixel coords.
    /// Each cell is 2 pixels wide and 4 tall; border is a 1-cell offset.
    fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
        let px = ((col.saturating_sub(1)) as i32) * 2;
        let py = ((row.saturating_sub(1)) as i32) * 4;
        (px, py)
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// Handle mouse drag panning
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            // Scale based on zoom: less sensitive when zoomed out
            let scale = if self.viewport.zoom < 2.0 {
                2
            } else if self.viewport.zoom < 4.0 {
                3
            } else {
                4
            };
            self.pan(dx * scale, dy * scale);
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    /// Update mouse cursor position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Get mouse position in braille pixel coordinates (for rendering)
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| Self::cell_to_pixel(col, row))
    }

    /// The marker under the cursor, if any, for the tooltip popup
    pub fn hovered_marker(&self) -> Option<&CaseMarker> {
        let cases = self.map_renderer.cases()?;
        let (px, py) = self.mouse_pixel_pos()?;
        let (lon, lat) = self.viewport.unproject(px, py);
        let radius_deg = self.viewport.degrees_per_pixel() * Self::HOVER_RADIUS_PX;
        cases.hit_test(lon, lat, radius_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{to_feature_collection, CountryInfo, CountryRecord};
    use geojson::JsonObject;

    fn layer(entries: &[(&str, f64, f64)]) -> CaseLayer {
        let records: Vec<CountryRecord> = entries
            .iter()
            .map(|&(country, lon, lat)| CountryRecord {
                country: country.to_string(),
                cases: 100,
                deaths: 0,
                recovered: 0,
                updated: None,
                country_info: CountryInfo {
                    lat: Some(lat),
                    long: Some(lon),
                    extra: JsonObject::new(),
                },
                extra: JsonObject::new(),
            })
            .collect();
        CaseLayer::from_features(&to_feature_collection(&records))
    }

    #[test]
    fn test_attach_non_empty_layer() {
        let mut app = App::new(80, 24);
        app.attach_cases(layer(&[("France", 2.2, 46.2)]));
        assert_eq!(app.fetch_status, FetchStatus::Loaded(1));
        assert!(app.map_renderer.cases().is_some());
    }

    #[test]
    fn test_empty_layer_not_attached() {
        let mut app = App::new(80, 24);
        app.attach_cases(layer(&[]));
        assert_eq!(app.fetch_status, FetchStatus::Done);
        assert!(app.map_renderer.cases().is_none());
    }

    #[test]
    fn test_finish_fetch_without_data() {
        let mut app = App::new(80, 24);
        app.finish_fetch();
        assert_eq!(app.fetch_status, FetchStatus::Done);
        assert!(app.map_renderer.cases().is_none());
    }

    #[test]
    fn test_finish_fetch_keeps_loaded_status() {
        let mut app = App::new(80, 24);
        app.attach_cases(layer(&[("France", 2.2, 46.2)]));
        app.finish_fetch();
        assert_eq!(app.fetch_status, FetchStatus::Loaded(1));
    }

    #[test]
    fn test_hover_finds_marker_under_cursor() {
        let mut app = App::new(80, 24);
        app.attach_cases(layer(&[("France", 2.2, 46.2)]));

        // Put the cursor right over the marker's projected cell
        let (px, py) = app.viewport.project(2.2, 46.2);
        let col = (px / 2 + 1) as u16;
        let row = (py / 4 + 1) as u16;
        app.set_mouse_pos(col, row);

        let hit = app.hovered_marker().expect("marker under cursor");
        assert_eq!(hit.tooltip.country, "France");
    }

    #[test]
    fn test_hover_without_layer_is_none() {
        let mut app = App::new(80, 24);
        app.set_mouse_pos(10, 10);
        assert!(app.hovered_marker().is_none());
    }

    #[test]
    fn test_reset_view_keeps_layer() {
        let mut app = App::new(80, 24);
        app.attach_cases(layer(&[("France", 2.2, 46.2)]));
        app.pan(50, 10);
        app.zoom_in();
        app.reset_view();
        assert_eq!(app.viewport.zoom, crate::map::Viewport::home(1, 1).zoom);
        assert!(app.map_renderer.cases().is_some());
    }
}
