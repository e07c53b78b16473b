use crate::app::{App, FetchStatus};
use crate::cases::CaseMarker;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);

    if let Some(marker) = app.hovered_marker() {
        render_tooltip(frame, app, marker, chunks[0]);
    }
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " COVID-19 Country Cases ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Render to the inner size; braille gives 2x4 resolution per char
    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = app
        .map_renderer
        .render(inner.width as usize, inner.height as usize, &viewport);

    // Cursor marker position in character coords, if inside the map
    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    let map_widget = MapWidget {
        layers,
        cursor_pos,
        inner_width: inner.width,
        inner_height: inner.height,
    };
    frame.render_widget(map_widget, inner);
}

/// Widget composing the braille layers with text labels overlaid
struct MapWidget {
    layers: crate::map::MapLayers,
    cursor_pos: Option<(u16, u16)>,
    inner_width: u16,
    inner_height: u16,
}

impl MapWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(
        &self,
        canvas: &crate::braille::BrailleCanvas,
        color: Color,
        area: Rect,
        buf: &mut Buffer,
    ) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Base layer at the back, markers on top
        self.render_layer(&self.layers.base, Color::Cyan, area, buf);
        self.render_layer(&self.layers.markers, Color::Red, area, buf);

        // Case-count labels beside markers
        let label_style = Style::default().fg(Color::White);
        for (lx, ly, text) in &self.layers.labels {
            if *ly >= self.inner_height || *lx >= self.inner_width {
                continue;
            }
            let y = area.y + *ly;

            let max_len = (self.inner_width.saturating_sub(*lx)) as usize;
            let display_text: String = text.chars().take(max_len.min(8)).collect();

            for (i, ch) in display_text.chars().enumerate() {
                let px = area.x + *lx + i as u16;
                if px < area.x + area.width {
                    buf[(px, y)].set_char(ch).set_style(label_style);
                }
            }
        }

        // Cursor marker
        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Yellow);
            }
        }
    }
}

/// Tooltip popup for the hovered marker: country, counts, and the
/// last-update line (omitted when the source value was absent).
fn render_tooltip(frame: &mut Frame, app: &App, marker: &CaseMarker, map_area: Rect) {
    let tooltip = &marker.tooltip;

    let mut lines = vec![
        Line::from(Span::styled(
            tooltip.country.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Confirmed: {}", tooltip.cases)),
        Line::from(format!("Deaths: {}", tooltip.deaths)),
        Line::from(format!("Recovered: {}", tooltip.recovered)),
    ];
    if let Some(updated) = &tooltip.updated {
        lines.push(Line::from(format!("Last Update: {updated}")));
    }

    let width = lines
        .iter()
        .map(|l| l.width())
        .max()
        .unwrap_or(0) as u16
        + 2;
    let height = lines.len() as u16 + 2;

    let (cursor_col, cursor_row) = app.mouse_pos.unwrap_or((map_area.x, map_area.y));

    // Prefer below-right of the cursor, flip when it would overflow
    let mut x = cursor_col.saturating_add(2);
    let mut y = cursor_row.saturating_add(1);
    if x + width > map_area.x + map_area.width {
        x = cursor_col.saturating_sub(width + 1);
    }
    if y + height > map_area.y + map_area.height {
        y = cursor_row.saturating_sub(height);
    }
    let x = x.max(map_area.x);
    let y = y.max(map_area.y);
    let popup = Rect {
        x,
        y,
        width: width.min(map_area.width),
        height: height.min(map_area.height),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.map_renderer.settings;

    let fetch_span = match app.fetch_status {
        FetchStatus::Fetching => Span::styled("fetching cases…", Style::default().fg(Color::Yellow)),
        FetchStatus::Loaded(n) => Span::styled(
            format!("{n} countries"),
            Style::default().fg(Color::Green),
        ),
        FetchStatus::Done => Span::styled("no data", Style::default().fg(Color::DarkGray)),
    };

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        fetch_span,
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            if settings.show_borders { "[B]orders " } else { "[b]orders " },
            Style::default().fg(if settings.show_borders { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            if settings.show_markers { "[C]ases " } else { "[c]ases " },
            Style::default().fg(if settings.show_markers { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            if settings.show_labels { "[L]abels " } else { "[l]abels " },
            Style::default().fg(if settings.show_labels { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            "| hjkl:pan +/-:zoom r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
