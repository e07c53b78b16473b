use anyhow::Result;
use corona_map::api;
use corona_map::app::App;
use corona_map::cases::CaseLayer;
use corona_map::model::to_feature_collection;
use corona_map::{data, ui};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture for hover tooltips, drag panning and zooming
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Kick off the one-shot dataset fetch; the UI loop stays responsive
    // while it is in flight and picks the layer up from the channel.
    let (tx, rx) = mpsc::unbounded_channel();
    spawn_fetch(tx);

    let result = run(&mut terminal, rx);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Log to a file: the terminal itself belongs to the map.
fn init_logging() -> Result<()> {
    let log_file = std::fs::File::create("corona-map.log")?;
    tracing_subscriber::fmt()
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .init();
    Ok(())
}

/// Fetch the dataset and build the marker layer off the UI loop.
/// Failures are logged and swallowed: the map stays up with no markers.
/// If the app exits before the response lands, the receiver is gone and
/// the send is a no-op, so a late response never touches torn-down state.
fn spawn_fetch(tx: mpsc::UnboundedSender<CaseLayer>) {
    tokio::spawn(async move {
        let client = match api::client() {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("failed to build http client: {e:#}");
                return;
            }
        };

        match api::fetch_countries(&client).await {
            Ok(records) => {
                tracing::info!("fetched {} country records", records.len());
                let layer = CaseLayer::from_features(&to_feature_collection(&records));
                let _ = tx.send(layer);
            }
            Err(e) => {
                tracing::error!("failed to fetch countries: {e:#}");
            }
        }
    });
}

/// Handle mouse events for hover, panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for the cursor marker and tooltips
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Click and drag to pan
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, mut rx: mpsc::UnboundedReceiver<CaseLayer>) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize);

    // Base layers: Natural Earth GeoJSON when available, built-in
    // outline otherwise
    let data_dir = Path::new("data");
    if data_dir.exists() {
        let _ = data::load_base_layers(&mut app.map_renderer, data_dir);
    }
    if !app.map_renderer.has_data() {
        data::builtin_world_outline(&mut app.map_renderer);
    }

    // Main loop
    loop {
        // Pick up the fetched layer, if it has arrived
        match rx.try_recv() {
            Ok(layer) => app.attach_cases(layer),
            Err(mpsc::error::TryRecvError::Disconnected) => app.finish_fetch(),
            Err(mpsc::error::TryRecvError::Empty) => {}
        }

        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Pan with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                            KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                            KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                            KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                            // Layer toggles
                            KeyCode::Char('b') | KeyCode::Char('B') => {
                                app.map_renderer.toggle_borders();
                            }
                            KeyCode::Char('c') | KeyCode::Char('C') => {
                                app.map_renderer.toggle_markers();
                            }
                            KeyCode::Char('L') => {
                                app.map_renderer.toggle_labels();
                            }

                            // Reset view (keeps the attached layer)
                            KeyCode::Char('r') | KeyCode::Char('0') => {
                                app.reset_view();
                            }

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
