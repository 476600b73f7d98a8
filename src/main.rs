use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use log::info;
use ratatui::DefaultTerminal;

use local_lens::app::{Action, App, AuthState, Mode};
use local_lens::config::Config;
use local_lens::data;
use local_lens::itinerary::ItineraryStore;
use local_lens::location::{detect_user_location, FixedLocation, LocationProvider, Unavailable};
use local_lens::logging;
use local_lens::map::MapRenderer;
use local_lens::repository::ExperienceRepository;
use local_lens::store::{DocumentStore, JsonFileKv, JsonFileStore, KeyValueStore};
use local_lens::ui;

fn main() -> Result<()> {
    let config = Config::parse();
    logging::init(&config.log_file)?;

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, config);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Keys while browsing the map and list
fn explore_key<S: DocumentStore, K: KeyValueStore>(app: &mut App<S, K>, key: KeyEvent) -> Option<Action> {
    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,

        // Pan with hjkl or left/right arrows, up/down move through the list
        KeyCode::Left | KeyCode::Char('h') => return pan(app, -10, 0),
        KeyCode::Right | KeyCode::Char('l') => return pan(app, 10, 0),
        KeyCode::Char('k') => return pan(app, 0, -6),
        KeyCode::Char('j') => return pan(app, 0, 6),
        KeyCode::Up => Action::StepCard(-1),
        KeyCode::Down => Action::StepCard(1),
        KeyCode::Enter => Action::ActivateHighlighted,

        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.zoom_in();
            return None;
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            app.zoom_out();
            return None;
        }
        KeyCode::Char('<') | KeyCode::Char(',') => {
            app.viewport.rotate(-15.0);
            return None;
        }
        KeyCode::Char('>') | KeyCode::Char('.') => {
            app.viewport.rotate(15.0);
            return None;
        }
        KeyCode::Char('t') => {
            app.viewport.tilt(5.0);
            return None;
        }
        KeyCode::Char('T') => {
            app.viewport.tilt(-5.0);
            return None;
        }
        KeyCode::Char('0') => {
            app.reset_camera();
            return None;
        }

        KeyCode::Char(']') => Action::CycleInterest(1),
        KeyCode::Char('[') => Action::CycleInterest(-1),
        KeyCode::Char('m') => Action::CycleMood(1),
        KeyCode::Char('M') => Action::CycleMood(-1),
        KeyCode::Char('s') => Action::SaveHighlighted,
        KeyCode::Char('a') => Action::Navigate(Mode::AddExperience),
        KeyCode::Char('i') => Action::Navigate(Mode::Itinerary),
        KeyCode::Char('o') => Action::Logout,
        KeyCode::Char('r') => Action::Reload,
        _ => return None,
    };
    Some(action)
}

fn pan<S: DocumentStore, K: KeyValueStore>(app: &mut App<S, K>, dx: i32, dy: i32) -> Option<Action> {
    app.pan(dx, dy);
    None
}

fn form_key(key: KeyEvent) -> Option<Action> {
    Some(match key.code {
        KeyCode::Esc => Action::Navigate(Mode::Explore),
        KeyCode::Tab | KeyCode::Down => Action::FormNext,
        KeyCode::BackTab | KeyCode::Up => Action::FormPrev,
        KeyCode::Enter => Action::Submit,
        KeyCode::Backspace => Action::FormBackspace,
        KeyCode::Char(c) => Action::FormInput(c),
        _ => return None,
    })
}

fn handle_key<S: DocumentStore, K: KeyValueStore>(app: &mut App<S, K>, key: KeyEvent, now: Instant) {
    let action = match app.mode {
        Mode::Explore => explore_key(app, key),
        Mode::AddExperience => form_key(key),
        Mode::Itinerary => match key.code {
            KeyCode::Esc | KeyCode::Char('i') => Some(Action::Navigate(Mode::Explore)),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        },
    };
    if let Some(action) = action {
        app.dispatch(action, now);
    }
}

/// Route a left click to whichever region it landed in
fn handle_click<S: DocumentStore, K: KeyValueStore>(app: &mut App<S, K>, col: u16, row: u16, now: Instant) {
    let layout = app.layout();
    let action = if row == layout.nav.y {
        ui::hotspot_at(&ui::nav_items(&app.auth, layout.nav), col)
    } else if row == layout.chips.y {
        ui::hotspot_at(&ui::chip_items(app, layout.chips), col)
    } else if app.map_pixel(col, row).is_some() {
        app.click_map(col, row, now);
        // Start a drag from here too
        app.last_mouse = Some((col, row));
        None
    } else {
        ui::card_action(app, col, row)
    };
    if let Some(action) = action {
        app.dispatch(action, now);
    }
}

fn handle_mouse<S: DocumentStore, K: KeyValueStore>(app: &mut App<S, K>, mouse: MouseEvent, now: Instant) {
    let over_map = app.map_pixel(mouse.column, mouse.row).is_some();
    match mouse.kind {
        // Scroll wheel zooms the map towards the pointer, or scrolls the list
        MouseEventKind::ScrollUp if over_map => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown if over_map => app.zoom_out_at(mouse.column, mouse.row),
        MouseEventKind::ScrollUp => app.dispatch(Action::StepCard(-1), now),
        MouseEventKind::ScrollDown => app.dispatch(Action::StepCard(1), now),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => handle_click(app, mouse.column, mouse.row, now),
        MouseEventKind::Drag(MouseButton::Left) if app.last_mouse.is_some() => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, config: Config) -> Result<()> {
    let mut map_renderer = MapRenderer::new();
    if config.data_dir.exists() {
        let loaded = data::load_basemap(&mut map_renderer, &config.data_dir);
        info!("Loaded {loaded} basemap files from {}", config.data_dir.display());
    }

    let provider: Box<dyn LocationProvider> = match config.here {
        Some(here) => Box::new(FixedLocation(here)),
        None => Box::new(Unavailable),
    };
    let user_location = detect_user_location(provider.as_ref());

    let store = JsonFileStore::open(&config.store);
    info!("Document store at {}", store.path().display());

    let size = terminal.size()?;
    let mut app = App::new(
        ExperienceRepository::new(store),
        ItineraryStore::new(JsonFileKv::open(&config.itinerary)),
        map_renderer,
        user_location,
        AuthState::from_user(config.user),
        size.width,
        size.height,
    );
    app.bootstrap(Instant::now());

    loop {
        let now = Instant::now();
        terminal.draw(|frame| ui::render(frame, &app, now))?;

        // ~60fps, fast enough for fly-to animations
        if event::poll(Duration::from_millis(16))? {
            let now = Instant::now();
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut app, key, now),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse, now),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }

    info!("Exiting");
    Ok(())
}
