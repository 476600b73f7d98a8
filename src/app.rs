use std::time::{Duration, Instant};

use log::{debug, error, info};
use ratatui::layout::Rect;

use crate::filter::{self, FilterState, FilteredIndex, InterestFilter, MoodFilter};
use crate::form::AddForm;
use crate::geo::{format_coordinate, Coordinate};
use crate::itinerary::{AddOutcome, ItineraryStore};
use crate::list::{ListView, CARD_HEIGHT};
use crate::location::FALLBACK_LOCATION;
use crate::map::{Camera, Lod, MapRenderer, MarkerLayer, Viewport, FOCUS_PITCH, FOCUS_ZOOM};
use crate::model::{Experience, ExperienceId};
use crate::repository::ExperienceRepository;
use crate::store::{DocumentStore, KeyValueStore};
use crate::toast::Toast;
use crate::ui::{self, ScreenLayout};

/// Camera the explore map starts with
pub const INITIAL_CAMERA: Camera = Camera {
    center: FALLBACK_LOCATION,
    zoom: 13.0,
    pitch: 45.0,
    bearing: -20.0,
};

/// Delay between publishing an experience and returning to explore
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// Which page is showing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Explore,
    AddExperience,
    Itinerary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
    SignedIn(String),
    SignedOut,
}

impl AuthState {
    pub fn from_user(user: Option<String>) -> Self {
        match user.filter(|u| !u.trim().is_empty()) {
            Some(name) => AuthState::SignedIn(name),
            None => AuthState::SignedOut,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn(_))
    }
}

/// User intents, already resolved from keys, clicks and chip positions
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SelectInterest(InterestFilter),
    SelectMood(MoodFilter),
    CycleInterest(isize),
    CycleMood(isize),
    ClickMarker(ExperienceId),
    ClickCard(ExperienceId),
    StepCard(isize),
    ActivateHighlighted,
    Save(ExperienceId),
    SaveHighlighted,
    PickLocation(Coordinate),
    Navigate(Mode),
    Login,
    Logout,
    Reload,
    FormInput(char),
    FormBackspace,
    FormNext,
    FormPrev,
    Submit,
    Quit,
}

/// Page session: owns the data, the derived views and the camera
pub struct App<S, K> {
    repo: ExperienceRepository<S>,
    itinerary: ItineraryStore<K>,
    pub experiences: Vec<Experience>,
    pub filter: FilterState,
    pub filtered: FilteredIndex,
    pub interest_options: Vec<InterestFilter>,
    pub mood_options: Vec<MoodFilter>,
    pub markers: MarkerLayer,
    pub list: ListView,
    pub viewport: Viewport,
    pub map_renderer: MapRenderer,
    pub user_location: Coordinate,
    pub auth: AuthState,
    pub mode: Mode,
    pub form: AddForm,
    pub saved: Vec<Experience>,
    pub toast: Toast,
    redirect_at: Option<Instant>,
    screen: Rect,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
}

impl<S: DocumentStore, K: KeyValueStore> App<S, K> {
    pub fn new(
        repo: ExperienceRepository<S>,
        itinerary: ItineraryStore<K>,
        map_renderer: MapRenderer,
        user_location: Coordinate,
        auth: AuthState,
        width: u16,
        height: u16,
    ) -> Self {
        let mut app = Self {
            repo,
            itinerary,
            experiences: Vec::new(),
            filter: FilterState::default(),
            filtered: FilteredIndex::default(),
            interest_options: vec![InterestFilter::All],
            mood_options: vec![MoodFilter::Any],
            markers: MarkerLayer::new(),
            list: ListView::new(),
            viewport: Viewport::new(INITIAL_CAMERA, 0, 0),
            map_renderer,
            user_location,
            auth,
            mode: Mode::Explore,
            form: AddForm::default(),
            saved: Vec::new(),
            toast: Default::default(),
            redirect_at: None,
            screen: Rect::default(),
            should_quit: false,
            last_mouse: None,
        };
        app.resize(width, height);
        app
    }

    /// Initial data load
    pub fn bootstrap(&mut self, now: Instant) {
        self.reload(now);
    }

    /// Fetch the full collection and rebuild every view
    pub fn reload(&mut self, now: Instant) {
        match self.repo.load_all() {
            Ok(experiences) => self.experiences = experiences,
            Err(e) => {
                error!("Loading experiences failed: {e}");
                self.toast.show("Could not load experiences", now);
            }
        }
        self.interest_options = filter::interest_options(&self.experiences);
        self.mood_options = filter::mood_options(&self.experiences);
        // A selection whose option vanished would silently show nothing
        if !self.interest_options.contains(&self.filter.interest) {
            self.filter.interest = InterestFilter::All;
        }
        if !self.mood_options.contains(&self.filter.mood) {
            self.filter.mood = MoodFilter::Any;
        }
        self.apply_filters();
    }

    /// Recompute the filtered view and re-render list and map from it
    pub fn apply_filters(&mut self) {
        self.filtered = filter::apply(&self.experiences, &self.filter);
        let visible = self.visible_cards();
        self.list.render(&self.filtered, self.user_location, visible);
        self.markers.sync(&self.filtered);
        debug!(
            "Filter {}/{}: {} listed, {} on map",
            self.filter.interest.label(),
            self.filter.mood.label(),
            self.filtered.len(),
            self.markers.len()
        );
    }

    pub fn layout(&self) -> ScreenLayout {
        ui::screen_layout(self.screen)
    }

    /// Update viewport size when the terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen = Rect::new(0, 0, width, height);
        let map = self.layout().map_inner;
        // Braille gives 2x4 resolution per character
        self.viewport.width = map.width as usize * 2;
        self.viewport.height = map.height as usize * 4;
    }

    /// How many cards fit in the list panel
    pub fn visible_cards(&self) -> usize {
        (self.layout().list_inner.height / CARD_HEIGHT).max(1) as usize
    }

    pub fn dispatch(&mut self, action: Action, now: Instant) {
        match action {
            Action::SelectInterest(interest) => {
                self.filter.interest = interest;
                self.apply_filters();
            }
            Action::SelectMood(mood) => {
                self.filter.mood = mood;
                self.apply_filters();
            }
            Action::CycleInterest(delta) => {
                let next = cycle(&self.interest_options, &self.filter.interest, delta);
                self.dispatch(Action::SelectInterest(next), now);
            }
            Action::CycleMood(delta) => {
                let next = cycle(&self.mood_options, &self.filter.mood, delta);
                self.dispatch(Action::SelectMood(next), now);
            }
            Action::ClickMarker(id) => self.click_marker(&id),
            Action::ClickCard(id) => self.click_card(&id),
            Action::StepCard(delta) => {
                let visible = self.visible_cards();
                self.list.step(delta, visible);
            }
            Action::ActivateHighlighted => {
                if let Some(id) = self.list.highlighted_id().cloned() {
                    self.click_card(&id);
                }
            }
            Action::Save(id) => self.save_to_itinerary(&id, now),
            Action::SaveHighlighted => {
                if let Some(id) = self.list.highlighted_id().cloned() {
                    self.save_to_itinerary(&id, now);
                }
            }
            Action::PickLocation(c) => {
                if self.mode == Mode::AddExperience {
                    self.form.set_location(c);
                }
            }
            Action::Navigate(mode) => self.navigate(mode, now),
            Action::Login => self.toast.show("Restart with --user NAME to sign in", now),
            Action::Logout => {
                if let AuthState::SignedIn(name) = &self.auth {
                    info!("{name} signed out");
                }
                self.auth = AuthState::SignedOut;
                self.navigate(Mode::Explore, now);
            }
            Action::Reload => self.reload(now),
            Action::FormInput(c) => self.form.insert(c),
            Action::FormBackspace => self.form.backspace(),
            Action::FormNext => self.form.focus_next(),
            Action::FormPrev => self.form.focus_prev(),
            Action::Submit => self.submit(now),
            Action::Quit => self.should_quit = true,
        }
    }

    fn navigate(&mut self, mode: Mode, now: Instant) {
        match mode {
            Mode::AddExperience if !self.auth.is_signed_in() => {
                self.toast.show("Sign in to add experiences", now);
                return;
            }
            Mode::AddExperience => self.form = AddForm::default(),
            Mode::Itinerary => match self.itinerary.list() {
                Ok(saved) => self.saved = saved,
                Err(e) => {
                    error!("Reading itinerary failed: {e}");
                    self.toast.show("Could not read itinerary", now);
                    return;
                }
            },
            Mode::Explore => {}
        }
        self.redirect_at = None;
        self.mode = mode;
    }

    /// Marker click: highlight the matching card and fly to the marker
    pub fn click_marker(&mut self, id: &ExperienceId) {
        let visible = self.visible_cards();
        self.list.highlight(id, visible);
        if let Some(marker) = self.markers.get(id) {
            self.viewport.fly_to(marker.coordinate, FOCUS_ZOOM, FOCUS_PITCH);
        }
    }

    /// Card click: highlight it and fly to its marker when it has one
    pub fn click_card(&mut self, id: &ExperienceId) {
        let visible = self.visible_cards();
        if self.list.highlight(id, visible).is_none() {
            return;
        }
        if let Some(marker) = self.markers.get(id) {
            self.viewport.fly_to(marker.coordinate, FOCUS_ZOOM, FOCUS_PITCH);
        }
    }

    pub fn save_to_itinerary(&mut self, id: &ExperienceId, now: Instant) {
        let Some(experience) = self.experiences.iter().find(|e| &e.id == id) else {
            return;
        };
        match self.itinerary.add(experience) {
            Ok(AddOutcome::Added) => self.toast.show("Added", now),
            Ok(AddOutcome::AlreadyPresent) => self.toast.show("Already added", now),
            Err(e) => {
                error!("Saving {id} to itinerary failed: {e}");
                self.toast.show("Could not save to itinerary", now);
            }
        }
    }

    fn submit(&mut self, now: Instant) {
        if self.mode != Mode::AddExperience || self.redirect_at.is_some() {
            return;
        }
        let draft = match self.form.to_draft() {
            Ok(draft) => draft,
            Err(e) => {
                self.toast.show(e.to_string(), now);
                return;
            }
        };
        match self.repo.create(draft) {
            Ok(created) => {
                info!("Created {} at {}", created.id, created.coordinate().map(format_coordinate).unwrap_or_default());
                self.toast.show("Experience Published!", now);
                self.redirect_at = Some(now + REDIRECT_DELAY);
            }
            Err(e) => {
                error!("Publishing experience failed: {e}");
                self.toast.show("Could not publish experience", now);
            }
        }
    }

    /// Advance timers and animations; call once per frame
    pub fn tick(&mut self, now: Instant) {
        self.viewport.advance();
        self.toast.expire(now);
        if self.redirect_at.is_some_and(|at| now >= at) {
            self.redirect_at = None;
            self.mode = Mode::Explore;
            self.reload(now);
        }
    }

    /// Map click at a terminal cell: marker hit in explore, location pick in the form
    pub fn click_map(&mut self, col: u16, row: u16, now: Instant) {
        let Some((px, py)) = self.map_pixel(col, row) else {
            return;
        };
        match self.mode {
            Mode::AddExperience => {
                let picked = self.viewport.unproject(px, py);
                self.dispatch(Action::PickLocation(picked), now);
            }
            _ => {
                if let Some(id) = self.markers.hit_test(&self.viewport, px, py).map(|m| m.id.clone()) {
                    self.dispatch(Action::ClickMarker(id), now);
                }
            }
        }
    }

    /// Terminal cell to braille pixel inside the map, `None` outside it
    pub fn map_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let map = self.layout().map_inner;
        if col < map.x || row < map.y || col >= map.x + map.width || row >= map.y + map.height {
            return None;
        }
        // Centre of the cell's 2x4 dot block
        Some(((col - map.x) as i32 * 2 + 1, (row - map.y) as i32 * 4 + 2))
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_in_at(px, py);
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_out_at(px, py);
        }
    }

    pub fn reset_camera(&mut self) {
        let (width, height) = (self.viewport.width, self.viewport.height);
        self.viewport = Viewport::new(INITIAL_CAMERA, width, height);
    }

    /// Drag to pan, scaled so the map follows the pointer
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = (last_x as i32 - x as i32) * 2;
            let dy = (last_y as i32 - y as i32) * 4;
            self.pan(dx, dy);
        }
        self.last_mouse = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn status_line(&self) -> String {
        let c = &self.viewport.camera;
        format!(
            "{} | z{:.1} {} pitch {:.0}° bearing {:.0}° | {}",
            self.list.result_count(),
            c.zoom,
            Lod::from_zoom(c.zoom).label(),
            c.pitch,
            c.bearing,
            format_coordinate(c.center)
        )
    }
}

/// Option `delta` steps away from `current`, wrapping around
fn cycle<T: Clone + PartialEq>(options: &[T], current: &T, delta: isize) -> T {
    let n = options.len() as isize;
    if n == 0 {
        return current.clone();
    }
    let at = options.iter().position(|o| o == current).unwrap_or(0) as isize;
    options[(at + delta).rem_euclid(n) as usize].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::EXPERIENCES;
    use crate::store::{Document, MemoryKv, MemoryStore};
    use simd_json::json;

    type TestApp = App<MemoryStore, MemoryKv>;

    fn docs() -> Vec<Document> {
        vec![
            Document {
                id: "rk".into(),
                fields: json!({"title": "Rushikonda", "interest": ["beach"], "mood": "relaxed",
                               "lat": 17.7826, "lng": 83.3853}),
            },
            Document {
                id: "ft".into(),
                fields: json!({"title": "Food street", "interest": ["food"], "mood": "lively",
                               "lat": 17.7126, "lng": 83.2985}),
            },
            Document {
                id: "nc".into(),
                fields: json!({"title": "No coords", "interest": ["beach"], "mood": "lively"}),
            },
        ]
    }

    fn app(auth: AuthState) -> TestApp {
        let mut app = App::new(
            ExperienceRepository::new(MemoryStore::with_documents(EXPERIENCES, docs())),
            ItineraryStore::new(MemoryKv::new()),
            MapRenderer::new(),
            FALLBACK_LOCATION,
            auth,
            120,
            40,
        );
        app.bootstrap(Instant::now());
        app
    }

    fn listed(app: &TestApp) -> Vec<&str> {
        app.list.cards().iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_bootstrap_lists_everything_and_maps_located() {
        let app = app(AuthState::SignedOut);
        assert_eq!(listed(&app), vec!["rk", "ft", "nc"]);
        assert_eq!(app.markers.len(), 2);
        assert_eq!(app.list.result_count(), "3 results");
        assert!(app.viewport.width > 0 && app.viewport.height > 0);
    }

    #[test]
    fn test_chip_and_mood_refilter_both_surfaces() {
        let mut app = app(AuthState::SignedOut);
        let now = Instant::now();
        app.dispatch(Action::SelectInterest(InterestFilter::Tag("beach".into())), now);
        assert_eq!(listed(&app), vec!["rk", "nc"]);
        assert_eq!(app.markers.len(), 1);

        app.dispatch(Action::SelectMood(MoodFilter::Is("lively".into())), now);
        assert_eq!(listed(&app), vec!["nc"]);
        assert!(app.markers.is_empty());
    }

    #[test]
    fn test_marker_click_highlights_card_and_flies() {
        let mut app = app(AuthState::SignedOut);
        app.dispatch(Action::ClickMarker("ft".into()), Instant::now());
        assert_eq!(app.list.highlighted_id().map(|id| id.as_str()), Some("ft"));
        let target = app.viewport.flight_target().expect("flying");
        assert_eq!(target.center, Coordinate::new(17.7126, 83.2985));
        assert_eq!(target.zoom, FOCUS_ZOOM);
        assert_eq!(target.pitch, FOCUS_PITCH);
    }

    #[test]
    fn test_card_without_marker_highlights_without_flying() {
        let mut app = app(AuthState::SignedOut);
        app.dispatch(Action::ClickCard("nc".into()), Instant::now());
        assert_eq!(app.list.highlighted(), Some(2));
        assert!(app.viewport.flight_target().is_none());
    }

    #[test]
    fn test_save_twice_reports_already_added() {
        let mut app = app(AuthState::SignedOut);
        let now = Instant::now();
        app.dispatch(Action::Save("rk".into()), now);
        assert_eq!(app.toast.visible(now), Some("Added"));
        app.dispatch(Action::Save("rk".into()), now);
        assert_eq!(app.toast.visible(now), Some("Already added"));

        app.dispatch(Action::Navigate(Mode::Itinerary), now);
        assert_eq!(app.mode, Mode::Itinerary);
        assert_eq!(app.saved.len(), 1);
    }

    #[test]
    fn test_add_requires_sign_in() {
        let mut app = app(AuthState::SignedOut);
        app.dispatch(Action::Navigate(Mode::AddExperience), Instant::now());
        assert_eq!(app.mode, Mode::Explore);
    }

    #[test]
    fn test_publish_then_redirect_reloads() {
        let mut app = app(AuthState::SignedIn("asha".into()));
        let now = Instant::now();
        app.dispatch(Action::Navigate(Mode::AddExperience), now);
        "Kailasagiri".chars().for_each(|c| app.dispatch(Action::FormInput(c), now));
        app.dispatch(Action::PickLocation(Coordinate::new(17.7494, 83.3425)), now);
        app.dispatch(Action::Submit, now);
        assert_eq!(app.toast.visible(now), Some("Experience Published!"));
        assert_eq!(app.mode, Mode::AddExperience);

        app.tick(now + Duration::from_millis(100));
        assert_eq!(app.mode, Mode::AddExperience);

        app.tick(now + REDIRECT_DELAY);
        assert_eq!(app.mode, Mode::Explore);
        assert_eq!(app.list.cards().len(), 4);
        assert_eq!(app.markers.len(), 3);
    }

    #[test]
    fn test_submit_without_location_shows_reason() {
        let mut app = app(AuthState::SignedIn("asha".into()));
        let now = Instant::now();
        app.dispatch(Action::Navigate(Mode::AddExperience), now);
        app.dispatch(Action::FormInput('x'), now);
        app.dispatch(Action::Submit, now);
        assert_eq!(app.toast.visible(now), Some("Pick a location on the map"));
    }

    #[test]
    fn test_logout_returns_to_explore() {
        let mut app = app(AuthState::SignedIn("asha".into()));
        let now = Instant::now();
        app.dispatch(Action::Navigate(Mode::AddExperience), now);
        app.dispatch(Action::Logout, now);
        assert_eq!(app.auth, AuthState::SignedOut);
        assert_eq!(app.mode, Mode::Explore);
    }

    #[test]
    fn test_cycle_wraps() {
        let options = vec![InterestFilter::All, InterestFilter::Tag("beach".into())];
        assert_eq!(cycle(&options, &InterestFilter::All, -1), InterestFilter::Tag("beach".into()));
        assert_eq!(cycle(&options, &InterestFilter::Tag("beach".into()), 1), InterestFilter::All);
    }

    #[test]
    fn test_map_click_on_marker() {
        let mut app = app(AuthState::SignedOut);
        let now = Instant::now();
        // Centre the camera on the first marker so it sits mid-map
        app.viewport.camera.center = Coordinate::new(17.7826, 83.3853);
        let map = app.layout().map_inner;
        app.click_map(map.x + map.width / 2, map.y + map.height / 2, now);
        assert_eq!(app.list.highlighted_id().map(|id| id.as_str()), Some("rk"));
    }
}
