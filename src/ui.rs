use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

use crate::app::{Action, App, AuthState, Mode};
use crate::braille::BrailleCanvas;
use crate::form::FormField;
use crate::geo::distance_km;
use crate::list::CARD_HEIGHT;
use crate::map::{GlyphKind, MapLayers, Scene};
use crate::store::{DocumentStore, KeyValueStore};

/// Width of the per-card save button, including padding
const SAVE_BUTTON: &str = " [+] ";

/// Screen regions, shared by rendering and mouse hit-testing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenLayout {
    pub nav: Rect,
    pub chips: Rect,
    pub list: Rect,
    pub list_inner: Rect,
    pub map: Rect,
    pub map_inner: Rect,
    pub status: Rect,
}

pub fn screen_layout(area: Rect) -> ScreenLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Nav
            Constraint::Length(1), // Chips
            Constraint::Min(3),    // List + map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(rows[2]);

    let bordered = Block::default().borders(Borders::ALL);
    ScreenLayout {
        nav: rows[0],
        chips: rows[1],
        list: main[0],
        list_inner: bordered.inner(main[0]),
        map: main[1],
        map_inner: bordered.inner(main[1]),
        status: rows[3],
    }
}

/// A clickable span on a one-line bar
#[derive(Clone, Debug, PartialEq)]
pub struct Hotspot {
    pub x: u16,
    pub label: String,
    pub action: Option<Action>,
}

impl Hotspot {
    fn width(&self) -> u16 {
        self.label.chars().count() as u16
    }
}

fn lay_out(x0: u16, items: Vec<(String, Option<Action>)>) -> Vec<Hotspot> {
    let mut x = x0;
    items
        .into_iter()
        .map(|(label, action)| {
            let spot = Hotspot { x, label, action };
            x = x.saturating_add(spot.width() + 1);
            spot
        })
        .collect()
}

/// Action of the hotspot covering column `col`
pub fn hotspot_at(spots: &[Hotspot], col: u16) -> Option<Action> {
    spots
        .iter()
        .find(|s| col >= s.x && col < s.x + s.width())
        .and_then(|s| s.action.clone())
}

/// Navigation entries for the current auth state
pub fn nav_items(auth: &AuthState, area: Rect) -> Vec<Hotspot> {
    let mut items = vec![(" Explore ".to_string(), Some(Action::Navigate(Mode::Explore)))];
    match auth {
        AuthState::SignedIn(name) => {
            items.push((" Add Experience ".into(), Some(Action::Navigate(Mode::AddExperience))));
            items.push((" Itinerary ".into(), Some(Action::Navigate(Mode::Itinerary))));
            items.push((format!(" Logout ({name}) "), Some(Action::Logout)));
        }
        AuthState::SignedOut => {
            items.push((" Login ".into(), Some(Action::Login)));
            items.push((" Sign Up ".into(), Some(Action::Login)));
        }
    }
    lay_out(area.x + 12, items)
}

/// Interest chips followed by the mood selector
pub fn chip_items<S, K>(app: &App<S, K>, area: Rect) -> Vec<Hotspot>
where
    S: DocumentStore,
    K: KeyValueStore,
{
    let mut items = vec![("Interest:".to_string(), None)];
    items.extend(
        app.interest_options
            .iter()
            .map(|i| (format!(" {} ", i.label()), Some(Action::SelectInterest(i.clone())))),
    );
    items.push(("│ Mood:".into(), None));
    items.push((format!(" {} ▾ ", app.filter.mood.label()), Some(Action::CycleMood(1))));
    lay_out(area.x + 1, items)
}

/// Resolve a click inside the list panel to a card action
pub fn card_action<S, K>(app: &App<S, K>, col: u16, row: u16) -> Option<Action>
where
    S: DocumentStore,
    K: KeyValueStore,
{
    let inner = app.layout().list_inner;
    if app.mode != Mode::Explore || row < inner.y || row >= inner.y + inner.height {
        return None;
    }
    if col < inner.x || col >= inner.x + inner.width {
        return None;
    }
    let rel = row - inner.y;
    let card = app.list.card_at_row(rel)?;
    let on_button = rel % CARD_HEIGHT == 0
        && col >= (inner.x + inner.width).saturating_sub(SAVE_BUTTON.len() as u16);
    Some(if on_button {
        Action::Save(card.id.clone())
    } else {
        Action::ClickCard(card.id.clone())
    })
}

/// Render the UI
pub fn render<S, K>(frame: &mut Frame, app: &App<S, K>, now: Instant)
where
    S: DocumentStore,
    K: KeyValueStore,
{
    let layout = screen_layout(frame.area());

    render_nav(frame, app, layout.nav);
    render_chips(frame, app, layout.chips);
    match app.mode {
        Mode::AddExperience => render_form(frame, app, layout.list),
        _ => render_list(frame, app, layout.list),
    }
    render_map(frame, app, layout.map);
    render_status_bar(frame, app, layout.status);

    if app.mode == Mode::Itinerary {
        render_itinerary(frame, app, layout.map);
    }
    if let Some(message) = app.toast.visible(now) {
        render_toast(frame, message, layout.map);
    }
}

fn render_nav<S: DocumentStore, K: KeyValueStore>(frame: &mut Frame, app: &App<S, K>, area: Rect) {
    let mut spans = vec![Span::styled(
        " LocalLens ",
        Style::default().fg(Color::Black).bg(Color::Rgb(255, 123, 0)).add_modifier(Modifier::BOLD),
    )];
    let mut x = area.x + spans[0].width() as u16;
    for spot in nav_items(&app.auth, area) {
        spans.push(Span::raw(" ".repeat(spot.x.saturating_sub(x) as usize)));
        let active = match &spot.action {
            Some(Action::Navigate(mode)) => *mode == app.mode,
            _ => false,
        };
        let style = if active {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::Gray)
        };
        x = spot.x + spot.width();
        spans.push(Span::styled(spot.label, style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_chips<S: DocumentStore, K: KeyValueStore>(frame: &mut Frame, app: &App<S, K>, area: Rect) {
    let mut spans = Vec::new();
    let mut x = area.x;
    for spot in chip_items(app, area) {
        spans.push(Span::raw(" ".repeat(spot.x.saturating_sub(x) as usize)));
        let style = match &spot.action {
            Some(Action::SelectInterest(i)) if *i == app.filter.interest => {
                Style::default().fg(Color::Black).bg(Color::Rgb(255, 123, 0))
            }
            Some(Action::SelectInterest(_)) => {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            }
            Some(_) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            None => Style::default().fg(Color::DarkGray),
        };
        x = spot.x + spot.width();
        spans.push(Span::styled(spot.label, style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn panel(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

fn render_list<S: DocumentStore, K: KeyValueStore>(frame: &mut Frame, app: &App<S, K>, area: Rect) {
    let block = panel(format!(" Experiences · {} ", app.list.result_count()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.list.cards().is_empty() {
        let empty = Paragraph::new("No experiences match these filters")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = (inner.height / CARD_HEIGHT) as usize + 1;
    let muted = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::with_capacity(visible * CARD_HEIGHT as usize);
    for (i, card) in app.list.cards().iter().enumerate().skip(app.list.offset()).take(visible) {
        let active = app.list.highlighted() == Some(i);
        let title_style = if active {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        };

        let room = (inner.width as usize).saturating_sub(SAVE_BUTTON.len());
        let title: String = card.title.chars().take(room).collect();
        let pad = room.saturating_sub(title.chars().count());
        lines.push(Line::from(vec![
            Span::styled(format!("{title}{}", " ".repeat(pad)), title_style),
            Span::styled(SAVE_BUTTON, Style::default().fg(Color::Green)),
        ]));
        lines.push(Line::from(Span::raw(card.description.clone())));

        let mut meta = vec![Span::styled(card.distance.to_string(), muted)];
        if let Some(city) = &card.city {
            meta.push(Span::styled(format!(" · {city}"), muted));
        }
        if let Some(rating) = card.rating {
            meta.push(Span::styled(format!(" · ★ {rating:.1}"), Style::default().fg(Color::Yellow)));
        }
        lines.push(Line::from(meta));
        lines.push(Line::default());
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_form<S: DocumentStore, K: KeyValueStore>(frame: &mut Frame, app: &App<S, K>, area: Rect) {
    let block = panel(" Add Experience ".into());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    for field in FormField::ALL {
        let focused = app.form.focus() == field;
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut value = app.form.value(field).to_string();
        if focused {
            value.push('▏');
        }
        lines.push(Line::from(Span::styled(field.label(), label_style)));
        lines.push(Line::from(Span::raw(format!("  {value}"))));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Click the map to pick a location",
        Style::default().fg(Color::Green),
    )));
    lines.push(Line::from(Span::styled(
        "Tab next field · Enter publish · Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_map<S: DocumentStore, K: KeyValueStore>(frame: &mut Frame, app: &App<S, K>, area: Rect) {
    let title = if app.mode == Mode::AddExperience { " Pick a location " } else { " Map " };
    let block = panel(title.into());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let scene = Scene {
        markers: &app.markers,
        highlighted: app.list.highlighted_id(),
        user: app.user_location,
        picker: (app.mode == Mode::AddExperience).then(|| app.form.picked()).flatten(),
    };
    let layers = app
        .map_renderer
        .render(inner.width as usize, inner.height as usize, &app.viewport, &scene);
    frame.render_widget(MapWidget { layers }, inner);
}

/// Braille basemap with marker glyphs overlaid
struct MapWidget {
    layers: MapLayers,
}

impl MapWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        let rows = canvas.height().min(area.height as usize);
        let cols = canvas.width().min(area.width as usize);
        for cy in 0..rows {
            for cx in 0..cols {
                if let Some(ch) = canvas.glyph(cx, cy) {
                    buf[(area.x + cx as u16, area.y + cy as u16)].set_char(ch).set_fg(color);
                }
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Self::render_layer(&self.layers.basemap, Color::Rgb(70, 110, 140), area, buf);
        Self::render_layer(&self.layers.overlay, Color::LightCyan, area, buf);

        for glyph in &self.layers.glyphs {
            if glyph.x >= area.width || glyph.y >= area.height {
                continue;
            }
            let color = match glyph.kind {
                GlyphKind::Marker => Color::Rgb(255, 123, 0),
                GlyphKind::Highlighted => Color::LightYellow,
                GlyphKind::Picker => Color::Rgb(0, 255, 103),
            };
            buf[(area.x + glyph.x, area.y + glyph.y)]
                .set_char(glyph.symbol)
                .set_style(Style::default().fg(color).add_modifier(Modifier::BOLD));
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_itinerary<S: DocumentStore, K: KeyValueStore>(frame: &mut Frame, app: &App<S, K>, area: Rect) {
    let popup = centered(area, area.width.saturating_sub(8), area.height.saturating_sub(4));
    frame.render_widget(Clear, popup);
    let block = panel(format!(" Itinerary · {} saved ", app.saved.len()));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let lines: Vec<Line> = if app.saved.is_empty() {
        vec![Line::from(Span::styled(
            "Nothing saved yet. Press s or click [+] on a card.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        app.saved
            .iter()
            .map(|e| {
                let distance = e
                    .coordinate()
                    .map(|c| format!("{:.1} km", distance_km(app.user_location, c)))
                    .unwrap_or_else(|| "distance unavailable".into());
                Line::from(vec![
                    Span::styled(e.title().to_string(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(format!("  {distance}"), Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect()
    };
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_toast(frame: &mut Frame, message: &str, map: Rect) {
    let width = (message.chars().count() as u16 + 4).min(map.width);
    let area = Rect::new(map.x + map.width.saturating_sub(width + 1), map.y + 1, width, map.height.min(3));
    frame.render_widget(Clear, area);
    let toast = Paragraph::new(message).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(255, 123, 0))),
    );
    frame.render_widget(toast, area);
}

fn render_status_bar<S: DocumentStore, K: KeyValueStore>(frame: &mut Frame, app: &App<S, K>, area: Rect) {
    let help = match app.mode {
        Mode::Explore => " | ↑↓:select ⏎:focus s:save [ ]:interest m:mood hjkl:pan +/-:zoom </>:rotate t/T:tilt q:quit",
        Mode::AddExperience => " | Tab:next ⏎:publish Esc:cancel",
        Mode::Itinerary => " | Esc:close",
    };
    let status = Line::from(vec![
        Span::styled(format!(" {}", app.status_line()), Style::default().fg(Color::Yellow)),
        Span::styled(help, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(status), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_regions_do_not_overlap() {
        let l = screen_layout(Rect::new(0, 0, 120, 40));
        assert_eq!(l.nav.y, 0);
        assert_eq!(l.chips.y, 1);
        assert_eq!(l.status.y, 39);
        assert!(l.list.x + l.list.width <= l.map.x);
        assert_eq!(l.map_inner.x, l.map.x + 1);
        assert_eq!(l.map_inner.height, l.map.height - 2);
    }

    #[test]
    fn test_hotspots_sequential_and_hit() {
        let spots = lay_out(
            0,
            vec![
                ("ab".into(), Some(Action::Quit)),
                ("cde".into(), None),
                ("f".into(), Some(Action::Reload)),
            ],
        );
        assert_eq!(spots.iter().map(|s| s.x).collect::<Vec<_>>(), vec![0, 3, 7]);
        assert_eq!(hotspot_at(&spots, 1), Some(Action::Quit));
        assert_eq!(hotspot_at(&spots, 2), None);
        assert_eq!(hotspot_at(&spots, 4), None);
        assert_eq!(hotspot_at(&spots, 7), Some(Action::Reload));
    }

    #[test]
    fn test_nav_depends_on_auth() {
        let area = Rect::new(0, 0, 120, 1);
        let signed_in = nav_items(&AuthState::SignedIn("asha".into()), area);
        assert!(signed_in.iter().any(|s| s.action == Some(Action::Logout)));
        let signed_out = nav_items(&AuthState::SignedOut, area);
        assert!(signed_out.iter().any(|s| s.action == Some(Action::Login)));
        let signed_out_labels: Vec<_> = signed_out.iter().map(|s| s.label.trim()).collect();
        assert_eq!(signed_out_labels, vec!["Explore", "Login", "Sign Up"]);
    }
}
