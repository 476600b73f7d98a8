use crate::filter::FilteredIndex;
use crate::geo::Coordinate;
use crate::map::projection::Viewport;
use crate::model::ExperienceId;

/// Zoom level a marker or card click flies to
pub const FOCUS_ZOOM: f64 = 15.0;
/// Camera pitch a marker or card click flies to
pub const FOCUS_PITCH: f64 = 45.0;
/// Click tolerance around a marker, in braille pixels
const HIT_RADIUS: i32 = 4;

/// One placed map marker
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: ExperienceId,
    /// Position of the experience in the filtered list
    pub ordinal: usize,
    pub coordinate: Coordinate,
}

/// Markers for the current filtered experiences.
///
/// Rebuilt from scratch on every `sync`; an experience without a
/// coordinate is listed but never gets a marker.
#[derive(Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, filtered: &FilteredIndex) {
        self.markers.clear();
        self.markers.extend(filtered.iter().filter_map(|(ordinal, e)| {
            e.coordinate().map(|coordinate| Marker {
                id: e.id.clone(),
                ordinal,
                coordinate,
            })
        }));
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, id: &ExperienceId) -> Option<&Marker> {
        self.markers.iter().find(|m| &m.id == id)
    }

    /// Marker under a braille pixel position; nearest wins, later
    /// markers win ties since they are drawn on top.
    pub fn hit_test(&self, viewport: &Viewport, px: i32, py: i32) -> Option<&Marker> {
        self.markers
            .iter()
            .rev()
            .filter_map(|m| {
                let (mx, my) = viewport.project(m.coordinate);
                let (dx, dy) = (i64::from(mx) - i64::from(px), i64::from(my) - i64::from(py));
                let r = i64::from(HIT_RADIUS);
                if dx.abs() > r || dy.abs() > r {
                    return None;
                }
                let d2 = dx * dx + dy * dy;
                (d2 <= r * r).then_some((d2, m))
            })
            .min_by_key(|(d2, _)| *d2)
            .map(|(_, m)| m)
    }
}
