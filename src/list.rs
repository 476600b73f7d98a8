use crate::filter::FilteredIndex;
use crate::geo::{distance_km, Coordinate};
use crate::model::ExperienceId;

/// Rows a card occupies in the list panel
pub const CARD_HEIGHT: u16 = 4;

/// Distance line shown on a card
#[derive(Clone, Debug, PartialEq)]
pub enum Distance {
    Km(f64),
    Unavailable,
}

impl std::fmt::Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Distance::Km(km) => write!(f, "{km:.1} km"),
            Distance::Unavailable => f.write_str("distance unavailable"),
        }
    }
}

/// One rendered list entry
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub id: ExperienceId,
    pub title: String,
    /// Blank when the experience has none
    pub description: String,
    pub city: Option<String>,
    pub rating: Option<f64>,
    pub distance: Distance,
}

/// The experience list panel: cards in filtered order, a highlighted card
/// and a scroll offset.
#[derive(Default)]
pub struct ListView {
    cards: Vec<Card>,
    highlighted: Option<usize>,
    offset: usize,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild every card. Keeps the highlight, scrolled into view, if that
    /// experience is still listed. `visible` is how many cards fit in the panel.
    pub fn render(&mut self, filtered: &FilteredIndex, user: Coordinate, visible: usize) {
        let keep = self.highlighted_id().cloned();

        self.cards = filtered
            .entries()
            .iter()
            .map(|e| Card {
                id: e.id.clone(),
                title: e.title().to_string(),
                description: e.fields.description.clone().unwrap_or_default(),
                city: e.fields.city.clone(),
                rating: e.fields.rating,
                distance: e
                    .coordinate()
                    .map_or(Distance::Unavailable, |c| Distance::Km(distance_km(user, c))),
            })
            .collect();

        self.highlighted = keep.and_then(|id| filtered.position(&id));
        self.offset = 0;
        if let Some(index) = self.highlighted {
            self.scroll_into_view(index, visible);
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn result_count(&self) -> String {
        format!("{} results", self.cards.len())
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted_id(&self) -> Option<&ExperienceId> {
        self.highlighted.and_then(|i| self.cards.get(i)).map(|c| &c.id)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Highlight the card for `id` and scroll it into view.
    /// `visible` is how many cards fit in the panel.
    pub fn highlight(&mut self, id: &ExperienceId, visible: usize) -> Option<usize> {
        let index = self.cards.iter().position(|c| &c.id == id)?;
        self.highlighted = Some(index);
        self.scroll_into_view(index, visible);
        Some(index)
    }

    /// Move the highlight by `delta` cards, returns the newly highlighted id
    pub fn step(&mut self, delta: isize, visible: usize) -> Option<ExperienceId> {
        if self.cards.is_empty() {
            return None;
        }
        let last = self.cards.len() as isize - 1;
        let next = match self.highlighted {
            Some(i) => (i as isize + delta).clamp(0, last),
            None if delta < 0 => last,
            None => 0,
        } as usize;
        self.highlighted = Some(next);
        self.scroll_into_view(next, visible);
        Some(self.cards[next].id.clone())
    }

    /// Centre the card in the panel where possible
    fn scroll_into_view(&mut self, index: usize, visible: usize) {
        let visible = visible.max(1);
        if index >= self.offset && index < self.offset + visible {
            return;
        }
        let max_offset = self.cards.len().saturating_sub(visible);
        self.offset = index.saturating_sub(visible / 2).min(max_offset);
    }

    /// Card under a panel-relative row
    pub fn card_at_row(&self, row: u16) -> Option<&Card> {
        self.cards.get(self.offset + (row / CARD_HEIGHT) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{apply, FilterState, InterestFilter};
    use crate::model::{normalize_tags, Experience, ExperienceFields};

    const VIZAG: Coordinate = Coordinate::new(17.6868, 83.2185);

    fn exp(id: &str, coord: Option<(f64, f64)>, tags: &str) -> Experience {
        Experience::new(
            id,
            ExperienceFields {
                title: format!("Title {id}"),
                description: (id == "a").then(|| "Sea view".to_string()),
                interest: normalize_tags(tags),
                lat: coord.map(|c| c.0),
                lng: coord.map(|c| c.1),
                ..Default::default()
            },
        )
    }

    fn all() -> Vec<Experience> {
        vec![
            exp("a", Some((17.7268, 83.2185)), "beach"),
            exp("b", None, "food"),
            exp("c", Some((17.6868, 83.2185)), "beach"),
        ]
    }

    #[test]
    fn test_render_cards_in_filtered_order() {
        let mut list = ListView::new();
        list.render(&apply(&all(), &FilterState::default()), VIZAG, 5);

        let cards = list.cards();
        assert_eq!(cards.len(), 3);
        assert_eq!(list.result_count(), "3 results");
        assert_eq!(cards[0].description, "Sea view");
        assert_eq!(cards[1].description, "");
        assert_eq!(cards[0].distance.to_string(), "4.4 km");
        assert_eq!(cards[1].distance, Distance::Unavailable);
        assert_eq!(cards[1].distance.to_string(), "distance unavailable");
        assert_eq!(cards[2].distance, Distance::Km(0.0));
    }

    #[test]
    fn test_highlight_survives_refilter_when_still_listed() {
        let mut list = ListView::new();
        list.render(&apply(&all(), &FilterState::default()), VIZAG, 5);
        assert_eq!(list.highlight(&"c".into(), 5), Some(2));

        let beach = FilterState {
            interest: InterestFilter::Tag("beach".into()),
            ..Default::default()
        };
        list.render(&apply(&all(), &beach), VIZAG, 5);
        assert_eq!(list.highlighted(), Some(1));

        let food = FilterState {
            interest: InterestFilter::Tag("food".into()),
            ..Default::default()
        };
        list.render(&apply(&all(), &food), VIZAG, 5);
        assert_eq!(list.highlighted(), None);
    }

    #[test]
    fn test_scroll_into_view() {
        let many: Vec<_> = (0..20).map(|i| exp(&i.to_string(), None, "")).collect();
        let mut list = ListView::new();
        list.render(&apply(&many, &FilterState::default()), VIZAG, 5);

        list.highlight(&"15".into(), 4);
        assert_eq!(list.offset(), 13);
        assert_eq!(list.card_at_row(0).map(|c| c.id.as_str()), Some("13"));
        assert_eq!(list.card_at_row(CARD_HEIGHT * 2).map(|c| c.id.as_str()), Some("15"));

        list.highlight(&"19".into(), 4);
        assert_eq!(list.offset(), 16);
    }

    #[test]
    fn test_step_clamps() {
        let mut list = ListView::new();
        list.render(&apply(&all(), &FilterState::default()), VIZAG, 5);
        assert_eq!(list.step(1, 5).map(|id| id.0), Some("a".to_string()));
        assert_eq!(list.step(5, 5).map(|id| id.0), Some("c".to_string()));
        assert_eq!(list.step(-1, 5).map(|id| id.0), Some("b".to_string()));
    }

    #[test]
    fn test_refilter_keeps_highlighted_card_on_screen() {
        let many: Vec<_> = (0..20)
            .map(|i| exp(&i.to_string(), None, if i % 2 == 0 { "beach" } else { "food" }))
            .collect();
        let mut list = ListView::new();
        list.render(&apply(&many, &FilterState::default()), VIZAG, 4);
        list.highlight(&"18".into(), 4);

        let beach = FilterState {
            interest: InterestFilter::Tag("beach".into()),
            ..Default::default()
        };
        list.render(&apply(&many, &beach), VIZAG, 4);
        assert_eq!(list.highlighted(), Some(9));
        assert_eq!(list.offset(), 6);
        assert!(list.card_at_row(CARD_HEIGHT * 3).is_some_and(|c| c.id.as_str() == "18"));
    }
}
