use std::collections::{BTreeSet, HashMap};

use crate::model::{Experience, ExperienceId};

/// Interest chip selection
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InterestFilter {
    #[default]
    All,
    Tag(String),
}

impl InterestFilter {
    pub fn label(&self) -> &str {
        match self {
            InterestFilter::All => "all",
            InterestFilter::Tag(t) => t,
        }
    }

    fn matches(&self, e: &Experience) -> bool {
        match self {
            InterestFilter::All => true,
            InterestFilter::Tag(t) => e.has_interest(t),
        }
    }
}

/// Mood selector value
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MoodFilter {
    #[default]
    Any,
    Is(String),
}

impl MoodFilter {
    pub fn label(&self) -> &str {
        match self {
            MoodFilter::Any => "any",
            MoodFilter::Is(m) => m,
        }
    }

    fn matches(&self, e: &Experience) -> bool {
        match self {
            MoodFilter::Any => true,
            MoodFilter::Is(m) => e.mood() == m,
        }
    }
}

/// Current filter selection. Lives only as long as the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub interest: InterestFilter,
    pub mood: MoodFilter,
}

impl FilterState {
    pub fn matches(&self, e: &Experience) -> bool {
        self.interest.matches(e) && self.mood.matches(e)
    }
}

/// Ordered subset of experiences matching the active filters.
///
/// The experience id is the key shared by list cards and map markers;
/// `position` resolves it to the ordinal used for display order.
#[derive(Clone, Debug, Default)]
pub struct FilteredIndex {
    entries: Vec<Experience>,
    positions: HashMap<ExperienceId, usize>,
}

impl FilteredIndex {
    pub fn from_entries(entries: Vec<Experience>) -> Self {
        let mut positions = HashMap::with_capacity(entries.len());
        for (i, e) in entries.iter().enumerate() {
            // First occurrence wins if a store ever hands back duplicate ids
            positions.entry(e.id.clone()).or_insert(i);
        }
        Self { entries, positions }
    }

    pub fn entries(&self) -> &[Experience] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, ordinal: usize) -> Option<&Experience> {
        self.entries.get(ordinal)
    }

    pub fn position(&self, id: &ExperienceId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn find(&self, id: &ExperienceId) -> Option<&Experience> {
        self.position(id).and_then(|i| self.entries.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Experience)> {
        self.entries.iter().enumerate()
    }
}

/// Stable filter: keeps input order, never sorts
pub fn apply(all: &[Experience], state: &FilterState) -> FilteredIndex {
    let entries = all.iter().filter(|e| state.matches(e)).cloned().collect();
    FilteredIndex::from_entries(entries)
}

/// Chip choices: "all" followed by every tag present in the data
pub fn interest_options(all: &[Experience]) -> Vec<InterestFilter> {
    let tags: BTreeSet<&str> = all
        .iter()
        .flat_map(|e| e.fields.interest.iter().map(String::as_str))
        .collect();
    std::iter::once(InterestFilter::All)
        .chain(tags.into_iter().map(|t| InterestFilter::Tag(t.to_string())))
        .collect()
}

/// Mood choices: "any" followed by every non-empty mood present in the data
pub fn mood_options(all: &[Experience]) -> Vec<MoodFilter> {
    let moods: BTreeSet<&str> = all
        .iter()
        .map(Experience::mood)
        .filter(|m| !m.is_empty())
        .collect();
    std::iter::once(MoodFilter::Any)
        .chain(moods.into_iter().map(|m| MoodFilter::Is(m.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{normalize_tags, ExperienceFields};

    fn exp(id: &str, tags: &str, mood: &str) -> Experience {
        Experience::new(
            id,
            ExperienceFields {
                title: id.to_string(),
                interest: normalize_tags(tags),
                mood: mood.to_string(),
                ..Default::default()
            },
        )
    }

    fn ids(index: &FilteredIndex) -> Vec<&str> {
        index.entries().iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_default_state_keeps_everything_in_order() {
        let all = vec![exp("c", "food", "lively"), exp("a", "", ""), exp("b", "beach", "relaxed")];
        let out = apply(&all, &FilterState::default());
        assert_eq!(ids(&out), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_beach_any() {
        let all = vec![exp("1", "beach", "relaxed"), exp("2", "food", "lively")];
        let state = FilterState {
            interest: InterestFilter::Tag("beach".into()),
            mood: MoodFilter::Any,
        };
        assert_eq!(ids(&apply(&all, &state)), vec!["1"]);
    }

    #[test]
    fn test_both_predicates_required() {
        let all = vec![
            exp("1", "beach", "relaxed"),
            exp("2", "beach", "lively"),
            exp("3", "food", "relaxed"),
        ];
        let state = FilterState {
            interest: InterestFilter::Tag("beach".into()),
            mood: MoodFilter::Is("relaxed".into()),
        };
        assert_eq!(ids(&apply(&all, &state)), vec!["1"]);
    }

    #[test]
    fn test_missing_interest_only_under_all() {
        let all = vec![exp("bare", "", "relaxed")];
        let tagged = FilterState {
            interest: InterestFilter::Tag("beach".into()),
            mood: MoodFilter::Any,
        };
        assert!(apply(&all, &tagged).is_empty());
        assert_eq!(apply(&all, &FilterState::default()).len(), 1);
    }

    #[test]
    fn test_position_lookup() {
        let all = vec![exp("a", "x", ""), exp("b", "x", ""), exp("c", "y", "")];
        let state = FilterState {
            interest: InterestFilter::Tag("x".into()),
            mood: MoodFilter::Any,
        };
        let out = apply(&all, &state);
        assert_eq!(out.position(&"b".into()), Some(1));
        assert_eq!(out.position(&"c".into()), None);
        assert_eq!(out.find(&"a".into()).map(|e| e.title()), Some("a"));
    }

    #[test]
    fn test_options_from_data() {
        let all = vec![exp("1", "food, beach", "relaxed"), exp("2", "beach", "")];
        assert_eq!(
            interest_options(&all),
            vec![
                InterestFilter::All,
                InterestFilter::Tag("beach".into()),
                InterestFilter::Tag("food".into()),
            ]
        );
        assert_eq!(mood_options(&all), vec![MoodFilter::Any, MoodFilter::Is("relaxed".into())]);
    }
}
