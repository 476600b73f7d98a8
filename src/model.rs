use std::collections::BTreeSet;
use std::fmt;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::Coordinate;

/// Opaque identifier assigned by the document store
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperienceId(pub String);

impl ExperienceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperienceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExperienceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The stored fields of an experience document (everything but the id).
///
/// Documents are written by whoever has access to the store, so reads
/// coerce rather than reject: numbers may arrive as strings, tags as a
/// comma separated string, and anything unusable becomes `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceFields {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub interest: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mood: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lng: Option<f64>,
}

/// A crowdsourced point of interest
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: ExperienceId,
    #[serde(flatten)]
    pub fields: ExperienceFields,
}

impl Experience {
    pub fn new(id: impl Into<String>, fields: ExperienceFields) -> Self {
        Self {
            id: ExperienceId(id.into()),
            fields,
        }
    }

    pub fn title(&self) -> &str {
        &self.fields.title
    }

    pub fn mood(&self) -> &str {
        &self.fields.mood
    }

    /// Both lat and lng present and finite, otherwise `None`.
    /// 0.0 is a valid value for either.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.fields.lat, self.fields.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(Coordinate::new(lat, lng))
            }
            _ => None,
        }
    }

    pub fn has_interest(&self, tag: &str) -> bool {
        self.fields.interest.contains(tag)
    }
}

/// Split a free-text tag list on commas into a lowercase tag set
pub fn normalize_tags(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// User input for a new experience, already coerced from form text
#[derive(Clone, Debug, PartialEq)]
pub struct ExperienceDraft {
    pub title: String,
    pub city: Option<String>,
    pub description: Option<String>,
    /// Comma separated, normalized on create
    pub tags: String,
    pub mood: String,
    pub rating: Option<f64>,
    pub coordinate: Coordinate,
}

impl ExperienceDraft {
    pub fn into_fields(self) -> ExperienceFields {
        ExperienceFields {
            title: self.title.trim().to_string(),
            description: self.description.filter(|s| !s.trim().is_empty()),
            city: self.city.filter(|s| !s.trim().is_empty()),
            interest: normalize_tags(&self.tags),
            mood: self.mood.trim().to_string(),
            rating: self.rating.filter(|r| r.is_finite()),
            lat: Some(self.coordinate.lat),
            lng: Some(self.coordinate.lng),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    Bool(bool),
    List(Vec<Loose>),
    Other(IgnoredAny),
}

impl Loose {
    fn into_text(self) -> Option<String> {
        match self {
            Loose::Text(s) => Some(s),
            Loose::Number(n) => Some(n.to_string()),
            Loose::Bool(b) => Some(b.to_string()),
            Loose::List(_) | Loose::Other(_) => None,
        }
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Option::<Loose>::deserialize(d)?;
    Ok(match v {
        Some(Loose::Number(n)) => Some(n),
        Some(Loose::Text(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite()))
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Option::<Loose>::deserialize(d)?;
    Ok(v.and_then(Loose::into_text).filter(|s| !s.is_empty()))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(d)?.unwrap_or_default())
}

fn lenient_tags<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeSet<String>, D::Error> {
    let v = Option::<Loose>::deserialize(d)?;
    Ok(match v {
        Some(Loose::List(items)) => items
            .into_iter()
            .filter_map(Loose::into_text)
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect(),
        Some(Loose::Text(s)) => normalize_tags(&s),
        _ => BTreeSet::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ExperienceFields {
        let mut bytes = json.as_bytes().to_vec();
        simd_json::serde::from_slice(&mut bytes).expect("valid json")
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(" Food, Culture ");
        assert_eq!(tags, BTreeSet::from(["food".to_string(), "culture".to_string()]));
        assert!(normalize_tags(" , ,").is_empty());
    }

    #[test]
    fn test_coerces_numeric_strings() {
        let f = parse(r#"{"title":"Beach","lat":"17.7","lng":83.2,"rating":"nope"}"#);
        assert_eq!(f.lat, Some(17.7));
        assert_eq!(f.lng, Some(83.2));
        assert_eq!(f.rating, None);
    }

    #[test]
    fn test_missing_fields_default() {
        let f = parse(r#"{"title":"Bare"}"#);
        assert!(f.interest.is_empty());
        assert_eq!(f.mood, "");
        assert_eq!(f.lat, None);
        assert_eq!(f.description, None);
    }

    #[test]
    fn test_interest_as_string_or_list() {
        let a = parse(r#"{"interest":["Beach","food"]}"#);
        let b = parse(r#"{"interest":"beach, FOOD"}"#);
        assert_eq!(a.interest, b.interest);
    }

    #[test]
    fn test_coordinate_requires_both() {
        let mut e = Experience::new("x", parse(r#"{"lat":0.0}"#));
        assert_eq!(e.coordinate(), None);
        e.fields.lng = Some(0.0);
        assert_eq!(e.coordinate(), Some(Coordinate::new(0.0, 0.0)));
    }

    #[test]
    fn test_draft_into_fields() {
        let draft = ExperienceDraft {
            title: "  Sunset point ".into(),
            city: Some("".into()),
            description: None,
            tags: "Beach,  Photo".into(),
            mood: "relaxed".into(),
            rating: Some(f64::NAN),
            coordinate: Coordinate::new(17.7, 83.3),
        };
        let f = draft.into_fields();
        assert_eq!(f.title, "Sunset point");
        assert_eq!(f.city, None);
        assert_eq!(f.rating, None);
        assert!(f.interest.contains("photo"));
        assert_eq!(f.lat, Some(17.7));
    }
}
