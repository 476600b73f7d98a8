use crate::error::FormError;
use crate::geo::Coordinate;
use crate::model::ExperienceDraft;

/// Inputs of the add-experience form, in tab order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Title,
    City,
    Description,
    Tags,
    Mood,
    Rating,
    Lat,
    Lng,
}

impl FormField {
    pub const ALL: [FormField; 8] = [
        FormField::Title,
        FormField::City,
        FormField::Description,
        FormField::Tags,
        FormField::Mood,
        FormField::Rating,
        FormField::Lat,
        FormField::Lng,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::City => "City",
            FormField::Description => "Description",
            FormField::Tags => "Tags (comma separated)",
            FormField::Mood => "Mood",
            FormField::Rating => "Rating",
            FormField::Lat => "Latitude",
            FormField::Lng => "Longitude",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// Plain-text form state; values are only coerced on submit
#[derive(Clone, Debug)]
pub struct AddForm {
    values: [String; 8],
    focus: FormField,
}

impl Default for AddForm {
    fn default() -> Self {
        Self {
            values: Default::default(),
            focus: FormField::Title,
        }
    }
}

fn optional(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

impl AddForm {
    pub fn value(&self, field: FormField) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = FormField::ALL[(self.focus.index() + 1) % FormField::ALL.len()];
    }

    pub fn focus_prev(&mut self) {
        let n = FormField::ALL.len();
        self.focus = FormField::ALL[(self.focus.index() + n - 1) % n];
    }

    pub fn insert(&mut self, c: char) {
        let i = self.focus.index();
        self.values[i].push(c);
    }

    pub fn backspace(&mut self) {
        let i = self.focus.index();
        self.values[i].pop();
    }

    /// Fill the coordinate fields from a map click
    pub fn set_location(&mut self, c: Coordinate) {
        self.set(FormField::Lat, format!("{:.6}", c.lat));
        self.set(FormField::Lng, format!("{:.6}", c.lng));
    }

    fn number(&self, field: FormField) -> Option<f64> {
        self.value(field).trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// Coordinate currently in the form, if both fields parse
    pub fn picked(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.number(FormField::Lat)?, self.number(FormField::Lng)?))
    }

    pub fn to_draft(&self) -> Result<ExperienceDraft, FormError> {
        let title = optional(self.value(FormField::Title)).ok_or(FormError::MissingTitle)?;
        let coordinate = self.picked().ok_or(FormError::MissingLocation)?;
        Ok(ExperienceDraft {
            title,
            city: optional(self.value(FormField::City)),
            description: optional(self.value(FormField::Description)),
            tags: self.value(FormField::Tags).to_string(),
            mood: self.value(FormField::Mood).trim().to_string(),
            rating: self.number(FormField::Rating),
            coordinate,
        })
    }
}
