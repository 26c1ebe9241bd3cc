//! Field-level validation of a [`ProfileState`].
//!
//! Violations are collected into [`ValidationErrors`] in a single pass; nothing here
//! returns `Err`. An empty result is the only gate in front of encoding.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use super::domain::{ProfileState, Section};

const Z_SCORE_RANGE: (f64, f64) = (0.0, 4.0);
const GPA_RANGE: (f64, f64) = (2.0, 4.0);

/// Form field a validation message is attached to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Grade { section: Section, subject: String },
    Stream,
    ZScore,
    Gpa,
}

impl FieldKey {
    pub fn grade(section: Section, subject: impl Into<String>) -> Self {
        FieldKey::Grade {
            section,
            subject: subject.into(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Grade { section, subject } => {
                write!(f, "{}_{}", section.key_prefix(), subject)
            }
            FieldKey::Stream => f.write_str("stream"),
            FieldKey::ZScore => f.write_str("zScore"),
            FieldKey::Gpa => f.write_str("gpa"),
        }
    }
}

impl Serialize for FieldKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Field key → human readable message. Empty means the profile can be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<FieldKey, String>);

impl ValidationErrors {
    pub fn is_clean(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &FieldKey) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &FieldKey) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &str)> {
        self.0.iter().map(|(key, message)| (key, message.as_str()))
    }

    fn insert(&mut self, key: FieldKey, message: impl Into<String>) {
        self.0.insert(key, message.into());
    }
}

/// Compute every violated rule for the current stage and stream.
pub fn validate(state: &ProfileState) -> ValidationErrors {
    let fields = state.applicable_fields();
    let mut errors = ValidationErrors::default();

    for subject in &fields.primary_subjects {
        if state.primary_results().grade(subject).is_none() {
            errors.insert(
                FieldKey::grade(Section::Primary, *subject),
                required_grade_message(subject),
            );
        }
    }

    if fields.stream_required {
        // A missing stream hides the stream grade and z-score checks until it is chosen.
        if state.stream().is_none() {
            errors.insert(FieldKey::Stream, "A/L stream is required");
        } else {
            for subject in fields.stream_subjects {
                if state.stream_results().grade(subject).is_none() {
                    errors.insert(
                        FieldKey::grade(Section::Stream, *subject),
                        required_grade_message(subject),
                    );
                }
            }

            match state.z_score().map(parse_decimal) {
                None => errors.insert(FieldKey::ZScore, "Z-Score is required"),
                Some(None) => errors.insert(FieldKey::ZScore, "Z-Score must be a number"),
                Some(Some(value)) if !within(value, Z_SCORE_RANGE) => {
                    errors.insert(FieldKey::ZScore, "Z-Score must be between 0 and 4")
                }
                Some(Some(_)) => {}
            }
        }
    }

    // GPA stays optional at university level; only a supplied value is checked.
    if fields.gpa_accepted {
        match state.gpa().map(parse_decimal) {
            Some(None) => errors.insert(FieldKey::Gpa, "GPA must be a number"),
            Some(Some(value)) if !within(value, GPA_RANGE) => {
                errors.insert(FieldKey::Gpa, "GPA must be between 2.0 and 4.0")
            }
            _ => {}
        }
    }

    errors
}

/// Strict decimal parse of user-entered text. Non-finite values are rejected.
pub(crate) fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn within(value: f64, (min, max): (f64, f64)) -> bool {
    (min..=max).contains(&value)
}

fn required_grade_message(subject: &str) -> String {
    format!("{} grade is required", subject.replace('_', " "))
}
