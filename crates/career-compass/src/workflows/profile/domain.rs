use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::taxonomy::{self, EducationStage, Grade, Stream, TaxonomyError};

/// Identifier of the authenticated student owning a profile.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Free-text contact details. Collected but never validated or encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub full_name: String,
    pub school: String,
    pub district: String,
    pub contact: String,
}

/// The two grade sections of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    /// Primary exam results, always required.
    Primary,
    /// Results for the subjects of the selected stream.
    Stream,
}

impl Section {
    pub const fn key_prefix(self) -> &'static str {
        match self {
            Section::Primary => "ol",
            Section::Stream => "al",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Section::Primary => "O/L",
            Section::Stream => "A/L",
        }
    }
}

/// One subject slot; `None` means no grade has been selected yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeEntry {
    pub subject: String,
    pub grade: Option<Grade>,
}

/// Subject → grade mapping that keeps catalog order and never loses a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeSheet {
    entries: Vec<GradeEntry>,
}

impl GradeSheet {
    /// Sheet with one empty slot per subject.
    pub fn blank<'a>(subjects: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            entries: subjects
                .into_iter()
                .map(|subject| GradeEntry {
                    subject: subject.to_string(),
                    grade: None,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.entries.iter().any(|entry| entry.subject == subject)
    }

    /// Grade for `subject`; `None` both for empty slots and unknown subjects.
    pub fn grade(&self, subject: &str) -> Option<Grade> {
        self.entries
            .iter()
            .find(|entry| entry.subject == subject)
            .and_then(|entry| entry.grade)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<Grade>)> {
        self.entries
            .iter()
            .map(|entry| (entry.subject.as_str(), entry.grade))
    }

    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.subject.as_str())
    }

    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|entry| entry.grade.is_some())
    }

    fn set(&mut self, subject: &str, grade: Option<Grade>) -> bool {
        match self.entries.iter_mut().find(|entry| entry.subject == subject) {
            Some(entry) => {
                entry.grade = grade;
                true
            }
            None => false,
        }
    }

    fn to_letters(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|entry| {
                let letter = entry.grade.map(Grade::letter).unwrap_or_default();
                (entry.subject.clone(), letter.to_string())
            })
            .collect()
    }

    /// Copies grades for known subjects from a letter map; unknown subjects are dropped.
    fn fill_from_letters(
        &mut self,
        letters: &BTreeMap<String, String>,
    ) -> Result<(), TaxonomyError> {
        for entry in &mut self.entries {
            if let Some(letter) = letters.get(&entry.subject) {
                entry.grade = if letter.trim().is_empty() {
                    None
                } else {
                    Some(letter.parse()?)
                };
            }
        }
        Ok(())
    }
}

/// Rejected field edits. The state is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileEditError {
    #[error("{subject} is not part of the {} results", .section.label())]
    UnknownSubject { section: Section, subject: String },
}

/// Which sections and fields apply for a given stage and stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicableFields {
    pub primary_subjects: Vec<&'static str>,
    pub stream_required: bool,
    pub stream_subjects: &'static [&'static str],
    pub z_score_required: bool,
    pub gpa_accepted: bool,
}

/// Derive the applicable fields from the two state-machine axes.
pub fn applicable_fields(stage: EducationStage, stream: Option<Stream>) -> ApplicableFields {
    let stream_section = stage.has_stream_section();
    let stream_subjects: &'static [&'static str] = match stream {
        Some(stream) if stream_section => taxonomy::subjects_for_stream(stream),
        _ => &[],
    };

    ApplicableFields {
        primary_subjects: taxonomy::subjects_for_stage(EducationStage::PrimaryExam).collect(),
        stream_required: stream_section,
        stream_subjects,
        z_score_required: stream_section,
        gpa_accepted: stage == EducationStage::University,
    }
}

/// In-progress academic profile edited field by field during a session.
///
/// Inactive sections keep their values in memory; whether they are validated or encoded
/// is decided by [`applicable_fields`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileSnapshot", into = "ProfileSnapshot")]
pub struct ProfileState {
    personal: PersonalDetails,
    stage: EducationStage,
    primary_results: GradeSheet,
    stream: Option<Stream>,
    stream_results: GradeSheet,
    z_score: Option<String>,
    gpa: Option<String>,
}

impl Default for ProfileState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileState {
    pub fn new() -> Self {
        Self {
            personal: PersonalDetails::default(),
            stage: EducationStage::PrimaryExam,
            primary_results: GradeSheet::blank(taxonomy::subjects_for_stage(
                EducationStage::PrimaryExam,
            )),
            stream: None,
            stream_results: GradeSheet::default(),
            z_score: None,
            gpa: None,
        }
    }

    pub fn personal(&self) -> &PersonalDetails {
        &self.personal
    }

    pub fn set_personal(&mut self, personal: PersonalDetails) {
        self.personal = personal;
    }

    pub fn stage(&self) -> EducationStage {
        self.stage
    }

    pub fn set_stage(&mut self, stage: EducationStage) {
        self.stage = stage;
    }

    pub fn stream(&self) -> Option<Stream> {
        self.stream
    }

    /// Replace the stream. The stream sheet is rebuilt blank even when the same stream is
    /// chosen again; earlier entries are not restored.
    pub fn select_stream(&mut self, stream: Option<Stream>) {
        self.stream = stream;
        self.stream_results = match stream {
            Some(stream) => {
                GradeSheet::blank(taxonomy::subjects_for_stream(stream).iter().copied())
            }
            None => GradeSheet::default(),
        };
    }

    pub fn primary_results(&self) -> &GradeSheet {
        &self.primary_results
    }

    pub fn stream_results(&self) -> &GradeSheet {
        &self.stream_results
    }

    pub fn results(&self, section: Section) -> &GradeSheet {
        match section {
            Section::Primary => &self.primary_results,
            Section::Stream => &self.stream_results,
        }
    }

    /// Set or clear one grade. Only `section[subject]` changes.
    pub fn set_grade(
        &mut self,
        section: Section,
        subject: &str,
        grade: Option<Grade>,
    ) -> Result<(), ProfileEditError> {
        let sheet = match section {
            Section::Primary => &mut self.primary_results,
            Section::Stream => &mut self.stream_results,
        };

        if sheet.set(subject, grade) {
            Ok(())
        } else {
            Err(ProfileEditError::UnknownSubject {
                section,
                subject: subject.to_string(),
            })
        }
    }

    /// Raw z-score text as entered; blank input counts as absent.
    pub fn z_score(&self) -> Option<&str> {
        self.z_score.as_deref()
    }

    pub fn set_z_score(&mut self, value: Option<String>) {
        self.z_score = non_blank(value);
    }

    /// Raw GPA text as entered; blank input counts as absent.
    pub fn gpa(&self) -> Option<&str> {
        self.gpa.as_deref()
    }

    pub fn set_gpa(&mut self, value: Option<String>) {
        self.gpa = non_blank(value);
    }

    pub fn applicable_fields(&self) -> ApplicableFields {
        applicable_fields(self.stage, self.stream)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Persisted and wire representation of a profile.
///
/// Grades are letters keyed by subject name with `""` for unselected slots, the stage is
/// its numeric code, and the stream is its label (`""` when unset).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileSnapshot {
    pub full_name: String,
    pub school: String,
    pub district: String,
    pub contact: String,
    #[serde(deserialize_with = "deserialize_stage_code")]
    pub education_level: u8,
    pub ol_results: BTreeMap<String, String>,
    pub stream: String,
    pub al_results: BTreeMap<String, String>,
    #[serde(deserialize_with = "deserialize_loose_text")]
    pub z_score: String,
    #[serde(deserialize_with = "deserialize_loose_text")]
    pub gpa: String,
}

impl TryFrom<ProfileSnapshot> for ProfileState {
    type Error = TaxonomyError;

    fn try_from(snapshot: ProfileSnapshot) -> Result<Self, Self::Error> {
        let stage = EducationStage::from_code(snapshot.education_level)
            .ok_or(TaxonomyError::UnknownStage(snapshot.education_level))?;

        let stream = if snapshot.stream.trim().is_empty() {
            None
        } else {
            Some(snapshot.stream.parse::<Stream>()?)
        };

        let mut state = ProfileState::new();
        state.personal = PersonalDetails {
            full_name: snapshot.full_name,
            school: snapshot.school,
            district: snapshot.district,
            contact: snapshot.contact,
        };
        state.stage = stage;
        state.primary_results.fill_from_letters(&snapshot.ol_results)?;
        state.select_stream(stream);
        state.stream_results.fill_from_letters(&snapshot.al_results)?;
        state.set_z_score(Some(snapshot.z_score));
        state.set_gpa(Some(snapshot.gpa));

        Ok(state)
    }
}

impl From<ProfileState> for ProfileSnapshot {
    fn from(state: ProfileState) -> Self {
        Self {
            education_level: state.stage.code(),
            ol_results: state.primary_results.to_letters(),
            stream: state
                .stream
                .map(|stream| stream.label().to_string())
                .unwrap_or_default(),
            al_results: state.stream_results.to_letters(),
            z_score: state.z_score.unwrap_or_default(),
            gpa: state.gpa.unwrap_or_default(),
            full_name: state.personal.full_name,
            school: state.personal.school,
            district: state.personal.district,
            contact: state.personal.contact,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Text(String),
    Number(serde_json::Number),
}

/// Form inputs arrive as strings or numbers depending on the client.
fn deserialize_loose_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LooseValue>::deserialize(deserializer)?;
    Ok(match value {
        None => String::new(),
        Some(LooseValue::Text(text)) => text,
        Some(LooseValue::Number(number)) => number.to_string(),
    })
}

fn deserialize_stage_code<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = deserialize_loose_text(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(EducationStage::PrimaryExam.code());
    }
    trimmed
        .parse::<u8>()
        .map_err(|err| serde::de::Error::custom(format!("invalid educationLevel '{raw}': {err}")))
}

/// One ranked career label from the prediction model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PredictionWire")]
pub struct CareerPrediction {
    pub career: String,
    pub probability: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PredictionWire {
    Pair(String, f64),
    Labeled {
        #[serde(alias = "label")]
        career: String,
        probability: f64,
    },
}

impl From<PredictionWire> for CareerPrediction {
    fn from(wire: PredictionWire) -> Self {
        match wire {
            PredictionWire::Pair(career, probability)
            | PredictionWire::Labeled {
                career,
                probability,
            } => Self {
                career,
                probability,
            },
        }
    }
}

/// Model output, passed through to persistence in the order received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionResult(pub Vec<CareerPrediction>);

impl PredictionResult {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CareerPrediction> {
        self.0.iter()
    }
}
