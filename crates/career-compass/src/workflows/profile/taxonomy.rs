//! Fixed coding tables shared by validation and encoding.
//!
//! Codes exist only for the prediction model's input vector; subjects are stored and
//! compared by name everywhere else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named catalog item with the integer code the prediction model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub code: u8,
}

const fn entry(name: &'static str, code: u8) -> CatalogEntry {
    CatalogEntry { name, code }
}

const PRIMARY_SUBJECTS: &[CatalogEntry] = &[
    entry("Maths", 0),
    entry("Science", 1),
    entry("English", 2),
    entry("Sinhala", 3),
    entry("History", 4),
    entry("Religion", 5),
];

const SECONDARY_SUBJECTS: &[CatalogEntry] = &[
    entry("Physics", 0),
    entry("Chemistry", 1),
    entry("Combined_Maths", 2),
    entry("Biology", 3),
    entry("Accounting", 4),
    entry("Business_Studies", 5),
    entry("Economics", 6),
    entry("History", 7),
    entry("Geography", 8),
    entry("Politics", 9),
    entry("Engineering_Tech", 10),
    entry("Science_Tech", 11),
    entry("ICT", 12),
];

const CAREERS: &[CatalogEntry] = &[
    entry("Engineering", 0),
    entry("Medicine", 1),
    entry("IT", 2),
    entry("Business", 3),
    entry("Teaching", 4),
    entry("Research", 5),
];

/// Where the student currently is in the education pipeline, ordered by progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EducationStage {
    #[default]
    PrimaryExam,
    SecondaryExam,
    University,
}

impl EducationStage {
    pub const ALL: [EducationStage; 3] = [
        EducationStage::PrimaryExam,
        EducationStage::SecondaryExam,
        EducationStage::University,
    ];

    pub const fn code(self) -> u8 {
        match self {
            EducationStage::PrimaryExam => 0,
            EducationStage::SecondaryExam => 1,
            EducationStage::University => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.code() == code)
    }

    pub const fn label(self) -> &'static str {
        match self {
            EducationStage::PrimaryExam => "O/L Completed",
            EducationStage::SecondaryExam => "A/L Completed",
            EducationStage::University => "University Student",
        }
    }

    /// Stream, stream grades, and z-score apply from the secondary exam onward.
    pub fn has_stream_section(self) -> bool {
        self >= EducationStage::SecondaryExam
    }
}

/// Letter mark for a single subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    S,
    F,
}

impl Grade {
    pub const ALL: [Grade; 5] = [Grade::A, Grade::B, Grade::C, Grade::S, Grade::F];

    pub const fn score(self) -> u8 {
        match self {
            Grade::A => 4,
            Grade::B => 3,
            Grade::C => 2,
            Grade::S => 1,
            Grade::F => 0,
        }
    }

    pub const fn letter(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::S => "S",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

impl FromStr for Grade {
    type Err = TaxonomyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Grade::ALL
            .into_iter()
            .find(|grade| grade.letter().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TaxonomyError::UnknownGrade(value.to_string()))
    }
}

/// Secondary exam subject bundle. Exactly one stream is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stream {
    #[serde(rename = "Physical Science")]
    PhysicalScience,
    #[serde(rename = "Biological Science")]
    BiologicalScience,
    Commerce,
    Arts,
    Technology,
}

impl Stream {
    pub const ALL: [Stream; 5] = [
        Stream::PhysicalScience,
        Stream::BiologicalScience,
        Stream::Commerce,
        Stream::Arts,
        Stream::Technology,
    ];

    pub const fn code(self) -> u8 {
        match self {
            Stream::PhysicalScience => 0,
            Stream::BiologicalScience => 1,
            Stream::Commerce => 2,
            Stream::Arts => 3,
            Stream::Technology => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Stream::PhysicalScience => "Physical Science",
            Stream::BiologicalScience => "Biological Science",
            Stream::Commerce => "Commerce",
            Stream::Arts => "Arts",
            Stream::Technology => "Technology",
        }
    }

    pub const fn subjects(self) -> &'static [&'static str; 3] {
        match self {
            Stream::PhysicalScience => &["Physics", "Chemistry", "Combined_Maths"],
            Stream::BiologicalScience => &["Biology", "Chemistry", "Physics"],
            Stream::Commerce => &["Accounting", "Business_Studies", "Economics"],
            Stream::Arts => &["History", "Geography", "Politics"],
            Stream::Technology => &["Engineering_Tech", "Science_Tech", "ICT"],
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        Self::ALL.into_iter().find(|stream| stream.label() == trimmed)
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stream {
    type Err = TaxonomyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Stream::from_label(value).ok_or_else(|| TaxonomyError::UnknownStream(value.to_string()))
    }
}

/// Lookup failures for user-supplied taxonomy names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxonomyError {
    #[error("unknown grade '{0}' (expected one of A, B, C, S, F)")]
    UnknownGrade(String),
    #[error("unknown stream '{0}'")]
    UnknownStream(String),
    #[error("unknown education level code {0}")]
    UnknownStage(u8),
}

/// Ordered subject catalog for a stage. University shares the secondary catalog.
pub fn subject_catalog(stage: EducationStage) -> &'static [CatalogEntry] {
    match stage {
        EducationStage::PrimaryExam => PRIMARY_SUBJECTS,
        EducationStage::SecondaryExam | EducationStage::University => SECONDARY_SUBJECTS,
    }
}

pub fn subjects_for_stage(
    stage: EducationStage,
) -> impl Iterator<Item = &'static str> + Clone {
    subject_catalog(stage).iter().map(|entry| entry.name)
}

pub fn subject_code(stage: EducationStage, subject: &str) -> Option<u8> {
    subject_catalog(stage)
        .iter()
        .find(|entry| entry.name == subject)
        .map(|entry| entry.code)
}

pub fn streams_available() -> &'static [Stream] {
    &Stream::ALL
}

pub fn stream_code(stream: Stream) -> u8 {
    stream.code()
}

pub fn subjects_for_stream(stream: Stream) -> &'static [&'static str; 3] {
    stream.subjects()
}

pub fn grade_score(grade: Grade) -> u8 {
    grade.score()
}

pub fn career_labels() -> &'static [CatalogEntry] {
    CAREERS
}

pub fn career_code(label: &str) -> Option<u8> {
    CAREERS
        .iter()
        .find(|entry| entry.name == label)
        .map(|entry| entry.code)
}

/// Serializable snapshot of every table, for form builders.
#[derive(Debug, Clone, Serialize)]
pub struct TaxonomyView {
    pub stages: Vec<StageView>,
    pub primary_subjects: &'static [CatalogEntry],
    pub secondary_subjects: &'static [CatalogEntry],
    pub streams: Vec<StreamView>,
    pub grades: Vec<GradeView>,
    pub careers: &'static [CatalogEntry],
}

#[derive(Debug, Clone, Serialize)]
pub struct StageView {
    pub code: u8,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamView {
    pub code: u8,
    pub label: &'static str,
    pub subjects: &'static [&'static str; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeView {
    pub letter: &'static str,
    pub score: u8,
}

pub fn taxonomy_view() -> TaxonomyView {
    TaxonomyView {
        stages: EducationStage::ALL
            .into_iter()
            .map(|stage| StageView {
                code: stage.code(),
                label: stage.label(),
            })
            .collect(),
        primary_subjects: subject_catalog(EducationStage::PrimaryExam),
        secondary_subjects: subject_catalog(EducationStage::SecondaryExam),
        streams: Stream::ALL
            .into_iter()
            .map(|stream| StreamView {
                code: stream.code(),
                label: stream.label(),
                subjects: stream.subjects(),
            })
            .collect(),
        grades: Grade::ALL
            .into_iter()
            .map(|grade| GradeView {
                letter: grade.letter(),
                score: grade.score(),
            })
            .collect(),
        careers: career_labels(),
    }
}
