//! Mapping of a validated profile onto the prediction model's numeric input.
//!
//! Encoding is total: optional numbers that fail to parse become `0.0` and unselected
//! grades score `0`. [`validate`](super::validation::validate) is the only correctness
//! gate, so callers must not encode a profile that still has validation errors.

use serde::{Deserialize, Serialize};

use super::domain::{GradeSheet, ProfileState};
use super::taxonomy::{self, EducationStage};
use super::validation::parse_decimal;

/// `(subject code, grade score)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedGrade {
    pub subject: u8,
    pub grade: u8,
}

/// Request body accepted by the prediction model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedRequest {
    pub education_level: u8,
    pub ol_results: Vec<EncodedGrade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub al_stream: Option<u8>,
    pub al_results: Vec<EncodedGrade>,
    pub z_score: f64,
    pub gpa: f64,
}

pub fn encode(state: &ProfileState) -> EncodedRequest {
    let stage = state.stage();
    let active_stream = state.stream().filter(|_| stage.has_stream_section());

    let al_results = match active_stream {
        Some(_) => encode_sheet(EducationStage::SecondaryExam, state.stream_results()),
        None => Vec::new(),
    };

    let z_score = if stage.has_stream_section() {
        lenient_decimal(state.z_score())
    } else {
        0.0
    };
    let gpa = if stage == EducationStage::University {
        lenient_decimal(state.gpa())
    } else {
        0.0
    };

    EncodedRequest {
        education_level: stage.code(),
        ol_results: encode_sheet(EducationStage::PrimaryExam, state.primary_results()),
        al_stream: active_stream.map(taxonomy::stream_code),
        al_results,
        z_score,
        gpa,
    }
}

fn encode_sheet(catalog: EducationStage, sheet: &GradeSheet) -> Vec<EncodedGrade> {
    sheet
        .iter()
        .filter_map(|(subject, grade)| {
            taxonomy::subject_code(catalog, subject).map(|code| EncodedGrade {
                subject: code,
                grade: grade.map(taxonomy::grade_score).unwrap_or(0),
            })
        })
        .collect()
}

fn lenient_decimal(raw: Option<&str>) -> f64 {
    raw.and_then(parse_decimal).unwrap_or(0.0)
}
