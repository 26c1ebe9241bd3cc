use std::fs;
use std::path::PathBuf;

use career_compass::error::AppError;
use career_compass::workflows::profile::{
    encode, validate, EncodedRequest, ProfileState, SubmissionError, ValidationErrors,
};
use clap::Args;
use serde_json::json;

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Profile snapshot (JSON, same shape the HTTP API accepts)
    #[arg(long)]
    pub(crate) profile: PathBuf,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub(crate) pretty: bool,
}

/// Outcome of checking a profile offline.
#[derive(Debug)]
pub(crate) enum CheckReport {
    Ready(EncodedRequest),
    Invalid(ValidationErrors),
}

impl CheckReport {
    pub(crate) fn render(&self, pretty: bool) -> Result<String, serde_json::Error> {
        let payload = match self {
            CheckReport::Ready(request) => json!({ "ready": true, "request": request }),
            CheckReport::Invalid(errors) => json!({ "ready": false, "errors": errors }),
        };
        if pretty {
            serde_json::to_string_pretty(&payload)
        } else {
            serde_json::to_string(&payload)
        }
    }
}

pub(crate) fn check_profile(profile: &ProfileState) -> CheckReport {
    let errors = validate(profile);
    if errors.is_clean() {
        CheckReport::Ready(encode(profile))
    } else {
        CheckReport::Invalid(errors)
    }
}

pub(crate) fn load_profile(raw: &str) -> Result<ProfileState, AppError> {
    Ok(serde_json::from_str(raw)?)
}

/// Prints the report and fails when the profile would be rejected on submission.
pub(crate) fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.profile)?;
    let profile = load_profile(&raw)?;
    let report = check_profile(&profile);
    println!("{}", report.render(args.pretty)?);

    match report {
        CheckReport::Ready(_) => Ok(()),
        CheckReport::Invalid(errors) => Err(SubmissionError::Validation(errors).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const COMPLETE_PROFILE: &str = r#"{
        "fullName": "Nimali Perera",
        "educationLevel": 1,
        "olResults": {
            "Maths": "A", "Science": "B", "English": "A",
            "Sinhala": "A", "History": "C", "Religion": "B"
        },
        "stream": "Technology",
        "alResults": { "Engineering_Tech": "A", "Science_Tech": "B", "ICT": "A" },
        "zScore": 1.25
    }"#;

    #[test]
    fn complete_profile_renders_encoded_request() {
        let profile = load_profile(COMPLETE_PROFILE).expect("profile parses");
        let report = check_profile(&profile);

        let rendered: Value =
            serde_json::from_str(&report.render(false).expect("renders")).expect("json");
        assert_eq!(rendered["ready"], Value::Bool(true));
        assert_eq!(rendered["request"]["education_level"], 1);
        assert_eq!(rendered["request"]["al_stream"], 4);
        assert_eq!(rendered["request"]["z_score"], 1.25);
        assert_eq!(rendered["request"]["al_results"][2]["subject"], 12);
    }

    #[test]
    fn incomplete_profile_renders_field_errors() {
        let profile = load_profile(r#"{ "educationLevel": 1 }"#).expect("profile parses");
        let report = check_profile(&profile);

        let rendered: Value =
            serde_json::from_str(&report.render(true).expect("renders")).expect("json");
        assert_eq!(rendered["ready"], Value::Bool(false));
        assert_eq!(rendered["errors"]["ol_Maths"], "Maths grade is required");
        assert_eq!(rendered["errors"]["stream"], "A/L stream is required");
        assert!(rendered["errors"].get("zScore").is_none());
    }

    #[test]
    fn unknown_grade_letters_are_rejected() {
        let error = load_profile(r#"{ "olResults": { "Maths": "Z" } }"#)
            .expect_err("invalid grade");
        assert!(matches!(error, AppError::InvalidProfile(_)));
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let error = run_check(CheckArgs {
            profile: PathBuf::from("/nonexistent/career-compass/profile.json"),
            pretty: false,
        })
        .expect_err("file is missing");
        assert!(matches!(error, AppError::Io(_)));
    }
}
