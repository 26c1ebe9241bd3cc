//! Student academic profile intake.
//!
//! The pipeline runs taxonomy lookups, stage/stream-aware validation, encoding into the
//! prediction model's numeric schema, and finally the submission service that calls the
//! model and persists the merged profile.

pub mod domain;
pub mod encoding;
pub mod remote;
pub mod repository;
pub mod router;
pub mod service;
pub mod taxonomy;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    applicable_fields, ApplicableFields, CareerPrediction, GradeEntry, GradeSheet,
    PersonalDetails, PredictionResult, ProfileEditError, ProfileSnapshot, ProfileState, Section,
    UserId,
};
pub use encoding::{encode, EncodedGrade, EncodedRequest};
pub use remote::{HttpPredictionClient, HttpProfileStore};
pub use repository::{
    PersistenceError, PredictionClient, PredictionError, ProfileRecord, ProfileStore,
    SaveConfirmation,
};
pub use router::profile_router;
pub use service::{
    unknown_careers, ProfileSession, ProfileSubmissionService, SubmissionError,
    GENERIC_FAILURE_MESSAGE,
};
pub use taxonomy::{EducationStage, Grade, Stream, TaxonomyError};
pub use validation::{validate, FieldKey, ValidationErrors};
