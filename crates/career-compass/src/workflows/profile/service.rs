use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{PredictionResult, ProfileState, UserId};
use super::encoding::encode;
use super::repository::{
    PersistenceError, PredictionClient, PredictionError, ProfileRecord, ProfileStore,
};
use super::taxonomy;
use super::validation::{validate, ValidationErrors};

/// Shown when a collaborator fails without a usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while processing your profile";

/// Service sequencing validation, encoding, prediction, and persistence.
pub struct ProfileSubmissionService<P, S> {
    predictor: Arc<P>,
    store: Arc<S>,
}

impl<P, S> ProfileSubmissionService<P, S>
where
    P: PredictionClient + 'static,
    S: ProfileStore + 'static,
{
    pub fn new(predictor: Arc<P>, store: Arc<S>) -> Self {
        Self { predictor, store }
    }

    /// Start an editing session, pre-populated from the last saved profile if any.
    pub async fn resume(&self, user_id: UserId) -> Result<ProfileSession, SubmissionError> {
        let prior = self
            .store
            .fetch(&user_id)
            .await
            .map_err(SubmissionError::Lookup)?;
        Ok(ProfileSession::from_prior(user_id, prior))
    }

    /// Validate, encode, predict, then persist.
    ///
    /// The profile is taken by value so the request is built from a snapshot; edits the
    /// caller makes while this future is pending are not part of the submission. Nothing
    /// is rolled back or retried when a later step fails.
    pub async fn submit(
        &self,
        user_id: &UserId,
        snapshot: ProfileState,
    ) -> Result<ProfileRecord, SubmissionError> {
        let errors = validate(&snapshot);
        if !errors.is_clean() {
            info!(
                user_id = user_id.as_str(),
                fields = errors.len(),
                "profile submission blocked by validation"
            );
            return Err(SubmissionError::Validation(errors));
        }

        let request = encode(&snapshot);
        let predictions = self.predictor.predict(&request).await.map_err(|err| {
            warn!(user_id = user_id.as_str(), error = %err, "career prediction failed");
            SubmissionError::Prediction(err)
        })?;
        let unknown = unknown_careers(&predictions);
        if !unknown.is_empty() {
            warn!(
                user_id = user_id.as_str(),
                careers = ?unknown,
                "prediction returned careers outside the catalog"
            );
        }

        let record = ProfileRecord {
            user_id: user_id.clone(),
            profile: snapshot,
            predictions,
            submitted_at: Utc::now(),
        };

        let confirmation = self.store.save(user_id, &record).await.map_err(|err| {
            warn!(
                user_id = user_id.as_str(),
                error = %err,
                "prediction received but profile was not saved"
            );
            SubmissionError::Persistence(err)
        })?;

        info!(
            user_id = user_id.as_str(),
            predictions = record.predictions.len(),
            stored_at = %confirmation.stored_at,
            "profile submitted"
        );
        Ok(record)
    }
}

/// Editing session for one authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSession {
    pub user_id: UserId,
    pub profile: ProfileState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predictions: Option<PredictionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_submitted_at: Option<DateTime<Utc>>,
}

impl ProfileSession {
    pub fn new(user_id: UserId) -> Self {
        Self::from_prior(user_id, None)
    }

    pub fn from_prior(user_id: UserId, prior: Option<ProfileRecord>) -> Self {
        match prior {
            Some(record) => Self {
                user_id,
                profile: record.profile,
                predictions: Some(record.predictions),
                last_submitted_at: Some(record.submitted_at),
            },
            None => Self {
                user_id,
                profile: ProfileState::new(),
                predictions: None,
                last_submitted_at: None,
            },
        }
    }

    pub fn validate(&self) -> ValidationErrors {
        validate(&self.profile)
    }

    /// Copy of the current profile to hand to [`ProfileSubmissionService::submit`].
    pub fn snapshot(&self) -> ProfileState {
        self.profile.clone()
    }

    /// Note a completed submission without discarding edits made since its snapshot.
    pub fn record_submission(&mut self, record: &ProfileRecord) {
        self.predictions = Some(record.predictions.clone());
        self.last_submitted_at = Some(record.submitted_at);
    }
}

/// Error raised by the submission service.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("profile has {} validation error(s)", .0.len())]
    Validation(ValidationErrors),
    #[error("career prediction failed: {0}")]
    Prediction(#[source] PredictionError),
    #[error("profile could not be saved: {0}")]
    Persistence(#[source] PersistenceError),
    #[error("saved profile could not be loaded: {0}")]
    Lookup(#[source] PersistenceError),
}

impl SubmissionError {
    /// Single message suitable for display next to the form.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Validation(_) => "Please correct the highlighted fields".to_string(),
            SubmissionError::Prediction(err) => or_generic(err.message()).to_string(),
            SubmissionError::Persistence(err) => format!(
                "Your career predictions were generated but could not be saved: {}",
                or_generic(err.message())
            ),
            SubmissionError::Lookup(err) => format!(
                "Your saved profile could not be loaded: {}",
                or_generic(err.message())
            ),
        }
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            SubmissionError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SubmissionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SubmissionError::Prediction(_) => StatusCode::BAD_GATEWAY,
            SubmissionError::Persistence(_) | SubmissionError::Lookup(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Labels the model returned that the career catalog does not know.
pub fn unknown_careers(predictions: &PredictionResult) -> Vec<&str> {
    predictions
        .iter()
        .map(|prediction| prediction.career.as_str())
        .filter(|career| taxonomy::career_code(career).is_none())
        .collect()
}

fn or_generic(message: &str) -> &str {
    if message.trim().is_empty() {
        GENERIC_FAILURE_MESSAGE
    } else {
        message
    }
}
