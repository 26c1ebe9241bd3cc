use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{PredictionResult, ProfileState, UserId};
use super::encoding::EncodedRequest;

/// Profile as persisted after a successful prediction.
///
/// On the wire the profile fields sit at the top level next to `userId`, `predictions`
/// and `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub user_id: UserId,
    #[serde(flatten)]
    pub profile: ProfileState,
    pub predictions: PredictionResult,
    #[serde(rename = "timestamp")]
    pub submitted_at: DateTime<Utc>,
}

/// Acknowledgement returned by a [`ProfileStore`] after a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveConfirmation {
    pub user_id: UserId,
    pub stored_at: DateTime<Utc>,
}

/// External career prediction model.
#[async_trait]
pub trait PredictionClient: Send + Sync {
    async fn predict(&self, request: &EncodedRequest) -> Result<PredictionResult, PredictionError>;
}

/// Storage abstraction so the submission service can be exercised in isolation.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn save(
        &self,
        user_id: &UserId,
        record: &ProfileRecord,
    ) -> Result<SaveConfirmation, PersistenceError>;

    /// Previously saved profile, used to pre-populate a new editing session.
    async fn fetch(&self, user_id: &UserId) -> Result<Option<ProfileRecord>, PersistenceError>;
}

/// Prediction call failure. Display renders the service message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    InvalidResponse(String),
}

impl PredictionError {
    pub fn message(&self) -> &str {
        match self {
            PredictionError::Rejected { message, .. } => message,
            PredictionError::Unavailable(message) | PredictionError::InvalidResponse(message) => {
                message
            }
        }
    }
}

/// Profile store failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// The user id cannot address a single profile.
    #[error("invalid user id '{0}'")]
    InvalidUserId(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Corrupt(String),
}

impl PersistenceError {
    pub fn message(&self) -> &str {
        match self {
            PersistenceError::Rejected { message, .. } => message,
            PersistenceError::InvalidUserId(_) => "Invalid user id",
            PersistenceError::Unavailable(message) | PersistenceError::Corrupt(message) => message,
        }
    }
}
