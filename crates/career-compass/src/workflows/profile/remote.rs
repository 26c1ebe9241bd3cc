//! HTTP implementations of the prediction and profile store collaborators.
//!
//! Both services answer errors with a JSON body carrying a `message` field; that message
//! is surfaced to the student as-is.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::domain::{PredictionResult, UserId};
use super::encoding::EncodedRequest;
use super::repository::{
    PersistenceError, PredictionClient, PredictionError, ProfileRecord, ProfileStore,
    SaveConfirmation,
};
use crate::config::{PredictionConfig, StoreConfig};

const PREDICTION_FALLBACK: &str = "Failed to get predictions";
const SAVE_FALLBACK: &str = "Failed to save profile";
const FETCH_FALLBACK: &str = "Failed to load profile";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Extracts `message` from an error response, falling back when absent or unreadable.
async fn error_message(response: Response, fallback: &str) -> String {
    response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Client for the career prediction model, `POST <base>/api/predictions`.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    client: Client,
    base_url: String,
}

impl HttpPredictionClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &PredictionConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn predictions_url(&self) -> String {
        format!("{}/api/predictions", self.base_url)
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn predict(&self, request: &EncodedRequest) -> Result<PredictionResult, PredictionError> {
        let url = self.predictions_url();
        debug!(%url, education_level = request.education_level, "requesting career predictions");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| PredictionError::Unavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictionError::Rejected {
                status: status.as_u16(),
                message: error_message(response, PREDICTION_FALLBACK).await,
            });
        }

        response
            .json::<PredictionResult>()
            .await
            .map_err(|err| PredictionError::InvalidResponse(err.to_string()))
    }
}

/// Client for the remote profile store, `<base>/api/profiles/<userId>`.
#[derive(Debug, Clone)]
pub struct HttpProfileStore {
    client: Client,
    base_url: String,
}

impl HttpProfileStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// `None` when no store URL is configured.
    pub fn from_config(
        config: &StoreConfig,
        timeout: Duration,
    ) -> Result<Option<Self>, reqwest::Error> {
        config
            .base_url
            .as_ref()
            .map(|base_url| Self::new(base_url.clone(), timeout))
            .transpose()
    }

    /// `<base>/api/profiles/<userId>` with the id percent-encoded as a single segment.
    fn profile_url(&self, user_id: &UserId) -> Result<Url, PersistenceError> {
        let id = user_id.as_str();
        if matches!(id.trim(), "" | "." | "..") {
            return Err(PersistenceError::InvalidUserId(id.to_string()));
        }

        let mut url = Url::parse(&self.base_url).map_err(|err| {
            PersistenceError::Unavailable(format!(
                "invalid profile store URL '{}': {err}",
                self.base_url
            ))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                PersistenceError::Unavailable(format!(
                    "profile store URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["api", "profiles", id]);
        Ok(url)
    }
}

#[async_trait]
impl ProfileStore for HttpProfileStore {
    async fn save(
        &self,
        user_id: &UserId,
        record: &ProfileRecord,
    ) -> Result<SaveConfirmation, PersistenceError> {
        let response = self
            .client
            .post(self.profile_url(user_id)?)
            .json(record)
            .send()
            .await
            .map_err(|err| PersistenceError::Unavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PersistenceError::Rejected {
                status: status.as_u16(),
                message: error_message(response, SAVE_FALLBACK).await,
            });
        }

        Ok(SaveConfirmation {
            user_id: user_id.clone(),
            stored_at: Utc::now(),
        })
    }

    async fn fetch(&self, user_id: &UserId) -> Result<Option<ProfileRecord>, PersistenceError> {
        let response = self
            .client
            .get(self.profile_url(user_id)?)
            .send()
            .await
            .map_err(|err| PersistenceError::Unavailable(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PersistenceError::Rejected {
                status: status.as_u16(),
                message: error_message(response, FETCH_FALLBACK).await,
            });
        }

        response
            .json::<ProfileRecord>()
            .await
            .map(Some)
            .map_err(|err| PersistenceError::Corrupt(err.to_string()))
    }
}
