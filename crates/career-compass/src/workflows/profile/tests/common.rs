use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::workflows::profile::domain::{
    CareerPrediction, PredictionResult, ProfileState, Section, UserId,
};
use crate::workflows::profile::encoding::EncodedRequest;
use crate::workflows::profile::repository::{
    PersistenceError, PredictionClient, PredictionError, ProfileRecord, ProfileStore,
    SaveConfirmation,
};
use crate::workflows::profile::service::ProfileSubmissionService;
use crate::workflows::profile::taxonomy::{self, EducationStage, Grade, Stream};

pub(super) fn user() -> UserId {
    UserId("student-001".to_string())
}

pub(super) fn primary_graded(grade: Grade) -> ProfileState {
    let mut state = ProfileState::new();
    for subject in taxonomy::subjects_for_stage(EducationStage::PrimaryExam) {
        state
            .set_grade(Section::Primary, subject, Some(grade))
            .expect("primary subject exists");
    }
    state
}

pub(super) fn grade_stream(state: &mut ProfileState, grade: Grade) {
    let stream = state.stream().expect("stream selected");
    for subject in taxonomy::subjects_for_stream(stream) {
        state
            .set_grade(Section::Stream, subject, Some(grade))
            .expect("stream subject exists");
    }
}

/// Secondary-exam student in Commerce: primary B, stream A, z-score 3.5.
pub(super) fn commerce_profile() -> ProfileState {
    let mut state = primary_graded(Grade::B);
    state.set_stage(EducationStage::SecondaryExam);
    state.select_stream(Some(Stream::Commerce));
    grade_stream(&mut state, Grade::A);
    state.set_z_score(Some("3.5".to_string()));
    state
}

pub(super) fn university_profile(gpa: Option<&str>) -> ProfileState {
    let mut state = primary_graded(Grade::A);
    state.set_stage(EducationStage::University);
    state.select_stream(Some(Stream::PhysicalScience));
    grade_stream(&mut state, Grade::B);
    state.set_z_score(Some("1.8421".to_string()));
    state.set_gpa(gpa.map(str::to_string));
    state
}

pub(super) fn predictions() -> PredictionResult {
    PredictionResult(vec![
        CareerPrediction {
            career: "Business".to_string(),
            probability: 0.72,
        },
        CareerPrediction {
            career: "IT".to_string(),
            probability: 0.18,
        },
    ])
}

pub(super) fn record_for(user_id: &UserId, profile: ProfileState) -> ProfileRecord {
    ProfileRecord {
        user_id: user_id.clone(),
        profile,
        predictions: predictions(),
        submitted_at: Utc
            .with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
            .single()
            .expect("valid timestamp"),
    }
}

pub(super) struct StubPredictor {
    response: Result<PredictionResult, PredictionError>,
    requests: Mutex<Vec<EncodedRequest>>,
}

impl StubPredictor {
    pub(super) fn succeeding() -> Self {
        Self::with_response(Ok(predictions()))
    }

    pub(super) fn failing(error: PredictionError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<PredictionResult, PredictionError>) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn requests(&self) -> Vec<EncodedRequest> {
        self.requests.lock().expect("predictor mutex poisoned").clone()
    }
}

#[async_trait]
impl PredictionClient for StubPredictor {
    async fn predict(&self, request: &EncodedRequest) -> Result<PredictionResult, PredictionError> {
        self.requests
            .lock()
            .expect("predictor mutex poisoned")
            .push(request.clone());
        self.response.clone()
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) records: Arc<Mutex<HashMap<UserId, ProfileRecord>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub(super) fn with_record(record: ProfileRecord) -> Self {
        let store = Self::default();
        store
            .records
            .lock()
            .expect("store mutex poisoned")
            .insert(record.user_id.clone(), record);
        store
    }

    pub(super) fn saves(&self) -> usize {
        *self.saves.lock().expect("store mutex poisoned")
    }

    pub(super) fn stored(&self, user_id: &UserId) -> Option<ProfileRecord> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .get(user_id)
            .cloned()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn save(
        &self,
        user_id: &UserId,
        record: &ProfileRecord,
    ) -> Result<SaveConfirmation, PersistenceError> {
        *self.saves.lock().expect("store mutex poisoned") += 1;
        self.records
            .lock()
            .expect("store mutex poisoned")
            .insert(user_id.clone(), record.clone());
        Ok(SaveConfirmation {
            user_id: user_id.clone(),
            stored_at: Utc::now(),
        })
    }

    async fn fetch(&self, user_id: &UserId) -> Result<Option<ProfileRecord>, PersistenceError> {
        Ok(self.stored(user_id))
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl ProfileStore for UnavailableStore {
    async fn save(
        &self,
        _user_id: &UserId,
        _record: &ProfileRecord,
    ) -> Result<SaveConfirmation, PersistenceError> {
        Err(PersistenceError::Unavailable("database offline".to_string()))
    }

    async fn fetch(&self, _user_id: &UserId) -> Result<Option<ProfileRecord>, PersistenceError> {
        Err(PersistenceError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    ProfileSubmissionService<StubPredictor, MemoryStore>,
    Arc<StubPredictor>,
    Arc<MemoryStore>,
) {
    let predictor = Arc::new(StubPredictor::succeeding());
    let store = Arc::new(MemoryStore::default());
    let service = ProfileSubmissionService::new(predictor.clone(), store.clone());
    (service, predictor, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
