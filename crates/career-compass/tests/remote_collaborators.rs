//! HTTP collaborator behavior against a mock prediction service and profile store.

use std::time::Duration;

use career_compass::workflows::profile::{
    encode, taxonomy, CareerPrediction, EducationStage, Grade, HttpPredictionClient,
    HttpProfileStore, PersistenceError, PredictionClient, PredictionError, PredictionResult,
    ProfileRecord, ProfileState, ProfileStore, Section, UserId,
};
use chrono::Utc;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn graded_profile() -> ProfileState {
    let mut state = ProfileState::new();
    for subject in taxonomy::subjects_for_stage(EducationStage::PrimaryExam) {
        state
            .set_grade(Section::Primary, subject, Some(Grade::B))
            .expect("primary subject");
    }
    state
}

fn client(server: &MockServer) -> HttpPredictionClient {
    HttpPredictionClient::new(server.uri(), Duration::from_secs(5)).expect("client builds")
}

fn store(server: &MockServer) -> HttpProfileStore {
    HttpProfileStore::new(format!("{}/", server.uri()), Duration::from_secs(5))
        .expect("store builds")
}

#[tokio::test]
async fn prediction_client_posts_encoded_request() {
    let server = MockServer::start().await;
    let request = encode(&graded_profile());
    Mock::given(method("POST"))
        .and(path("/api/predictions"))
        .and(body_json(&request))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "career": "Engineering", "probability": 0.5 },
            { "label": "IT", "probability": 0.3 },
            ["Medicine", 0.2]
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server).predict(&request).await.expect("prediction");

    let labels: Vec<&str> = result.iter().map(|p| p.career.as_str()).collect();
    assert_eq!(labels, vec!["Engineering", "IT", "Medicine"]);
    assert_eq!(result.0[2].probability, 0.2);
}

#[tokio::test]
async fn prediction_client_surfaces_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/predictions"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "z_score out of range" })),
        )
        .mount(&server)
        .await;

    let error = client(&server)
        .predict(&encode(&graded_profile()))
        .await
        .expect_err("service rejects");

    assert_eq!(
        error,
        PredictionError::Rejected {
            status: 422,
            message: "z_score out of range".to_string(),
        }
    );
    assert_eq!(error.to_string(), "z_score out of range");
}

#[tokio::test]
async fn prediction_client_falls_back_when_error_body_is_not_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/predictions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let error = client(&server)
        .predict(&encode(&graded_profile()))
        .await
        .expect_err("service fails");

    assert_eq!(error.message(), "Failed to get predictions");
}

#[tokio::test]
async fn prediction_client_reports_malformed_success_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/predictions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "careers": [] })))
        .mount(&server)
        .await;

    let error = client(&server)
        .predict(&encode(&graded_profile()))
        .await
        .expect_err("unexpected shape");

    assert!(matches!(error, PredictionError::InvalidResponse(_)));
}

#[tokio::test]
async fn profile_store_saves_and_fetches_records() {
    let server = MockServer::start().await;
    let user_id = UserId("uid-7".to_string());
    let record = ProfileRecord {
        user_id: user_id.clone(),
        profile: graded_profile(),
        predictions: PredictionResult(vec![CareerPrediction {
            career: "Business".to_string(),
            probability: 0.9,
        }]),
        submitted_at: Utc::now(),
    };
    Mock::given(method("POST"))
        .and(path("/api/profiles/uid-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/profiles/uid-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&record))
        .mount(&server)
        .await;

    let store = store(&server);
    let confirmation = store.save(&user_id, &record).await.expect("saved");
    let fetched = store.fetch(&user_id).await.expect("fetched");

    assert_eq!(confirmation.user_id, user_id);
    assert_eq!(fetched, Some(record));

    let requests = server.received_requests().await.expect("recording enabled");
    let saved: Value = requests[0].body_json().expect("json body");
    assert_eq!(saved["userId"], "uid-7");
    assert_eq!(saved["olResults"]["Maths"], "B");
    assert_eq!(saved["educationLevel"], 0);
    assert_eq!(saved["predictions"][0]["career"], "Business");
    assert!(saved["timestamp"].is_string());
    assert!(saved.get("profile").is_none());
}

#[tokio::test]
async fn profile_store_keeps_user_id_in_one_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "leak": true })))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/api/profiles/[^/]+$"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = store(&server)
        .fetch(&UserId("../admin/export".to_string()))
        .await
        .expect("lookup succeeds");

    assert!(fetched.is_none());
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/api/profiles/..%2Fadmin%2Fexport");
}

#[tokio::test]
async fn profile_store_rejects_dot_segment_user_ids() {
    let server = MockServer::start().await;

    let error = store(&server)
        .fetch(&UserId("..".to_string()))
        .await
        .expect_err("id cannot address a profile");

    assert_eq!(error, PersistenceError::InvalidUserId("..".to_string()));
    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn profile_store_treats_missing_profile_as_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profiles/uid-8"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetched = store(&server)
        .fetch(&UserId("uid-8".to_string()))
        .await
        .expect("lookup succeeds");

    assert!(fetched.is_none());
}

#[tokio::test]
async fn profile_store_surfaces_save_rejections() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/profiles/uid-9"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "message": "" })))
        .mount(&server)
        .await;
    let record = ProfileRecord {
        user_id: UserId("uid-9".to_string()),
        profile: graded_profile(),
        predictions: PredictionResult::default(),
        submitted_at: Utc::now(),
    };

    let error = store(&server)
        .save(&record.user_id, &record)
        .await
        .expect_err("store rejects");

    assert_eq!(
        error,
        PersistenceError::Rejected {
            status: 503,
            message: "Failed to save profile".to_string(),
        }
    );
}
