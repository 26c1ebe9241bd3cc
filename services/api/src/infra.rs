use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use career_compass::config::StoreConfig;
use career_compass::error::AppError;
use career_compass::workflows::profile::{
    HttpProfileStore, PersistenceError, ProfileRecord, ProfileStore, SaveConfirmation, UserId,
};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local profile store used when no remote store is configured.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileStore {
    records: Arc<Mutex<HashMap<UserId, ProfileRecord>>>,
}

fn poisoned() -> PersistenceError {
    PersistenceError::Unavailable("profile store lock poisoned".to_string())
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn save(
        &self,
        user_id: &UserId,
        record: &ProfileRecord,
    ) -> Result<SaveConfirmation, PersistenceError> {
        let mut guard = self.records.lock().map_err(|_| poisoned())?;
        guard.insert(user_id.clone(), record.clone());
        Ok(SaveConfirmation {
            user_id: user_id.clone(),
            stored_at: Utc::now(),
        })
    }

    async fn fetch(&self, user_id: &UserId) -> Result<Option<ProfileRecord>, PersistenceError> {
        let guard = self.records.lock().map_err(|_| poisoned())?;
        Ok(guard.get(user_id).cloned())
    }
}

/// Store selected at startup from `PROFILE_STORE_URL`.
#[derive(Clone)]
pub(crate) enum ConfiguredProfileStore {
    Memory(InMemoryProfileStore),
    Http(HttpProfileStore),
}

impl ConfiguredProfileStore {
    pub(crate) fn from_config(
        config: &StoreConfig,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        Ok(match HttpProfileStore::from_config(config, timeout)? {
            Some(store) => Self::Http(store),
            None => Self::Memory(InMemoryProfileStore::default()),
        })
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Http(_) => "http",
        }
    }
}

#[async_trait]
impl ProfileStore for ConfiguredProfileStore {
    async fn save(
        &self,
        user_id: &UserId,
        record: &ProfileRecord,
    ) -> Result<SaveConfirmation, PersistenceError> {
        match self {
            Self::Memory(store) => store.save(user_id, record).await,
            Self::Http(store) => store.save(user_id, record).await,
        }
    }

    async fn fetch(&self, user_id: &UserId) -> Result<Option<ProfileRecord>, PersistenceError> {
        match self {
            Self::Memory(store) => store.fetch(user_id).await,
            Self::Http(store) => store.fetch(user_id).await,
        }
    }
}
