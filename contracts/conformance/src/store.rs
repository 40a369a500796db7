//! Downstream storage oracle for run results.

use modelkit_types::{MediaType, ModelResult, OutputData};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("output '{title}' has media type {media_type} but carries {found} data")]
    MediaMismatch {
        title: String,
        media_type: MediaType,
        found: &'static str,
    },

    #[error("result store unavailable: {0}")]
    Unavailable(String),
}

/// Accepts or rejects a run result as the publishing side would.
pub trait ResultStore: Send + Sync {
    /// Persist `result`, returning the key it was written under.
    fn write(&self, result: &ModelResult) -> Result<Uuid, StoreError>;
}

/// Keeps accepted results in memory.
///
/// Binary media types must carry bytes; text media types must carry text or
/// a structured record.
///
/// Results accumulate until [`InMemoryResultStore::clear`] is called, so a
/// store shared across runs through `with_store` keeps every run's output.
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    results: Mutex<HashMap<Uuid, ModelResult>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &Uuid) -> Option<ModelResult> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored result.
    pub fn clear(&self) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ResultStore for InMemoryResultStore {
    fn write(&self, result: &ModelResult) -> Result<Uuid, StoreError> {
        for item in result.items() {
            let fits = match &item.data {
                OutputData::Bytes(_) => item.media_type.is_binary(),
                OutputData::Text(_) | OutputData::Record(_) => !item.media_type.is_binary(),
            };
            if !fits {
                return Err(StoreError::MediaMismatch {
                    title: item.title.clone(),
                    media_type: item.media_type,
                    found: item.data.kind(),
                });
            }
        }

        let id = Uuid::new_v4();
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, result.clone());
        tracing::debug!(%id, outputs = result.items().count(), "stored model result");
        Ok(id)
    }
}
