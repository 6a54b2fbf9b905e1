//! Saved forecast history.
//!
//! [`ForecastHistoryStore`] is the async handle callers share. It owns a
//! [`SqliteHistoryStore`] behind a mutex, runs every query on the blocking
//! pool, and announces mutations on a broadcast channel so list views can
//! refresh themselves.

use std::{path::Path, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::{
    error::HistoryError,
    model::{ForecastRecord, NewForecast, RecordId},
};

pub mod sqlite;

pub use sqlite::SqliteHistoryStore;

const EVENT_CAPACITY: usize = 32;

/// Change notification emitted after a successful mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEvent {
    Saved(ForecastRecord),
    Deleted(RecordId),
}

/// Shared, cloneable handle to the forecast history.
#[derive(Debug, Clone)]
pub struct ForecastHistoryStore {
    store: Arc<Mutex<SqliteHistoryStore>>,
    events: broadcast::Sender<HistoryEvent>,
}

impl ForecastHistoryStore {
    pub fn new(store: SqliteHistoryStore) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { store: Arc::new(Mutex::new(store)), events }
    }

    /// Open the history database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HistoryError> {
        Ok(Self::new(SqliteHistoryStore::open(path)?))
    }

    pub fn in_memory() -> Result<Self, HistoryError> {
        Ok(Self::new(SqliteHistoryStore::open_in_memory()?))
    }

    /// Receive [`HistoryEvent`]s for every later `save` and `delete`.
    pub fn subscribe(&self) -> broadcast::Receiver<HistoryEvent> {
        self.events.subscribe()
    }

    /// Persist a new forecast.
    ///
    /// The [`HistoryEvent::Saved`] announcement is sent from the storage task,
    /// so it goes out even if the caller stops awaiting after the write began.
    pub async fn save(&self, new: NewForecast) -> Result<ForecastRecord, HistoryError> {
        let events = self.events.clone();
        self.run(move |store| {
            let record = store.insert(new)?;
            tracing::info!(id = %record.id, city = %record.city_name, "forecast saved");
            notify(&events, HistoryEvent::Saved(record.clone()));
            Ok::<_, HistoryError>(record)
        })
        .await
    }

    /// All saved forecasts, most recent first. Empty when nothing was saved.
    pub async fn list_all(&self) -> Result<Vec<ForecastRecord>, HistoryError> {
        self.run(|store| store.list_all()).await
    }

    /// Remove `record`. Deleting a record that is already gone is a no-op.
    pub async fn delete(&self, record: &ForecastRecord) -> Result<(), HistoryError> {
        self.delete_by_id(record.id).await
    }

    pub async fn delete_by_id(&self, id: RecordId) -> Result<(), HistoryError> {
        let events = self.events.clone();
        self.run(move |store| {
            if store.remove(id)? {
                tracing::info!(%id, "forecast deleted");
                notify(&events, HistoryEvent::Deleted(id));
            } else {
                tracing::debug!(%id, "forecast already deleted");
            }
            Ok::<_, rusqlite::Error>(())
        })
        .await
    }

    pub async fn count(&self) -> Result<usize, HistoryError> {
        self.run(|store| store.count()).await
    }

    async fn run<T, E, F>(&self, op: F) -> Result<T, HistoryError>
    where
        T: Send + 'static,
        E: Send + 'static,
        HistoryError: From<E>,
        F: FnOnce(&SqliteHistoryStore) -> Result<T, E> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || {
            let guard = store.lock();
            op(&*guard)
        })
        .await?;
        Ok(result?)
    }
}

fn notify(events: &broadcast::Sender<HistoryEvent>, event: HistoryEvent) {
    // Err only means nobody is listening.
    let _ = events.send(event);
}
