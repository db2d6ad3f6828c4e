//! In-memory cache of the merged parcel dataset.
//!
//! The cache starts empty and is populated by the first [`DatasetCache::get_or_load`] call.
//! Concurrent callers that find it empty serialize on a load lock, so at most one load runs
//! at a time and waiters pick up its result. A successful load replaces the dataset
//! atomically; a failed load leaves the previous dataset (if any) in place.

use std::{
    sync::{Arc, Mutex, PoisonError, RwLock},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::{
    config::SourceConfig,
    error::LoadError,
    parcel::{load_dataset, LoadStats, MergedDataset},
};

/// Something that can build a [`MergedDataset`] from scratch.
pub trait DatasetSource: Send + Sync {
    fn load(&self) -> Result<MergedDataset, LoadError>;
}

/// Loads from the parcel shapefile and assessment CSV named in a [`SourceConfig`].
#[derive(Debug, Clone)]
pub struct FileSource {
    config: SourceConfig,
}

impl FileSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    #[inline] pub fn config(&self) -> &SourceConfig { &self.config }
}

impl DatasetSource for FileSource {
    fn load(&self) -> Result<MergedDataset, LoadError> {
        load_dataset(&self.config)
    }
}

impl<F> DatasetSource for F
where
    F: Fn() -> Result<MergedDataset, LoadError> + Send + Sync,
{
    fn load(&self) -> Result<MergedDataset, LoadError> {
        self()
    }
}

/// Health snapshot of a [`DatasetCache`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStatus {
    /// A dataset is cached (possibly with zero parcels).
    pub loaded: bool,
    /// The cached dataset was invalidated and will be replaced on next access.
    pub stale: bool,
    pub parcel_count: Option<usize>,
    /// Seconds since the Unix epoch of the last successful load.
    pub loaded_at: Option<u64>,
    /// Seconds since the last successful load.
    pub age_secs: Option<u64>,
    /// Message of the most recent failed load, cleared by the next success.
    pub last_error: Option<String>,
    /// Number of load attempts, successful or not.
    pub load_count: u64,
    pub stats: Option<LoadStats>,
}

#[derive(Default)]
struct CacheState {
    dataset: Option<Arc<MergedDataset>>,
    loaded_at: Option<(SystemTime, Instant)>,
    stale: bool,
    last_error: Option<String>,
    load_count: u64,
    generation: u64, // Bumped on every successful load.
}

/// Lazily loaded, explicitly invalidated holder of the merged dataset.
pub struct DatasetCache<S = FileSource> {
    source: S,
    state: RwLock<CacheState>,
    load_lock: Mutex<()>,
}

impl DatasetCache<FileSource> {
    /// Cache over the configured parcel and assessment files.
    pub fn from_config(config: SourceConfig) -> Self {
        Self::new(FileSource::new(config))
    }
}

impl<S: DatasetSource> DatasetCache<S> {
    pub fn new(source: S) -> Self {
        Self { source, state: RwLock::new(CacheState::default()), load_lock: Mutex::new(()) }
    }

    #[inline] pub fn source(&self) -> &S { &self.source }

    /// Return the cached dataset, loading it first if there is none, it was invalidated, or
    /// `force_reload` is set.
    ///
    /// A failed forced reload returns the error and keeps the previous dataset. A failed
    /// reload of an invalidated dataset logs the error and keeps serving the old one.
    pub fn get_or_load(&self, force_reload: bool) -> Result<Arc<MergedDataset>, LoadError> {
        let seen = {
            let state = self.read_state();
            match &state.dataset {
                Some(dataset) if !force_reload && !state.stale => return Ok(dataset.clone()),
                _ => state.generation,
            }
        };

        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Someone else may have finished a load while we waited for the lock.
        {
            let state = self.read_state();
            if let Some(dataset) = &state.dataset {
                if state.generation != seen || (!force_reload && !state.stale) {
                    debug!("reusing dataset loaded by a concurrent caller");
                    return Ok(dataset.clone());
                }
            }
        }

        info!(force_reload, "loading parcel dataset");
        let result = self.source.load();

        let mut state = self.write_state();
        state.load_count += 1;
        match result {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                state.dataset = Some(dataset.clone());
                state.loaded_at = Some((SystemTime::now(), Instant::now()));
                state.stale = false;
                state.last_error = None;
                state.generation += 1;
                Ok(dataset)
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, "failed to load parcel dataset");
                state.last_error = Some(e.to_string());
                match &state.dataset {
                    Some(previous) if !force_reload => {
                        warn!("serving previously loaded dataset");
                        Ok(previous.clone())
                    }
                    _ => Err(e),
                }
            }
        }
    }

    /// The dataset as currently cached, without loading anything.
    pub fn cached(&self) -> Option<Arc<MergedDataset>> {
        self.read_state().dataset.clone()
    }

    /// Mark the cached dataset stale; the next [`get_or_load`](Self::get_or_load) reloads it.
    /// The stale dataset stays available until a reload succeeds.
    pub fn invalidate(&self) {
        let mut state = self.write_state();
        if state.dataset.is_some() {
            state.stale = true;
            debug!("parcel dataset invalidated");
        }
    }

    pub fn status(&self) -> CacheStatus {
        let state = self.read_state();
        let dataset = state.dataset.as_deref();
        CacheStatus {
            loaded: dataset.is_some(),
            stale: state.stale,
            parcel_count: dataset.map(MergedDataset::len),
            loaded_at: state.loaded_at
                .and_then(|(at, _)| at.duration_since(UNIX_EPOCH).ok())
                .map(|since| since.as_secs()),
            age_secs: state.loaded_at.map(|(_, at)| at.elapsed().as_secs()),
            last_error: state.last_error.clone(),
            load_count: state.load_count,
            stats: dataset.map(|dataset| dataset.stats().clone()),
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
