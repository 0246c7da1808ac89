//! In-memory result store keyed by experiment configuration.
//!
//! Memoizes one [`EstimationResult`] per [`ExperimentConfig`]. Writes go
//! through upsert semantics: concurrent attempts to insert the same key
//! collapse to a single row instead of surfacing a conflict, so callers can
//! treat "check cache, else compute, else insert" as one operation via
//! [`ResultStore::get_or_compute`].

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::core::{EstimationResult, ExperimentConfig};
use crate::error::Result;

/// Where a returned result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    /// Found in the store; the estimator was not invoked.
    Cache,
    /// Freshly computed during this call.
    Computed,
}

impl ResultSource {
    /// Label used by the textual report.
    pub fn label(&self) -> &'static str {
        match self {
            ResultSource::Cache => "cache",
            ResultSource::Computed => "computation",
        }
    }
}

/// A stored row: the immutable result plus its insertion timestamp.
#[derive(Debug, Clone)]
pub struct StoredResult {
    pub result: EstimationResult,
    pub computed_at: DateTime<Utc>,
}

/// Shared, in-memory memo of estimation results.
///
/// Interior mutability behind `&self` so one store handle can be shared by
/// concurrent workers; uniqueness per configuration is enforced here, not by
/// callers.
#[derive(Debug, Default)]
pub struct ResultStore {
    rows: RwLock<HashMap<ExperimentConfig, StoredResult>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a result without computing anything.
    pub fn get(&self, config: &ExperimentConfig) -> Option<EstimationResult> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        rows.get(config).map(|row| row.result.clone())
    }

    /// Insert or replace the row for `config`. Last write wins; the store
    /// never holds more than one row per configuration.
    pub fn upsert(&self, config: ExperimentConfig, result: EstimationResult) {
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        rows.insert(
            config,
            StoredResult {
                result,
                computed_at: Utc::now(),
            },
        );
    }

    /// Return the stored result, or compute, store, and return it.
    ///
    /// The compute closure runs outside any lock, so slow estimations do not
    /// serialize unrelated lookups. If two callers race on the same missing
    /// key, both may compute, but the insert itself is an upsert through the
    /// entry API under one write lock: exactly one row survives and no
    /// conflict propagates. A second call with the same configuration never
    /// re-invokes the closure.
    pub fn get_or_compute<F>(
        &self,
        config: ExperimentConfig,
        compute: F,
    ) -> Result<(EstimationResult, ResultSource)>
    where
        F: FnOnce() -> Result<EstimationResult>,
    {
        config.validate()?;
        if let Some(result) = self.get(&config) {
            return Ok((result, ResultSource::Cache));
        }

        let result = compute()?;

        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        match rows.entry(config) {
            Entry::Occupied(row) => {
                // Lost the race: keep the winner's row.
                Ok((row.get().result.clone(), ResultSource::Cache))
            }
            Entry::Vacant(slot) => {
                slot.insert(StoredResult {
                    result: result.clone(),
                    computed_at: Utc::now(),
                });
                Ok((result, ResultSource::Computed))
            }
        }
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
