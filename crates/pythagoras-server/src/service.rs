use pythagoras_core::ranking::{
    MAX_SCORE, RANKING_CAPACITY, RankingEntry, ValidationError, validate_name,
};
use pythagoras_core::time::timestamp_now;

use crate::config::ResetSecret;
use crate::store::{RankingBackend, RankingStore, StoreError};

/// Domain outcomes of ranking operations.
#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("{}", ValidationError::InvalidName)]
    InvalidName,
    #[error("{}", ValidationError::InvalidScore)]
    InvalidScore,
    #[error("wrong reset password")]
    Unauthorized,
    #[error("storage failure: {0}")]
    StorageFailure(#[from] StoreError),
}

impl From<ValidationError> for RankingError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidName => Self::InvalidName,
            ValidationError::InvalidScore => Self::InvalidScore,
        }
    }
}

/// Leaderboard rules on top of a [`RankingBackend`]: validation, top-N
/// retention and reset authorization. Inputs are validated before the store
/// is touched.
pub struct RankingService<S = RankingStore> {
    store: S,
    reset_secret: ResetSecret,
}

impl<S: RankingBackend> RankingService<S> {
    pub fn new(store: S, reset_secret: ResetSecret) -> Self {
        Self {
            store,
            reset_secret,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a score under a trimmed name, replacing that name's previous
    /// entry and evicting anything beyond the top [`RANKING_CAPACITY`].
    pub fn submit_score(&self, name: &str, score: u64) -> Result<(), RankingError> {
        let name = validate_name(name)?;
        if score > MAX_SCORE {
            return Err(RankingError::InvalidScore);
        }

        let entry = RankingEntry::new(name, score, timestamp_now());
        let evicted = self
            .store
            .upsert(&entry, RANKING_CAPACITY)
            .inspect_err(|e| {
                tracing::error!(operation = "submit", name, error = %e, "Failed to record score");
            })?;

        tracing::info!(name, score, evicted, "Score recorded");
        Ok(())
    }

    /// Current leaderboard, best first, at most [`RANKING_CAPACITY`] entries.
    pub fn get_top(&self) -> Result<Vec<RankingEntry>, RankingError> {
        let mut entries = self.store.list_all().inspect_err(|e| {
            tracing::error!(operation = "list", error = %e, "Failed to read ranking");
        })?;
        entries.truncate(RANKING_CAPACITY);
        Ok(entries)
    }

    /// Whether a case-insensitive match of `name` is on the leaderboard.
    /// Blank names are rejected.
    pub fn is_name_taken(&self, name: &str) -> Result<bool, RankingError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RankingError::InvalidName);
        }
        Ok(self.store.exists(name).inspect_err(|e| {
            tracing::error!(operation = "check_name", name, error = %e, "Failed to check name");
        })?)
    }

    /// Clear the leaderboard if `provided_password` equals the reset secret.
    pub fn reset_all(&self, provided_password: &str) -> Result<(), RankingError> {
        if !self.reset_secret.matches(provided_password) {
            tracing::warn!("Rejected ranking reset: wrong password");
            return Err(RankingError::Unauthorized);
        }
        self.store.clear().inspect_err(|e| {
            tracing::error!(operation = "reset", error = %e, "Failed to clear ranking");
        })?;
        tracing::info!("Ranking reset");
        Ok(())
    }
}
