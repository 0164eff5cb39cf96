use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Maximum length of a player name, counted in characters after trimming.
pub const MAX_NAME_CHARS: usize = 10;

/// Number of entries the leaderboard retains.
pub const RANKING_CAPACITY: usize = 10;

/// Largest score a SQLite `INTEGER` column can hold.
pub const MAX_SCORE: u64 = i64::MAX as u64;

/// One leaderboard row. Serialized as `{name, score, date}` both on the wire
/// and in the flat-file store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub name: String,
    pub score: u64,
    #[serde(rename = "date")]
    pub recorded_at: String,
}

impl RankingEntry {
    pub fn new(name: impl Into<String>, score: u64, recorded_at: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score,
            recorded_at: recorded_at.into(),
        }
    }

    /// Case-insensitive identity of this entry's name.
    pub fn key(&self) -> String {
        name_key(&self.name)
    }
}

/// Rejections produced before any storage work happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must be between 1 and {} characters", MAX_NAME_CHARS)]
    InvalidName,
    #[error("score must be a non-negative integer")]
    InvalidScore,
}

/// Fold a name to the form used for uniqueness checks.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trim `raw` and check it is a usable player name.
pub fn validate_name(raw: &str) -> Result<&str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(ValidationError::InvalidName);
    }
    Ok(trimmed)
}

/// Interpret a JSON value as a score.
///
/// Integers and integral floats (`120.0`) are accepted; negatives, fractions,
/// non-numbers and anything above [`MAX_SCORE`] are not.
pub fn parse_score(value: &serde_json::Value) -> Result<u64, ValidationError> {
    let serde_json::Value::Number(n) = value else {
        return Err(ValidationError::InvalidScore);
    };
    if let Some(u) = n.as_u64() {
        return if u <= MAX_SCORE {
            Ok(u)
        } else {
            Err(ValidationError::InvalidScore)
        };
    }
    // MAX_SCORE as f64 rounds up to 2^63, hence the strict bound
    match n.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < MAX_SCORE as f64 => {
            Ok(f as u64)
        },
        _ => Err(ValidationError::InvalidScore),
    }
}

/// Sort an insertion-ordered slice into leaderboard order: score descending,
/// earlier insertions first among equal scores.
pub fn sort_ranking(entries: &mut [RankingEntry]) {
    // sort_by is stable, so insertion order survives among ties
    entries.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Replace any entry whose name matches `entry` case-insensitively, appending
/// `entry` at the end of the insertion order. Returns true if a prior entry
/// was replaced.
pub fn replace_by_name(entries: &mut Vec<RankingEntry>, entry: RankingEntry) -> bool {
    let key = entry.key();
    let before = entries.len();
    entries.retain(|e| e.key() != key);
    let replaced = entries.len() != before;
    entries.push(entry);
    replaced
}

/// Drop entries beyond `retain` from an insertion-ordered list. The lowest
/// scores go first; among equal scores the oldest insertion goes first.
/// Returns how many were removed.
pub fn evict_surplus(entries: &mut Vec<RankingEntry>, retain: usize) -> usize {
    let surplus = entries.len().saturating_sub(retain);
    if surplus == 0 {
        return 0;
    }

    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by_key(|&i| (entries[i].score, i));
    let doomed: HashSet<usize> = order.into_iter().take(surplus).collect();

    let mut index = 0;
    entries.retain(|_| {
        let keep = !doomed.contains(&index);
        index += 1;
        keep
    });
    surplus
}
