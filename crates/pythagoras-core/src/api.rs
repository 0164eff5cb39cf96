//! Wire contract between the ranking server and its clients. All bodies are
//! JSON; every error body is `{"error": "..."}`.

use serde::{Deserialize, Serialize};

use crate::ranking::{ValidationError, parse_score};

/// `GET` lists the ranking, `POST` submits a score.
pub const RANKING_PATH: &str = "/api/ranking";
/// `DELETE` with a [`ResetRequest`] body clears the ranking.
pub const RESET_PATH: &str = "/api/ranking/reset";
/// `GET {CHECK_NAME_PATH}/{name}` reports whether a name is in use.
pub const CHECK_NAME_PATH: &str = "/api/ranking/checkName";

/// Body of a score submission.
///
/// Both fields are kept as raw JSON so that a wrongly-typed name or score is
/// reported as a validation failure rather than a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitScoreRequest {
    #[serde(default)]
    pub name: serde_json::Value,
    #[serde(default)]
    pub score: serde_json::Value,
}

impl SubmitScoreRequest {
    pub fn new(name: &str, score: u64) -> Self {
        Self {
            name: serde_json::Value::from(name),
            score: serde_json::Value::from(score),
        }
    }

    /// The name as submitted and the score as an integer. A non-string name
    /// fails before the score is looked at; name length is not checked here.
    pub fn fields(&self) -> Result<(&str, u64), ValidationError> {
        let name = self.name.as_str().ok_or(ValidationError::InvalidName)?;
        let score = parse_score(&self.score)?;
        Ok((name, score))
    }
}

/// Body of a reset request. A missing password is treated as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCheckResponse {
    #[serde(rename = "isTaken")]
    pub is_taken: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
