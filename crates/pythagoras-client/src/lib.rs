//! Client side of the ranking API: the calls the quiz makes after a game and
//! on the ranking screen.

mod view;

pub use view::RankingView;

use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use pythagoras_core::api::{
    CHECK_NAME_PATH, ErrorResponse, MessageResponse, NameCheckResponse, RANKING_PATH, RESET_PATH,
    ResetRequest, SubmitScoreRequest,
};
use pythagoras_core::quiz::QuizSession;
use pythagoras_core::ranking::RankingEntry;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),
    #[error("could not reach the ranking server: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server answered {status}: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("the game is still in progress")]
    GameInProgress,
}

impl GatewayError {
    /// HTTP status of a server-side rejection.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Network(e) => e.status(),
            Self::InvalidUrl(_) | Self::GameInProgress => None,
        }
    }
}

/// Async caller for the four ranking endpoints.
#[derive(Debug, Clone)]
pub struct RankingGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl RankingGateway {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, GatewayError> {
        let base_url =
            Url::parse(base_url).map_err(|e| GatewayError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::InvalidUrl(format!("{path}: {e}")))
    }

    /// URL of the name check, with `name` percent-encoded as one segment.
    pub fn check_name_url(&self, name: &str) -> Result<Url, GatewayError> {
        let mut url = self.url(CHECK_NAME_PATH)?;
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidUrl(self.base_url.to_string()))?
            .push(name);
        Ok(url)
    }

    pub async fn submit_score(&self, name: &str, score: u64) -> Result<MessageResponse, GatewayError> {
        let resp = self
            .client
            .post(self.url(RANKING_PATH)?)
            .json(&SubmitScoreRequest::new(name, score))
            .send()
            .await?;
        decode(resp).await
    }

    /// Submit the final score of a finished game under `name`.
    pub async fn submit_session<R>(
        &self,
        name: &str,
        session: &QuizSession<R>,
    ) -> Result<MessageResponse, GatewayError> {
        let score = session.final_score().ok_or(GatewayError::GameInProgress)?;
        self.submit_score(name, score).await
    }

    pub async fn fetch_ranking(&self) -> Result<Vec<RankingEntry>, GatewayError> {
        let resp = self.client.get(self.url(RANKING_PATH)?).send().await?;
        decode(resp).await
    }

    pub async fn is_name_taken(&self, name: &str) -> Result<bool, GatewayError> {
        let resp = self.client.get(self.check_name_url(name)?).send().await?;
        let check: NameCheckResponse = decode(resp).await?;
        Ok(check.is_taken)
    }

    pub async fn reset_ranking(&self, password: &str) -> Result<MessageResponse, GatewayError> {
        let resp = self
            .client
            .delete(self.url(RESET_PATH)?)
            .json(&ResetRequest {
                password: password.to_string(),
            })
            .send()
            .await?;
        decode(resp).await
    }

    /// Fetch the ranking for display. Failures degrade to
    /// [`RankingView::Unavailable`] instead of propagating.
    pub async fn ranking_view(&self) -> RankingView {
        let result = self.fetch_ranking().await;
        if let Err(ref e) = result {
            tracing::warn!(error = %e, "Ranking fetch failed");
        }
        RankingView::from_result(result)
    }
}

/// Decode a success body, or turn an `{error}` body into
/// [`GatewayError::Rejected`].
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    let message = match resp.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string(),
    };
    Err(GatewayError::Rejected { status, message })
}
