use pythagoras_core::ranking::RankingEntry;

use crate::GatewayError;

/// What the ranking screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankingView {
    Entries(Vec<RankingEntry>),
    Empty,
    /// The fetch failed; carries the reason shown to the player.
    Unavailable(String),
}

impl RankingView {
    pub fn from_result(result: Result<Vec<RankingEntry>, GatewayError>) -> Self {
        match result {
            Ok(entries) if entries.is_empty() => Self::Empty,
            Ok(entries) => Self::Entries(entries),
            Err(e) => Self::Unavailable(e.to_string()),
        }
    }

    /// One display line per list item.
    pub fn render_lines(&self) -> Vec<String> {
        match self {
            Self::Entries(entries) => entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    format!("{}. {} - {} ({})", i + 1, e.name, e.score, e.recorded_at)
                })
                .collect(),
            Self::Empty => vec!["No rankings yet. Play a game to get on the board!".to_string()],
            Self::Unavailable(reason) => {
                vec![format!("Ranking unavailable: {reason}. Check the server.")]
            },
        }
    }
}
