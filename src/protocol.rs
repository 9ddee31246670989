//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Nothing here carries the answer except `RevealOut`, which is only built
//! for sessions in a terminal state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{FinishSummary, LeaderboardEntry, Outcome, PlayerStats, Verdict};
use crate::leaderboard::StreakEntry;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Start {
        #[serde(default)]
        player: Option<String>,
    },
    Guess {
        #[serde(rename = "sessionId")]
        session_id: String,
        guess: String,
    },
    Reveal {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Finish {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(default)]
        name: Option<String>,
    },
    Share {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Stats {
        player: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session { session: StartOut },
    GuessResult { result: GuessOut },
    Reveal { reveal: RevealOut },
    Finished { summary: FinishSummary },
    Share { share: ShareOut },
    Stats { stats: PlayerStats },
    Error { message: String },
}

/// Session start: the current clue and counters, never the answer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOut {
    pub session_id: String,
    pub date: NaiveDate,
    pub category: String,
    pub difficulty: String,
    pub total_clues: usize,
    pub clue_index: usize,
    pub clue: Option<String>,
    pub guesses_remaining: usize,
    pub outcome: Outcome,
    pub already_played: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessOut {
    pub verdict: Verdict,
    pub outcome: Outcome,
    pub clue_index: usize,
    pub guesses_remaining: usize,
    /// Next clue to show after an incorrect guess, while the game goes on.
    pub next_clue: Option<String>,
    pub previous_clues: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealOut {
    pub date: NaiveDate,
    pub answer: String,
    pub alt_answers: Vec<String>,
    pub summary: String,
    pub clues: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareOut {
    pub grid: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownOut {
    pub seconds: u64,
    pub display: String,
    pub today: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardOut {
    pub date: NaiveDate,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize)]
pub struct StreakLeaderboardOut {
    pub entries: Vec<StreakEntry>,
}

//
// HTTP request DTOs
//

#[derive(Debug, Deserialize)]
pub struct StartQuery {
    pub player: Option<String>,
}

#[derive(Deserialize)]
pub struct GuessIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub guess: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FinishIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub player: String,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
