//! Domain models: the daily event, a player's session state, play records and
//! the derived stats/leaderboard rows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One day's puzzle. Immutable once fetched for its date.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DailyEvent {
  pub date: NaiveDate,
  pub clues: Vec<String>,
  /// Category or year label shown above the clue ("1969", "Exploration").
  #[serde(default)] pub category: String,
  #[serde(default)] pub difficulty: String,
  pub answer: String,
  #[serde(default)] pub alt_answers: Vec<String>,
  #[serde(default)] pub summary: String,
}

impl DailyEvent {
  /// N: number of clues, which is also the number of guesses allowed.
  pub fn total_clues(&self) -> usize {
    self.clues.len()
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  InProgress,
  Won,
  Lost,
}

impl Outcome {
  pub fn is_terminal(self) -> bool {
    !matches!(self, Outcome::InProgress)
  }
}

/// Result of comparing a single guess.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  Correct,
  Incorrect,
}

/// Per-day play state for one player.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SessionState {
  pub clue_index: usize,
  pub guesses_remaining: usize,
  pub total_clues: usize,
  pub outcome: Outcome,
  pub started_at: DateTime<Utc>,
  /// Clues archived by incorrect guesses, oldest first.
  pub previous_clues: Vec<String>,
}

impl SessionState {
  pub fn is_terminal(&self) -> bool {
    self.outcome.is_terminal()
  }

  /// The clue currently on screen, if any remain.
  pub fn current_clue<'a>(&self, event: &'a DailyEvent) -> Option<&'a str> {
    event.clues.get(self.clue_index).map(String::as_str)
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayRecord {
  pub date: NaiveDate,
  pub won: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct PlayerStats {
  pub streak: u32,
  pub longest_win_streak: u32,
  pub total_wins: u32,
  pub days_played: u32,
  /// Whole percent, rounded.
  pub win_percentage: u32,
}

/// A solved puzzle as ranked by the daily leaderboard.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
  pub name: String,
  pub date: NaiveDate,
  pub solve_seconds: u64,
  /// "MM:SS", for display.
  pub solve_time: String,
  pub clues_used: usize,
  pub timestamp: DateTime<Utc>,
}

/// What `finish` hands back; cached on the session so a repeat call returns it.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinishSummary {
  pub won: bool,
  pub clues_used: usize,
  pub solve_seconds: u64,
  pub solve_time: String,
  /// Daily leaderboard rank, for wins that made the cut.
  pub rank: Option<usize>,
  /// Current streak, for named players only.
  pub streak: Option<u32>,
}
