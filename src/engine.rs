//! Puzzle session engine.
//!
//! Pure state transitions for one player's day of play, plus the streak,
//! stats and share-grid derivations over play history. Nothing here performs
//! I/O; callers own the `SessionState` and the history and persist them.
//!
//! State machine: `InProgress -> Won` or `InProgress -> Lost`, once. Both
//! terminal states have no outgoing transitions.

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::domain::{DailyEvent, Outcome, PlayRecord, PlayerStats, SessionState, Verdict};
use crate::error::{GameError, GameResult};

/// Glyph for a guess slot the player did not need.
pub const UNUSED_GLYPH: &str = "🟫";
/// Glyph for a clue the player burned through.
pub const USED_GLYPH: &str = "⬜";

/// Start (or re-enter) a day's session.
///
/// Re-entering a day that already has a `PlayRecord` yields a terminal session
/// carrying the recorded outcome; it is never re-scored.
pub fn init_session(event: &DailyEvent, history: &[PlayRecord], now: DateTime<Utc>) -> SessionState {
  let n = event.total_clues();
  match history.iter().find(|r| r.date == event.date) {
    Some(record) => SessionState {
      clue_index: n,
      guesses_remaining: 0,
      total_clues: n,
      outcome: if record.won { Outcome::Won } else { Outcome::Lost },
      started_at: now,
      previous_clues: Vec::new(),
    },
    None => SessionState {
      clue_index: 0,
      guesses_remaining: n,
      total_clues: n,
      outcome: Outcome::InProgress,
      started_at: now,
      previous_clues: Vec::new(),
    },
  }
}

/// Trim and case-fold a guess or an answer.
pub fn normalize_guess(raw: &str) -> String {
  raw.trim().to_lowercase()
}

/// True if `guess` matches the answer or any alternate after normalization.
pub fn is_correct(event: &DailyEvent, guess: &str) -> bool {
  let guess = normalize_guess(guess);
  std::iter::once(&event.answer)
    .chain(event.alt_answers.iter())
    .any(|candidate| normalize_guess(candidate) == guess)
}

/// Apply one guess. On error `state` is returned untouched to the caller
/// (it is borrowed, not consumed), so the submission can be retried.
pub fn submit_guess(
  state: &SessionState,
  event: &DailyEvent,
  raw_guess: &str,
) -> GameResult<(SessionState, Verdict)> {
  if state.outcome != Outcome::InProgress {
    return Err(GameError::InvalidInput("the game for this day is over".into()));
  }
  if normalize_guess(raw_guess).is_empty() {
    return Err(GameError::InvalidInput("guess is empty".into()));
  }

  let mut next = state.clone();
  if is_correct(event, raw_guess) {
    next.outcome = Outcome::Won;
    return Ok((next, Verdict::Correct));
  }

  if let Some(clue) = event.clues.get(next.clue_index) {
    next.previous_clues.push(clue.clone());
  }
  next.clue_index += 1;
  next.guesses_remaining = next.guesses_remaining.saturating_sub(1);
  if next.guesses_remaining == 0 || next.clue_index >= next.total_clues {
    next.outcome = Outcome::Lost;
  }
  Ok((next, Verdict::Incorrect))
}

/// Idempotent append keyed by date.
pub fn record_outcome(mut history: Vec<PlayRecord>, date: NaiveDate, won: bool) -> Vec<PlayRecord> {
  if !history.iter().any(|r| r.date == date) {
    history.push(PlayRecord { date, won });
  }
  history
}

fn wins_by_date(history: &[PlayRecord]) -> HashMap<NaiveDate, bool> {
  history.iter().map(|r| (r.date, r.won)).collect()
}

/// Consecutive winning days ending at `today`.
///
/// Walks calendar days backwards from `today` (offset 0 included) and stops at
/// the first day without a winning record. A recorded loss stops the walk the
/// same way a missing day does.
pub fn compute_streak(history: &[PlayRecord], today: NaiveDate) -> u32 {
  let by_date = wins_by_date(history);
  let mut streak = 0;
  let mut day = today;
  while by_date.get(&day).copied().unwrap_or(false) {
    streak += 1;
    match day.checked_sub_days(Days::new(1)) {
      Some(prev) => day = prev,
      None => break,
    }
  }
  streak
}

/// Longest run of consecutive winning calendar days anywhere in history.
pub fn longest_streak(history: &[PlayRecord]) -> u32 {
  let mut won: Vec<NaiveDate> = history.iter().filter(|r| r.won).map(|r| r.date).collect();
  won.sort_unstable();
  won.dedup();

  let mut best = 0;
  let mut run = 0;
  let mut last: Option<NaiveDate> = None;
  for date in won {
    run = match last {
      Some(prev) if prev.checked_add_days(Days::new(1)) == Some(date) => run + 1,
      _ => 1,
    };
    best = best.max(run);
    last = Some(date);
  }
  best
}

pub fn player_stats(history: &[PlayRecord], today: NaiveDate) -> PlayerStats {
  let days_played = history.len() as u32;
  let total_wins = history.iter().filter(|r| r.won).count() as u32;
  let win_percentage = if days_played == 0 {
    0
  } else {
    ((total_wins as f64 / days_played as f64) * 100.0).round() as u32
  };
  PlayerStats {
    streak: compute_streak(history, today),
    longest_win_streak: longest_streak(history),
    total_wins,
    days_played,
    win_percentage,
  }
}

/// Unused slots first, then used ones: `render_share_grid(5, 2) == "🟫🟫🟫⬜⬜"`.
pub fn render_share_grid(total_slots: usize, clues_used: usize) -> String {
  let used = clues_used.min(total_slots);
  UNUSED_GLYPH.repeat(total_slots - used) + &USED_GLYPH.repeat(used)
}

/// Clues counted against a finished session for scoring: the winning clue
/// counts, and a loss used every clue.
pub fn clues_used_for_score(state: &SessionState) -> usize {
  match state.outcome {
    Outcome::Won => (state.clue_index + 1).min(state.total_clues),
    Outcome::Lost => state.total_clues,
    Outcome::InProgress => state.clue_index,
  }
}
