//! Score sink: the daily leaderboard and the streak leaderboard.
//!
//! Daily entries are ordered by solve time, then clues used, and truncated
//! to `limit` per day.

use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::domain::{LeaderboardEntry, PlayRecord};
use crate::engine::compute_streak;

#[derive(Clone)]
pub struct Leaderboard {
  by_date: Arc<RwLock<HashMap<NaiveDate, Vec<LeaderboardEntry>>>>,
  limit: usize,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct StreakEntry {
  pub name: String,
  pub streak: u32,
}

impl Leaderboard {
  pub fn new(limit: usize, entries: Vec<LeaderboardEntry>) -> Self {
    let mut by_date: HashMap<NaiveDate, Vec<LeaderboardEntry>> = HashMap::new();
    for e in entries {
      by_date.entry(e.date).or_default().push(e);
    }
    for day in by_date.values_mut() {
      rank_day(day, limit);
    }
    Self { by_date: Arc::new(RwLock::new(by_date)), limit }
  }

  /// Insert and re-rank the entry's day. Returns its 1-based rank, or None
  /// if it fell outside the kept window.
  #[instrument(level = "info", skip(self, entry), fields(name = %entry.name, date = %entry.date))]
  pub async fn submit(&self, entry: LeaderboardEntry) -> Option<usize> {
    let mut map = self.by_date.write().await;
    let day = map.entry(entry.date).or_default();
    day.push(entry.clone());
    rank_day(day, self.limit);
    let rank = day.iter().position(|e| *e == entry).map(|i| i + 1);
    info!(target: "puzzle", rank = ?rank, solve_seconds = entry.solve_seconds, clues_used = entry.clues_used, "Leaderboard submission");
    rank
  }

  pub async fn for_date(&self, date: NaiveDate) -> Vec<LeaderboardEntry> {
    self.by_date.read().await.get(&date).cloned().unwrap_or_default()
  }

  pub async fn all_entries(&self) -> Vec<LeaderboardEntry> {
    let map = self.by_date.read().await;
    let mut out: Vec<LeaderboardEntry> = map.values().flatten().cloned().collect();
    out.sort_by(|a, b| a.date.cmp(&b.date).then(rank_key(a).cmp(&rank_key(b))));
    out
  }

  /// Players ranked by current streak, highest first. Zero streaks are left out.
  pub fn streaks(&self, history: &HashMap<String, Vec<PlayRecord>>, today: NaiveDate) -> Vec<StreakEntry> {
    let mut rows: Vec<StreakEntry> = history
      .iter()
      .map(|(name, records)| StreakEntry { name: name.clone(), streak: compute_streak(records, today) })
      .filter(|row| row.streak > 0)
      .collect();
    rows.sort_by(|a, b| b.streak.cmp(&a.streak).then_with(|| a.name.cmp(&b.name)));
    rows.truncate(self.limit);
    rows
  }
}

fn rank_key(e: &LeaderboardEntry) -> (u64, usize) {
  (e.solve_seconds, e.clues_used)
}

fn rank_day(day: &mut Vec<LeaderboardEntry>, limit: usize) {
  // Stable sort: earlier submissions win ties.
  day.sort_by_key(rank_key);
  day.truncate(limit);
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
  }

  fn entry(name: &str, secs: u64, clues: usize) -> LeaderboardEntry {
    LeaderboardEntry {
      name: name.into(),
      date: date(),
      solve_seconds: secs,
      solve_time: crate::util::format_solve_time(secs),
      clues_used: clues,
      timestamp: Utc::now(),
    }
  }

  #[tokio::test]
  async fn orders_by_time_then_clues() {
    let board = Leaderboard::new(100, vec![]);
    assert_eq!(board.submit(entry("slow", 300, 1)).await, Some(1));
    assert_eq!(board.submit(entry("fast", 30, 3)).await, Some(1));
    assert_eq!(board.submit(entry("fast-fewer", 30, 2)).await, Some(1));

    let names: Vec<String> = board.for_date(date()).await.into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["fast-fewer", "fast", "slow"]);
  }

  #[tokio::test]
  async fn keeps_only_limit_entries() {
    let board = Leaderboard::new(2, vec![]);
    board.submit(entry("a", 10, 1)).await;
    board.submit(entry("b", 20, 1)).await;
    assert_eq!(board.submit(entry("c", 30, 1)).await, None);
    assert_eq!(board.for_date(date()).await.len(), 2);
  }

  #[test]
  fn streak_board_ranks_and_skips_zero() {
    let today = date();
    let yesterday = today.pred_opt().unwrap();
    let mut history = HashMap::new();
    history.insert("ada".to_string(), vec![PlayRecord { date: today, won: true }]);
    history.insert(
      "grace".to_string(),
      vec![PlayRecord { date: yesterday, won: true }, PlayRecord { date: today, won: true }],
    );
    history.insert("linus".to_string(), vec![PlayRecord { date: today, won: false }]);

    let board = Leaderboard::new(100, vec![]);
    let rows = board.streaks(&history, today);
    assert_eq!(
      rows,
      vec![
        StreakEntry { name: "grace".into(), streak: 2 },
        StreakEntry { name: "ada".into(), streak: 1 },
      ]
    );
  }
}
