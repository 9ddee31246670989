//! History store: player name -> ordered play records.
//!
//! Appends go through `engine::record_outcome`, so replaying a date is a no-op.

use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::domain::PlayRecord;
use crate::engine::record_outcome;

#[derive(Clone, Default)]
pub struct HistoryStore {
  by_player: Arc<RwLock<HashMap<String, Vec<PlayRecord>>>>,
}

impl HistoryStore {
  pub fn from_map(map: HashMap<String, Vec<PlayRecord>>) -> Self {
    Self { by_player: Arc::new(RwLock::new(map)) }
  }

  /// Idempotent append. Returns true if a new record was stored.
  #[instrument(level = "debug", skip(self))]
  pub async fn append(&self, player: &str, date: NaiveDate, won: bool) -> bool {
    let mut map = self.by_player.write().await;
    let records = map.remove(player).unwrap_or_default();
    let before = records.len();
    let records = record_outcome(records, date, won);
    let added = records.len() > before;
    map.insert(player.to_string(), records);
    debug!(target: "puzzle", %player, %date, won, added, "History append");
    added
  }

  pub async fn records(&self, player: &str) -> Vec<PlayRecord> {
    self.by_player.read().await.get(player).cloned().unwrap_or_default()
  }

  pub async fn get(&self, player: &str, date: NaiveDate) -> Option<PlayRecord> {
    let map = self.by_player.read().await;
    map.get(player)?.iter().find(|r| r.date == date).cloned()
  }

  /// Full copy, for snapshots and the streak leaderboard.
  pub async fn snapshot(&self) -> HashMap<String, Vec<PlayRecord>> {
    self.by_player.read().await.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
  }

  #[tokio::test]
  async fn append_is_idempotent_per_date() {
    let store = HistoryStore::default();
    assert!(store.append("ada", d(1), true).await);
    assert!(!store.append("ada", d(1), false).await);
    assert!(store.append("ada", d(2), false).await);

    let recs = store.records("ada").await;
    assert_eq!(recs.len(), 2);
    assert_eq!(store.get("ada", d(1)).await, Some(PlayRecord { date: d(1), won: true }));
  }

  #[tokio::test]
  async fn players_are_isolated() {
    let store = HistoryStore::default();
    store.append("ada", d(1), true).await;
    assert!(store.records("grace").await.is_empty());
    assert!(store.get("grace", d(1)).await.is_none());
  }
}
