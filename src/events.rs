//! Event sources: the in-memory event bank and the optional remote event feed.
//!
//! The remote feed speaks plain JSON: `GET {EVENTS_URL}/events/{YYYY-MM-DD}`
//! returns a `DailyEvent`, or 404 when nothing is scheduled for that day.
//! Calls are instrumented and log the date, status and latency (never the answer).

use std::{collections::HashMap, sync::Arc, time::{Duration, Instant}};

use chrono::NaiveDate;
use reqwest::{header::USER_AGENT, StatusCode};
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::domain::DailyEvent;
use crate::error::{GameError, GameResult};

/// Events by date. Config-bank entries and remote fetches both land here.
#[derive(Clone, Default)]
pub struct EventBank {
  by_date: Arc<RwLock<HashMap<NaiveDate, DailyEvent>>>,
}

impl EventBank {
  /// Build from configured events, skipping unplayable ones.
  pub fn from_events(events: Vec<DailyEvent>) -> Self {
    let mut map = HashMap::new();
    for ev in events {
      if let Err(e) = validate_event(&ev) {
        error!(target: "puzzle", date = %ev.date, error = %e, "Skipping bank event");
        continue;
      }
      map.insert(ev.date, ev);
    }
    Self { by_date: Arc::new(RwLock::new(map)) }
  }

  pub async fn insert(&self, ev: DailyEvent) {
    self.by_date.write().await.insert(ev.date, ev);
  }

  pub async fn get(&self, date: NaiveDate) -> Option<DailyEvent> {
    self.by_date.read().await.get(&date).cloned()
  }

  pub async fn len(&self) -> usize {
    self.by_date.read().await.len()
  }
}

/// An event needs at least one clue and a non-empty answer to be playable.
pub fn validate_event(ev: &DailyEvent) -> GameResult<()> {
  if ev.clues.is_empty() {
    return Err(GameError::Config(format!("event {} has no clues", ev.date)));
  }
  if ev.answer.trim().is_empty() {
    return Err(GameError::Config(format!("event {} has an empty answer", ev.date)));
  }
  Ok(())
}

#[derive(Clone)]
pub struct RemoteEvents {
  client: reqwest::Client,
  pub base_url: String,
}

impl RemoteEvents {
  /// Enabled when EVENTS_URL is set.
  pub fn from_env() -> Option<Self> {
    let base_url = std::env::var("EVENTS_URL").ok()?;
    Self::new(base_url)
  }

  pub fn new(base_url: impl Into<String>) -> Option<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .ok()?;
    Some(Self { client, base_url: base_url.into().trim_end_matches('/').to_string() })
  }

  /// Fetch the event for `date`. `Ok(None)` when the feed has nothing for that day.
  #[instrument(level = "info", skip(self), fields(%date))]
  pub async fn fetch(&self, date: NaiveDate) -> GameResult<Option<DailyEvent>> {
    let url = format!("{}/events/{}", self.base_url, date.format("%Y-%m-%d"));
    let started = Instant::now();
    let res = self.client.get(&url)
      .header(USER_AGENT, "historle-backend/0.1")
      .send().await?;

    let status = res.status();
    info!(target: "puzzle", %status, elapsed_ms = started.elapsed().as_millis() as u64, "Remote event feed responded");
    if status == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !status.is_success() {
      let body = res.text().await.unwrap_or_default();
      return Err(GameError::Upstream(format!("event feed HTTP {}: {}", status, crate::util::trunc_for_log(&body, 200))));
    }

    let ev: DailyEvent = res.json().await?;
    if ev.date != date {
      return Err(GameError::Upstream(format!("event feed returned {} for {}", ev.date, date)));
    }
    validate_event(&ev).map_err(|e| GameError::Upstream(e.to_string()))?;
    Ok(Some(ev))
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
  }

  async fn remote() -> RemoteEvents {
    RemoteEvents::new(feed_stub::spawn().await).unwrap()
  }

  fn ev(date: &str, clues: &[&str], answer: &str) -> DailyEvent {
    DailyEvent {
      date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
      clues: clues.iter().map(|c| c.to_string()).collect(),
      category: String::new(),
      difficulty: String::new(),
      answer: answer.into(),
      alt_answers: vec![],
      summary: String::new(),
    }
  }

  #[tokio::test]
  async fn bank_skips_unplayable_events() {
    let bank = EventBank::from_events(vec![
      ev("2025-01-01", &["a"], "x"),
      ev("2025-01-02", &[], "x"),
      ev("2025-01-03", &["a"], "  "),
    ]);
    assert_eq!(bank.len().await, 1);
    assert!(bank.get(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).await.is_some());
    assert!(bank.get(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()).await.is_none());
  }

  #[tokio::test]
  async fn insert_replaces_by_date() {
    let bank = EventBank::default();
    bank.insert(ev("2025-01-01", &["a"], "x")).await;
    bank.insert(ev("2025-01-01", &["b"], "y")).await;
    assert_eq!(bank.len().await, 1);
    let got = bank.get(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).await.unwrap();
    assert_eq!(got.answer, "y");
  }

  #[tokio::test]
  async fn fetch_returns_scheduled_event() {
    let got = remote().await.fetch(day(15)).await.unwrap().unwrap();
    assert_eq!(got.date, day(15));
    assert_eq!(got.total_clues(), 2);
    assert_eq!(got.answer, "moon landing");
  }

  #[tokio::test]
  async fn fetch_maps_not_found_to_none() {
    assert_eq!(remote().await.fetch(day(16)).await.unwrap(), None);
  }

  #[tokio::test]
  async fn fetch_rejects_bad_feed_responses() {
    let feed = remote().await;
    match feed.fetch(day(17)).await {
      Err(GameError::Upstream(msg)) => assert!(msg.contains("500") && msg.contains("feed down")),
      other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(feed.fetch(day(18)).await, Err(GameError::Upstream(_))));
    assert!(matches!(feed.fetch(day(19)).await, Err(GameError::Upstream(_))));
  }

  #[tokio::test]
  async fn unreachable_feed_is_upstream_error() {
    let feed = RemoteEvents::new("http://127.0.0.1:1").unwrap();
    assert!(matches!(feed.fetch(day(15)).await, Err(GameError::Upstream(_))));
  }

  #[test]
  fn remote_trims_trailing_slash() {
    let remote = RemoteEvents::new("http://localhost:9000/").unwrap();
    assert_eq!(remote.base_url, "http://localhost:9000");
  }
}
