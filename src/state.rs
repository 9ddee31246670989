//! Application state: event sources, history, leaderboard, and live sessions.
//!
//! This module owns:
//!   - the event bank (from TOML config) and the optional remote event feed
//!   - the history store and the leaderboard (the score sink)
//!   - live sessions, one `SessionState` per session id
//!   - the game clock and settings
//!
//! Event resolution tries the remote feed first, then the bank. Built-in seeds
//! are only served when neither a bank nor a feed is configured.

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use chrono::{Days, NaiveDate};
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, instrument, warn};

use crate::clock::GameClock;
use crate::config::{load_game_config_from_env, GameConfig, GameSettings};
use crate::domain::{DailyEvent, FinishSummary, SessionState};
use crate::error::{GameError, GameResult};
use crate::events::{EventBank, RemoteEvents};
use crate::history::HistoryStore;
use crate::leaderboard::Leaderboard;
use crate::seeds::seed_event_for;
use crate::store::{data_path_from_env, load_snapshot, save_snapshot, Snapshot};

/// One player's play of one day, owned by the session map.
#[derive(Clone, Debug)]
pub struct LiveSession {
  pub player: Option<String>,
  pub event: DailyEvent,
  pub state: SessionState,
  /// Started on a day the player already has a record for.
  pub replayed: bool,
  pub finished: Option<FinishSummary>,
}

#[derive(Clone)]
pub struct AppState {
  pub settings: GameSettings,
  pub clock: GameClock,
  pub bank: EventBank,
  pub remote: Option<RemoteEvents>,
  pub history: HistoryStore,
  pub leaderboard: Leaderboard,
  pub sessions: Arc<RwLock<HashMap<String, LiveSession>>>,
  pub data_path: Option<PathBuf>,
  /// Held across snapshot capture and write, so saves land in order.
  persist_lock: Arc<Mutex<()>>,
}

impl AppState {
  /// Build state from env: load config and data snapshot, init the remote feed.
  #[instrument(level = "info", skip_all)]
  pub async fn new() -> Self {
    let cfg = load_game_config_from_env().unwrap_or_default();
    let data_path = data_path_from_env();
    let snapshot = match &data_path {
      Some(p) => load_snapshot(p).await,
      None => Snapshot::default(),
    };

    let remote = RemoteEvents::from_env();
    if let Some(r) = &remote {
      info!(target: "historle_backend", base_url = %r.base_url, "Remote event feed enabled.");
    } else {
      info!(target: "historle_backend", "Remote event feed disabled (no EVENTS_URL). Using local bank.");
    }

    Self::from_parts(cfg, remote, snapshot, data_path)
  }

  pub fn from_parts(
    cfg: GameConfig,
    remote: Option<RemoteEvents>,
    snapshot: Snapshot,
    data_path: Option<PathBuf>,
  ) -> Self {
    let clock = GameClock::from_offset_minutes(cfg.game.utc_offset_minutes).unwrap_or_else(|e| {
      error!(target: "historle_backend", error = %e, "Invalid rollover offset; using UTC");
      GameClock::default()
    });
    let limit = cfg.game.leaderboard_limit.max(1);

    info!(target: "puzzle", events = cfg.events.len(), offset_minutes = cfg.game.utc_offset_minutes, "Startup event inventory");

    Self {
      bank: EventBank::from_events(cfg.events),
      settings: cfg.game,
      clock,
      remote,
      history: HistoryStore::from_map(snapshot.history),
      leaderboard: Leaderboard::new(limit, snapshot.leaderboard),
      sessions: Arc::new(RwLock::new(HashMap::new())),
      data_path,
      persist_lock: Arc::new(Mutex::new(())),
    }
  }

  /// Event for `date`: remote feed, then bank, then (demo mode only) a seed.
  #[instrument(level = "info", skip(self), fields(%date))]
  pub async fn resolve_event(&self, date: NaiveDate) -> GameResult<DailyEvent> {
    if let Some(remote) = &self.remote {
      match remote.fetch(date).await {
        Ok(Some(ev)) => {
          self.bank.insert(ev.clone()).await;
          return Ok(ev);
        }
        Ok(None) => {}
        Err(e) => {
          error!(target: "puzzle", %date, error = %e, "Remote event fetch failed; trying local bank");
        }
      }
    }

    if let Some(ev) = self.bank.get(date).await {
      return Ok(ev);
    }

    if self.remote.is_none() && self.bank.len().await == 0 {
      warn!(target: "puzzle", %date, "No event bank configured; serving built-in seed");
      return Ok(seed_event_for(date));
    }

    Err(GameError::NotFound(format!("no event for {}", date)))
  }

  pub async fn insert_session(&self, id: String, session: LiveSession) {
    self.sessions.write().await.insert(id, session);
  }

  pub async fn get_session(&self, id: &str) -> GameResult<LiveSession> {
    self.sessions
      .read()
      .await
      .get(id)
      .cloned()
      .ok_or_else(|| GameError::NotFound(format!("unknown session {}", id)))
  }

  /// Drop sessions for days before yesterday; nobody can finish those any more.
  pub async fn prune_sessions(&self, today: NaiveDate) -> usize {
    let cutoff = today.checked_sub_days(Days::new(1)).unwrap_or(today);
    let mut map = self.sessions.write().await;
    let before = map.len();
    map.retain(|_, s| s.event.date >= cutoff);
    before - map.len()
  }

  /// Write history + leaderboard to DATA_PATH, if configured.
  pub async fn persist(&self) -> GameResult<()> {
    let Some(path) = &self.data_path else { return Ok(()) };
    let _guard = self.persist_lock.lock().await;
    let snap = Snapshot {
      history: self.history.snapshot().await,
      leaderboard: self.leaderboard.all_entries().await,
    };
    save_snapshot(path, &snap).await
  }
}
