//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Starting a day's session (or re-entering a finished one)
//!   - Applying guesses through the engine
//!   - Revealing the answer once the game is over
//!   - Finishing: history, leaderboard, persistence
//!   - Share text, stats, leaderboards, rollover countdown

use chrono::NaiveDate;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::domain::{FinishSummary, LeaderboardEntry, Outcome, PlayerStats};
use crate::engine::{self, render_share_grid};
use crate::error::{GameError, GameResult};
use crate::protocol::*;
use crate::state::{AppState, LiveSession};
use crate::util::{fill_template, format_countdown, format_solve_time};

const SHARE_TEMPLATE: &str = "My Historle guesses:\n{grid}\nGive it a try: {url}";

/// Trimmed, non-empty player name.
fn player_name(raw: Option<&str>) -> Option<String> {
  raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

#[instrument(level = "info", skip(state))]
pub async fn start_game(state: &AppState, player: Option<&str>) -> GameResult<StartOut> {
  let player = player_name(player);
  let now = state.clock.now();
  let today = state.clock.day_of(now);
  state.prune_sessions(today).await;

  let event = state.resolve_event(today).await?;
  let history = match &player {
    Some(p) => state.history.records(p).await,
    None => Vec::new(),
  };
  let session = engine::init_session(&event, &history, now);
  let replayed = session.is_terminal();

  let id = Uuid::new_v4().to_string();
  let out = StartOut {
    session_id: id.clone(),
    date: event.date,
    category: event.category.clone(),
    difficulty: event.difficulty.clone(),
    total_clues: event.total_clues(),
    clue_index: session.clue_index,
    clue: session.current_clue(&event).map(str::to_string),
    guesses_remaining: session.guesses_remaining,
    outcome: session.outcome,
    already_played: replayed,
  };
  info!(target: "puzzle", session = %id, date = %event.date, replayed, named = player.is_some(), "Session started");
  state
    .insert_session(id, LiveSession { player, event, state: session, replayed, finished: None })
    .await;
  Ok(out)
}

/// Runs the guess under the session map's write lock, so guesses for one
/// session are applied one at a time. Failed guesses leave the session as is.
#[instrument(level = "info", skip(state, guess), fields(%session_id, guess_len = guess.len()))]
pub async fn submit_guess(state: &AppState, session_id: &str, guess: &str) -> GameResult<GuessOut> {
  let mut sessions = state.sessions.write().await;
  let live = sessions
    .get_mut(session_id)
    .ok_or_else(|| GameError::NotFound(format!("unknown session {}", session_id)))?;

  let (next, verdict) = engine::submit_guess(&live.state, &live.event, guess)?;
  live.state = next;

  let s = &live.state;
  info!(target: "puzzle", ?verdict, outcome = ?s.outcome, clue_index = s.clue_index, "Guess evaluated");
  Ok(GuessOut {
    verdict,
    outcome: s.outcome,
    clue_index: s.clue_index,
    guesses_remaining: s.guesses_remaining,
    next_clue: if s.outcome == Outcome::InProgress { s.current_clue(&live.event).map(str::to_string) } else { None },
    previous_clues: s.previous_clues.clone(),
  })
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn reveal(state: &AppState, session_id: &str) -> GameResult<RevealOut> {
  let live = state.get_session(session_id).await?;
  if !live.state.is_terminal() {
    return Err(GameError::InvalidInput("the answer is revealed only after the game ends".into()));
  }
  let ev = live.event;
  Ok(RevealOut { date: ev.date, answer: ev.answer, alt_answers: ev.alt_answers, summary: ev.summary, clues: ev.clues })
}

/// Record the outcome and submit the score. A second call returns the first
/// result; a session that re-entered an already played day cannot be finished.
///
/// The session map's write lock is held from the `finished` check until the
/// summary is cached, so overlapping calls for one session score it once.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn finish(state: &AppState, session_id: &str, name: Option<&str>) -> GameResult<FinishSummary> {
  let summary = {
    let mut sessions = state.sessions.write().await;
    let live = sessions
      .get_mut(session_id)
      .ok_or_else(|| GameError::NotFound(format!("unknown session {}", session_id)))?;
    if let Some(done) = &live.finished {
      return Ok(done.clone());
    }
    if live.replayed {
      return Err(GameError::AlreadyCompleted(format!("{} was already played", live.event.date)));
    }
    if !live.state.is_terminal() {
      return Err(GameError::InvalidInput("the game is still in progress".into()));
    }

    let now = state.clock.now();
    let won = live.state.outcome == Outcome::Won;
    let clues_used = engine::clues_used_for_score(&live.state);
    let solve_seconds = (now - live.state.started_at).num_seconds().max(0) as u64;
    let solve_time = format_solve_time(solve_seconds);

    let streak = match &live.player {
      Some(p) => {
        // Another session of the same player may have finished this day first.
        if !state.history.append(p, live.event.date, won).await {
          let recorded = state.history.get(p, live.event.date).await.map(|r| if r.won { "won" } else { "lost" });
          return Err(GameError::AlreadyCompleted(format!(
            "{} already recorded as {}",
            live.event.date,
            recorded.unwrap_or("played")
          )));
        }
        let records = state.history.records(p).await;
        Some(engine::compute_streak(&records, state.clock.day_of(now)))
      }
      None => None,
    };

    let rank = if won {
      let display = live.player.clone().or_else(|| player_name(name)).unwrap_or_else(|| "Anonymous".into());
      state
        .leaderboard
        .submit(LeaderboardEntry {
          name: display,
          date: live.event.date,
          solve_seconds,
          solve_time: solve_time.clone(),
          clues_used,
          timestamp: now,
        })
        .await
    } else {
      None
    };

    let summary = FinishSummary { won, clues_used, solve_seconds, solve_time, rank, streak };
    // Cache first; a failed persist below only logs.
    live.finished = Some(summary.clone());
    summary
  };

  if let Err(e) = state.persist().await {
    error!(target: "historle_backend", error = %e, "Failed to persist data snapshot");
  }

  info!(
    target: "puzzle",
    won = summary.won,
    clues_used = summary.clues_used,
    solve_seconds = summary.solve_seconds,
    rank = ?summary.rank,
    streak = ?summary.streak,
    "Session finished"
  );
  Ok(summary)
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn share(state: &AppState, session_id: &str) -> GameResult<ShareOut> {
  let live = state.get_session(session_id).await?;
  if !live.state.is_terminal() {
    return Err(GameError::InvalidInput("nothing to share before the game ends".into()));
  }
  let grid = render_share_grid(live.state.total_clues, live.state.previous_clues.len());
  let message = fill_template(SHARE_TEMPLATE, &[("grid", &grid), ("url", &state.settings.site_url)]);
  Ok(ShareOut { grid, message })
}

#[instrument(level = "info", skip(state))]
pub async fn stats(state: &AppState, player: &str) -> GameResult<PlayerStats> {
  let player = player_name(Some(player)).ok_or_else(|| GameError::InvalidInput("player is required".into()))?;
  let records = state.history.records(&player).await;
  Ok(engine::player_stats(&records, state.clock.today()))
}

pub async fn leaderboard(state: &AppState, date: Option<NaiveDate>) -> LeaderboardOut {
  let date = date.unwrap_or_else(|| state.clock.today());
  LeaderboardOut { date, entries: state.leaderboard.for_date(date).await }
}

pub async fn streak_leaderboard(state: &AppState) -> StreakLeaderboardOut {
  let history = state.history.snapshot().await;
  StreakLeaderboardOut { entries: state.leaderboard.streaks(&history, state.clock.today()) }
}

pub fn countdown(state: &AppState) -> CountdownOut {
  let now = state.clock.now();
  let seconds = state.clock.until_rollover(now).as_secs();
  CountdownOut { seconds, display: format_countdown(seconds), today: state.clock.day_of(now) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::GameConfig;
  use crate::domain::{DailyEvent, Verdict};
  use crate::store::Snapshot;

  fn app() -> AppState {
    app_with_data(None)
  }

  fn app_with_data(data_path: Option<std::path::PathBuf>) -> AppState {
    let today = crate::clock::GameClock::default().today();
    let ev = DailyEvent {
      date: today,
      clues: vec!["c1".into(), "c2".into(), "c3".into()],
      category: "Antiquity".into(),
      difficulty: "easy".into(),
      answer: "rome".into(),
      alt_answers: vec!["roma".into()],
      summary: "Eternal city.".into(),
    };
    let cfg = GameConfig { events: vec![ev], ..Default::default() };
    AppState::from_parts(cfg, None, Snapshot::default(), data_path)
  }

  #[tokio::test]
  async fn win_flow_records_history_and_rank() {
    let state = app();
    let start = start_game(&state, Some(" ada ")).await.unwrap();
    assert_eq!(start.clue.as_deref(), Some("c1"));
    assert!(!start.already_played);

    let g = submit_guess(&state, &start.session_id, "paris").await.unwrap();
    assert_eq!(g.verdict, Verdict::Incorrect);
    assert_eq!(g.next_clue.as_deref(), Some("c2"));

    let g = submit_guess(&state, &start.session_id, "ROMA").await.unwrap();
    assert_eq!(g.verdict, Verdict::Correct);
    assert_eq!(g.outcome, Outcome::Won);

    let summary = finish(&state, &start.session_id, None).await.unwrap();
    assert!(summary.won);
    assert_eq!(summary.clues_used, 2);
    assert_eq!(summary.rank, Some(1));
    assert_eq!(summary.streak, Some(1));

    let again = finish(&state, &start.session_id, None).await.unwrap();
    assert_eq!(again, summary);
    assert_eq!(state.history.records("ada").await.len(), 1);
    assert_eq!(leaderboard(&state, None).await.entries.len(), 1);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
  async fn overlapping_finishes_score_once() {
    for _ in 0..50 {
      let state = app();
      let anon = start_game(&state, None).await.unwrap();
      let named = start_game(&state, Some("ada")).await.unwrap();
      submit_guess(&state, &anon.session_id, "rome").await.unwrap();
      submit_guess(&state, &named.session_id, "rome").await.unwrap();

      let tasks: Vec<_> = [&anon.session_id, &anon.session_id, &named.session_id, &named.session_id]
        .into_iter()
        .map(|id| {
          let (state, id) = (state.clone(), id.clone());
          tokio::spawn(async move { finish(&state, &id, Some("Guest")).await })
        })
        .collect();
      let mut results = Vec::new();
      for t in tasks {
        results.push(t.await.unwrap().unwrap());
      }

      assert_eq!(results[0], results[1]);
      assert_eq!(results[2], results[3]);
      assert_eq!(leaderboard(&state, None).await.entries.len(), 2);
      assert_eq!(state.history.records("ada").await.len(), 1);
    }
  }

  #[tokio::test]
  async fn finish_writes_snapshot() {
    let path = std::env::temp_dir()
      .join(format!("historle-finish-{}", Uuid::new_v4()))
      .join("data.json");
    let state = app_with_data(Some(path.clone()));
    let s = start_game(&state, Some("ada")).await.unwrap();
    submit_guess(&state, &s.session_id, "rome").await.unwrap();
    finish(&state, &s.session_id, None).await.unwrap();

    let snap = crate::store::load_snapshot(&path).await;
    let records = snap.history.get("ada").cloned().unwrap_or_default();
    assert_eq!(records.len(), 1);
    assert!(records[0].won);
    assert_eq!(snap.leaderboard.len(), 1);
    assert_eq!(snap.leaderboard[0].name, "ada");
  }

  #[tokio::test]
  async fn replay_is_terminal_and_cannot_be_rescored() {
    let state = app();
    let first = start_game(&state, Some("ada")).await.unwrap();
    for g in ["a", "b", "c"] {
      submit_guess(&state, &first.session_id, g).await.unwrap();
    }
    finish(&state, &first.session_id, None).await.unwrap();

    let second = start_game(&state, Some("ada")).await.unwrap();
    assert!(second.already_played);
    assert_eq!(second.outcome, Outcome::Lost);
    assert!(matches!(
      submit_guess(&state, &second.session_id, "rome").await,
      Err(GameError::InvalidInput(_))
    ));
    assert!(matches!(finish(&state, &second.session_id, None).await, Err(GameError::AlreadyCompleted(_))));
    assert!(reveal(&state, &second.session_id).await.is_ok());
  }

  #[tokio::test]
  async fn two_sessions_same_day_only_first_finish_counts() {
    let state = app();
    let a = start_game(&state, Some("ada")).await.unwrap();
    let b = start_game(&state, Some("ada")).await.unwrap();
    submit_guess(&state, &a.session_id, "rome").await.unwrap();
    for g in ["x", "y", "z"] {
      submit_guess(&state, &b.session_id, g).await.unwrap();
    }

    assert!(finish(&state, &a.session_id, None).await.unwrap().won);
    match finish(&state, &b.session_id, None).await {
      Err(GameError::AlreadyCompleted(msg)) => assert!(msg.ends_with("already recorded as won")),
      other => panic!("unexpected {:?}", other),
    }
    assert_eq!(state.history.records("ada").await.len(), 1);
  }

  #[tokio::test]
  async fn reveal_and_share_wait_for_the_end() {
    let state = app();
    let s = start_game(&state, None).await.unwrap();
    assert!(matches!(reveal(&state, &s.session_id).await, Err(GameError::InvalidInput(_))));
    assert!(share(&state, &s.session_id).await.is_err());

    submit_guess(&state, &s.session_id, "athens").await.unwrap();
    submit_guess(&state, &s.session_id, "rome").await.unwrap();

    let r = reveal(&state, &s.session_id).await.unwrap();
    assert_eq!(r.answer, "rome");
    assert_eq!(r.clues.len(), 3);

    let sh = share(&state, &s.session_id).await.unwrap();
    assert_eq!(sh.grid, "🟫🟫⬜");
    assert!(sh.message.starts_with("My Historle guesses:\n🟫🟫⬜\n"));
  }

  #[tokio::test]
  async fn anonymous_win_uses_supplied_name_and_skips_history() {
    let state = app();
    let s = start_game(&state, None).await.unwrap();
    submit_guess(&state, &s.session_id, "rome").await.unwrap();
    let summary = finish(&state, &s.session_id, Some("Guest")).await.unwrap();
    assert_eq!(summary.streak, None);
    assert_eq!(leaderboard(&state, None).await.entries[0].name, "Guest");
    assert!(state.history.snapshot().await.is_empty());
  }

  #[tokio::test]
  async fn empty_guess_leaves_session_untouched() {
    let state = app();
    let s = start_game(&state, None).await.unwrap();
    assert!(submit_guess(&state, &s.session_id, "  ").await.is_err());
    let live = state.get_session(&s.session_id).await.unwrap();
    assert_eq!(live.state.clue_index, 0);
    assert_eq!(live.state.guesses_remaining, 3);
  }

  #[tokio::test]
  async fn unknown_session_is_not_found() {
    let state = app();
    assert!(matches!(submit_guess(&state, "nope", "rome").await, Err(GameError::NotFound(_))));
    assert!(matches!(stats(&state, "  ").await, Err(GameError::InvalidInput(_))));
  }
}
