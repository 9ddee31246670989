//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info
//! (never guesses or answers).

use std::sync::Arc;
use axum::{extract::{State, Query}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::domain::{FinishSummary, PlayerStats};
use crate::error::GameResult;
use crate::protocol::*;
use crate::state::AppState;
use crate::logic;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_event(
  State(state): State<Arc<AppState>>,
  Query(q): Query<StartQuery>,
) -> GameResult<Json<StartOut>> {
  let out = logic::start_game(&state, q.player.as_deref()).await?;
  info!(target: "puzzle", date = %out.date, session = %out.session_id, already_played = out.already_played, "HTTP event served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, guess_len = body.guess.len()))]
pub async fn http_post_guess(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GuessIn>,
) -> GameResult<Json<GuessOut>> {
  let out = logic::submit_guess(&state, &body.session_id, &body.guess).await?;
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id))]
pub async fn http_post_reveal(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionIn>,
) -> GameResult<Json<RevealOut>> {
  Ok(Json(logic::reveal(&state, &body.session_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id))]
pub async fn http_post_finish(
  State(state): State<Arc<AppState>>,
  Json(body): Json<FinishIn>,
) -> GameResult<Json<FinishSummary>> {
  let summary = logic::finish(&state, &body.session_id, body.name.as_deref()).await?;
  info!(target: "puzzle", id = %body.session_id, won = summary.won, rank = ?summary.rank, "HTTP finish recorded");
  Ok(Json(summary))
}

#[instrument(level = "info", skip(state), fields(%q.session_id))]
pub async fn http_get_share(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SessionIn>,
) -> GameResult<Json<ShareOut>> {
  Ok(Json(logic::share(&state, &q.session_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_stats(
  State(state): State<Arc<AppState>>,
  Query(q): Query<StatsQuery>,
) -> GameResult<Json<PlayerStats>> {
  Ok(Json(logic::stats(&state, &q.player).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_leaderboard(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LeaderboardQuery>,
) -> impl IntoResponse {
  Json(logic::leaderboard(&state, q.date).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_streak_leaderboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::streak_leaderboard(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_countdown(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::countdown(&state))
}
