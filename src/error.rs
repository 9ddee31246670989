//! Error type shared by the engine, the stores and the HTTP/WS layers.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
  /// Empty guess, guess after the game ended, reveal before it ended...
  /// Rejected locally and never forwarded anywhere.
  #[error("Invalid input: {0}")]
  InvalidInput(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Already completed: {0}")]
  AlreadyCompleted(String),

  #[error("Upstream error: {0}")]
  Upstream(String),

  #[error("Storage error: {0}")]
  Storage(String),

  #[error("Configuration error: {0}")]
  Config(String),
}

pub type GameResult<T> = Result<T, GameError>;

impl GameError {
  pub fn status_code(&self) -> StatusCode {
    match self {
      Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::AlreadyCompleted(_) => StatusCode::CONFLICT,
      Self::Upstream(_) => StatusCode::BAD_GATEWAY,
      Self::Storage(_) | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for GameError {
  fn into_response(self) -> Response {
    let status = self.status_code();
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

impl From<std::io::Error> for GameError {
  fn from(err: std::io::Error) -> Self {
    Self::Storage(err.to_string())
  }
}

impl From<serde_json::Error> for GameError {
  fn from(err: serde_json::Error) -> Self {
    Self::Storage(err.to_string())
  }
}

impl From<reqwest::Error> for GameError {
  fn from(err: reqwest::Error) -> Self {
    Self::Upstream(err.to_string())
  }
}
