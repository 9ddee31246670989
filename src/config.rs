//! Loading game configuration (settings + optional event bank) from TOML.
//!
//! See `GameConfig` and `GameSettings` for expected schema:
//!
//! ```toml
//! [game]
//! utc_offset_minutes = -300
//! site_url = "https://historle.com"
//! leaderboard_limit = 100
//!
//! [[events]]
//! date = "2025-07-20"
//! category = "1969"
//! difficulty = "easy"
//! clues = ["...", "..."]
//! answer = "moon landing"
//! alt_answers = ["apollo 11"]
//! summary = "..."
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::DailyEvent;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct GameConfig {
  #[serde(default)]
  pub game: GameSettings,
  #[serde(default)]
  pub events: Vec<DailyEvent>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GameSettings {
  /// Fixed UTC offset of the daily rollover, in minutes.
  pub utc_offset_minutes: i32,
  /// Link appended to share messages.
  pub site_url: String,
  /// Entries kept per day on the leaderboard (and rows in the streak board).
  pub leaderboard_limit: usize,
}

impl Default for GameSettings {
  fn default() -> Self {
    Self {
      utc_offset_minutes: 0,
      site_url: "https://historle.com".into(),
      leaderboard_limit: 100,
    }
  }
}

pub fn parse_game_config(s: &str) -> Result<GameConfig, toml::de::Error> {
  toml::from_str::<GameConfig>(s)
}

/// Attempt to load `GameConfig` from GAME_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_game_config_from_env() -> Option<GameConfig> {
  let path = std::env::var("GAME_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_game_config(&s) {
      Ok(cfg) => {
        info!(target: "historle_backend", %path, events = cfg.events.len(), "Loaded game config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "historle_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "historle_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_settings_and_events() {
    let cfg = parse_game_config(
      r#"
        [game]
        utc_offset_minutes = -300
        leaderboard_limit = 10

        [[events]]
        date = "2025-07-20"
        category = "1969"
        clues = ["A giant leap", "Eagle has landed"]
        answer = "Moon Landing"
        alt_answers = ["apollo 11"]
      "#,
    )
    .unwrap();

    assert_eq!(cfg.game.utc_offset_minutes, -300);
    assert_eq!(cfg.game.leaderboard_limit, 10);
    assert_eq!(cfg.game.site_url, "https://historle.com");
    assert_eq!(cfg.events.len(), 1);
    assert_eq!(cfg.events[0].total_clues(), 2);
    assert!(cfg.events[0].summary.is_empty());
  }

  #[test]
  fn empty_document_uses_defaults() {
    let cfg = parse_game_config("").unwrap();
    assert_eq!(cfg.game.leaderboard_limit, 100);
    assert!(cfg.events.is_empty());
  }
}
