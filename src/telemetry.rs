//! Tracing setup.
//!
//! - LOG_LEVEL holds `EnvFilter` directives, e.g. "debug" or
//!   "info,puzzle=debug,historle_backend=debug,tower_http=info".
//! - LOG_FORMAT=json switches to one JSON object per event; anything else is
//!   the human-readable format.
//!
//! Two targets are used across the crate: `puzzle` for game events (sessions,
//! verdicts, leaderboard) and `historle_backend` for server plumbing.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "info,puzzle=debug,historle_backend=debug,tower_http=info,axum=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl LogFormat {
  pub fn parse(raw: Option<&str>) -> Self {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
      Some("json") => LogFormat::Json,
      _ => LogFormat::Pretty,
    }
  }
}

fn filter_from_env() -> EnvFilter {
  EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

pub fn init_tracing() {
  let format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref());
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter_from_env())
    .with_target(true)
    .with_file(true)
    .with_line_number(true);

  // A subscriber may already be installed (tests, embedding); keep it.
  let _ = match format {
    LogFormat::Json => builder.json().try_init(),
    LogFormat::Pretty => builder.try_init(),
  };
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_log_format() {
    assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
    assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
    assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Pretty);
    assert_eq!(LogFormat::parse(None), LogFormat::Pretty);
  }

  #[test]
  fn default_directives_parse() {
    assert!(DEFAULT_DIRECTIVES.parse::<EnvFilter>().is_ok());
  }

  #[test]
  fn init_twice_does_not_panic() {
    init_tracing();
    init_tracing();
  }
}
