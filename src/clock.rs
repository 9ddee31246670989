//! Game-day boundaries.
//!
//! The daily rollover happens at local midnight of one fixed UTC offset
//! (`utc_offset_minutes` in config, default 0 = UTC midnight). Days are always
//! compared as calendar dates, never as 24-hour windows.

use std::time::Duration;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Offset, Utc};

use crate::error::{GameError, GameResult};

#[derive(Clone, Copy, Debug)]
pub struct GameClock {
  offset: FixedOffset,
}

impl Default for GameClock {
  fn default() -> Self {
    Self { offset: Utc.fix() }
  }
}

impl GameClock {
  pub fn from_offset_minutes(minutes: i32) -> GameResult<Self> {
    minutes
      .checked_mul(60)
      .and_then(FixedOffset::east_opt)
      .map(|offset| Self { offset })
      .ok_or_else(|| GameError::Config(format!("utc_offset_minutes out of range: {minutes}")))
  }

  pub fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }

  /// Calendar day that `at` falls on under the rollover policy.
  pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&self.offset).date_naive()
  }

  pub fn today(&self) -> NaiveDate {
    self.day_of(self.now())
  }

  /// Time left until the next rollover.
  pub fn until_rollover(&self, at: DateTime<Utc>) -> Duration {
    let local = at.with_timezone(&self.offset);
    let next_midnight = local
      .date_naive()
      .checked_add_days(Days::new(1))
      .and_then(|d| d.and_hms_opt(0, 0, 0))
      .and_then(|naive| naive.and_local_timezone(self.offset).single());
    match next_midnight {
      Some(next) => (next - local).to_std().unwrap_or_default(),
      None => Duration::ZERO,
    }
  }
}
