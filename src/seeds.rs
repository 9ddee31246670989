//! Seed data: a few built-in events so the game is playable without any
//! configured event bank or remote feed.

use chrono::{Datelike, NaiveDate};

use crate::domain::DailyEvent;

fn seed(category: &str, difficulty: &str, clues: &[&str], answer: &str, alt: &[&str], summary: &str) -> DailyEvent {
  DailyEvent {
    date: NaiveDate::MIN,
    clues: clues.iter().map(|c| c.to_string()).collect(),
    category: category.into(),
    difficulty: difficulty.into(),
    answer: answer.into(),
    alt_answers: alt.iter().map(|a| a.to_string()).collect(),
    summary: summary.into(),
  }
}

/// Minimal set of built-in events. Dates are stamped when served.
pub fn seed_events() -> Vec<DailyEvent> {
  vec![
    seed(
      "1969",
      "easy",
      &[
        "Three men left on a Wednesday and came back eight days later.",
        "Half a billion people watched a grainy broadcast.",
        "A lunar module named Eagle.",
        "\"One small step for man...\"",
        "Neil Armstrong and Buzz Aldrin walked on the Moon.",
      ],
      "moon landing",
      &["apollo 11", "first moon landing", "apollo 11 moon landing"],
      "On 20 July 1969 Apollo 11 landed on the Moon and Neil Armstrong became the first person to walk on its surface.",
    ),
    seed(
      "1989",
      "medium",
      &[
        "A press conference answer came out earlier than planned.",
        "Crowds gathered at checkpoints that night.",
        "Guards stopped checking papers.",
        "People climbed on top of a concrete barrier with hammers.",
        "A divided German city was reunited.",
      ],
      "fall of the berlin wall",
      &["berlin wall", "berlin wall falls", "the fall of the berlin wall"],
      "On 9 November 1989 East Germany opened its border crossings and Berliners began tearing down the Wall.",
    ),
    seed(
      "1912",
      "easy",
      &[
        "A maiden voyage from Southampton.",
        "Described as practically unsinkable.",
        "Not enough lifeboats for everyone aboard.",
        "An iceberg in the North Atlantic.",
        "More than 1,500 people died when the White Star liner sank.",
      ],
      "sinking of the titanic",
      &["titanic", "titanic sinking", "the titanic"],
      "The RMS Titanic struck an iceberg on 14 April 1912 and sank early the next morning.",
    ),
  ]
}

/// Pick a seed for `date` by rotating through the built-ins, stamped with that date.
pub fn seed_event_for(date: NaiveDate) -> DailyEvent {
  let mut seeds = seed_events();
  let idx = date.num_days_from_ce().rem_euclid(seeds.len() as i32) as usize;
  let mut ev = seeds.swap_remove(idx);
  ev.date = date;
  ev
}
