//! On-disk snapshot of history and leaderboard (optional, via DATA_PATH).
//!
//! The whole snapshot is rewritten after each finished session: write to a
//! sibling temp file, then rename over the target.

use std::{collections::HashMap, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::domain::{LeaderboardEntry, PlayRecord};
use crate::error::GameResult;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
  #[serde(default)]
  pub history: HashMap<String, Vec<PlayRecord>>,
  #[serde(default)]
  pub leaderboard: Vec<LeaderboardEntry>,
}

pub fn data_path_from_env() -> Option<PathBuf> {
  std::env::var("DATA_PATH").ok().map(PathBuf::from)
}

/// Missing or unreadable files yield an empty snapshot.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_snapshot(path: &Path) -> Snapshot {
  match fs::read(path).await {
    Ok(bytes) => match serde_json::from_slice::<Snapshot>(&bytes) {
      Ok(snap) => {
        info!(target: "historle_backend", players = snap.history.len(), entries = snap.leaderboard.len(), "Loaded data snapshot");
        snap
      }
      Err(e) => {
        warn!(target: "historle_backend", error = %e, "Data snapshot is corrupt; starting empty");
        Snapshot::default()
      }
    },
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
    Err(e) => {
      warn!(target: "historle_backend", error = %e, "Failed to read data snapshot; starting empty");
      Snapshot::default()
    }
  }
}

#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn save_snapshot(path: &Path, snap: &Snapshot) -> GameResult<()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent).await?;
  }
  let body = serde_json::to_vec_pretty(snap)?;
  let tmp = path.with_extension("json.tmp");
  fs::write(&tmp, body).await?;
  fs::rename(&tmp, path).await?;
  Ok(())
}
