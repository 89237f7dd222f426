//! External collaborator seams
//!
//! The core's contact surface with the rest of the product: persisted
//! key-value storage (high score), the leaderboard submission hook and the
//! scene router. All are traits so the gameplay screen can be driven with
//! test doubles.

use std::collections::HashMap;
use std::path::PathBuf;

/// Storage key for the persisted high score
pub const HIGH_SCORE_KEY: &str = "high_score";
/// Storage key for the logged-out flag; owned by the auth layer, read-only here
pub const LOGGED_OUT_KEY: &str = "logged_out";

/// Persisted integer key-value store
pub trait Storage {
    fn get_i64(&self, key: &str) -> Option<i64>;
    fn set_i64(&mut self, key: &str, value: i64);
}

/// In-memory store for tests and headless runs
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, i64>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set_i64(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }
}

/// JSON-file-backed store
///
/// The whole map is read once at open and rewritten on every set. Read or
/// write failures degrade to an empty store with a warning; persistence
/// failures never affect gameplay.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: HashMap<String, i64>,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(values) => values,
                Err(e) => {
                    log::warn!("ignoring corrupt store {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(), // first run
        };
        Self { path, values }
    }

    fn flush(&self) {
        match serde_json::to_string(&self.values) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    log::warn!("failed to write {}: {}", self.path.display(), e);
                }
            }
            Err(e) => log::warn!("failed to serialize store: {}", e),
        }
    }
}

impl Storage for FileStorage {
    fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set_i64(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
        self.flush();
    }
}

/// Remote leaderboard hand-off
///
/// Fire-and-forget: the terminal score is passed by value after a round ends
/// and the core neither awaits nor retries the submission.
pub trait LeaderboardSink {
    fn submit(&mut self, score: u32);
}

/// Default sink that only logs the submission
pub struct LogLeaderboard;

impl LeaderboardSink for LogLeaderboard {
    fn submit(&mut self, score: u32) {
        log::info!("leaderboard submission: {}", score);
    }
}

/// Scene transition collaborator; the core's only exit point
pub trait SceneRouter {
    fn return_to_menu(&mut self);
}

/// Default router that only logs the request
pub struct LogSceneRouter;

impl SceneRouter for LogSceneRouter {
    fn return_to_menu(&mut self) {
        log::info!("return to menu requested");
    }
}
