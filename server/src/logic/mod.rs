use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

pub mod flag;
pub mod generator;
pub mod reveal;
pub mod session;
pub mod snapshot;

pub use session::{GameSession, RevealReport};

/// Live sessions keyed by session id. Each session is locked for the whole
/// duration of an action.
pub type Sessions = Arc<DashMap<String, Arc<Mutex<GameSession>>>>;
