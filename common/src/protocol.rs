use serde::{Deserialize, Serialize};

use crate::models::{Pos, Snapshot};

/// Cell named by a reveal or flag request. Negative coordinates are out of
/// bounds.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellTarget {
    pub x: i64,
    pub y: i64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RevealResult {
    Ok,
    Mine,
    Win,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StartResponse {
    pub session: String,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RevealResponse {
    pub result: RevealResult,
    pub newly_revealed: Vec<Pos>,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FlagResponse {
    /// Reveal marker of the toggled cell after the action.
    pub cell: u8,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

/// Suggested hidden cell to play next, `None` when every unrevealed cell is
/// flagged.
#[derive(Serialize, Deserialize, Debug)]
pub struct HintResponse {
    pub pos: Option<Pos>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidConfiguration,
    OutOfBounds,
    IllegalAction,
    NoActiveSession,
    RateLimited,
    MalformedRequest,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: ErrorKind,
    pub message: String,
}
