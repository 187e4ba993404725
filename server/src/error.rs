use mine_web_common::models::Pos;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid board configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("Position ({0}, {1}) is outside the board")]
    OutOfBounds(i64, i64),
    #[error("Illegal action: {0}")]
    IllegalAction(&'static str),
    #[error("No active session, start a game first")]
    NoActiveSession,
}

impl EngineError {
    pub fn out_of_bounds(pos: Pos) -> Self {
        let coord = |v: usize| i64::try_from(v).unwrap_or(i64::MAX);
        Self::OutOfBounds(coord(pos.x), coord(pos.y))
    }
}

pub type Result<T> = core::result::Result<T, EngineError>;
