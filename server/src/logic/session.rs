use std::time::Instant;

use mine_web_common::{models::Pos, protocol::RevealResult};
use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};
use tracing::{debug, info, instrument, warn};

use crate::{
    data::{Board, BoardConfig, RevealState, Status},
    error::{EngineError, Result},
    logic::{
        flag::toggle_flag,
        generator::generate,
        reveal::{Outcome, reveal},
    },
};

/// One game: the board, the per-cell reveal state and the win/loss status.
pub struct GameSession {
    board: Board,
    states: Vec<RevealState>,
    status: Status,
    revealed_safe: usize,
    first_move_taken: bool,
    safe_first_click: bool,
    rng: StdRng,
    last_activity: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealReport {
    pub newly_revealed: Vec<Pos>,
    pub outcome: Outcome,
    pub status: Status,
}

impl RevealReport {
    pub fn result(&self) -> RevealResult {
        match (self.outcome, self.status) {
            (Outcome::MineHit, _) => RevealResult::Mine,
            (Outcome::None, Status::Won) => RevealResult::Win,
            (Outcome::None, _) => RevealResult::Ok,
        }
    }
}

impl GameSession {
    /// Starts a game on a freshly generated board.
    ///
    /// With `safe_first_click`, the board is regenerated around the first
    /// revealed cell so the opening move never hits a mine.
    #[instrument(level = "trace")]
    pub fn start(config: BoardConfig, safe_first_click: bool) -> Result<Self> {
        Self::start_with_rng(
            config,
            safe_first_click,
            StdRng::from_rng(&mut rand::rng()),
        )
    }

    pub fn start_with_rng(
        config: BoardConfig,
        safe_first_click: bool,
        mut rng: StdRng,
    ) -> Result<Self> {
        let board = generate(config, None, &mut rng)?;
        info!(
            "Starting game: {}x{} with {} mines (safe first click: {})",
            config.rows(),
            config.cols(),
            config.mines(),
            safe_first_click
        );
        Ok(Self::assemble(board, safe_first_click, rng))
    }

    /// Plays on a fixed layout. The first click is not protected.
    pub fn from_board(board: Board) -> Self {
        Self::assemble(board, false, StdRng::from_rng(&mut rand::rng()))
    }

    fn assemble(board: Board, safe_first_click: bool, rng: StdRng) -> Self {
        let cells = board.rows() * board.cols();
        Self {
            board,
            states: vec![RevealState::Hidden; cells],
            status: Status::InProgress,
            revealed_safe: 0,
            first_move_taken: false,
            safe_first_click,
            rng,
            last_activity: Instant::now(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn state_at(&self, pos: Pos) -> RevealState {
        self.states[self.board.index(pos)]
    }

    pub fn revealed_safe_count(&self) -> usize {
        self.revealed_safe
    }

    pub fn first_move_taken(&self) -> bool {
        self.first_move_taken
    }

    pub fn flag_count(&self) -> usize {
        self.states
            .iter()
            .filter(|&&state| state == RevealState::Flagged)
            .count()
    }

    /// Whether the session has been idle for longer than the timeout as of
    /// `now`.
    pub fn should_cleanup(&self, inactive_timeout_secs: u64, now: Instant) -> bool {
        now.saturating_duration_since(self.last_activity).as_secs() > inactive_timeout_secs
    }

    /// Marks the session as in use without changing the game.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Picks a random hidden cell to play next. Flagged and revealed cells
    /// are never suggested; `None` means every unrevealed cell is flagged.
    #[instrument(level = "trace", skip(self))]
    pub fn suggest(&mut self) -> Result<Option<Pos>> {
        self.check_in_progress()?;
        self.last_activity = Instant::now();

        let hidden: Vec<Pos> = self
            .board
            .positions()
            .filter(|&pos| self.state_at(pos) == RevealState::Hidden)
            .collect();
        let hint = hidden.choose(&mut self.rng).copied();

        match hint {
            Some(pos) => debug!(
                "Suggesting ({}, {}) out of {} hidden cells",
                pos.x,
                pos.y,
                hidden.len()
            ),
            None => debug!("No hidden cell left to suggest"),
        }
        Ok(hint)
    }

    #[instrument(level = "trace", skip(self), fields(x = pos.x, y = pos.y))]
    pub fn reveal(&mut self, pos: Pos) -> Result<RevealReport> {
        let pos = self.board.validate(pos)?;
        self.check_in_progress()?;

        match self.state_at(pos) {
            RevealState::Hidden => {}
            RevealState::Revealed => {
                debug!("Rejecting reveal of revealed cell ({}, {})", pos.x, pos.y);
                return Err(EngineError::IllegalAction("cell is already revealed"));
            }
            RevealState::Flagged => {
                debug!("Rejecting reveal of flagged cell ({}, {})", pos.x, pos.y);
                return Err(EngineError::IllegalAction(
                    "flagged cells cannot be revealed",
                ));
            }
        }

        self.last_activity = Instant::now();

        if !self.first_move_taken && self.safe_first_click {
            self.board = generate(self.board.config(), Some(pos), &mut self.rng)?;
            debug!("Regenerated board around first click ({}, {})", pos.x, pos.y);
        }
        self.first_move_taken = true;

        let result = reveal(&self.board, &mut self.states, pos);
        self.revealed_safe += result.safe_count();

        match result.outcome {
            Outcome::MineHit => {
                warn!("Mine hit at ({}, {}) - game over!", pos.x, pos.y);
                self.status = Status::Lost;
                let exposed = self.expose_mines();
                info!("Game lost, exposed {} mines", exposed);
            }
            Outcome::None if self.revealed_safe == self.board.safe_cell_count() => {
                self.status = Status::Won;
                info!("Game won! All {} safe cells revealed.", self.revealed_safe);
            }
            Outcome::None => {
                debug!(
                    "Revealed {} cells, {} of {} safe cells open",
                    result.newly_revealed.len(),
                    self.revealed_safe,
                    self.board.safe_cell_count()
                );
            }
        }

        Ok(RevealReport {
            newly_revealed: result.newly_revealed,
            outcome: result.outcome,
            status: self.status,
        })
    }

    #[instrument(level = "trace", skip(self), fields(x = pos.x, y = pos.y))]
    pub fn flag(&mut self, pos: Pos) -> Result<RevealState> {
        let pos = self.board.validate(pos)?;
        self.check_in_progress()?;

        let index = self.board.index(pos);
        if self.states[index] == RevealState::Revealed {
            debug!("Rejecting flag on revealed cell ({}, {})", pos.x, pos.y);
            return Err(EngineError::IllegalAction(
                "revealed cells cannot be flagged",
            ));
        }

        self.last_activity = Instant::now();
        let state = toggle_flag(&mut self.states[index]);
        debug!("Cell ({}, {}) is now {:?}", pos.x, pos.y, state);
        Ok(state)
    }

    fn check_in_progress(&self) -> Result<()> {
        if self.status.is_finished() {
            debug!("Rejecting action on finished game ({:?})", self.status);
            Err(EngineError::IllegalAction("game is already over"))
        } else {
            Ok(())
        }
    }

    // Display only, runs once on the transition to lost.
    fn expose_mines(&mut self) -> usize {
        let mut exposed = 0;
        for pos in self.board.mine_positions() {
            let index = self.board.index(pos);
            if self.states[index] != RevealState::Revealed {
                self.states[index] = RevealState::Revealed;
                exposed += 1;
            }
        }
        exposed
    }
}
