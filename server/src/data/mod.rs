use mine_web_common::{
    models::{GameStatus, Pos},
    protocol::CellTarget,
};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Revealed,
    Flagged,
}

impl RevealState {
    pub const fn marker(self) -> u8 {
        use mine_web_common::models::{FLAGGED, HIDDEN, REVEALED};

        match self {
            Self::Hidden => HIDDEN,
            Self::Revealed => REVEALED,
            Self::Flagged => FLAGGED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub mine: bool,
    pub adjacent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    InProgress,
    Won,
    Lost,
}

impl Status {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl From<Status> for GameStatus {
    fn from(value: Status) -> Self {
        match value {
            Status::InProgress => Self::InProgress,
            Status::Won => Self::Won,
            Status::Lost => Self::Lost,
        }
    }
}

/// Validated board dimensions: `rows, cols >= 1` and `0 < mines < rows * cols`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    rows: usize,
    cols: usize,
    mines: usize,
}

impl BoardConfig {
    pub fn new(rows: usize, cols: usize, mines: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(EngineError::InvalidConfiguration(
                "rows and cols must be at least 1",
            ));
        }
        let total = rows
            .checked_mul(cols)
            .ok_or(EngineError::InvalidConfiguration("board is too large"))?;
        if mines == 0 {
            return Err(EngineError::InvalidConfiguration(
                "at least one mine is required",
            ));
        }
        if mines >= total {
            return Err(EngineError::InvalidConfiguration(
                "mines must be fewer than the number of cells",
            ));
        }
        Ok(Self { rows, cols, mines })
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn cols(&self) -> usize {
        self.cols
    }

    pub const fn mines(&self) -> usize {
        self.mines
    }

    pub const fn total_cells(&self) -> usize {
        self.rows * self.cols
    }
}

/// Converts a requested cell into a board position. Negative coordinates
/// are out of bounds; the upper bound is checked against the board later.
pub fn target_pos(target: CellTarget) -> Result<Pos> {
    match (usize::try_from(target.x), usize::try_from(target.y)) {
        (Ok(x), Ok(y)) => Ok(Pos { x, y }),
        _ => Err(EngineError::OutOfBounds(target.x, target.y)),
    }
}

const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// In-bounds 8-directional neighbors of `pos` on a `rows x cols` grid.
pub fn neighbors(pos: Pos, rows: usize, cols: usize) -> impl Iterator<Item = Pos> {
    DISPLACEMENTS.into_iter().filter_map(move |(dx, dy)| {
        let x = pos.x.checked_add_signed(dx)?;
        let y = pos.y.checked_add_signed(dy)?;
        (x < rows && y < cols).then_some(Pos { x, y })
    })
}

/// Immutable mine layout with precomputed adjacency counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    config: BoardConfig,
    cells: Vec<Cell>,
}

impl Board {
    /// Builds a board from a row-major mine mask, counting adjacency for
    /// every cell.
    pub fn from_mask(config: BoardConfig, mask: &[bool]) -> Result<Self> {
        if mask.len() != config.total_cells() {
            return Err(EngineError::InvalidConfiguration(
                "mine mask does not match board size",
            ));
        }
        if mask.iter().filter(|&&mine| mine).count() != config.mines() {
            return Err(EngineError::InvalidConfiguration(
                "mine mask does not match mine count",
            ));
        }

        let cells = (0..config.total_cells())
            .map(|index| {
                let pos = Pos {
                    x: index / config.cols(),
                    y: index % config.cols(),
                };
                let adjacent = neighbors(pos, config.rows(), config.cols())
                    .filter(|n| mask[n.x * config.cols() + n.y])
                    .count() as u8;
                Cell {
                    mine: mask[index],
                    adjacent,
                }
            })
            .collect();

        Ok(Self { config, cells })
    }

    /// Builds a board with mines at exactly the given positions.
    pub fn with_mines(rows: usize, cols: usize, mines: &[Pos]) -> Result<Self> {
        let mut mask = vec![false; rows.saturating_mul(cols)];
        for &pos in mines {
            if pos.x >= rows || pos.y >= cols {
                return Err(EngineError::out_of_bounds(pos));
            }
            mask[pos.x * cols + pos.y] = true;
        }
        let count = mask.iter().filter(|&&mine| mine).count();
        let config = BoardConfig::new(rows, cols, count)?;
        Self::from_mask(config, &mask)
    }

    pub const fn config(&self) -> BoardConfig {
        self.config
    }

    pub const fn rows(&self) -> usize {
        self.config.rows
    }

    pub const fn cols(&self) -> usize {
        self.config.cols
    }

    pub const fn mine_count(&self) -> usize {
        self.config.mines
    }

    pub const fn safe_cell_count(&self) -> usize {
        self.config.total_cells() - self.config.mines
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.rows() && pos.y < self.cols()
    }

    pub fn validate(&self, pos: Pos) -> Result<Pos> {
        if self.contains(pos) {
            Ok(pos)
        } else {
            Err(EngineError::out_of_bounds(pos))
        }
    }

    /// Row-major index of an in-bounds position.
    pub fn index(&self, pos: Pos) -> usize {
        pos.x * self.cols() + pos.y
    }

    pub fn cell(&self, pos: Pos) -> Cell {
        self.cells[self.index(pos)]
    }

    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + use<> {
        neighbors(pos, self.rows(), self.cols())
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let cols = self.cols();
        (0..self.config.total_cells()).map(move |index| Pos {
            x: index / cols,
            y: index % cols,
        })
    }

    pub fn mine_positions(&self) -> impl Iterator<Item = Pos> + '_ {
        self.positions().filter(|&pos| self.cell(pos).mine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: usize, cols: usize, mines: &[(usize, usize)]) -> Board {
        let mines: Vec<Pos> = mines.iter().map(|&(x, y)| Pos::new(x, y)).collect();
        Board::with_mines(rows, cols, &mines).unwrap()
    }

    #[test]
    fn corner_edge_and_center_neighbor_counts() {
        assert_eq!(neighbors(Pos::new(0, 0), 3, 3).count(), 3);
        assert_eq!(neighbors(Pos::new(0, 1), 3, 3).count(), 5);
        assert_eq!(neighbors(Pos::new(1, 1), 3, 3).count(), 8);
        assert_eq!(neighbors(Pos::new(0, 0), 1, 1).count(), 0);
    }

    #[test]
    fn adjacency_counts_for_diagonal_mines() {
        let board = board(3, 3, &[(0, 0), (2, 2)]);

        assert_eq!(board.cell(Pos::new(1, 1)).adjacent, 2);
        assert_eq!(board.cell(Pos::new(0, 1)).adjacent, 1);
        assert_eq!(board.cell(Pos::new(1, 2)).adjacent, 1);
        assert_eq!(board.cell(Pos::new(0, 2)).adjacent, 0);
        assert_eq!(board.cell(Pos::new(2, 0)).adjacent, 0);
        assert!(board.cell(Pos::new(0, 0)).mine);
        assert_eq!(board.safe_cell_count(), 7);
    }

    #[test]
    fn config_rejects_out_of_range_values() {
        assert!(BoardConfig::new(0, 5, 1).is_err());
        assert!(BoardConfig::new(5, 0, 1).is_err());
        assert!(BoardConfig::new(3, 3, 0).is_err());
        assert!(BoardConfig::new(3, 3, 9).is_err());
        assert!(BoardConfig::new(usize::MAX, 2, 1).is_err());
        assert!(BoardConfig::new(3, 3, 8).is_ok());
    }

    #[test]
    fn mines_outside_the_board_are_rejected() {
        let result = Board::with_mines(2, 2, &[Pos::new(2, 0)]);

        assert_eq!(result, Err(EngineError::OutOfBounds(2, 0)));
    }

    #[test]
    fn negative_targets_are_out_of_bounds() {
        assert_eq!(
            target_pos(CellTarget { x: -1, y: 0 }),
            Err(EngineError::OutOfBounds(-1, 0))
        );
        assert_eq!(
            target_pos(CellTarget { x: 2, y: -7 }),
            Err(EngineError::OutOfBounds(2, -7))
        );
        assert_eq!(target_pos(CellTarget { x: 2, y: 3 }), Ok(Pos::new(2, 3)));
    }

    #[test]
    fn mask_with_wrong_mine_count_is_rejected() {
        let config = BoardConfig::new(2, 2, 2).unwrap();

        assert!(Board::from_mask(config, &[true, false, false, false]).is_err());
    }
}
