use mine_web_common::models::{MINE, Pos, Snapshot};

use crate::{
    data::{Cell, RevealState, Status},
    logic::session::GameSession,
};

fn cell_value(cell: Cell) -> i8 {
    if cell.mine { MINE } else { cell.adjacent as i8 }
}

impl GameSession {
    /// Client-visible state. Cell contents are withheld for hidden and
    /// flagged cells until the game is over.
    pub fn snapshot(&self) -> Snapshot {
        let board = self.board();
        let finished = self.status().is_finished();

        let grid = (0..board.rows())
            .map(|x| {
                (0..board.cols())
                    .map(|y| {
                        let pos = Pos { x, y };
                        let visible = finished || self.state_at(pos) == RevealState::Revealed;
                        visible.then(|| cell_value(board.cell(pos)))
                    })
                    .collect()
            })
            .collect();

        let revealed = (0..board.rows())
            .map(|x| {
                (0..board.cols())
                    .map(|y| self.state_at(Pos { x, y }).marker())
                    .collect()
            })
            .collect();

        Snapshot {
            rows: board.rows(),
            cols: board.cols(),
            mines: board.mine_count(),
            flags: self.flag_count(),
            grid,
            revealed,
            status: self.status().into(),
            game_over: finished,
            win: self.status() == Status::Won,
        }
    }
}

#[cfg(test)]
mod tests {
    use mine_web_common::models::{FLAGGED, GameStatus, HIDDEN, REVEALED};

    use super::*;
    use crate::data::Board;

    fn session(rows: usize, cols: usize, mines: &[(usize, usize)]) -> GameSession {
        let mines: Vec<Pos> = mines.iter().map(|&(x, y)| Pos::new(x, y)).collect();
        GameSession::from_board(Board::with_mines(rows, cols, &mines).unwrap())
    }

    #[test]
    fn fresh_game_withholds_every_cell() {
        let snapshot = session(2, 3, &[(1, 2)]).snapshot();

        assert_eq!(snapshot.rows, 2);
        assert_eq!(snapshot.cols, 3);
        assert_eq!(snapshot.mines, 1);
        assert_eq!(snapshot.grid, vec![vec![None; 3]; 2]);
        assert_eq!(snapshot.revealed, vec![vec![HIDDEN; 3]; 2]);
        assert_eq!(snapshot.status, GameStatus::InProgress);
        assert!(!snapshot.game_over);
        assert!(!snapshot.win);
    }

    #[test]
    fn only_revealed_cells_show_values_in_progress() {
        let mut session = session(3, 3, &[(0, 0), (2, 2)]);
        session.reveal(Pos::new(1, 1)).unwrap();
        session.flag(Pos::new(0, 0)).unwrap();

        let snapshot = session.snapshot();

        assert_eq!(snapshot.grid[1][1], Some(2));
        assert_eq!(snapshot.grid[0][0], None);
        assert_eq!(snapshot.grid[2][2], None);
        assert_eq!(snapshot.grid[0][1], None);
        assert_eq!(snapshot.revealed[1][1], REVEALED);
        assert_eq!(snapshot.revealed[0][0], FLAGGED);
        assert_eq!(snapshot.flags, 1);
    }

    #[test]
    fn lost_game_shows_full_board() {
        let mut session = session(2, 2, &[(0, 0)]);
        session.reveal(Pos::new(0, 0)).unwrap();

        let snapshot = session.snapshot();

        assert_eq!(
            snapshot.grid,
            vec![vec![Some(MINE), Some(1)], vec![Some(1), Some(1)]]
        );
        assert_eq!(snapshot.revealed[0][0], REVEALED);
        assert_eq!(snapshot.revealed[1][1], HIDDEN);
        assert_eq!(snapshot.status, GameStatus::Lost);
        assert!(snapshot.game_over);
        assert!(!snapshot.win);
    }

    #[test]
    fn won_game_sets_win_flag() {
        let mut session = session(1, 2, &[(0, 0)]);
        session.reveal(Pos::new(0, 1)).unwrap();

        let snapshot = session.snapshot();

        assert_eq!(snapshot.status, GameStatus::Won);
        assert!(snapshot.win);
        assert!(snapshot.game_over);
        assert_eq!(snapshot.grid[0][0], Some(MINE));
    }
}
