use std::collections::VecDeque;

use mine_web_common::models::Pos;

use crate::data::{Board, RevealState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    None,
    MineHit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    /// Cells that moved from hidden to revealed, target first.
    pub newly_revealed: Vec<Pos>,
    pub outcome: Outcome,
}

impl Reveal {
    fn empty() -> Self {
        Self {
            newly_revealed: Vec::new(),
            outcome: Outcome::None,
        }
    }

    /// Number of safe cells this reveal uncovered.
    pub fn safe_count(&self) -> usize {
        match self.outcome {
            Outcome::None => self.newly_revealed.len(),
            Outcome::MineHit => 0,
        }
    }
}

/// Reveals `start` and, when it has no adjacent mines, floods outward
/// through the zero region and its border.
///
/// Only hidden cells are touched. Flagged cells block the flood and mines
/// are never uncovered by it.
pub fn reveal(board: &Board, states: &mut [RevealState], start: Pos) -> Reveal {
    let index = board.index(start);
    if states[index] != RevealState::Hidden {
        return Reveal::empty();
    }

    states[index] = RevealState::Revealed;
    let cell = board.cell(start);
    if cell.mine {
        return Reveal {
            newly_revealed: vec![start],
            outcome: Outcome::MineHit,
        };
    }

    let mut newly_revealed = vec![start];
    let mut frontier = VecDeque::new();
    if cell.adjacent == 0 {
        frontier.push_back(start);
    }

    while let Some(pos) = frontier.pop_front() {
        for neighbor in board.neighbors(pos) {
            let index = board.index(neighbor);
            let cell = board.cell(neighbor);
            if states[index] != RevealState::Hidden || cell.mine {
                continue;
            }

            states[index] = RevealState::Revealed;
            newly_revealed.push(neighbor);
            if cell.adjacent == 0 {
                frontier.push_back(neighbor);
            }
        }
    }

    Reveal {
        newly_revealed,
        outcome: Outcome::None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{data::BoardConfig, logic::generator::generate};

    fn board(rows: usize, cols: usize, mines: &[(usize, usize)]) -> Board {
        let mines: Vec<Pos> = mines.iter().map(|&(x, y)| Pos::new(x, y)).collect();
        Board::with_mines(rows, cols, &mines).unwrap()
    }

    fn hidden(board: &Board) -> Vec<RevealState> {
        vec![RevealState::Hidden; board.rows() * board.cols()]
    }

    fn set(cells: &[(usize, usize)]) -> BTreeSet<Pos> {
        cells.iter().map(|&(x, y)| Pos::new(x, y)).collect()
    }

    /// Fixed-point closure over the zero region, independent of the queue
    /// based traversal.
    fn expected_region(board: &Board, states: &[RevealState], start: Pos) -> BTreeSet<Pos> {
        let mut region = BTreeSet::from([start]);
        loop {
            let mut grew = false;
            let zeros: Vec<Pos> = region
                .iter()
                .copied()
                .filter(|&pos| board.cell(pos).adjacent == 0)
                .collect();
            for pos in zeros {
                for neighbor in board.neighbors(pos) {
                    if states[board.index(neighbor)] == RevealState::Hidden
                        && !board.cell(neighbor).mine
                    {
                        grew |= region.insert(neighbor);
                    }
                }
            }
            if !grew {
                return region;
            }
        }
    }

    #[test]
    fn numbered_cell_reveals_only_itself() {
        let board = board(3, 3, &[(0, 0), (2, 2)]);
        let mut states = hidden(&board);

        let reveal = reveal(&board, &mut states, Pos::new(1, 1));

        assert_eq!(reveal.newly_revealed, vec![Pos::new(1, 1)]);
        assert_eq!(reveal.outcome, Outcome::None);
    }

    #[test]
    fn zero_cell_cascades_to_its_border() {
        let board = board(3, 3, &[(0, 0), (2, 2)]);
        let mut states = hidden(&board);

        let reveal = reveal(&board, &mut states, Pos::new(0, 2));
        let revealed: BTreeSet<Pos> = reveal.newly_revealed.iter().copied().collect();

        assert_eq!(revealed, set(&[(0, 2), (0, 1), (1, 1), (1, 2)]));
        assert_eq!(reveal.newly_revealed[0], Pos::new(0, 2));
        assert_eq!(states[board.index(Pos::new(0, 0))], RevealState::Hidden);
        assert_eq!(states[board.index(Pos::new(2, 2))], RevealState::Hidden);
    }

    #[test]
    fn mine_hit_reveals_only_the_mine() {
        let board = board(2, 2, &[(0, 0)]);
        let mut states = hidden(&board);

        let reveal = reveal(&board, &mut states, Pos::new(0, 0));

        assert_eq!(reveal.outcome, Outcome::MineHit);
        assert_eq!(reveal.newly_revealed, vec![Pos::new(0, 0)]);
        assert_eq!(reveal.safe_count(), 0);
    }

    #[test]
    fn flagged_cells_block_the_cascade() {
        let board = board(1, 5, &[(0, 4)]);
        let mut states = hidden(&board);
        states[board.index(Pos::new(0, 2))] = RevealState::Flagged;

        let reveal = reveal(&board, &mut states, Pos::new(0, 0));

        assert_eq!(reveal.newly_revealed, vec![Pos::new(0, 0), Pos::new(0, 1)]);
        assert_eq!(states[board.index(Pos::new(0, 2))], RevealState::Flagged);
        assert_eq!(states[board.index(Pos::new(0, 3))], RevealState::Hidden);
    }

    #[test]
    fn non_hidden_targets_are_no_ops() {
        let board = board(2, 2, &[(0, 0)]);
        let mut states = hidden(&board);
        states[board.index(Pos::new(1, 1))] = RevealState::Flagged;
        states[board.index(Pos::new(0, 1))] = RevealState::Revealed;

        assert!(reveal(&board, &mut states, Pos::new(1, 1)).newly_revealed.is_empty());
        assert!(reveal(&board, &mut states, Pos::new(0, 1)).newly_revealed.is_empty());
    }

    #[test]
    fn cascade_matches_closure_on_random_boards() {
        let config = BoardConfig::new(16, 30, 60).unwrap();

        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let board = generate(config, None, &mut rng).unwrap();
            let Some(start) = board.positions().find(|&pos| {
                let cell = board.cell(pos);
                !cell.mine && cell.adjacent == 0
            }) else {
                continue;
            };

            let mut states = hidden(&board);
            let expected = expected_region(&board, &states, start);
            let reveal = reveal(&board, &mut states, start);
            let revealed: BTreeSet<Pos> = reveal.newly_revealed.iter().copied().collect();

            assert_eq!(revealed, expected);
            assert_eq!(revealed.len(), reveal.newly_revealed.len());
            assert!(revealed.iter().all(|&pos| !board.cell(pos).mine));
        }
    }
}
