use mine_web_common::models::Pos;
use rand::{Rng, seq::index};
use tracing::{debug, warn};

use crate::{
    data::{Board, BoardConfig, neighbors},
    error::{EngineError, Result},
};

/// Places `config.mines()` mines uniformly at random.
///
/// With a `safe_cell`, that cell and its neighbors are kept free of mines.
/// When the remaining cells cannot hold every mine, only the safe cell
/// itself is kept free.
pub fn generate<R: Rng + ?Sized>(
    config: BoardConfig,
    safe_cell: Option<Pos>,
    rng: &mut R,
) -> Result<Board> {
    let (rows, cols) = (config.rows(), config.cols());
    let total = config.total_cells();
    let index_of = |pos: Pos| pos.x * cols + pos.y;

    let mut excluded = vec![false; total];
    if let Some(safe) = safe_cell {
        if safe.x >= rows || safe.y >= cols {
            return Err(EngineError::out_of_bounds(safe));
        }

        let zone: Vec<usize> = std::iter::once(safe)
            .chain(neighbors(safe, rows, cols))
            .map(index_of)
            .collect();

        if total - zone.len() >= config.mines() {
            for i in zone {
                excluded[i] = true;
            }
        } else {
            warn!(
                "Cannot keep neighborhood of ({}, {}) clear of {} mines, keeping only the cell itself",
                safe.x,
                safe.y,
                config.mines()
            );
            excluded[index_of(safe)] = true;
        }
    }

    let eligible: Vec<usize> = (0..total).filter(|&i| !excluded[i]).collect();
    let mut mask = vec![false; total];
    for chosen in index::sample(rng, eligible.len(), config.mines()) {
        mask[eligible[chosen]] = true;
    }

    debug!(
        "Generated {}x{} board with {} mines from {} eligible cells",
        rows,
        cols,
        config.mines(),
        eligible.len()
    );

    Board::from_mask(config, &mask)
}
