use serde::{Deserialize, Serialize};

/// Grid value sent for a cell that holds a mine.
pub const MINE: i8 = -1;

/// Reveal markers used in [`Snapshot::revealed`].
pub const HIDDEN: u8 = 0;
pub const REVEALED: u8 = 1;
pub const FLAGGED: u8 = 2;

/// Board coordinate. `x` is the row, `y` the column, so `grid[x][y]`
/// addresses the cell.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// `(rows, cols, mines)` of the preset.
    pub const fn dimensions(self) -> (usize, usize, usize) {
        match self {
            Self::Easy => (9, 9, 10),
            Self::Medium => (16, 16, 40),
            Self::Hard => (16, 30, 99),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preset {
    pub name: Difficulty,
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
}

impl From<Difficulty> for Preset {
    fn from(name: Difficulty) -> Self {
        let (rows, cols, mines) = name.dimensions();
        Self {
            name,
            rows,
            cols,
            mines,
        }
    }
}

/// Body of a start request. A `difficulty` takes precedence over the
/// explicit dimensions.
///
/// Fields are signed; negative values are rejected by the engine as an
/// invalid configuration.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct StartParams {
    pub rows: i64,
    pub cols: i64,
    pub mines: i64,
    pub difficulty: Option<Difficulty>,
}

impl Default for StartParams {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            mines: 10,
            difficulty: None,
        }
    }
}

impl StartParams {
    pub fn resolve(&self) -> (i64, i64, i64) {
        match self.difficulty {
            Some(difficulty) => {
                let (rows, cols, mines) = difficulty.dimensions();
                (rows as i64, cols as i64, mines as i64)
            }
            None => (self.rows, self.cols, self.mines),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

/// Client-visible projection of a game.
///
/// `grid[x][y]` is `None` while the cell content is withheld, [`MINE`] for a
/// mine, and the adjacency count otherwise. `revealed[x][y]` is one of
/// [`HIDDEN`], [`REVEALED`] or [`FLAGGED`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
    pub flags: usize,
    pub grid: Vec<Vec<Option<i8>>>,
    pub revealed: Vec<Vec<u8>>,
    pub status: GameStatus,
    pub game_over: bool,
    pub win: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_params_fill_missing_fields() {
        let params: StartParams = serde_json::from_str(r#"{"rows": 5}"#).unwrap();

        assert_eq!(params.resolve(), (5, 10, 10));
    }

    #[test]
    fn difficulty_overrides_dimensions() {
        let params: StartParams =
            serde_json::from_str(r#"{"rows": 3, "difficulty": "hard"}"#).unwrap();

        assert_eq!(params.resolve(), (16, 30, 99));
    }

    #[test]
    fn negative_dimensions_deserialize() {
        let params: StartParams =
            serde_json::from_str(r#"{"rows": -3, "cols": 4, "mines": 2}"#).unwrap();

        assert_eq!(params.resolve(), (-3, 4, 2));
    }

    #[test]
    fn status_uses_snake_case() {
        let json = serde_json::to_string(&GameStatus::InProgress).unwrap();

        assert_eq!(json, r#""in_progress""#);
    }

    #[test]
    fn withheld_cells_serialize_as_null() {
        let snapshot = Snapshot {
            rows: 1,
            cols: 2,
            mines: 1,
            flags: 0,
            grid: vec![vec![None, Some(1)]],
            revealed: vec![vec![HIDDEN, REVEALED]],
            status: GameStatus::InProgress,
            game_over: false,
            win: false,
        };

        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["grid"], serde_json::json!([[null, 1]]));
        assert_eq!(value["revealed"], serde_json::json!([[0, 1]]));
    }
}
