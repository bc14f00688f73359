use crate::{GameError, Position};
use ndarray::Array2;
use rand::Rng;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Marker used for mines in the board file format.
pub const MINE_TOKEN: &str = "*";

/// Ground-truth content of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellValue {
    Mine,
    Clue(u8),
}

impl CellValue {
    pub fn is_mine(self) -> bool {
        matches!(self, CellValue::Mine)
    }
}

/// The immutable mine layout and clue grid of one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Array2<CellValue>,
    mines_count: usize,
}

impl Board {
    /// Builds a board from explicit mine positions, computing every clue.
    pub fn from_mines(rows: usize, cols: usize, mines: &[Position]) -> Result<Self, GameError> {
        let mut cells = Array2::from_elem((rows, cols), CellValue::Clue(0));
        for &pos in mines {
            if !in_bounds(rows, cols, pos) {
                return Err(GameError::OutOfBounds(pos));
            }
            cells[pos.to_index()] = CellValue::Mine;
        }

        let mines_count = cells.iter().filter(|cell| cell.is_mine()).count();
        let mut board = Board { cells, mines_count };
        board.compute_clues();
        Ok(board)
    }

    /// Places `mines` mines uniformly at random. At least one cell is always
    /// left free, so the mine count is clamped to `rows * cols - 1`.
    pub fn random<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        mines: usize,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let total = rows
            .checked_mul(cols)
            .filter(|&total| total > 0)
            .ok_or_else(|| GameError::MalformedHeader(format!("{rows} {cols} {mines}")))?;
        let mines = mines.min(total - 1);

        let positions: Vec<Position> = rand::seq::index::sample(rng, total, mines)
            .into_iter()
            .map(|idx| Position::new((idx / cols) as i32, (idx % cols) as i32))
            .collect();

        Self::from_mines(rows, cols, &positions)
    }

    /// Reads a board file (`rows cols mines` header followed by `rows` lines
    /// of `cols` tokens).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        std::fs::read_to_string(path)?.parse()
    }

    fn compute_clues(&mut self) {
        let (rows, cols) = self.cells.dim();
        for r in 0..rows {
            for c in 0..cols {
                let pos = Position::new(r as i32, c as i32);
                if self.cells[pos.to_index()].is_mine() {
                    continue;
                }
                let count = self.neighbors(pos).filter(|&p| self.is_mine(p)).count();
                self.cells[pos.to_index()] = CellValue::Clue(count as u8);
            }
        }
    }

    pub fn is_within_bounds(&self, pos: Position) -> bool {
        let (rows, cols) = self.cells.dim();
        in_bounds(rows, cols, pos)
    }

    pub fn get_cell(&self, pos: Position) -> Result<CellValue, GameError> {
        if !self.is_within_bounds(pos) {
            return Err(GameError::OutOfBounds(pos));
        }
        Ok(self.cells[pos.to_index()])
    }

    pub fn is_mine(&self, pos: Position) -> bool {
        self.is_within_bounds(pos) && self.cells[pos.to_index()].is_mine()
    }

    /// Moore neighborhood of `pos`, clipped to the grid.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.neighbors()
            .collect::<Vec<_>>()
            .into_iter()
            .filter(move |p| self.is_within_bounds(*p))
    }

    /// Row-major iteration over every coordinate.
    pub fn iter_positions(&self) -> impl Iterator<Item = Position> {
        let (rows, cols) = self.dimensions();
        (0..rows).flat_map(move |r| (0..cols).map(move |c| Position::new(r as i32, c as i32)))
    }

    /// `(rows, cols)`
    pub fn dimensions(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn mines_count(&self) -> usize {
        self.mines_count
    }

    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }
}

fn in_bounds(rows: usize, cols: usize, pos: Position) -> bool {
    pos.row >= 0 && pos.col >= 0 && (pos.row as usize) < rows && (pos.col as usize) < cols
}

impl FromStr for Board {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines();
        let header = lines.next().unwrap_or_default();
        let dims: Vec<usize> = header
            .split_whitespace()
            .map(str::parse::<usize>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| GameError::MalformedHeader(header.to_string()))?;
        let [rows, cols, mines] = dims[..] else {
            return Err(GameError::MalformedHeader(header.to_string()));
        };
        let total = rows
            .checked_mul(cols)
            .filter(|&total| total > 0)
            .ok_or_else(|| GameError::MalformedHeader(header.to_string()))?;
        if mines > total {
            return Err(GameError::TooManyMines { rows, cols, mines });
        }

        let mut data: Vec<&str> = lines.collect();
        while data.last().is_some_and(|line| line.trim().is_empty()) {
            data.pop();
        }
        if data.len() != rows {
            return Err(GameError::WrongRowCount {
                expected: rows,
                found: data.len(),
            });
        }

        let mut cells = Vec::with_capacity(total);
        for (row, line) in data.iter().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != cols {
                return Err(GameError::WrongTokenCount {
                    row,
                    expected: cols,
                    found: tokens.len(),
                });
            }
            for token in tokens {
                let cell = match token {
                    MINE_TOKEN => CellValue::Mine,
                    _ => match token.parse::<u8>() {
                        Ok(n) if n <= 8 => CellValue::Clue(n),
                        _ => {
                            return Err(GameError::InvalidToken {
                                row,
                                token: token.to_string(),
                            })
                        }
                    },
                };
                cells.push(cell);
            }
        }

        let found = cells.iter().filter(|cell| cell.is_mine()).count();
        if found != mines {
            return Err(GameError::MineCountMismatch {
                declared: mines,
                found,
            });
        }

        let cells = Array2::from_shape_vec((rows, cols), cells)
            .map_err(|_| GameError::MalformedHeader(header.to_string()))?;
        Ok(Board {
            cells,
            mines_count: mines,
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.dimensions();
        writeln!(f, "{rows} {cols} {}", self.mines_count)?;
        for row in self.cells.rows() {
            let tokens: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    CellValue::Mine => MINE_TOKEN.to_string(),
                    CellValue::Clue(n) => n.to_string(),
                })
                .collect();
            writeln!(f, "{}", tokens.join(" "))?;
        }
        Ok(())
    }
}
