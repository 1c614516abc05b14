// Grid coordinates, movement directions and the HTTP wire format
//
// Coordinates are (row, col) with row 0 at the top of the grid, so `Up`
// decreases the row and `Right` increases the column.

use serde::{Deserialize, Serialize};

/// 2D position on the grid
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub const fn new(row: i32, col: i32) -> Self {
        Coord { row, col }
    }

    /// The four orthogonal neighbors, in `Direction::all()` order
    pub fn neighbors(&self) -> [Coord; 4] {
        Direction::all().map(|dir| dir.apply(self))
    }

    /// Direction of a single orthogonal step from `self` to `other`
    /// Returns `None` when the two positions are not adjacent
    pub fn direction_to(&self, other: &Coord) -> Option<Direction> {
        Direction::all()
            .into_iter()
            .find(|dir| dir.apply(self) == *other)
    }

    pub fn is_adjacent(&self, other: &Coord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Calculates Manhattan distance between two coordinates
    pub fn manhattan_distance(&self, other: &Coord) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Represents the four possible movement directions
/// The absence of a heading is modelled as `Option<Direction>::None`
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all possible directions
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Converts direction to string representation for API response
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Calculates the next coordinate when moving in this direction
    pub fn apply(&self, coord: &Coord) -> Coord {
        match self {
            Direction::Up => Coord { row: coord.row - 1, col: coord.col },
            Direction::Down => Coord { row: coord.row + 1, col: coord.col },
            Direction::Left => Coord { row: coord.row, col: coord.col - 1 },
            Direction::Right => Coord { row: coord.row, col: coord.col + 1 },
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Decision policy, chosen once when a game starts
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// Simulate eating on a cloned board, otherwise chase the tail
    #[default]
    GraphSearch,
    /// Walk the precomputed Hamiltonian cycle, taking safe shortcuts to food
    CycleFollowing,
}

/// How breadth-first searches are executed
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    #[default]
    Sequential,
    /// Level-synchronous expansion on the rayon pool
    Parallel,
}

/// Game metadata sent with every request
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Game {
    pub id: String,
    /// Overrides the configured policy for this game
    #[serde(default)]
    pub mode: Option<PolicyMode>,
}

/// Board description including dimensions, walls, food and the snake
///
/// `rows` and `cols` include the wall border. `snake` is listed head first.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Board {
    pub rows: i32,
    pub cols: i32,
    #[serde(default)]
    pub walls: Vec<Coord>,
    #[serde(default)]
    pub food: Option<Coord>,
    pub snake: Vec<Coord>,
    #[serde(default)]
    pub direction: Option<Direction>,
}

/// Complete game state received from the API
#[derive(Deserialize, Serialize, Debug)]
pub struct GameState {
    pub game: Game,
    pub turn: i32,
    pub board: Board,
}
