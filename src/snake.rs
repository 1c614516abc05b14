// The agent: an ordered body on the grid, head first
//
// The snake keeps the grid's Head/Body/Tail markings in sync with its body
// on every move, so a cloned (grid, snake) pair can be advanced freely
// without touching the live pair.

use std::collections::VecDeque;

use crate::error::EngineError;
use crate::grid::{CellKind, Grid};
use crate::types::{Coord, Direction};

/// Result of applying one move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// Landed on food; the tail stayed put
    Ate,
    Died,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Coord>,
    direction: Option<Direction>,
    dead: bool,
}

impl Snake {
    /// Places a snake on the grid and paints its cells
    ///
    /// # Arguments
    /// * `grid` - Grid to paint; every body cell must currently be enterable
    /// * `body` - Positions listed head first
    /// * `direction` - Current heading, if any
    pub fn from_body(
        grid: &mut Grid,
        body: &[Coord],
        direction: Option<Direction>,
    ) -> Result<Self, EngineError> {
        if body.is_empty() {
            return Err(EngineError::InvalidBody("body is empty".to_string()));
        }

        for (i, pos) in body.iter().enumerate() {
            if !grid.is_interior(pos) || !grid.is_enterable(pos) {
                return Err(EngineError::InvalidBody(format!(
                    "{:?} is not a free interior cell",
                    pos
                )));
            }
            if body[..i].contains(pos) {
                return Err(EngineError::InvalidBody(format!("{:?} appears twice", pos)));
            }
            if i > 0 && !body[i - 1].is_adjacent(pos) {
                return Err(EngineError::InvalidBody(format!(
                    "{:?} and {:?} are not adjacent",
                    body[i - 1],
                    pos
                )));
            }
        }

        let snake = Snake {
            body: body.iter().copied().collect(),
            direction,
            dead: false,
        };
        snake.paint(grid);
        Ok(snake)
    }

    fn paint(&self, grid: &mut Grid) {
        let last = self.body.len() - 1;
        for (i, pos) in self.body.iter().enumerate() {
            let kind = match i {
                0 => CellKind::Head,
                i if i == last => CellKind::Tail,
                _ => CellKind::Body,
            };
            grid.set_kind(pos, kind);
        }
    }

    pub fn head(&self) -> Coord {
        self.body[0]
    }

    pub fn tail(&self) -> Coord {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Body positions from head to tail
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Coord> + '_ {
        self.body.iter()
    }

    pub fn segment(&self, i: usize) -> Option<Coord> {
        self.body.get(i).copied()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Moves the head one step and updates the grid
    ///
    /// The tail is kept when the new head lands on food. Stepping onto the
    /// current tail is allowed when not eating because the tail leaves on
    /// the same tick.
    pub fn advance(&mut self, grid: &mut Grid, dir: Direction) -> MoveOutcome {
        if self.dead {
            return MoveOutcome::Died;
        }

        self.direction = Some(dir);
        let head = self.head();
        let tail = self.tail();
        let new_head = dir.apply(&head);
        let eats = grid.kind(&new_head) == CellKind::Food;
        let chases_tail = new_head == tail && self.body.len() > 2;

        if !grid.is_enterable(&new_head) && !chases_tail {
            self.dead = true;
            return MoveOutcome::Died;
        }

        if !eats {
            grid.set_kind(&tail, CellKind::Empty);
            self.body.pop_back();
            if let Some(&new_tail) = self.body.back() {
                if self.body.len() > 1 {
                    grid.set_kind(&new_tail, CellKind::Tail);
                }
            }
        } else {
            grid.consume_food();
        }

        if self.body.len() > 1 {
            grid.set_kind(&head, CellKind::Body);
        } else if !self.body.is_empty() {
            grid.set_kind(&head, CellKind::Tail);
        }
        self.body.push_front(new_head);
        grid.set_kind(&new_head, CellKind::Head);

        if eats {
            MoveOutcome::Ate
        } else {
            MoveOutcome::Moved
        }
    }

    /// Applies a sequence of moves, stopping early on death
    pub fn follow(&mut self, grid: &mut Grid, path: &[Direction]) -> MoveOutcome {
        let mut outcome = MoveOutcome::Moved;
        for &dir in path {
            outcome = self.advance(grid, dir);
            if outcome == MoveOutcome::Died {
                break;
            }
        }
        outcome
    }
}
