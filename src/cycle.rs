// Hamiltonian cycle construction
//
// The cycle is threaded through the snake's starting body: index 0 sits on
// the tail, indices grow along the body to the head, and the rest of the
// cycle is the longest path found from the head back around to the tail.
// Walling off the segment behind the head forces that path to leave the
// head away from the body.

use log::{debug, info};

use crate::error::EngineError;
use crate::grid::{CellKind, Grid};
use crate::pathfinder::PathFinder;
use crate::snake::Snake;
use crate::types::Coord;

pub struct CycleBuilder;

impl CycleBuilder {
    /// Writes a cycle index into every interior cell
    ///
    /// Fails without touching the grid when both dimensions are odd (no
    /// Hamiltonian cycle exists on the interior) or the body is shorter than
    /// three cells. If the longest-path heuristic does not cover the whole
    /// interior, no index is written and `IncompleteCycle` is returned.
    pub fn build(grid: &mut Grid, snake: &Snake, finder: &mut PathFinder) -> Result<(), EngineError> {
        let (rows, cols) = (grid.rows(), grid.cols());
        if rows % 2 == 1 && cols % 2 == 1 {
            return Err(EngineError::OddDimensions { rows, cols });
        }
        let Some(segment) = snake.segment(1).filter(|_| snake.len() >= 3) else {
            return Err(EngineError::BodyTooShort(snake.len()));
        };

        let segment_kind = grid.kind(&segment);
        let food = grid.food();
        grid.set_kind(&segment, CellKind::Wall);
        // food is transient and must not block the detours
        if let Some(food) = food {
            grid.set_kind(&food, CellKind::Empty);
        }

        let path = finder.longest_path(grid, snake.head(), snake.tail(), snake.direction());

        grid.set_kind(&segment, segment_kind);
        if let Some(food) = food {
            grid.set_kind(&food, CellKind::Food);
        }

        let size = grid.interior_size();
        // the path ends back on the tail, which already holds index 0
        let covered = snake.len() + path.len().saturating_sub(1);
        if path.is_empty() || covered != size {
            debug!("cycle heuristic covered {} of {} cells", covered, size);
            return Err(EngineError::IncompleteCycle { covered, size });
        }

        let mut indexed: Vec<(Coord, usize)> = snake
            .iter()
            .rev()
            .enumerate()
            .map(|(index, pos)| (*pos, index))
            .collect();
        let mut cur = snake.head();
        let mut index = snake.len() - 1;
        for dir in &path[..path.len() - 1] {
            cur = dir.apply(&cur);
            index += 1;
            indexed.push((cur, index));
        }

        grid.clear_cycle_indices();
        for (pos, index) in indexed {
            grid.set_cycle_index(&pos, index);
        }

        info!("Built hamiltonian cycle over {}x{} grid ({} cells)", rows, cols, size);
        Ok(())
    }
}
