// Per-tick direction choice
//
// Two mutually exclusive modes:
// - Cycle following walks the Hamiltonian cycle and only leaves it for a
//   shortcut that cannot overtake the food or fall behind the tail.
// - Graph search eats only when a simulated meal still leaves a route to the
//   tail, otherwise it stalls along the longest path to its own tail.

use log::debug;

use crate::config::PolicyConfig;
use crate::cycle::CycleBuilder;
use crate::error::EngineError;
use crate::grid::Grid;
use crate::pathfinder::PathFinder;
use crate::snake::Snake;
use crate::types::{Coord, Direction, PolicyMode};

/// Distance walked forward along a cycle of `size` cells from `from` to `to`
fn cycle_distance(from: usize, to: usize, size: usize) -> usize {
    (to + size - from) % size
}

pub struct DecisionPolicy {
    mode: PolicyMode,
    finder: PathFinder,
    config: PolicyConfig,
}

impl DecisionPolicy {
    /// Creates a policy in graph-search mode
    pub fn new(config: PolicyConfig, finder: PathFinder) -> Self {
        DecisionPolicy {
            mode: PolicyMode::GraphSearch,
            finder,
            config,
        }
    }

    pub fn mode(&self) -> PolicyMode {
        self.mode
    }

    pub fn finder(&self) -> &PathFinder {
        &self.finder
    }

    pub fn finder_mut(&mut self) -> &mut PathFinder {
        &mut self.finder
    }

    /// Builds the Hamiltonian cycle and switches to cycle following
    ///
    /// On error the mode is left unchanged.
    pub fn enable_cycle_following(&mut self, grid: &mut Grid, snake: &Snake) -> Result<(), EngineError> {
        CycleBuilder::build(grid, snake, &mut self.finder)?;
        self.mode = PolicyMode::CycleFollowing;
        Ok(())
    }

    /// Chooses the next direction for `snake`
    ///
    /// Returns `None` when the snake is dead, there is no food to chase, or
    /// (cycle mode only) the head carries no cycle index.
    pub fn decide(&mut self, grid: &mut Grid, snake: &Snake) -> Option<Direction> {
        if snake.is_dead() {
            return None;
        }
        let food = grid.food()?;

        match self.mode {
            PolicyMode::CycleFollowing => self.follow_cycle(grid, snake, food),
            PolicyMode::GraphSearch => Some(self.graph_search(grid, snake, food)),
        }
    }

    fn follow_cycle(&mut self, grid: &mut Grid, snake: &Snake, food: Coord) -> Option<Direction> {
        let size = grid.interior_size();
        let head = snake.head();

        let shortcut_limit =
            size * self.config.shortcut_length_numerator / self.config.shortcut_length_denominator.max(1);
        if snake.len() < shortcut_limit {
            if let Some(dir) = self.cycle_shortcut(grid, snake, food, size) {
                debug!("cycle shortcut {} from {:?}", dir.as_str(), head);
                return Some(dir);
            }
        }

        let successor = grid.cycle_successor(&head)?;
        head.direction_to(&successor)
    }

    /// First step of the shortest path to food, if taking it keeps the body
    /// in cycle order
    ///
    /// Positions are measured as forward cycle distance from the tail. The
    /// step must land strictly ahead of the head and no further than the
    /// food. Relative positions live in `[0, size)`, so none can equal `size`.
    fn cycle_shortcut(&mut self, grid: &mut Grid, snake: &Snake, food: Coord, size: usize) -> Option<Direction> {
        let head = snake.head();
        let path = self.finder.shortest_path(grid, head, food, snake.direction());
        let &first = path.first()?;

        let tail_index = grid.cycle_index(&snake.tail())?;
        let head_rel = cycle_distance(tail_index, grid.cycle_index(&head)?, size);
        let next_rel = cycle_distance(tail_index, grid.cycle_index(&first.apply(&head))?, size);
        let food_rel = cycle_distance(tail_index, grid.cycle_index(&food)?, size);

        (next_rel > head_rel && next_rel <= food_rel).then_some(first)
    }

    fn graph_search(&mut self, grid: &mut Grid, snake: &Snake, food: Coord) -> Direction {
        let head = snake.head();

        // what-if: eat on a private copy and check the tail is still reachable
        let mut sim_grid = grid.clone();
        let mut sim_snake = snake.clone();
        let to_food = self
            .finder
            .shortest_path(&mut sim_grid, head, food, snake.direction());
        if let Some(&first) = to_food.first() {
            sim_snake.follow(&mut sim_grid, &to_food);
            if sim_grid.is_all_body() {
                debug!("path to food fills the grid, taking it");
                return first;
            }
            let to_tail = self.finder.longest_path(
                &mut sim_grid,
                sim_snake.head(),
                sim_snake.tail(),
                sim_snake.direction(),
            );
            if to_tail.len() > 1 {
                debug!("food at {:?} is safe to eat", food);
                return first;
            }
        }

        let to_tail = self
            .finder
            .longest_path(grid, head, snake.tail(), snake.direction());
        if to_tail.len() > 1 {
            debug!("stalling along {}-step path to tail", to_tail.len());
            return to_tail[0];
        }

        self.wander(grid, snake, food)
    }

    /// Free neighbor farthest from the food, or the configured fallback
    fn wander(&self, grid: &Grid, snake: &Snake, food: Coord) -> Direction {
        let head = snake.head();
        let mut best = self.config.fallback_direction;
        let mut max_dist = 0;
        for dir in Direction::all() {
            let adj = dir.apply(&head);
            if grid.is_enterable(&adj) {
                let dist = adj.manhattan_distance(&food);
                if dist >= max_dist {
                    max_dist = dist;
                    best = dir;
                }
            }
        }
        debug!("wandering {}", best.as_str());
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_distance_wraps() {
        assert_eq!(cycle_distance(3, 5, 16), 2);
        assert_eq!(cycle_distance(5, 3, 16), 14);
        assert_eq!(cycle_distance(7, 7, 16), 0);
        assert_eq!(cycle_distance(15, 0, 16), 1);
    }
}
