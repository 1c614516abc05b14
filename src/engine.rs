// Caller-facing movement engine
//
// Bundles the grid, the snake and the decision policy. Everything the HTTP
// service and the simulator need goes through here.

use log::{debug, info};
use std::sync::Arc;

use crate::config::Config;
use crate::error::EngineError;
use crate::grid::{CellKind, Grid};
use crate::pathfinder::PathFinder;
use crate::policy::DecisionPolicy;
use crate::profiler::{SearchProfiler, SearchStats};
use crate::snake::{MoveOutcome, Snake};
use crate::types::{Board, Coord, Direction, PolicyMode};

pub struct Engine {
    grid: Grid,
    snake: Snake,
    policy: DecisionPolicy,
    profiler: Arc<SearchProfiler>,
}

impl Engine {
    /// Creates an engine around an already populated grid and snake
    ///
    /// When the configured mode is cycle following the Hamiltonian cycle is
    /// built here, so construction fails for grids that cannot carry one.
    pub fn new(grid: Grid, snake: Snake, config: &Config) -> Result<Self, EngineError> {
        let profiler = Arc::new(SearchProfiler::new());
        let finder = PathFinder::new(config.engine.seed, config.engine.strategy, Arc::clone(&profiler));
        let mut engine = Engine {
            grid,
            snake,
            policy: DecisionPolicy::new(config.policy.clone(), finder),
            profiler,
        };
        if config.engine.mode == PolicyMode::CycleFollowing {
            engine.enable_cycle_following_mode()?;
        }
        Ok(engine)
    }

    /// Builds grid and snake from a board description
    pub fn from_board(board: &Board, config: &Config) -> Result<Self, EngineError> {
        let (grid, snake) = Self::layout(board)?;
        Self::new(grid, snake, config)
    }

    fn layout(board: &Board) -> Result<(Grid, Snake), EngineError> {
        let mut grid = Grid::new(board.rows, board.cols)?;
        for wall in &board.walls {
            grid.set_kind(wall, CellKind::Wall);
        }

        // without an explicit heading, the head points away from the neck
        let direction = board.direction.or_else(|| match board.snake.as_slice() {
            [head, neck, ..] => neck.direction_to(head),
            _ => None,
        });
        let snake = Snake::from_body(&mut grid, &board.snake, direction)?;
        if let Some(food) = board.food {
            grid.place_food(food)?;
        }
        Ok((grid, snake))
    }

    /// Builds the cycle and switches the policy to cycle following
    pub fn enable_cycle_following_mode(&mut self) -> Result<(), EngineError> {
        self.policy.enable_cycle_following(&mut self.grid, &self.snake)?;
        info!(
            "Cycle following enabled on {}x{} grid",
            self.grid.rows(),
            self.grid.cols()
        );
        Ok(())
    }

    /// Next direction for the snake, or `None` if it is dead or there is no food
    pub fn compute_next_direction(&mut self) -> Option<Direction> {
        self.policy.decide(&mut self.grid, &self.snake)
    }

    pub fn step(&mut self, dir: Direction) -> MoveOutcome {
        self.snake.advance(&mut self.grid, dir)
    }

    /// Decides and applies one move; `None` when there was nothing to decide
    pub fn tick(&mut self) -> Option<(Direction, MoveOutcome)> {
        let dir = self.compute_next_direction()?;
        let outcome = self.step(dir);
        debug!("tick {} -> {:?}", dir.as_str(), outcome);
        Some((dir, outcome))
    }

    /// Shortest path on the live grid, with no preferred heading
    pub fn shortest_path(&mut self, from: Coord, to: Coord) -> Vec<Direction> {
        self.policy
            .finder_mut()
            .shortest_path(&mut self.grid, from, to, None)
    }

    /// Longest path on the live grid, with no preferred heading
    pub fn longest_path(&mut self, from: Coord, to: Coord) -> Vec<Direction> {
        self.policy
            .finder_mut()
            .longest_path(&mut self.grid, from, to, None)
    }

    pub fn stats(&self) -> SearchStats {
        self.profiler.snapshot()
    }

    pub fn reset_stats(&self) {
        self.profiler.reset();
    }

    pub fn profiler(&self) -> &Arc<SearchProfiler> {
        &self.profiler
    }

    /// Replaces occupancy with a freshly posted board
    ///
    /// Cycle indices survive when the dimensions are unchanged. A board of a
    /// different size drops them, and in cycle mode the cycle is rebuilt.
    pub fn sync_board(&mut self, board: &Board) -> Result<(), EngineError> {
        let (mut grid, snake) = Self::layout(board)?;
        let kept = grid.adopt_cycle(&self.grid);
        self.grid = grid;
        self.snake = snake;

        if !kept && self.policy.mode() == PolicyMode::CycleFollowing {
            info!("Board size changed, rebuilding cycle");
            self.enable_cycle_following_mode()?;
        }
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn mode(&self) -> PolicyMode {
        self.policy.mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: i32, cols: i32) -> Board {
        Board {
            rows,
            cols,
            walls: Vec::new(),
            food: Some(Coord::new(rows - 2, cols - 2)),
            snake: vec![Coord::new(1, 3), Coord::new(1, 2), Coord::new(1, 1)],
            direction: None,
        }
    }

    #[test]
    fn test_from_board_infers_heading() {
        let engine = Engine::from_board(&board(10, 10), &Config::seeded(1)).unwrap();
        assert_eq!(engine.snake().direction(), Some(Direction::Right));
        assert_eq!(engine.grid().food(), Some(Coord::new(8, 8)));
        assert_eq!(engine.mode(), PolicyMode::GraphSearch);
    }

    #[test]
    fn test_cycle_mode_from_config() {
        let mut config = Config::seeded(1);
        config.engine.mode = PolicyMode::CycleFollowing;
        let engine = Engine::from_board(&board(6, 6), &config).unwrap();
        assert_eq!(engine.mode(), PolicyMode::CycleFollowing);
        assert!(engine.grid().has_cycle());

        let err = Engine::from_board(&board(7, 7), &config).err();
        assert_eq!(err, Some(EngineError::OddDimensions { rows: 7, cols: 7 }));
    }

    #[test]
    fn test_sync_board_keeps_cycle() {
        let mut config = Config::seeded(3);
        config.engine.mode = PolicyMode::CycleFollowing;
        let mut engine = Engine::from_board(&board(6, 6), &config).unwrap();
        let before: Vec<_> = engine
            .grid()
            .interior()
            .map(|pos| engine.grid().cycle_index(&pos))
            .collect();

        let mut moved = board(6, 6);
        moved.snake = vec![Coord::new(2, 3), Coord::new(1, 3), Coord::new(1, 2)];
        engine.sync_board(&moved).unwrap();

        let after: Vec<_> = engine
            .grid()
            .interior()
            .map(|pos| engine.grid().cycle_index(&pos))
            .collect();
        assert_eq!(before, after);
        assert_eq!(engine.snake().head(), Coord::new(2, 3));
        assert_eq!(engine.snake().direction(), Some(Direction::Down));
        assert_eq!(engine.grid().kind(&Coord::new(1, 1)), CellKind::Empty);
    }

    #[test]
    fn test_no_food_means_no_decision() {
        let mut b = board(10, 10);
        b.food = None;
        let mut engine = Engine::from_board(&b, &Config::seeded(1)).unwrap();
        assert_eq!(engine.compute_next_direction(), None);
        assert_eq!(engine.tick(), None);
    }

    #[test]
    fn test_stats_count_public_queries() {
        let mut engine = Engine::from_board(&board(10, 10), &Config::seeded(1)).unwrap();
        engine.shortest_path(Coord::new(1, 3), Coord::new(8, 8));
        engine.longest_path(Coord::new(1, 3), Coord::new(8, 8));
        let stats = engine.stats();
        assert_eq!(stats.shortest.calls, 1);
        assert_eq!(stats.longest.calls, 1);

        engine.reset_stats();
        assert_eq!(engine.stats().shortest.calls, 0);
    }
}
