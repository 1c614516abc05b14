// Breadth-first shortest paths and detour-extended longest paths
//
// Both searches run on a caller-supplied grid and use its per-cell metadata
// as scratch space. Neighbor order is shuffled by the finder's own seedable
// RNG, then the straight-ahead neighbor is moved to the front so that among
// equally short paths the straightest one tends to win.

use log::trace;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::grid::{CellKind, Grid};
use crate::profiler::{SearchKind, SearchProfiler, SearchStats};
use crate::types::{Coord, Direction, SearchStrategy};

/// Positions visited by `path` starting at `from`, both endpoints included
pub fn path_cells(from: Coord, path: &[Direction]) -> Vec<Coord> {
    let mut cells = Vec::with_capacity(path.len() + 1);
    let mut cur = from;
    cells.push(cur);
    for dir in path {
        cur = dir.apply(&cur);
        cells.push(cur);
    }
    cells
}

pub struct PathFinder {
    rng: StdRng,
    strategy: SearchStrategy,
    profiler: Arc<SearchProfiler>,
}

impl PathFinder {
    /// Creates a finder
    ///
    /// # Arguments
    /// * `seed` - Fixes the neighbor shuffle; `None` seeds from the OS
    /// * `strategy` - Sequential or level-synchronous parallel BFS
    /// * `profiler` - Shared diagnostic counters
    pub fn new(seed: Option<u64>, strategy: SearchStrategy, profiler: Arc<SearchProfiler>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        PathFinder {
            rng,
            strategy,
            profiler,
        }
    }

    /// Sequential finder with a fixed seed and its own profiler
    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed), SearchStrategy::Sequential, Arc::new(SearchProfiler::new()))
    }

    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    pub fn profiler(&self) -> &Arc<SearchProfiler> {
        &self.profiler
    }

    pub fn stats(&self) -> SearchStats {
        self.profiler.snapshot()
    }

    /// Finds a shortest path from `from` to `to` through enterable cells
    ///
    /// The goal is treated as Empty for the duration of the search, so it may
    /// be a snake cell. `heading` is the direction considered "straight" at
    /// `from`. Returns an empty path when the goal is unreachable.
    pub fn shortest_path(
        &mut self,
        grid: &mut Grid,
        from: Coord,
        to: Coord,
        heading: Option<Direction>,
    ) -> Vec<Direction> {
        let profiler = Arc::clone(&self.profiler);
        let _guard = profiler.time(SearchKind::Shortest);

        let path = self.search_shortest(grid, from, to, heading);
        if path.is_empty() {
            grid.retain_search_metadata(&[]);
        } else {
            grid.retain_search_metadata(&path_cells(from, &path));
        }
        path
    }

    /// Finds a path at least as long as the shortest one by repeatedly
    /// splicing U-shaped detours into straight steps
    ///
    /// Not guaranteed to be maximal. The returned path never revisits a cell.
    pub fn longest_path(
        &mut self,
        grid: &mut Grid,
        from: Coord,
        to: Coord,
        heading: Option<Direction>,
    ) -> Vec<Direction> {
        let profiler = Arc::clone(&self.profiler);
        let _guard = profiler.time(SearchKind::Longest);

        let mut path = self.search_shortest(grid, from, to, heading);
        if path.is_empty() {
            grid.retain_search_metadata(&[]);
            return path;
        }

        grid.reset_visited();
        for pos in path_cells(from, &path) {
            grid.cell_mut(&pos).visited = true;
        }

        let mut i = 0;
        let mut cur = from;
        while i < path.len() {
            let dir = path[i];
            let next = dir.apply(&cur);
            match Self::detour_side(grid, cur, next, dir) {
                Some(side) => {
                    grid.cell_mut(&side.apply(&cur)).visited = true;
                    grid.cell_mut(&side.apply(&next)).visited = true;
                    path[i] = side;
                    path.insert(i + 1, dir);
                    path.insert(i + 2, side.opposite());
                    // indices after i have shifted, rescan from the start
                    i = 0;
                    cur = from;
                }
                None => {
                    i += 1;
                    cur = next;
                }
            }
        }

        trace!("longest path {:?} -> {:?}: {} steps", from, to, path.len());
        grid.retain_search_metadata(&path_cells(from, &path));
        path
    }

    /// Side on which both cells flanking the step `cur -> next` are free
    fn detour_side(grid: &Grid, cur: Coord, next: Coord, dir: Direction) -> Option<Direction> {
        let sides = if dir.is_horizontal() {
            [Direction::Up, Direction::Down]
        } else {
            [Direction::Left, Direction::Right]
        };
        sides.into_iter().find(|side| {
            grid.is_empty_unvisited(&side.apply(&cur)) && grid.is_empty_unvisited(&side.apply(&next))
        })
    }

    fn search_shortest(
        &mut self,
        grid: &mut Grid,
        from: Coord,
        to: Coord,
        heading: Option<Direction>,
    ) -> Vec<Direction> {
        if !grid.is_inside(&from) || !grid.is_inside(&to) {
            return Vec::new();
        }

        let goal_kind = grid.kind(&to);
        grid.set_kind(&to, CellKind::Empty);
        let reached = match self.strategy {
            SearchStrategy::Sequential => self.bfs(grid, from, to, heading),
            SearchStrategy::Parallel => self.level_sync_bfs(grid, from, to, heading),
        };
        grid.set_kind(&to, goal_kind);

        if reached {
            Self::build_path(grid, from, to)
        } else {
            Vec::new()
        }
    }

    /// Neighbors of `cur` in the order they should be expanded
    fn expansion_order(
        &mut self,
        grid: &Grid,
        cur: Coord,
        from: Coord,
        heading: Option<Direction>,
    ) -> [Coord; 4] {
        let mut adjacent = cur.neighbors();
        adjacent.shuffle(&mut self.rng);

        let inbound = if cur == from {
            heading
        } else {
            grid.cell(&cur).parent.and_then(|parent| parent.direction_to(&cur))
        };
        if let Some(dir) = inbound {
            let ahead = dir.apply(&cur);
            if let Some(i) = adjacent.iter().position(|pos| *pos == ahead) {
                adjacent.swap(0, i);
            }
        }
        adjacent
    }

    /// FIFO breadth-first search; stops when the goal is dequeued
    fn bfs(&mut self, grid: &mut Grid, from: Coord, to: Coord, heading: Option<Direction>) -> bool {
        grid.reset_search();
        grid.cell_mut(&from).dist = Some(0);

        let mut frontier = VecDeque::from([from]);
        while let Some(cur) = frontier.pop_front() {
            if cur == to {
                return true;
            }
            let cur_dist = grid.cell(&cur).dist.unwrap_or_default();
            for adj in self.expansion_order(grid, cur, from, heading) {
                if grid.is_enterable(&adj) && grid.cell(&adj).dist.is_none() {
                    let cell = grid.cell_mut(&adj);
                    cell.parent = Some(cur);
                    cell.dist = Some(cur_dist + 1);
                    frontier.push_back(adj);
                }
            }
        }
        false
    }

    /// Level-synchronous breadth-first search on the rayon pool
    ///
    /// Workers only read the grid: each one buffers the enterable, unreached
    /// neighbors of its frontier cell. After the level's workers finish, the
    /// buffers are merged on this thread in frontier order with the same
    /// ordering and claim-once rule as `bfs`, so for a given RNG state both
    /// searches discover identical parents.
    fn level_sync_bfs(
        &mut self,
        grid: &mut Grid,
        from: Coord,
        to: Coord,
        heading: Option<Direction>,
    ) -> bool {
        grid.reset_search();
        grid.cell_mut(&from).dist = Some(0);

        let mut frontier = vec![from];
        while !frontier.is_empty() {
            if frontier.contains(&to) {
                return true;
            }

            let buffered: Vec<Vec<Coord>> = {
                let frozen: &Grid = grid;
                let profiler = &*self.profiler;
                frontier
                    .par_iter()
                    .map(|cur| {
                        profiler.worker_started();
                        let discovered: Vec<Coord> = cur
                            .neighbors()
                            .into_iter()
                            .filter(|adj| frozen.is_enterable(adj) && frozen.cell(adj).dist.is_none())
                            .collect();
                        profiler.worker_finished();
                        discovered
                    })
                    .collect()
            };

            let mut next_level = Vec::new();
            for (&cur, discovered) in frontier.iter().zip(buffered) {
                let cur_dist = grid.cell(&cur).dist.unwrap_or_default();
                for adj in self.expansion_order(grid, cur, from, heading) {
                    if discovered.contains(&adj) && grid.cell(&adj).dist.is_none() {
                        let cell = grid.cell_mut(&adj);
                        cell.parent = Some(cur);
                        cell.dist = Some(cur_dist + 1);
                        next_level.push(adj);
                    }
                }
            }
            frontier = next_level;
        }
        false
    }

    /// Walks parent links back from `to` and returns the forward directions
    fn build_path(grid: &Grid, from: Coord, to: Coord) -> Vec<Direction> {
        let mut path = Vec::new();
        let mut cur = to;
        while cur != from {
            let Some(parent) = grid.cell(&cur).parent else {
                return Vec::new();
            };
            match parent.direction_to(&cur) {
                Some(dir) => path.push(dir),
                None => return Vec::new(),
            }
            cur = parent;
        }
        path.reverse();
        path
    }
}
