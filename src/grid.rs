// Occupancy grid with per-cell search and cycle metadata
//
// The outermost ring of cells is always Wall. Search metadata (distance,
// parent, visited) is scratch space owned by whichever search last ran; the
// cycle index is written once by the cycle builder and survives until the
// grid is rebuilt.

use rand::Rng;

use crate::error::EngineError;
use crate::types::Coord;

/// What currently occupies a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Empty,
    Wall,
    Food,
    Head,
    Body,
    Tail,
}

impl CellKind {
    /// Empty and Food cells can be stepped on
    pub fn is_enterable(self) -> bool {
        matches!(self, CellKind::Empty | CellKind::Food)
    }

    pub fn is_snake(self) -> bool {
        matches!(self, CellKind::Head | CellKind::Body | CellKind::Tail)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub kind: CellKind,
    /// BFS distance from the search origin, `None` while unreached
    pub dist: Option<u32>,
    /// Cell this one was discovered from
    pub parent: Option<Coord>,
    /// Claimed by the longest-path extension
    pub visited: bool,
    /// Position on the Hamiltonian cycle
    pub cycle_index: Option<usize>,
}

impl Cell {
    fn new(kind: CellKind) -> Self {
        Cell {
            kind,
            dist: None,
            parent: None,
            visited: false,
            cycle_index: None,
        }
    }

    fn clear_search(&mut self) {
        self.dist = None;
        self.parent = None;
        self.visited = false;
    }
}

/// Largest accepted grid, border included
pub const MAX_CELLS: usize = 1 << 20;

/// Fixed-size grid. `Clone` produces a fully independent copy, which is what
/// the policy relies on when it simulates moves.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: i32,
    cols: i32,
    cells: Vec<Cell>,
    food: Option<Coord>,
}

impl Grid {
    /// Creates a grid with a wall border and an empty interior
    ///
    /// # Arguments
    /// * `rows` - Row count including the border
    /// * `cols` - Column count including the border
    ///
    /// Grids of more than `MAX_CELLS` cells are rejected before allocating.
    pub fn new(rows: i32, cols: i32) -> Result<Self, EngineError> {
        if rows < 3 || cols < 3 {
            return Err(EngineError::GridTooSmall { rows, cols });
        }
        let total = rows
            .checked_mul(cols)
            .map(|n| n as usize)
            .filter(|&n| n <= MAX_CELLS)
            .ok_or(EngineError::GridTooLarge {
                rows,
                cols,
                max: MAX_CELLS,
            })?;

        let mut cells = Vec::with_capacity(total);
        for row in 0..rows {
            for col in 0..cols {
                let border = row == 0 || col == 0 || row == rows - 1 || col == cols - 1;
                cells.push(Cell::new(if border {
                    CellKind::Wall
                } else {
                    CellKind::Empty
                }));
            }
        }

        Ok(Grid {
            rows,
            cols,
            cells,
            food: None,
        })
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// Number of interior cells; also the length of the Hamiltonian cycle
    pub fn interior_size(&self) -> usize {
        ((self.rows - 2) * (self.cols - 2)) as usize
    }

    pub fn is_inside(&self, pos: &Coord) -> bool {
        pos.row >= 0 && pos.row < self.rows && pos.col >= 0 && pos.col < self.cols
    }

    pub fn is_interior(&self, pos: &Coord) -> bool {
        pos.row > 0 && pos.row < self.rows - 1 && pos.col > 0 && pos.col < self.cols - 1
    }

    /// All interior positions, row-major
    pub fn interior(&self) -> impl Iterator<Item = Coord> + '_ {
        (1..self.rows - 1).flat_map(move |row| (1..self.cols - 1).map(move |col| Coord::new(row, col)))
    }

    fn index(&self, pos: &Coord) -> usize {
        debug_assert!(self.is_inside(pos), "{:?} outside {}x{} grid", pos, self.rows, self.cols);
        (pos.row * self.cols + pos.col) as usize
    }

    /// Panics if `pos` is outside the grid
    pub fn cell(&self, pos: &Coord) -> &Cell {
        &self.cells[self.index(pos)]
    }

    /// Panics if `pos` is outside the grid
    pub fn cell_mut(&mut self, pos: &Coord) -> &mut Cell {
        let idx = self.index(pos);
        &mut self.cells[idx]
    }

    /// Cell kind at `pos`; anything outside the grid reads as Wall
    pub fn kind(&self, pos: &Coord) -> CellKind {
        if self.is_inside(pos) {
            self.cell(pos).kind
        } else {
            CellKind::Wall
        }
    }

    /// Overwrites the kind of a cell without touching the food bookkeeping
    pub fn set_kind(&mut self, pos: &Coord, kind: CellKind) {
        if self.is_inside(pos) {
            self.cell_mut(pos).kind = kind;
        }
    }

    pub fn is_enterable(&self, pos: &Coord) -> bool {
        self.kind(pos).is_enterable()
    }

    /// Empty (not Food) and not yet claimed by the longest-path extension
    pub fn is_empty_unvisited(&self, pos: &Coord) -> bool {
        self.is_inside(pos) && {
            let cell = self.cell(pos);
            cell.kind == CellKind::Empty && !cell.visited
        }
    }

    pub fn food(&self) -> Option<Coord> {
        self.food
    }

    pub fn has_food(&self) -> bool {
        self.food.is_some()
    }

    /// Places the single food item, replacing any existing one
    pub fn place_food(&mut self, pos: Coord) -> Result<(), EngineError> {
        if !self.is_interior(&pos) || self.kind(&pos) != CellKind::Empty {
            return Err(EngineError::InvalidFood(pos));
        }
        self.remove_food();
        self.cell_mut(&pos).kind = CellKind::Food;
        self.food = Some(pos);
        Ok(())
    }

    /// Clears the food marker; a Food cell reverts to Empty
    pub fn remove_food(&mut self) {
        if let Some(pos) = self.food.take() {
            if self.kind(&pos) == CellKind::Food {
                self.cell_mut(&pos).kind = CellKind::Empty;
            }
        }
    }

    /// Drops the food bookkeeping after the snake has moved onto the cell
    pub(crate) fn consume_food(&mut self) {
        self.food = None;
    }

    /// Places food on a uniformly chosen Empty interior cell
    /// Returns `None` when no Empty cell is left
    pub fn place_random_food<R: Rng>(&mut self, rng: &mut R) -> Option<Coord> {
        let free: Vec<Coord> = self
            .interior()
            .filter(|pos| self.kind(pos) == CellKind::Empty)
            .collect();
        if free.is_empty() {
            return None;
        }
        let pos = free[rng.random_range(0..free.len())];
        self.place_food(pos).ok()?;
        Some(pos)
    }

    /// True once the snake occupies every interior cell
    pub fn is_all_body(&self) -> bool {
        self.interior().all(|pos| self.kind(&pos).is_snake())
    }

    /// Marks every cell unreached and parentless
    pub fn reset_search(&mut self) {
        for cell in &mut self.cells {
            cell.dist = None;
            cell.parent = None;
        }
    }

    pub fn reset_visited(&mut self) {
        for cell in &mut self.cells {
            cell.visited = false;
        }
    }

    /// Clears search metadata on every cell not listed in `keep`
    pub fn retain_search_metadata(&mut self, keep: &[Coord]) {
        let mut kept = vec![false; self.cells.len()];
        for pos in keep.iter().filter(|pos| self.is_inside(pos)) {
            kept[self.index(pos)] = true;
        }
        for (cell, keep) in self.cells.iter_mut().zip(kept) {
            if !keep {
                cell.clear_search();
            }
        }
    }

    pub fn cycle_index(&self, pos: &Coord) -> Option<usize> {
        if self.is_inside(pos) {
            self.cell(pos).cycle_index
        } else {
            None
        }
    }

    pub fn set_cycle_index(&mut self, pos: &Coord, index: usize) {
        if self.is_inside(pos) {
            self.cell_mut(pos).cycle_index = Some(index);
        }
    }

    pub fn clear_cycle_indices(&mut self) {
        for cell in &mut self.cells {
            cell.cycle_index = None;
        }
    }

    pub fn has_cycle(&self) -> bool {
        self.interior().all(|pos| self.cycle_index(&pos).is_some())
    }

    /// The neighbor that follows `pos` on the Hamiltonian cycle
    pub fn cycle_successor(&self, pos: &Coord) -> Option<Coord> {
        let next = (self.cycle_index(pos)? + 1) % self.interior_size();
        pos.neighbors()
            .into_iter()
            .find(|adj| self.cycle_index(adj) == Some(next))
    }

    /// Copies cycle indices from another grid of the same dimensions
    pub fn adopt_cycle(&mut self, other: &Grid) -> bool {
        if other.rows != self.rows || other.cols != self.cols {
            return false;
        }
        for (cell, source) in self.cells.iter_mut().zip(&other.cells) {
            cell.cycle_index = source.cycle_index;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_is_wall_and_interior_empty() {
        let grid = Grid::new(5, 6).unwrap();
        assert_eq!(grid.kind(&Coord::new(0, 3)), CellKind::Wall);
        assert_eq!(grid.kind(&Coord::new(4, 3)), CellKind::Wall);
        assert_eq!(grid.kind(&Coord::new(2, 0)), CellKind::Wall);
        assert_eq!(grid.kind(&Coord::new(2, 5)), CellKind::Wall);
        assert_eq!(grid.kind(&Coord::new(2, 2)), CellKind::Empty);
        assert_eq!(grid.kind(&Coord::new(-1, 2)), CellKind::Wall);
        assert_eq!(grid.interior_size(), 12);
        assert_eq!(grid.interior().count(), 12);
    }

    #[test]
    fn test_too_small_grid_rejected() {
        assert_eq!(
            Grid::new(2, 8).unwrap_err(),
            EngineError::GridTooSmall { rows: 2, cols: 8 }
        );
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let too_large = EngineError::GridTooLarge {
            rows: 50_000,
            cols: 50_000,
            max: MAX_CELLS,
        };
        assert_eq!(Grid::new(50_000, 50_000).unwrap_err(), too_large);
        assert!(matches!(
            Grid::new(i32::MAX, i32::MAX),
            Err(EngineError::GridTooLarge { .. })
        ));
        assert!(matches!(
            Grid::new(1025, 1024),
            Err(EngineError::GridTooLarge { .. })
        ));
        assert_eq!(Grid::new(1024, 1024).unwrap().interior_size(), 1022 * 1022);
    }

    #[test]
    fn test_food_lifecycle() {
        let mut grid = Grid::new(6, 6).unwrap();
        grid.place_food(Coord::new(2, 2)).unwrap();
        assert_eq!(grid.food(), Some(Coord::new(2, 2)));
        assert!(grid.is_enterable(&Coord::new(2, 2)));

        grid.place_food(Coord::new(3, 3)).unwrap();
        assert_eq!(grid.kind(&Coord::new(2, 2)), CellKind::Empty);
        assert_eq!(grid.kind(&Coord::new(3, 3)), CellKind::Food);

        assert!(grid.place_food(Coord::new(0, 0)).is_err());
        grid.remove_food();
        assert!(!grid.has_food());
        assert_eq!(grid.kind(&Coord::new(3, 3)), CellKind::Empty);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut grid = Grid::new(6, 6).unwrap();
        let snapshot = grid.clone();
        grid.set_kind(&Coord::new(2, 2), CellKind::Body);
        grid.cell_mut(&Coord::new(2, 3)).dist = Some(4);
        assert_eq!(snapshot.kind(&Coord::new(2, 2)), CellKind::Empty);
        assert_eq!(snapshot.cell(&Coord::new(2, 3)).dist, None);
    }

    #[test]
    fn test_retain_search_metadata() {
        let mut grid = Grid::new(6, 6).unwrap();
        for pos in grid.interior().collect::<Vec<_>>() {
            let cell = grid.cell_mut(&pos);
            cell.dist = Some(1);
            cell.visited = true;
        }
        grid.retain_search_metadata(&[Coord::new(1, 1)]);
        assert_eq!(grid.cell(&Coord::new(1, 1)).dist, Some(1));
        assert!(grid.cell(&Coord::new(1, 1)).visited);
        assert_eq!(grid.cell(&Coord::new(1, 2)).dist, None);
        assert!(!grid.cell(&Coord::new(1, 2)).visited);
    }
}
