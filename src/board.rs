use crate::geometry::{Bounds, Neighbors, Offset, NEIGHBORHOOD};
use rand::Rng;

/// Value of a cell that froze this tick or has no frozen neighbors.
pub const FRESH_ICE: i32 = -1;

/// Deepest cosmetic grade an ice cell can reach (four frozen neighbors).
pub const MAX_ICE_GRADE: i32 = 5;

/// Ice value for a cell with `frozen_neighbors` frozen neighbors.
pub fn ice_grade(frozen_neighbors: usize) -> i32 {
    -((frozen_neighbors as i32 + 1).min(MAX_ICE_GRADE))
}

/// Grid of signed cell values.
///
/// Positive values are gas mass, zero is empty and negative values are ice,
/// whose magnitude is a display grade rather than mass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    bounds: Bounds,
    cells: Vec<i32>,
}

impl Board {
    /// Create an empty board
    pub fn empty(width: usize, height: usize) -> Self {
        let bounds = Bounds::new(width, height);
        Self {
            bounds,
            cells: vec![0; bounds.area()],
        }
    }

    /// Each cell independently becomes a full gas cell with probability `density`.
    pub fn random<R: Rng + ?Sized>(width: usize, height: usize, density: f64, max_mass: i32, rng: &mut R) -> Self {
        let mut board = Self::empty(width, height);
        for cell in board.cells.iter_mut() {
            if rng.gen_bool(density) {
                *cell = max_mass;
            }
        }
        board
    }

    /// Build a board from rows of values, top row first.
    #[cfg(test)]
    pub fn from_rows(rows: &[&[i32]]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        let mut board = Self::empty(width, height);
        for (y, row) in rows.iter().enumerate() {
            assert!(row.len() == width, "rows must all have the same width");
            for (x, &value) in row.iter().enumerate() {
                board.cells[y * width + x] = value;
            }
        }
        board
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn width(&self) -> usize {
        self.bounds.width
    }

    pub fn height(&self) -> usize {
        self.bounds.height
    }

    /// Row-major view of every cell
    pub fn cells(&self) -> &[i32] {
        &self.cells
    }

    pub fn get(&self, x: usize, y: usize) -> Option<i32> {
        if self.bounds.contains(x, y) {
            Some(self.cells[self.bounds.index(x, y)])
        } else {
            None
        }
    }

    /// Write a cell. Out-of-range coordinates are ignored; returns whether
    /// the write happened.
    pub fn set(&mut self, x: usize, y: usize, value: i32) -> bool {
        if self.bounds.contains(x, y) {
            let idx = self.bounds.index(x, y);
            self.cells[idx] = value;
            true
        } else {
            false
        }
    }

    /// Value at an in-range coordinate.
    pub(crate) fn at(&self, (x, y): (usize, usize)) -> i32 {
        self.cells[self.bounds.index(x, y)]
    }

    pub(crate) fn at_mut(&mut self, (x, y): (usize, usize)) -> &mut i32 {
        let idx = self.bounds.index(x, y);
        &mut self.cells[idx]
    }

    /// Value of the cell `offset` away from `(x, y)`, clamped at the edges
    /// when not wrapping.
    pub fn destination_value(&self, x: usize, y: usize, offset: Offset, wraparound: bool) -> i32 {
        self.at(self.bounds.resolve(x, y, offset, wraparound))
    }

    /// Neighbor coordinates and their values.
    pub fn neighbors(&self, x: usize, y: usize, wraparound: bool) -> Neighbors<((usize, usize), i32)> {
        self.bounds
            .neighbor_coords(x, y, wraparound)
            .iter()
            .map(|&coord| (coord, self.at(coord)))
            .collect()
    }

    pub fn frozen_neighbors(&self, x: usize, y: usize, wraparound: bool) -> usize {
        self.neighbors(x, y, wraparound)
            .iter()
            .filter(|(_, value)| *value < 0)
            .count()
    }

    /// Offsets gas may move or diffuse along: never into ice, and never off
    /// the grid when not wrapping.
    pub fn valid_move_directions(&self, x: usize, y: usize, wraparound: bool) -> Neighbors<Offset> {
        NEIGHBORHOOD
            .iter()
            .copied()
            .filter(|&offset| wraparound || self.bounds.is_in_bounds(x, y, offset))
            .filter(|&offset| self.destination_value(x, y, offset, wraparound) >= 0)
            .collect()
    }

    /// Number of gas cells
    pub fn count_gas(&self) -> usize {
        self.cells().iter().filter(|&&v| v > 0).count()
    }

    /// Number of ice cells
    pub fn count_ice(&self) -> usize {
        self.cells().iter().filter(|&&v| v < 0).count()
    }

    /// Sum of all gas mass on the board
    pub fn total_mass(&self) -> i64 {
        self.cells().iter().filter(|&&v| v > 0).map(|&v| v as i64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ice_grade_range() {
        assert_eq!(ice_grade(0), -1);
        assert_eq!(ice_grade(1), -2);
        assert_eq!(ice_grade(4), -5);
        assert_eq!(ice_grade(9), -5);
    }

    #[test]
    fn test_set_out_of_range_is_ignored() {
        let mut board = Board::empty(3, 2);
        assert!(!board.set(3, 0, 6));
        assert!(!board.set(0, 2, 6));
        assert!(board.cells().iter().all(|&v| v == 0));
        assert!(board.set(2, 1, 6));
        assert_eq!(board.get(2, 1), Some(6));
        assert_eq!(board.get(5, 5), None);
    }

    #[test]
    fn test_counts() {
        let board = Board::from_rows(&[&[0, 3, -1], &[6, -2, 0]]);
        assert_eq!(board.count_gas(), 2);
        assert_eq!(board.count_ice(), 2);
        assert_eq!(board.total_mass(), 9);
    }

    #[test]
    fn test_random_board_density_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        let full = Board::random(4, 4, 1.0, 6, &mut rng);
        assert!(full.cells().iter().all(|&v| v == 6));
        let none = Board::random(4, 4, 0.0, 6, &mut rng);
        assert!(none.cells().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_bounded_neighbors_skip_off_grid_offsets() {
        let board = Board::from_rows(&[&[1, 2, 3], &[4, 5, 6], &[7, 8, 9]]);
        let values: Vec<i32> = board.neighbors(0, 0, false).iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![2, 4]);
        let values: Vec<i32> = board.neighbors(1, 1, false).iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![4, 6, 8, 2]);
    }

    #[test]
    fn test_wrapping_neighbors_include_opposite_edges() {
        let board = Board::from_rows(&[&[1, 2, 3], &[4, 5, 6], &[7, 8, 9]]);
        let values: Vec<i32> = board.neighbors(0, 0, true).iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![3, 2, 4, 7]);
    }

    #[test]
    fn test_destination_value_clamps_at_edge() {
        // Reading past the right edge samples the edge cell itself
        let board = Board::from_rows(&[&[0, 0, 5]]);
        assert_eq!(board.destination_value(2, 0, (1, 0), false), 5);
        assert_eq!(board.destination_value(2, 0, (1, 0), true), 0);
    }

    #[test]
    fn test_valid_directions_exclude_ice_and_edges() {
        let board = Board::from_rows(&[&[0, -1, 0], &[0, 4, 0], &[0, 0, 0]]);
        let dirs = board.valid_move_directions(1, 1, false);
        assert_eq!(dirs.as_slice(), &[(-1, 0), (1, 0), (0, 1)]);

        let dirs = board.valid_move_directions(0, 0, false);
        assert_eq!(dirs.as_slice(), &[(0, 1)]);
    }

    #[test]
    fn test_valid_directions_wrapping_sees_ice_across_edge() {
        let board = Board::from_rows(&[&[3, 0, -1], &[0, 0, 0], &[0, 0, 0]]);
        let dirs = board.valid_move_directions(0, 0, true);
        assert_eq!(dirs.as_slice(), &[(1, 0), (0, 1), (0, -1)]);
    }

    #[test]
    fn test_frozen_neighbors() {
        let board = Board::from_rows(&[&[-1, 0, -3], &[-2, 0, 0], &[0, 0, 0]]);
        assert_eq!(board.frozen_neighbors(1, 0, false), 2);
        assert_eq!(board.frozen_neighbors(0, 0, false), 1);
        assert_eq!(board.frozen_neighbors(0, 0, true), 2);
    }
}
