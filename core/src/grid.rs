use crate::error::{CoreError, CoreResult};

pub const DIFFICULTY_DIM_BASE: usize = 2;
pub const GRID_DIM_MIN: usize = 2;
pub const DEFAULT_PIECE_COUNT: usize = 4;

/// Edge of a piece, listed in the order adjacency is tested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Bottom,
        Direction::Left,
        Direction::Right,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Top => "top",
            Direction::Bottom => "bottom",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDim {
    pub dim: usize,
}

impl GridDim {
    pub fn total(&self) -> usize {
        self.dim * self.dim
    }

    /// (row, col) of a piece; row 0 is the top row of the image.
    pub fn cell_of(&self, id: usize) -> (usize, usize) {
        (id / self.dim, id % self.dim)
    }
}

pub fn difficulty_dim(difficulty: u32) -> usize {
    difficulty as usize + DIFFICULTY_DIM_BASE
}

pub fn square_grid_for_count(count: usize) -> CoreResult<GridDim> {
    let dim = (count as f64).sqrt().floor() as usize;
    if dim < GRID_DIM_MIN || dim * dim != count {
        return Err(CoreError::PieceCount { requested: count });
    }
    Ok(GridDim { dim })
}

pub fn neighbor_id(id: usize, dim: usize, dir: Direction) -> Option<usize> {
    if dim == 0 || id >= dim * dim {
        return None;
    }
    let row = id / dim;
    let col = id % dim;
    match dir {
        Direction::Top if row > 0 => Some(id - dim),
        Direction::Bottom if row + 1 < dim => Some(id + dim),
        Direction::Left if col > 0 => Some(id - 1),
        Direction::Right if col + 1 < dim => Some(id + 1),
        _ => None,
    }
}

pub fn grid_neighbors(id: usize, dim: usize) -> [Option<usize>; 4] {
    Direction::ALL.map(|dir| neighbor_id(id, dim, dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_counts_are_accepted() {
        assert_eq!(square_grid_for_count(4).unwrap().dim, 2);
        assert_eq!(square_grid_for_count(25).unwrap().dim, 5);
    }

    #[test]
    fn non_square_or_tiny_counts_fail() {
        assert!(square_grid_for_count(0).is_err());
        assert!(square_grid_for_count(1).is_err());
        assert_eq!(
            square_grid_for_count(10),
            Err(CoreError::PieceCount { requested: 10 })
        );
    }

    #[test]
    fn corner_pieces_have_two_neighbors() {
        let dim = 3;
        let corner = grid_neighbors(0, dim);
        assert_eq!(corner, [None, Some(3), None, Some(1)]);
        let center = grid_neighbors(4, dim);
        assert_eq!(center, [Some(1), Some(7), Some(3), Some(5)]);
        assert_eq!(grid_neighbors(8, dim), [Some(5), None, Some(7), None]);
    }

    #[test]
    fn difficulty_maps_to_dimension() {
        assert_eq!(difficulty_dim(0), 2);
        assert_eq!(difficulty_dim(3), 5);
    }
}
