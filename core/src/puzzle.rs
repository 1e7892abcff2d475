use glam::Vec3;
use serde::Deserialize;
use tracing::debug;

use crate::catalog::PictureEntry;
use crate::error::{CoreError, CoreResult};
use crate::geometry::{bounds_of, Aabb, PieceBody};
use crate::grid::{grid_neighbors, square_grid_for_count, Direction, GridDim};
use crate::scramble::{scatter_position, scramble_cells};

pub const SNAP_DISTANCE_DEFAULT: f32 = 5.0;
pub const OVERLAP_OFFSET_DEFAULT: f32 = 1.8;
pub const PIECE_EXTENT_DEFAULT: f32 = 10.0;
pub const SCATTER_DEPTH_DEFAULT: f32 = 1.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PuzzleImage {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl PuzzleImage {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    pub fn from_picture(entry: &PictureEntry) -> Self {
        Self::new(entry.name, entry.width, entry.height)
    }

    /// World size of one piece when the image is cut into `dim x dim`
    /// pieces and the longer axis spans `extent` per piece.
    pub fn piece_size(&self, extent: f32) -> Vec3 {
        let width = self.width.max(1) as f32;
        let height = self.height.max(1) as f32;
        let longer = width.max(height);
        Vec3::new(extent * width / longer, extent * height / longer, 0.0)
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Deserialize, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize,
)]
#[serde(default)]
pub struct PuzzleRules {
    /// Largest edge gap / center misalignment that still joins two pieces.
    pub snap_distance: f32,
    /// Overlap left between joined pieces to hide transparent fringe pixels.
    pub overlap_offset: f32,
    pub piece_extent: f32,
    pub depth: f32,
}

impl Default for PuzzleRules {
    fn default() -> Self {
        Self {
            snap_distance: SNAP_DISTANCE_DEFAULT,
            overlap_offset: OVERLAP_OFFSET_DEFAULT,
            piece_extent: PIECE_EXTENT_DEFAULT,
            depth: SCATTER_DEPTH_DEFAULT,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PuzzlePiece {
    pub id: usize,
    /// Neighbor ids indexed by `Direction::index()`.
    pub neighbors: [Option<usize>; 4],
    pub body: PieceBody,
}

impl PuzzlePiece {
    pub fn neighbor(&self, dir: Direction) -> Option<usize> {
        self.neighbors[dir.index()]
    }

    pub fn name(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectionReport {
    /// Number of other components joined to the moved one.
    pub merged: usize,
    /// Total translation applied to the moved component.
    pub shift: Vec3,
}

impl ConnectionReport {
    pub fn connected(&self) -> bool {
        self.merged > 0
    }
}

#[derive(Clone, Debug)]
pub struct PuzzleAssembly {
    rules: PuzzleRules,
    grid: GridDim,
    pieces: Vec<PuzzlePiece>,
    components: Vec<Vec<usize>>,
    cells: Vec<usize>,
}

impl PuzzleAssembly {
    /// Cuts `image` into a square grid of `piece_count` pieces and scatters
    /// them over distinct cells, one singleton component per piece.
    pub fn setup(
        image: &PuzzleImage,
        piece_count: usize,
        rules: PuzzleRules,
        seed: u32,
    ) -> CoreResult<Self> {
        let grid = square_grid_for_count(piece_count)?;
        let size = image.piece_size(rules.piece_extent);
        let cells = scramble_cells(seed, grid.total());
        let pieces = cells
            .iter()
            .enumerate()
            .map(|(id, &cell)| PuzzlePiece {
                id,
                neighbors: grid_neighbors(id, grid.dim),
                body: PieceBody::new(scatter_position(cell, grid.dim, size, rules.depth), size),
            })
            .collect();
        let mut assembly = Self::from_pieces(grid.dim, pieces, rules)?;
        assembly.cells = cells;
        debug!(
            "puzzle '{}' set up with {} pieces ({}x{})",
            image.name,
            assembly.pieces.len(),
            grid.dim,
            grid.dim
        );
        Ok(assembly)
    }

    /// Builds an assembly from an explicit piece table. Every neighbor link
    /// must point at an existing piece and be reciprocated.
    pub fn from_pieces(dim: usize, pieces: Vec<PuzzlePiece>, rules: PuzzleRules) -> CoreResult<Self> {
        let grid = square_grid_for_count(dim * dim)?;
        if pieces.len() != grid.total() {
            return Err(CoreError::PieceCount {
                requested: pieces.len(),
            });
        }
        validate_neighbors(&pieces)?;
        let components = (0..pieces.len()).map(|id| vec![id]).collect();
        Ok(Self {
            rules,
            grid,
            pieces,
            components,
            cells: Vec::new(),
        })
    }

    pub(crate) fn with_components(mut self, components: Vec<Vec<usize>>) -> CoreResult<Self> {
        check_partition(&components, self.pieces.len())?;
        self.components = components;
        Ok(self)
    }

    pub fn rules(&self) -> &PuzzleRules {
        &self.rules
    }

    pub fn dim(&self) -> usize {
        self.grid.dim
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn pieces(&self) -> &[PuzzlePiece] {
        &self.pieces
    }

    pub fn piece(&self, id: usize) -> CoreResult<&PuzzlePiece> {
        self.pieces.get(id).ok_or(CoreError::UnknownPiece {
            id,
            total: self.pieces.len(),
        })
    }

    /// Scatter cell of every piece as assigned by `setup` (empty for
    /// assemblies built from a piece table).
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    pub fn components(&self) -> &[Vec<usize>] {
        &self.components
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn is_won(&self) -> bool {
        self.components.len() == 1
    }

    pub fn bounds(&self) -> Option<Aabb> {
        bounds_of(self.pieces.iter().map(|piece| &piece.body))
    }

    pub fn component_index_of(&self, id: usize) -> CoreResult<usize> {
        self.piece(id)?;
        self.components
            .iter()
            .position(|component| component.contains(&id))
            .ok_or_else(|| CoreError::Partition {
                detail: format!("piece {id} belongs to no component"),
            })
    }

    pub fn component_of(&self, id: usize) -> CoreResult<&[usize]> {
        let idx = self.component_index_of(id)?;
        Ok(&self.components[idx])
    }

    /// Moves a piece together with every piece joined to it.
    pub fn drag_component(&mut self, id: usize, delta: Vec3) -> CoreResult<()> {
        let idx = self.component_index_of(id)?;
        let members = self.components[idx].clone();
        self.translate(&members, delta);
        Ok(())
    }

    pub fn set_piece_position(&mut self, id: usize, position: Vec3) -> CoreResult<()> {
        let total = self.pieces.len();
        let piece = self
            .pieces
            .get_mut(id)
            .ok_or(CoreError::UnknownPiece { id, total })?;
        piece.body.position = position;
        Ok(())
    }

    /// Where a piece sits in the finished picture when piece 0 is at `origin`.
    pub fn solved_position(&self, id: usize, origin: Vec3) -> CoreResult<Vec3> {
        let piece = self.piece(id)?;
        let (row, col) = self.grid.cell_of(id);
        let body = &piece.body;
        let step_x = body.size.x - self.rules.overlap_offset * body.scale.x;
        let step_y = body.size.y - self.rules.overlap_offset * body.scale.y;
        Ok(origin + Vec3::new(col as f32 * step_x, -(row as f32) * step_y, 0.0))
    }

    /// Tests every member of the moved piece's component against its grid
    /// neighbors, snaps the component flush against each neighbor that is
    /// close enough, and joins those neighbors' components into it.
    ///
    /// A neighbor component that is already staged for merging in this call
    /// is not tested again; the first qualifying edge anchors the snap.
    pub fn check_possible_connection(&mut self, moved: usize) -> CoreResult<ConnectionReport> {
        let own = self.component_index_of(moved)?;
        let members = self.components[own].clone();
        let mut staged: Vec<usize> = Vec::new();
        let mut shift = Vec3::ZERO;

        for &member in &members {
            for dir in Direction::ALL {
                let Some(neighbor) = self.pieces[member].neighbor(dir) else {
                    continue;
                };
                if neighbor >= self.pieces.len() {
                    return Err(CoreError::BrokenNeighbor {
                        piece: member,
                        dir,
                        neighbor,
                    });
                }
                let other = self.component_index_of(neighbor)?;
                if other == own || staged.contains(&other) {
                    continue;
                }
                let Some(target) = self.snap_target(member, neighbor, dir) else {
                    continue;
                };
                let move_by = target - self.pieces[member].body.position;
                self.translate(&members, move_by);
                for &idx in &staged {
                    let staged_members = self.components[idx].clone();
                    self.translate(&staged_members, move_by);
                }
                shift += move_by;
                staged.push(other);
                debug!(
                    "piece {member} joins piece {neighbor} on its {} edge",
                    dir.as_str()
                );
            }
        }

        let merged = staged.len();
        if merged > 0 {
            let mut joined = Vec::new();
            for &idx in &staged {
                joined.extend(std::mem::take(&mut self.components[idx]));
            }
            self.components[own].extend(joined);
            self.components.retain(|component| !component.is_empty());
            debug!(
                "merged {merged} component(s), {} remaining",
                self.components.len()
            );
        }
        Ok(ConnectionReport { merged, shift })
    }

    /// Position `piece` would take to sit flush against `neighbor` on edge
    /// `dir`, or `None` if the two are not close enough.
    pub fn snap_target(&self, piece: usize, neighbor: usize, dir: Direction) -> Option<Vec3> {
        let mine = &self.pieces.get(piece)?.body;
        let other = &self.pieces.get(neighbor)?.body;
        adjacency_target(mine, other, dir, &self.rules)
    }

    pub fn check_partition(&self) -> CoreResult<()> {
        check_partition(&self.components, self.pieces.len())
    }

    fn translate(&mut self, ids: &[usize], by: Vec3) {
        for &id in ids {
            if let Some(piece) = self.pieces.get_mut(id) {
                piece.body.translate(by);
            }
        }
    }
}

/// Directional adjacency test. `dir` names the edge of `mine` that faces
/// `other`; world y grows upward.
pub fn adjacency_target(
    mine: &PieceBody,
    other: &PieceBody,
    dir: Direction,
    rules: &PuzzleRules,
) -> Option<Vec3> {
    let diff = rules.snap_distance;
    let offset = rules.overlap_offset;
    let my = mine.bounds();
    let their = other.bounds();
    let p = mine.position;
    let q = other.position;
    let q_size = their.size();
    match dir {
        Direction::Top => {
            let close = my.min.y < their.min.y
                && (their.min.y - my.max.y).abs() < diff
                && (p.x - q.x).abs() < diff;
            close.then(|| Vec3::new(q.x, q.y - q_size.y + offset * other.scale.y, p.z))
        }
        Direction::Bottom => {
            let close = my.min.y > their.min.y
                && (their.max.y - my.min.y).abs() < diff
                && (p.x - q.x).abs() < diff;
            close.then(|| Vec3::new(q.x, q.y + q_size.y - offset * other.scale.y, p.z))
        }
        Direction::Left => {
            let close = my.min.x > their.min.x
                && (their.max.x - my.min.x).abs() < diff
                && (p.y - q.y).abs() < diff;
            close.then(|| Vec3::new(q.x + q_size.x - offset * other.scale.x, q.y, p.z))
        }
        Direction::Right => {
            let close = my.min.x < their.min.x
                && (their.min.x - my.max.x).abs() < diff
                && (p.y - q.y).abs() < diff;
            close.then(|| Vec3::new(q.x - q_size.x + offset * other.scale.x, q.y, p.z))
        }
    }
}

pub fn validate_neighbors(pieces: &[PuzzlePiece]) -> CoreResult<()> {
    let total = pieces.len();
    for (idx, piece) in pieces.iter().enumerate() {
        if piece.id != idx {
            return Err(CoreError::UnknownPiece {
                id: piece.id,
                total,
            });
        }
        for dir in Direction::ALL {
            let Some(neighbor) = piece.neighbor(dir) else {
                continue;
            };
            let broken = CoreError::BrokenNeighbor {
                piece: idx,
                dir,
                neighbor,
            };
            let Some(other) = pieces.get(neighbor) else {
                return Err(broken);
            };
            if neighbor == idx || other.neighbor(dir.opposite()) != Some(idx) {
                return Err(broken);
            }
        }
    }
    Ok(())
}

pub fn check_partition(components: &[Vec<usize>], total: usize) -> CoreResult<()> {
    let mut seen = vec![false; total];
    for component in components {
        if component.is_empty() {
            return Err(CoreError::Partition {
                detail: "empty component".to_string(),
            });
        }
        for &id in component {
            let Some(slot) = seen.get_mut(id) else {
                return Err(CoreError::Partition {
                    detail: format!("piece {id} out of range"),
                });
            };
            if *slot {
                return Err(CoreError::Partition {
                    detail: format!("piece {id} appears twice"),
                });
            }
            *slot = true;
        }
    }
    if let Some(missing) = seen.iter().position(|present| !present) {
        return Err(CoreError::Partition {
            detail: format!("piece {missing} missing"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: f32 = 10.0;

    fn square_pieces(dim: usize) -> Vec<PuzzlePiece> {
        (0..dim * dim)
            .map(|id| PuzzlePiece {
                id,
                neighbors: grid_neighbors(id, dim),
                body: PieceBody::new(
                    Vec3::new(id as f32 * 100.0, 0.0, 1.0),
                    Vec3::new(SIZE, SIZE, 0.0),
                ),
            })
            .collect()
    }

    fn assembly(dim: usize) -> PuzzleAssembly {
        PuzzleAssembly::from_pieces(dim, square_pieces(dim), PuzzleRules::default()).unwrap()
    }

    #[test]
    fn setup_builds_singleton_components() {
        let image = PuzzleImage::new("bonobo", 800, 600);
        let puzzle = PuzzleAssembly::setup(&image, 9, PuzzleRules::default(), 3).unwrap();
        assert_eq!(puzzle.dim(), 3);
        assert_eq!(puzzle.component_count(), 9);
        assert!(puzzle.components().iter().all(|c| c.len() == 1));
        assert_eq!(puzzle.pieces()[4].neighbors, [Some(1), Some(7), Some(3), Some(5)]);
        puzzle.check_partition().unwrap();
    }

    #[test]
    fn setup_rejects_non_square_counts() {
        let image = PuzzleImage::new("bonobo", 800, 600);
        let err = PuzzleAssembly::setup(&image, 8, PuzzleRules::default(), 3).unwrap_err();
        assert_eq!(err, CoreError::PieceCount { requested: 8 });
    }

    #[test]
    fn piece_size_keeps_image_aspect() {
        let image = PuzzleImage::new("wide", 800, 400);
        assert_eq!(image.piece_size(10.0), Vec3::new(10.0, 5.0, 0.0));
    }

    #[test]
    fn unreciprocated_link_is_rejected() {
        let mut pieces = square_pieces(2);
        pieces[0].neighbors[Direction::Right.index()] = None;
        let err = PuzzleAssembly::from_pieces(2, pieces, PuzzleRules::default()).unwrap_err();
        assert_eq!(
            err,
            CoreError::BrokenNeighbor {
                piece: 1,
                dir: Direction::Left,
                neighbor: 0
            }
        );
    }

    #[test]
    fn link_outside_table_is_rejected() {
        let mut pieces = square_pieces(2);
        pieces[3].neighbors[Direction::Bottom.index()] = Some(17);
        assert!(matches!(
            PuzzleAssembly::from_pieces(2, pieces, PuzzleRules::default()),
            Err(CoreError::BrokenNeighbor { piece: 3, neighbor: 17, .. })
        ));
    }

    #[test]
    fn unknown_piece_is_an_error() {
        let mut puzzle = assembly(2);
        assert_eq!(
            puzzle.check_possible_connection(4),
            Err(CoreError::UnknownPiece { id: 4, total: 4 })
        );
    }

    #[test]
    fn piece_below_its_top_neighbor_snaps_up() {
        let mut puzzle = assembly(2);
        // piece 2 sits under piece 0 with a 3 unit gap and 2 units of drift
        puzzle.set_piece_position(0, Vec3::new(0.0, 0.0, 1.0)).unwrap();
        puzzle.set_piece_position(2, Vec3::new(2.0, -13.0, 1.0)).unwrap();
        let report = puzzle.check_possible_connection(2).unwrap();
        assert!(report.connected());
        let snapped = puzzle.piece(2).unwrap().body.position;
        assert_eq!(snapped, Vec3::new(0.0, -SIZE + OVERLAP_OFFSET_DEFAULT, 1.0));
        assert_eq!(puzzle.component_of(0).unwrap(), &[2, 0]);
    }

    #[test]
    fn left_and_right_edges_snap_horizontally() {
        let mut puzzle = assembly(2);
        puzzle.set_piece_position(0, Vec3::new(0.0, 0.0, 1.0)).unwrap();
        puzzle.set_piece_position(1, Vec3::new(12.5, 1.0, 1.0)).unwrap();
        let report = puzzle.check_possible_connection(1).unwrap();
        assert_eq!(report.merged, 1);
        let snapped = puzzle.piece(1).unwrap().body.position;
        assert!((snapped.x - (SIZE - OVERLAP_OFFSET_DEFAULT)).abs() < 1e-5);
        assert_eq!(snapped.y, 0.0);
    }

    #[test]
    fn wrong_side_does_not_connect() {
        let mut puzzle = assembly(2);
        // piece 1 belongs right of piece 0 but lies to its left
        puzzle.set_piece_position(0, Vec3::new(0.0, 0.0, 1.0)).unwrap();
        puzzle.set_piece_position(1, Vec3::new(-12.0, 0.0, 1.0)).unwrap();
        let report = puzzle.check_possible_connection(1).unwrap();
        assert!(!report.connected());
        assert_eq!(puzzle.component_count(), 4);
    }

    #[test]
    fn scaled_pieces_scale_the_overlap() {
        let mut puzzle = assembly(2);
        for id in 0..4 {
            let mut body = puzzle.piece(id).unwrap().body;
            body.scale = Vec3::splat(2.0);
            puzzle.pieces[id].body = body;
        }
        puzzle.set_piece_position(0, Vec3::new(0.0, 0.0, 1.0)).unwrap();
        puzzle.set_piece_position(1, Vec3::new(11.0, 0.0, 1.0)).unwrap();
        puzzle.check_possible_connection(1).unwrap();
        let snapped = puzzle.piece(1).unwrap().body.position;
        assert!((snapped.x - (SIZE - 2.0 * OVERLAP_OFFSET_DEFAULT)).abs() < 1e-5);
    }

    #[test]
    fn broken_partition_is_detected() {
        assert!(check_partition(&[vec![0, 1], vec![1, 2, 3]], 4).is_err());
        assert!(check_partition(&[vec![0, 1], vec![3]], 4).is_err());
        assert!(check_partition(&[vec![0, 1], vec![], vec![2, 3]], 4).is_err());
        assert!(check_partition(&[vec![3, 1], vec![0, 2]], 4).is_ok());
    }
}
