use glam::Vec3;
use rkyv::{Archive, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec::{decode, encode};
use crate::error::{CoreError, CoreResult};
use crate::geometry::PieceBody;
use crate::grid::grid_neighbors;
use crate::puzzle::{PuzzleAssembly, PuzzlePiece, PuzzleRules};
use crate::stats::PuzzleStats;

pub const PUZZLE_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct PuzzleSnapshot {
    pub version: u32,
    pub dim: u32,
    pub rules: PuzzleRules,
    pub positions: Vec<[f32; 3]>,
    pub scales: Vec<[f32; 3]>,
    pub sizes: Vec<[f32; 3]>,
    pub components: Vec<Vec<u32>>,
    pub stats: PuzzleStats,
}

impl PuzzleSnapshot {
    pub fn piece_count(&self) -> usize {
        self.positions.len()
    }

    pub fn to_bytes(&self) -> CoreResult<Vec<u8>> {
        encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let snapshot: Self = decode(bytes)?;
        if snapshot.version != PUZZLE_SNAPSHOT_VERSION {
            return Err(CoreError::Codec(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, PUZZLE_SNAPSHOT_VERSION
            )));
        }
        Ok(snapshot)
    }
}

impl PuzzleAssembly {
    pub fn snapshot(&self, stats: &PuzzleStats) -> PuzzleSnapshot {
        let pieces = self.pieces();
        PuzzleSnapshot {
            version: PUZZLE_SNAPSHOT_VERSION,
            dim: self.dim() as u32,
            rules: *self.rules(),
            positions: pieces.iter().map(|p| p.body.position.to_array()).collect(),
            scales: pieces.iter().map(|p| p.body.scale.to_array()).collect(),
            sizes: pieces.iter().map(|p| p.body.size.to_array()).collect(),
            components: self
                .components()
                .iter()
                .map(|component| component.iter().map(|&id| id as u32).collect())
                .collect(),
            stats: stats.clone(),
        }
    }

    /// Rebuilds an assembly from a snapshot, rejecting mismatched tables
    /// and component sets that do not partition the pieces.
    pub fn restore(snapshot: &PuzzleSnapshot) -> CoreResult<Self> {
        if snapshot.version != PUZZLE_SNAPSHOT_VERSION {
            warn!("rejected puzzle snapshot version {}", snapshot.version);
            return Err(CoreError::Codec(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        let dim = snapshot.dim as usize;
        let total = dim * dim;
        if snapshot.positions.len() != total
            || snapshot.scales.len() != total
            || snapshot.sizes.len() != total
        {
            warn!("rejected puzzle snapshot: piece tables do not match a {dim}x{dim} grid");
            return Err(CoreError::PieceCount {
                requested: snapshot.positions.len(),
            });
        }
        let pieces = (0..total)
            .map(|id| PuzzlePiece {
                id,
                neighbors: grid_neighbors(id, dim),
                body: PieceBody {
                    position: Vec3::from_array(snapshot.positions[id]),
                    scale: Vec3::from_array(snapshot.scales[id]),
                    size: Vec3::from_array(snapshot.sizes[id]),
                },
            })
            .collect();
        let components = snapshot
            .components
            .iter()
            .map(|component| component.iter().map(|&id| id as usize).collect())
            .collect();
        let assembly = PuzzleAssembly::from_pieces(dim, pieces, snapshot.rules)
            .and_then(|assembly| assembly.with_components(components))
            .inspect_err(|err| warn!("rejected puzzle snapshot: {err}"))?;
        debug!(
            "restored puzzle with {} pieces in {} component(s)",
            assembly.len(),
            assembly.component_count()
        );
        Ok(assembly)
    }
}
