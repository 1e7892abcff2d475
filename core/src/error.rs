use crate::grid::Direction;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("piece count {requested} does not form a square grid of at least 2x2")]
    PieceCount { requested: usize },
    #[error("piece {id} does not exist (puzzle has {total} pieces)")]
    UnknownPiece { id: usize, total: usize },
    #[error("piece {piece} has a broken {dir:?} link to {neighbor}")]
    BrokenNeighbor {
        piece: usize,
        dir: Direction,
        neighbor: usize,
    },
    #[error("component table is not a partition: {detail}")]
    Partition { detail: String },
    #[error("snapshot codec failed: {0}")]
    Codec(String),
    #[error("unknown gesture '{name}'")]
    UnknownGesture { name: String },
    #[error("user {user} is not tracked")]
    UnknownUser { user: u32 },
}

pub type CoreResult<T> = Result<T, CoreError>;
