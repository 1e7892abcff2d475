pub mod catalog;
pub mod codec;
pub mod context;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod grid;
pub mod puzzle;
pub mod scramble;
pub mod session;
pub mod snapshot;
pub mod stats;

pub use codec::{decode, encode};
pub use context::{GameContext, MinigameStates, ProgressStore, SceneLoader, SceneRef};
pub use error::{CoreError, CoreResult};
pub use geometry::{Aabb, PieceBody};
pub use gesture::{
    Gesture, GestureConfig, GestureData, GestureListener, GestureTracker, Joint, NavigationKey,
    SkeletonFrame,
};
pub use grid::{Direction, GridDim};
pub use puzzle::{ConnectionReport, PuzzleAssembly, PuzzleImage, PuzzlePiece, PuzzleRules};
pub use session::PuzzleSession;
pub use snapshot::{PuzzleSnapshot, PUZZLE_SNAPSHOT_VERSION};
pub use stats::PuzzleStats;
