use glam::Vec3;
use tracing::{debug, info};

use crate::catalog::PUZZLE_MINIGAME;
use crate::context::{GameContext, ProgressStore, SceneLoader};
use crate::error::CoreResult;
use crate::geometry::{camera_frame, CameraFrame};
use crate::puzzle::{ConnectionReport, PuzzleAssembly, PuzzleImage, PuzzleRules};
use crate::snapshot::PuzzleSnapshot;
use crate::stats::PuzzleStats;

/// One play-through of the jigsaw minigame, driven frame by frame.
#[derive(Clone, Debug)]
pub struct PuzzleSession {
    assembly: PuzzleAssembly,
    stats: PuzzleStats,
    won: bool,
}

impl PuzzleSession {
    pub fn start<P: ProgressStore, S: SceneLoader>(
        ctx: &mut GameContext<P, S>,
        image: &PuzzleImage,
        rules: PuzzleRules,
        seed: u32,
        now: f64,
    ) -> CoreResult<Self> {
        let dim = ctx.puzzle_dim();
        let assembly = PuzzleAssembly::setup(image, dim * dim, rules, seed)?;
        let mut stats = PuzzleStats::new(image.name.clone());
        stats.start(now);
        ctx.progress.set_played(PUZZLE_MINIGAME);
        info!(
            "puzzle session started: '{}' with {} pieces",
            image.name,
            assembly.len()
        );
        Ok(Self {
            assembly,
            stats,
            won: false,
        })
    }

    /// Resumes a saved session. The clock restarts at `now` with the
    /// recorded move counts kept.
    pub fn resume(snapshot: &PuzzleSnapshot, now: f64) -> CoreResult<Self> {
        let assembly = PuzzleAssembly::restore(snapshot)?;
        let mut stats = snapshot.stats.clone();
        let won = assembly.is_won();
        if !won {
            stats.start(now);
        }
        Ok(Self {
            assembly,
            stats,
            won,
        })
    }

    pub fn assembly(&self) -> &PuzzleAssembly {
        &self.assembly
    }

    pub fn stats(&self) -> &PuzzleStats {
        &self.stats
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn camera(&self) -> Option<CameraFrame> {
        self.assembly.bounds().map(|bounds| camera_frame(&bounds))
    }

    pub fn drag(&mut self, piece: usize, delta: Vec3) -> CoreResult<()> {
        self.assembly.drag_component(piece, delta)
    }

    /// Drop of a dragged piece: try to join its group to the neighbors it
    /// now touches.
    pub fn release(&mut self, piece: usize) -> CoreResult<ConnectionReport> {
        let report = self.assembly.check_possible_connection(piece)?;
        self.stats.register_move(report.connected());
        debug!(
            "release of piece {piece}: merged {}, {} component(s) left",
            report.merged,
            self.assembly.component_count()
        );
        Ok(report)
    }

    /// Per-frame victory check. Returns true on the one frame the win is
    /// first observed.
    pub fn update<P: ProgressStore, S: SceneLoader>(
        &mut self,
        ctx: &mut GameContext<P, S>,
        now: f64,
    ) -> bool {
        if self.won || !self.assembly.is_won() {
            return false;
        }
        self.won = true;
        self.stats.stop(now);
        info!(
            "puzzle solved in {:.1}s with {} moves",
            self.stats.elapsed(now),
            self.stats.total_moves()
        );
        ctx.win_minigame();
        true
    }

    pub fn snapshot(&self) -> PuzzleSnapshot {
        self.assembly.snapshot(&self.stats)
    }
}
