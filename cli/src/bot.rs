use glam::Vec3;
use minigames_core::{
    CoreResult, GameContext, ProgressStore, PuzzleAssembly, PuzzleSession, SceneLoader,
};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use crate::err_msg;

#[derive(clap::Args, Debug, Clone)]
pub(crate) struct BotArgs {
    /// Random offset of a drop around the flush position, in world units.
    #[arg(long, default_value_t = 1.0)]
    jitter: f32,
    /// Share of drops that deliberately land away from any neighbor.
    #[arg(long, default_value_t = 0.15)]
    miss_rate: f32,
    #[arg(long, default_value_t = 1000)]
    max_moves: u32,
    #[arg(long, default_value_t = 0.4)]
    think_min_s: f64,
    #[arg(long, default_value_t = 2.5)]
    think_max_s: f64,
}

impl BotArgs {
    pub(crate) fn config(&self) -> Result<BotConfig, Box<dyn std::error::Error>> {
        let config = BotConfig {
            jitter: self.jitter,
            miss_rate: self.miss_rate,
            max_moves: self.max_moves,
            think_min_s: self.think_min_s,
            think_max_s: self.think_max_s,
        };
        validate_bot_config(config)?;
        Ok(config)
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct BotConfig {
    pub jitter: f32,
    pub miss_rate: f32,
    pub max_moves: u32,
    pub think_min_s: f64,
    pub think_max_s: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            jitter: 1.0,
            miss_rate: 0.15,
            max_moves: 1000,
            think_min_s: 0.4,
            think_max_s: 2.5,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct BotOutcome {
    pub won: bool,
    pub moves: u32,
    /// Simulated clock at the last move, in seconds.
    pub finished_at: f64,
}

fn validate_bot_config(config: BotConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=2.0).contains(&config.jitter) {
        return Err(err_msg("jitter must be between 0 and 2"));
    }
    if !(0.0..1.0).contains(&config.miss_rate) {
        return Err(err_msg("miss-rate must be at least 0 and below 1"));
    }
    if config.max_moves == 0 {
        return Err(err_msg("max-moves must be positive"));
    }
    if config.think_min_s < 0.0 || config.think_max_s < config.think_min_s {
        return Err(err_msg("invalid think-time range"));
    }
    Ok(())
}

/// Grows the component holding piece 0: each move drops a piece that
/// borders it next to its solved spot, then runs the per-frame win check.
pub(crate) fn run_solver<P: ProgressStore, S: SceneLoader>(
    session: &mut PuzzleSession,
    ctx: &mut GameContext<P, S>,
    config: BotConfig,
    rng: &mut StdRng,
) -> CoreResult<BotOutcome> {
    let mut now = 0.0;
    let mut moves = 0;
    while !session.is_won() && moves < config.max_moves {
        now += rng.random_range(config.think_min_s..=config.think_max_s);
        let frontier = frontier_pairs(session.assembly())?;
        if frontier.is_empty() {
            break;
        }
        let (piece, anchor) = frontier[rng.random_range(0..frontier.len())];

        let assembly = session.assembly();
        let offset = assembly.solved_position(piece, Vec3::ZERO)?
            - assembly.solved_position(anchor, Vec3::ZERO)?;
        let mut target = assembly.piece(anchor)?.body.position + offset;
        if rng.random::<f32>() < config.miss_rate {
            target += miss_offset(rng, assembly.rules().snap_distance);
        } else {
            let jitter = config.jitter;
            target += Vec3::new(
                rng.random_range(-jitter..=jitter),
                rng.random_range(-jitter..=jitter),
                0.0,
            );
        }
        let current = assembly.piece(piece)?.body.position;

        session.drag(piece, target - current)?;
        let report = session.release(piece)?;
        moves += 1;
        debug!(
            "bot move {moves}: piece {piece} next to {anchor}, merged {}",
            report.merged
        );
        session.update(ctx, now);
    }
    Ok(BotOutcome {
        won: session.is_won(),
        moves,
        finished_at: now,
    })
}

/// `(piece, neighbor)` pairs where the neighbor already belongs to piece
/// 0's component and the piece does not.
fn frontier_pairs(assembly: &PuzzleAssembly) -> CoreResult<Vec<(usize, usize)>> {
    let anchored = assembly.component_of(0)?;
    let mut pairs = Vec::new();
    for piece in assembly.pieces() {
        if anchored.contains(&piece.id) {
            continue;
        }
        for neighbor in piece.neighbors.iter().flatten() {
            if anchored.contains(neighbor) {
                pairs.push((piece.id, *neighbor));
            }
        }
    }
    Ok(pairs)
}

/// Offset at least twice the snap distance in a random direction.
fn miss_offset(rng: &mut StdRng, snap_distance: f32) -> Vec3 {
    let angle = rng.random_range(0.0f32..std::f32::consts::TAU);
    let distance = snap_distance * rng.random_range(2.0f32..=4.0f32);
    Vec3::new(angle.cos() * distance, angle.sin() * distance, 0.0)
}
