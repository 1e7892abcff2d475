//! Game-state context handed explicitly to minigame sessions: which
//! minigames have been played, where to go when one is won, and the
//! difficulty picked in the hub.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::catalog::{minigame_by_name, MINIGAME_CATALOG};
use crate::grid::difficulty_dim;

pub const MINIGAME_SELECTION_SCENE: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneRef {
    Name(String),
    Index(usize),
}

/// Persists the per-minigame "played" flag.
pub trait ProgressStore {
    fn set_played(&mut self, minigame: &str);
    fn get_played(&self, minigame: &str) -> bool;
}

/// Switches scenes (fades and loading happen behind this seam).
pub trait SceneLoader {
    fn load_scene(&mut self, scene: SceneRef);
}

/// In-memory played flags for every minigame in the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinigameStates {
    played: BTreeMap<&'static str, bool>,
}

impl Default for MinigameStates {
    fn default() -> Self {
        Self {
            played: MINIGAME_CATALOG
                .iter()
                .map(|entry| (entry.name, false))
                .collect(),
        }
    }
}

impl MinigameStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.played.iter().map(|(name, played)| (*name, *played))
    }
}

impl ProgressStore for MinigameStates {
    fn set_played(&mut self, minigame: &str) {
        let Some(entry) = minigame_by_name(minigame) else {
            debug!("ignoring played flag for unknown minigame '{minigame}'");
            return;
        };
        self.played.insert(entry.name, true);
    }

    fn get_played(&self, minigame: &str) -> bool {
        minigame_by_name(minigame)
            .and_then(|entry| self.played.get(entry.name).copied())
            .unwrap_or(false)
    }
}

/// Records every scene request instead of loading anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingSceneLoader {
    pub loaded: Vec<SceneRef>,
}

impl SceneLoader for RecordingSceneLoader {
    fn load_scene(&mut self, scene: SceneRef) {
        self.loaded.push(scene);
    }
}

pub struct GameContext<P, S> {
    pub progress: P,
    pub scenes: S,
    pub difficulty: u32,
}

impl<P: ProgressStore, S: SceneLoader> GameContext<P, S> {
    pub fn new(progress: P, scenes: S, difficulty: u32) -> Self {
        Self {
            progress,
            scenes,
            difficulty,
        }
    }

    /// Side length of the puzzle grid for the selected difficulty.
    pub fn puzzle_dim(&self) -> usize {
        difficulty_dim(self.difficulty)
    }

    pub fn win_minigame(&mut self) {
        info!("minigame won, returning to selection");
        self.scenes
            .load_scene(SceneRef::Index(MINIGAME_SELECTION_SCENE));
    }
}

impl GameContext<MinigameStates, RecordingSceneLoader> {
    pub fn in_memory(difficulty: u32) -> Self {
        Self::new(
            MinigameStates::new(),
            RecordingSceneLoader::default(),
            difficulty,
        )
    }
}
