use rkyv::{Archive, Deserialize, Serialize};

/// Per-session puzzle statistics. Time is measured against a clock owned by
/// the caller, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Archive, Serialize, Deserialize)]
pub struct PuzzleStats {
    pub picture_name: String,
    pub connecting_moves: u32,
    pub non_connecting_moves: u32,
    started_at: Option<f64>,
    stopped_at: Option<f64>,
}

impl PuzzleStats {
    pub fn new(picture_name: impl Into<String>) -> Self {
        Self {
            picture_name: picture_name.into(),
            ..Self::default()
        }
    }

    pub fn register_move(&mut self, connected: bool) {
        if connected {
            self.connecting_moves += 1;
        } else {
            self.non_connecting_moves += 1;
        }
    }

    pub fn total_moves(&self) -> u32 {
        self.connecting_moves + self.non_connecting_moves
    }

    pub fn start(&mut self, now: f64) {
        self.started_at = Some(now);
        self.stopped_at = None;
    }

    pub fn stop(&mut self, now: f64) {
        if self.started_at.is_some() && self.stopped_at.is_none() {
            self.stopped_at = Some(now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none()
    }

    /// Seconds since `start`, frozen once `stop` has been called.
    pub fn elapsed(&self, now: f64) -> f64 {
        match (self.started_at, self.stopped_at) {
            (Some(start), Some(stop)) => (stop - start).max(0.0),
            (Some(start), None) => (now - start).max(0.0),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_are_split_by_outcome() {
        let mut stats = PuzzleStats::new("Bonobo");
        stats.register_move(true);
        stats.register_move(false);
        stats.register_move(false);
        assert_eq!(stats.connecting_moves, 1);
        assert_eq!(stats.non_connecting_moves, 2);
        assert_eq!(stats.total_moves(), 3);
    }

    #[test]
    fn elapsed_freezes_after_stop() {
        let mut stats = PuzzleStats::default();
        assert_eq!(stats.elapsed(5.0), 0.0);
        stats.start(10.0);
        assert_eq!(stats.elapsed(12.5), 2.5);
        stats.stop(14.0);
        stats.stop(20.0);
        assert!(!stats.is_running());
        assert_eq!(stats.elapsed(100.0), 4.0);
    }
}
