use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glam::Vec3;
use minigames_core::{
    Gesture, GestureConfig, GestureListener, GestureTracker, Joint, NavigationKey, SkeletonFrame,
};
use serde::Deserialize;

use crate::err_msg;

/// One line of a skeleton trace. Joints missing from the map are untracked.
#[derive(Debug, Deserialize)]
struct TraceLine {
    t: f32,
    #[serde(default)]
    joints: HashMap<Joint, [f32; 3]>,
}

impl TraceLine {
    fn frame(&self) -> SkeletonFrame {
        let mut frame = SkeletonFrame::new();
        for (joint, [x, y, z]) in &self.joints {
            frame.set(*joint, Vec3::new(*x, *y, *z));
        }
        frame
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ReplaySummary {
    pub frames: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub keys: usize,
    /// Event lines in the order they were reported.
    pub events: Vec<String>,
}

impl ReplaySummary {
    fn log(&mut self, line: String) {
        println!("{line}");
        self.events.push(line);
    }
}

struct ReplayListener<'a> {
    summary: &'a mut ReplaySummary,
    now: f32,
}

impl GestureListener for ReplayListener<'_> {
    fn gesture_in_progress(
        &mut self,
        user: u32,
        gesture: Gesture,
        progress: f32,
        _joint: Joint,
        _screen_pos: Vec3,
    ) {
        let now = self.now;
        self.summary.log(format!(
            "{now:.3} user {user} {} {:.0}%",
            gesture.as_str(),
            progress * 100.0
        ));
    }

    fn gesture_completed(
        &mut self,
        user: u32,
        gesture: Gesture,
        joint: Joint,
        screen_pos: Vec3,
    ) -> bool {
        let now = self.now;
        self.summary.completed += 1;
        self.summary.log(format!(
            "{now:.3} user {user} {} completed by {} at ({:.2}, {:.2}, {:.2})",
            gesture.as_str(),
            joint.as_str(),
            screen_pos.x,
            screen_pos.y,
            screen_pos.z
        ));
        true
    }

    fn gesture_cancelled(&mut self, user: u32, gesture: Gesture, _joint: Joint) -> bool {
        let now = self.now;
        self.summary.cancelled += 1;
        self.summary
            .log(format!("{now:.3} user {user} {} cancelled", gesture.as_str()));
        true
    }

    fn navigation_key(&mut self, user: u32, key: NavigationKey) {
        let now = self.now;
        self.summary.keys += 1;
        self.summary
            .log(format!("{now:.3} user {user} key {}", key.as_str()));
    }
}

pub(crate) fn replay_file(
    path: &Path,
    user: u32,
    gestures: &[Gesture],
    config: GestureConfig,
) -> Result<ReplaySummary, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    replay(BufReader::new(file), user, gestures, config)
}

/// Feeds every trace line to a fresh tracker detecting `gestures` for
/// `user`. Lines must be in timestamp order.
pub(crate) fn replay<R: BufRead>(
    reader: R,
    user: u32,
    gestures: &[Gesture],
    config: GestureConfig,
) -> Result<ReplaySummary, Box<dyn std::error::Error>> {
    let mut summary = ReplaySummary::default();
    let mut tracker = GestureTracker::new(config);
    let mut last_t = f32::NEG_INFINITY;
    {
        let mut listener = ReplayListener {
            summary: &mut summary,
            now: 0.0,
        };
        tracker.add_user(user, &mut listener);
        for gesture in gestures {
            tracker.detect_gesture(user, *gesture)?;
        }

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let row: TraceLine = serde_json::from_str(&line)
                .map_err(|err| err_msg(format!("invalid trace line {}: {err}", idx + 1)))?;
            if row.t < last_t {
                return Err(err_msg(format!(
                    "trace line {} goes back in time ({} < {last_t})",
                    idx + 1,
                    row.t
                )));
            }
            last_t = row.t;
            listener.now = row.t;
            tracker.update(user, row.t, &row.frame(), &mut listener)?;
            listener.summary.frames += 1;
        }
        tracker.remove_user(user, &mut listener);
    }
    if summary.frames == 0 {
        return Err(err_msg("skeleton trace is empty"));
    }
    Ok(summary)
}
