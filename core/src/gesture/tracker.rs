//! Per-user gesture tables and listener dispatch.

use std::collections::BTreeMap;

use glam::Vec3;
use tracing::{debug, info};

use super::config::GestureConfig;
use super::data::{Gesture, GestureData, NavigationKey};
use super::joint::{Joint, SkeletonFrame};
use super::recognizer::check_for_gesture;
use crate::error::{CoreError, CoreResult};

// ── Listener ───────────────────────────────────────────────

/// Receives tracking and gesture events. The boolean returned from
/// `gesture_completed` / `gesture_cancelled` asks the tracker to re-arm
/// detection; `false` drops the gesture until it is detected again.
pub trait GestureListener {
    fn user_detected(&mut self, _user: u32) {}

    fn user_lost(&mut self, _user: u32) {}

    fn gesture_in_progress(
        &mut self,
        _user: u32,
        _gesture: Gesture,
        _progress: f32,
        _joint: Joint,
        _screen_pos: Vec3,
    ) {
    }

    fn gesture_completed(
        &mut self,
        _user: u32,
        _gesture: Gesture,
        _joint: Joint,
        _screen_pos: Vec3,
    ) -> bool {
        true
    }

    fn gesture_cancelled(&mut self, _user: u32, _gesture: Gesture, _joint: Joint) -> bool {
        true
    }

    fn navigation_key(&mut self, _user: u32, _key: NavigationKey) {}
}

// ── Tracker ────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct UserGestures {
    gestures: Vec<GestureData>,
    /// No gesture of this user is checked before this time.
    tracking_gate: f32,
    last_timestamp: f32,
}

#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    config: GestureConfig,
    users: BTreeMap<u32, UserGestures>,
}

impl GestureTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            users: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn users(&self) -> impl Iterator<Item = u32> + '_ {
        self.users.keys().copied()
    }

    pub fn is_tracked(&self, user: u32) -> bool {
        self.users.contains_key(&user)
    }

    pub fn add_user<L: GestureListener + ?Sized>(&mut self, user: u32, listener: &mut L) {
        if self.users.contains_key(&user) {
            return;
        }
        self.users.insert(user, UserGestures::default());
        info!("user {user} detected");
        listener.user_detected(user);
    }

    pub fn remove_user<L: GestureListener + ?Sized>(&mut self, user: u32, listener: &mut L) {
        if self.users.remove(&user).is_some() {
            info!("user {user} lost");
            listener.user_lost(user);
        }
    }

    /// Starts (or re-arms) detection of `gesture` for `user`.
    pub fn detect_gesture(&mut self, user: u32, gesture: Gesture) -> CoreResult<()> {
        let start = self.config.min_time_between_same_gestures;
        let entry = self.user_mut(user)?;
        let restart_at = entry.last_timestamp + start;
        match entry.gestures.iter_mut().find(|data| data.gesture == gesture) {
            Some(data) => data.reset(restart_at),
            None => entry.gestures.push(GestureData::new(user, gesture)),
        }
        debug!("user {user} now detecting {}", gesture.as_str());
        Ok(())
    }

    pub fn gesture(&self, user: u32, gesture: Gesture) -> Option<&GestureData> {
        self.users
            .get(&user)?
            .gestures
            .iter()
            .find(|data| data.gesture == gesture)
    }

    pub fn gestures(&self, user: u32) -> &[GestureData] {
        self.users
            .get(&user)
            .map(|entry| entry.gestures.as_slice())
            .unwrap_or(&[])
    }

    /// Runs one pass over every gesture of `user` against `frame`, then
    /// reports the outcome to `listener`.
    pub fn update<L: GestureListener + ?Sized>(
        &mut self,
        user: u32,
        timestamp: f32,
        frame: &SkeletonFrame,
        listener: &mut L,
    ) -> CoreResult<()> {
        let config = self.config;
        let entry = self.user_mut(user)?;
        entry.last_timestamp = timestamp;
        if timestamp < entry.tracking_gate {
            return Ok(());
        }

        let mut keys = Vec::new();
        for idx in 0..entry.gestures.len() {
            let data = &entry.gestures[idx];
            if data.start_tracking_at_time > timestamp || conflicts_active(&entry.gestures, data) {
                continue;
            }
            let data = &mut entry.gestures[idx];
            let was_complete = data.complete;
            if let Some(key) = check_for_gesture(user, data, timestamp, frame, &config) {
                keys.push(key);
            }
            if data.complete && !was_complete {
                entry.tracking_gate = timestamp + config.min_time_between_gestures;
            }
        }

        for key in keys {
            debug!("user {user} navigation key {}", key.as_str());
            listener.navigation_key(user, key);
        }

        let mut restart_all = false;
        let mut restart = Vec::new();
        let mut discard = Vec::new();
        for data in &entry.gestures {
            if data.complete {
                if listener.gesture_completed(user, data.gesture, data.joint, data.screen_pos) {
                    restart_all = true;
                } else {
                    discard.push(data.gesture);
                }
            } else if data.cancelled {
                if listener.gesture_cancelled(user, data.gesture, data.joint) {
                    restart.push(data.gesture);
                } else {
                    discard.push(data.gesture);
                }
            } else if data.progress >= config.in_progress_threshold {
                listener.gesture_in_progress(
                    user,
                    data.gesture,
                    data.progress,
                    data.joint,
                    data.screen_pos,
                );
            }
        }

        // declined records stop being detected
        if !discard.is_empty() {
            entry.gestures.retain(|data| !discard.contains(&data.gesture));
            for gesture in &discard {
                debug!("user {user} dropped {}", gesture.as_str());
            }
        }

        if restart_all {
            self.reset_user_gestures(user);
        } else {
            for gesture in restart {
                self.reset_gesture(user, gesture);
            }
        }
        Ok(())
    }

    /// Re-arms one gesture. Returns false if it is not being detected.
    pub fn reset_gesture(&mut self, user: u32, gesture: Gesture) -> bool {
        let delay = self.config.min_time_between_same_gestures;
        let Some(entry) = self.users.get_mut(&user) else {
            return false;
        };
        let restart_at = entry.last_timestamp + delay;
        match entry.gestures.iter_mut().find(|data| data.gesture == gesture) {
            Some(data) => {
                data.reset(restart_at);
                true
            }
            None => false,
        }
    }

    pub fn reset_user_gestures(&mut self, user: u32) {
        let delay = self.config.min_time_between_same_gestures;
        if let Some(entry) = self.users.get_mut(&user) {
            let restart_at = entry.last_timestamp + delay;
            for data in &mut entry.gestures {
                data.reset(restart_at);
            }
        }
    }

    /// Stops detecting `gesture`. Returns false if it was not detected.
    pub fn delete_gesture(&mut self, user: u32, gesture: Gesture) -> bool {
        let Some(entry) = self.users.get_mut(&user) else {
            return false;
        };
        let before = entry.gestures.len();
        entry.gestures.retain(|data| data.gesture != gesture);
        entry.gestures.len() != before
    }

    pub fn is_gesture_complete(&mut self, user: u32, gesture: Gesture, reset_on_complete: bool) -> bool {
        let complete = self
            .gesture(user, gesture)
            .is_some_and(|data| data.complete);
        if complete && reset_on_complete {
            self.reset_gesture(user, gesture);
        }
        complete
    }

    pub fn gesture_progress(&self, user: u32, gesture: Gesture) -> f32 {
        self.gesture(user, gesture)
            .map(|data| data.progress)
            .unwrap_or(0.0)
    }

    pub fn gesture_screen_pos(&self, user: u32, gesture: Gesture) -> Vec3 {
        self.gesture(user, gesture)
            .map(|data| data.screen_pos)
            .unwrap_or(Vec3::ZERO)
    }

    fn user_mut(&mut self, user: u32) -> CoreResult<&mut UserGestures> {
        self.users
            .get_mut(&user)
            .ok_or(CoreError::UnknownUser { user })
    }
}

/// True while any gesture that `data` lists as conflicting has progress.
fn conflicts_active(gestures: &[GestureData], data: &GestureData) -> bool {
    data.check_for_gestures.iter().any(|conflict| {
        gestures
            .iter()
            .any(|other| other.gesture == *conflict && other.progress > 0.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        detected: Vec<u32>,
        lost: Vec<u32>,
        completed: Vec<Gesture>,
        cancelled: Vec<Gesture>,
        keys: Vec<NavigationKey>,
        restart: bool,
    }

    impl GestureListener for Recorder {
        fn user_detected(&mut self, user: u32) {
            self.detected.push(user);
        }

        fn user_lost(&mut self, user: u32) {
            self.lost.push(user);
        }

        fn gesture_completed(&mut self, _: u32, gesture: Gesture, _: Joint, _: Vec3) -> bool {
            self.completed.push(gesture);
            self.restart
        }

        fn gesture_cancelled(&mut self, _: u32, gesture: Gesture, _: Joint) -> bool {
            self.cancelled.push(gesture);
            self.restart
        }

        fn navigation_key(&mut self, _: u32, key: NavigationKey) {
            self.keys.push(key);
        }
    }

    fn arms(left: Vec3, right: Vec3) -> SkeletonFrame {
        SkeletonFrame::new()
            .with(Joint::ElbowLeft, Vec3::new(-0.25, 1.25, 2.0))
            .with(Joint::ElbowRight, Vec3::new(0.25, 1.25, 2.0))
            .with(Joint::HandLeft, left)
            .with(Joint::HandRight, right)
    }

    #[test]
    fn test_users_come_and_go() {
        let mut tracker = GestureTracker::default();
        let mut recorder = Recorder::default();
        tracker.add_user(3, &mut recorder);
        tracker.add_user(3, &mut recorder);
        assert_eq!(recorder.detected, vec![3]);
        tracker.detect_gesture(3, Gesture::Wave).unwrap();
        tracker.remove_user(3, &mut recorder);
        assert_eq!(recorder.lost, vec![3]);
        assert!(tracker.gestures(3).is_empty());
        assert_eq!(
            tracker.detect_gesture(3, Gesture::Wave),
            Err(CoreError::UnknownUser { user: 3 })
        );
    }

    #[test]
    fn test_zoom_blocks_wheel() {
        let mut tracker = GestureTracker::default();
        let mut recorder = Recorder::default();
        tracker.add_user(1, &mut recorder);
        tracker.detect_gesture(1, Gesture::ZoomOut).unwrap();
        tracker.detect_gesture(1, Gesture::Wheel).unwrap();
        // hands together and raised: zoom-out entry, too close for the wheel
        let together = arms(Vec3::new(-0.0625, 1.5, 2.0), Vec3::new(0.0625, 1.5, 2.0));
        tracker.update(1, 0.0, &together, &mut recorder).unwrap();
        assert_eq!(tracker.gesture_progress(1, Gesture::ZoomOut), 0.3);
        // wheel distance now, but zoom-out is busy
        let apart = arms(Vec3::new(-0.25, 1.5, 2.0), Vec3::new(0.25, 1.5, 2.0));
        tracker.update(1, 0.25, &apart, &mut recorder).unwrap();
        assert_eq!(tracker.gesture_progress(1, Gesture::Wheel), 0.0);
        assert_eq!(tracker.gesture_screen_pos(1, Gesture::ZoomOut).z, 2.0);
    }

    #[test]
    fn test_completion_gates_user_and_restarts() {
        let mut tracker = GestureTracker::default();
        let mut recorder = Recorder {
            restart: true,
            ..Recorder::default()
        };
        tracker.add_user(1, &mut recorder);
        tracker.detect_gesture(1, Gesture::SwipeLeft).unwrap();
        let start = arms(Vec3::new(-0.25, 0.75, 2.0), Vec3::new(0.5, 1.25, 2.0));
        let end = arms(Vec3::new(-0.25, 0.75, 2.0), Vec3::new(0.25, 1.25, 2.0));
        tracker.update(1, 0.0, &start, &mut recorder).unwrap();
        tracker.update(1, 0.25, &end, &mut recorder).unwrap();
        assert_eq!(recorder.completed, vec![Gesture::SwipeLeft]);
        assert_eq!(recorder.keys, vec![NavigationKey::Left]);
        // restarted, and the user is gated for the cool-down
        assert!(tracker.gesture(1, Gesture::SwipeLeft).unwrap().is_idle());
        tracker.update(1, 0.5, &start, &mut recorder).unwrap();
        assert_eq!(tracker.gesture(1, Gesture::SwipeLeft).unwrap().state, 0);
        tracker.update(1, 1.0, &start, &mut recorder).unwrap();
        assert_eq!(tracker.gesture(1, Gesture::SwipeLeft).unwrap().state, 1);
    }

    #[test]
    fn test_complete_flag_resets_on_request() {
        let mut tracker = GestureTracker::default();
        let mut recorder = Recorder::default();
        tracker.add_user(1, &mut recorder);
        tracker.detect_gesture(1, Gesture::SwipeLeft).unwrap();
        tracker.users.get_mut(&1).unwrap().gestures[0].complete = true;
        assert!(tracker.is_gesture_complete(1, Gesture::SwipeLeft, false));
        assert!(tracker.is_gesture_complete(1, Gesture::SwipeLeft, true));
        assert!(!tracker.is_gesture_complete(1, Gesture::SwipeLeft, false));
        assert!(!tracker.is_gesture_complete(1, Gesture::Wave, true));
    }

    #[test]
    fn test_declined_completion_drops_the_gesture() {
        let mut tracker = GestureTracker::default();
        let mut recorder = Recorder::default();
        tracker.add_user(1, &mut recorder);
        tracker.detect_gesture(1, Gesture::SwipeLeft).unwrap();
        tracker.detect_gesture(1, Gesture::SwipeRight).unwrap();
        let start = arms(Vec3::new(-0.25, 0.75, 2.0), Vec3::new(0.5, 1.25, 2.0));
        let end = arms(Vec3::new(-0.25, 0.75, 2.0), Vec3::new(0.25, 1.25, 2.0));
        tracker.update(1, 0.0, &start, &mut recorder).unwrap();
        tracker.update(1, 0.25, &end, &mut recorder).unwrap();
        assert_eq!(recorder.completed, vec![Gesture::SwipeLeft]);
        assert!(tracker.gesture(1, Gesture::SwipeLeft).is_none());
        assert!(!tracker.is_gesture_complete(1, Gesture::SwipeLeft, false));
        assert_eq!(tracker.gestures(1).len(), 1);
        for step in 2..12 {
            tracker.update(1, step as f32 * 0.25, &end, &mut recorder).unwrap();
        }
        assert_eq!(recorder.completed.len(), 1);
        assert_eq!(recorder.keys, vec![NavigationKey::Left]);
    }

    #[test]
    fn test_cancelled_gesture_is_reported() {
        let mut tracker = GestureTracker::default();
        let mut recorder = Recorder::default();
        tracker.add_user(1, &mut recorder);
        tracker.detect_gesture(1, Gesture::SwipeLeft).unwrap();
        let start = arms(Vec3::new(-0.25, 0.75, 2.0), Vec3::new(0.5, 1.25, 2.0));
        let rest = arms(Vec3::new(-0.25, 0.75, 2.0), Vec3::new(0.25, 0.75, 2.0));
        tracker.update(1, 0.0, &start, &mut recorder).unwrap();
        tracker.update(1, 0.5, &rest, &mut recorder).unwrap();
        assert_eq!(recorder.cancelled, vec![Gesture::SwipeLeft]);
        assert!(tracker.gesture(1, Gesture::SwipeLeft).is_none());
        tracker.update(1, 0.75, &rest, &mut recorder).unwrap();
        assert_eq!(recorder.cancelled.len(), 1);
    }

    #[test]
    fn test_delete_gesture() {
        let mut tracker = GestureTracker::default();
        let mut recorder = Recorder::default();
        tracker.add_user(1, &mut recorder);
        tracker.detect_gesture(1, Gesture::Jump).unwrap();
        assert!(tracker.delete_gesture(1, Gesture::Jump));
        assert!(!tracker.delete_gesture(1, Gesture::Jump));
        assert!(!tracker.reset_gesture(1, Gesture::Jump));
    }
}
