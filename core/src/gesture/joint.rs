//! Skeleton joints and the per-frame joint snapshot consumed by gesture
//! recognition.

use glam::Vec3;
use serde::Deserialize;

// ── Joint definitions ──────────────────────────────────────

/// Tracked body joints. World y grows upward and z grows away from the
/// sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    HipCenter,
    Neck,
    Head,
    ShoulderLeft,
    ElbowLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    HandRight,
    HipLeft,
    KneeLeft,
    HipRight,
    KneeRight,
}

/// Number of joints in a skeleton frame.
pub const JOINT_COUNT: usize = 13;

impl Joint {
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::HipCenter,
        Joint::Neck,
        Joint::Head,
        Joint::ShoulderLeft,
        Joint::ElbowLeft,
        Joint::HandLeft,
        Joint::ShoulderRight,
        Joint::ElbowRight,
        Joint::HandRight,
        Joint::HipLeft,
        Joint::KneeLeft,
        Joint::HipRight,
        Joint::KneeRight,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HipCenter => "hip_center",
            Self::Neck => "neck",
            Self::Head => "head",
            Self::ShoulderLeft => "shoulder_left",
            Self::ElbowLeft => "elbow_left",
            Self::HandLeft => "hand_left",
            Self::ShoulderRight => "shoulder_right",
            Self::ElbowRight => "elbow_right",
            Self::HandRight => "hand_right",
            Self::HipLeft => "hip_left",
            Self::KneeLeft => "knee_left",
            Self::HipRight => "hip_right",
            Self::KneeRight => "knee_right",
        }
    }

    /// Elbow on the same arm, for hand joints.
    pub fn elbow(&self) -> Option<Joint> {
        match self {
            Self::HandLeft => Some(Self::ElbowLeft),
            Self::HandRight => Some(Self::ElbowRight),
            _ => None,
        }
    }
}

// ── Skeleton frame ─────────────────────────────────────────

/// One frame of joint positions with per-joint tracking flags. A pass over
/// a user's gestures reads a single frame and never mutates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkeletonFrame {
    positions: [Vec3; JOINT_COUNT],
    tracked: [bool; JOINT_COUNT],
}

impl Default for SkeletonFrame {
    fn default() -> Self {
        Self {
            positions: [Vec3::ZERO; JOINT_COUNT],
            tracked: [false; JOINT_COUNT],
        }
    }
}

impl SkeletonFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`SkeletonFrame::set`].
    pub fn with(mut self, joint: Joint, position: Vec3) -> Self {
        self.set(joint, position);
        self
    }

    /// Records a tracked joint position.
    pub fn set(&mut self, joint: Joint, position: Vec3) {
        self.positions[joint.index()] = position;
        self.tracked[joint.index()] = true;
    }

    /// Marks a joint as lost; its last position is kept.
    pub fn untrack(&mut self, joint: Joint) {
        self.tracked[joint.index()] = false;
    }

    pub fn position(&self, joint: Joint) -> Vec3 {
        self.positions[joint.index()]
    }

    pub fn is_tracked(&self, joint: Joint) -> bool {
        self.tracked[joint.index()]
    }

    pub fn all_tracked(&self, joints: &[Joint]) -> bool {
        joints.iter().all(|joint| self.is_tracked(*joint))
    }

    /// `a - b`, when both joints are tracked.
    pub fn offset(&self, a: Joint, b: Joint) -> Option<Vec3> {
        (self.is_tracked(a) && self.is_tracked(b)).then(|| self.position(a) - self.position(b))
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.iter().filter(|tracked| **tracked).count()
    }
}
