use std::str::FromStr;

use glam::Vec3;

use super::joint::Joint;
use crate::error::CoreError;

// ── Gesture types ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gesture {
    RaiseRightHand,
    RaiseLeftHand,
    Psi,
    Stop,
    Wave,
    Click,
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    RightHandCursor,
    LeftHandCursor,
    ZoomOut,
    ZoomIn,
    Wheel,
    Jump,
    Squat,
    Push,
    Pull,
    HoldRightHandRaised,
    HiddenGesture,
}

impl Gesture {
    pub const ALL: [Gesture; 21] = [
        Gesture::RaiseRightHand,
        Gesture::RaiseLeftHand,
        Gesture::Psi,
        Gesture::Stop,
        Gesture::Wave,
        Gesture::Click,
        Gesture::SwipeLeft,
        Gesture::SwipeRight,
        Gesture::SwipeUp,
        Gesture::SwipeDown,
        Gesture::RightHandCursor,
        Gesture::LeftHandCursor,
        Gesture::ZoomOut,
        Gesture::ZoomIn,
        Gesture::Wheel,
        Gesture::Jump,
        Gesture::Squat,
        Gesture::Push,
        Gesture::Pull,
        Gesture::HoldRightHandRaised,
        Gesture::HiddenGesture,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RaiseRightHand => "raise-right-hand",
            Self::RaiseLeftHand => "raise-left-hand",
            Self::Psi => "psi",
            Self::Stop => "stop",
            Self::Wave => "wave",
            Self::Click => "click",
            Self::SwipeLeft => "swipe-left",
            Self::SwipeRight => "swipe-right",
            Self::SwipeUp => "swipe-up",
            Self::SwipeDown => "swipe-down",
            Self::RightHandCursor => "right-hand-cursor",
            Self::LeftHandCursor => "left-hand-cursor",
            Self::ZoomOut => "zoom-out",
            Self::ZoomIn => "zoom-in",
            Self::Wheel => "wheel",
            Self::Jump => "jump",
            Self::Squat => "squat",
            Self::Push => "push",
            Self::Pull => "pull",
            Self::HoldRightHandRaised => "hold-right-hand-raised",
            Self::HiddenGesture => "hidden-gesture",
        }
    }

    /// Continuous gestures never complete; they report a live payload in
    /// `screen_pos` for as long as their pose holds.
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            Self::RightHandCursor | Self::LeftHandCursor | Self::ZoomOut | Self::ZoomIn | Self::Wheel
        )
    }

    /// Gestures that must be idle before this one may advance.
    pub fn conflicts(&self) -> &'static [Gesture] {
        match self {
            Self::ZoomOut => &[Self::ZoomIn, Self::Wheel],
            Self::ZoomIn => &[Self::ZoomOut, Self::Wheel],
            Self::Wheel => &[Self::ZoomIn, Self::ZoomOut],
            _ => &[],
        }
    }

    /// Key event emitted when this gesture completes.
    pub fn navigation_key(&self) -> Option<NavigationKey> {
        match self {
            Self::SwipeLeft => Some(NavigationKey::Left),
            Self::SwipeRight => Some(NavigationKey::Right),
            Self::Pull => Some(NavigationKey::Down),
            Self::HoldRightHandRaised => Some(NavigationKey::KeyO),
            Self::HiddenGesture => Some(NavigationKey::KeyI),
            _ => None,
        }
    }
}

impl FromStr for Gesture {
    type Err = CoreError;

    /// Accepts kebab-case, snake_case or CamelCase names in any letter case.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wanted: String = name
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Gesture::ALL
            .into_iter()
            .find(|gesture| gesture.as_str().replace('-', "") == wanted)
            .ok_or_else(|| CoreError::UnknownGesture {
                name: name.to_string(),
            })
    }
}

/// Discrete navigation input produced by some completed gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationKey {
    Left,
    Right,
    Down,
    KeyO,
    KeyI,
}

impl NavigationKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Down => "down",
            Self::KeyO => "o",
            Self::KeyI => "i",
        }
    }
}

// ── Per-(user, gesture) record ─────────────────────────────

/// Recognition state of one gesture for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureData {
    pub user: u32,
    pub gesture: Gesture,
    /// Position in the gesture's own state machine; 0 waits for entry.
    pub state: u8,
    /// Time of the last state transition.
    pub timestamp: f32,
    pub joint: Joint,
    pub joint_pos: Vec3,
    /// Normalized cursor position in x/y; z carries the zoom factor or
    /// wheel angle.
    pub screen_pos: Vec3,
    pub tag_float: f32,
    pub tag_vector: Vec3,
    pub tag_vector2: Vec3,
    pub progress: f32,
    pub complete: bool,
    pub cancelled: bool,
    pub check_for_gestures: Vec<Gesture>,
    pub start_tracking_at_time: f32,
}

impl GestureData {
    pub fn new(user: u32, gesture: Gesture) -> Self {
        Self {
            user,
            gesture,
            state: 0,
            timestamp: 0.0,
            joint: Joint::HipCenter,
            joint_pos: Vec3::ZERO,
            screen_pos: Vec3::ZERO,
            tag_float: 0.0,
            tag_vector: Vec3::ZERO,
            tag_vector2: Vec3::ZERO,
            progress: 0.0,
            complete: false,
            cancelled: false,
            check_for_gestures: gesture.conflicts().to_vec(),
            start_tracking_at_time: 0.0,
        }
    }

    /// Re-arms the record; it is ignored until `start_tracking_at_time`.
    pub fn reset(&mut self, start_tracking_at_time: f32) {
        *self = Self {
            start_tracking_at_time,
            ..Self::new(self.user, self.gesture)
        };
    }

    pub fn is_idle(&self) -> bool {
        self.state == 0 && self.progress == 0.0
    }
}
