//! Skeletal gesture recognition: per-(user, gesture) state machines fed by
//! one immutable joint frame per pass.

pub mod config;
pub mod data;
pub mod joint;
pub mod recognizer;
pub mod tracker;

pub use config::GestureConfig;
pub use data::{Gesture, GestureData, NavigationKey};
pub use joint::{Joint, SkeletonFrame, JOINT_COUNT};
pub use recognizer::check_for_gesture;
pub use tracker::{GestureListener, GestureTracker};
