//! Per-(user, gesture) state machines over skeleton frames.
//!
//! Every call to [`check_for_gesture`] advances one record by exactly one
//! frame. State 0 waits for an entry pose; later states either hold a pose
//! for a duration or wait for a follow-up motion inside a time window.
//! Untracked joints simply fail the current predicate.

use glam::Vec3;
use tracing::trace;

use super::config::GestureConfig;
use super::data::{Gesture, GestureData, NavigationKey};
use super::joint::{Joint, SkeletonFrame};

// ── Thresholds ─────────────────────────────────────────────

/// Window for each phase of a wave.
const WAVE_WINDOW: f32 = 1.5;
/// Window for the sideways swipes.
const SWIPE_SIDE_WINDOW: f32 = 0.5;
/// Window for vertical swipes, jumps, squats, pushes and pulls.
const MOTION_WINDOW: f32 = 1.5;
const ZOOM_WINDOW: f32 = 1.0;
const WHEEL_WINDOW: f32 = 1.5;
/// Seconds the arm must stay raised before the hold is evaluated.
const HOLD_RAISED_ARMING: f32 = 2.0;
const HIDDEN_ARMING: f32 = 3.0;
/// Maximum drift of a clicking hand.
const CLICK_STAY_RADIUS: f32 = 0.05;
/// Hand distance that maps to a zoom factor of 1.
const ZOOM_REFERENCE_DISTANCE: f32 = 0.5;

const ENTRY_PROGRESS: f32 = 0.3;
const SWIPE_ENTRY_PROGRESS: f32 = 0.5;
const ACTIVE_PROGRESS: f32 = 0.7;

const HANDS: [Joint; 2] = [Joint::HandRight, Joint::HandLeft];
const ARMS: [Joint; 4] = [
    Joint::HandLeft,
    Joint::ElbowLeft,
    Joint::HandRight,
    Joint::ElbowRight,
];

// ── State helpers ──────────────────────────────────────────

/// Latches `joint` at `position` and moves to the next state.
pub fn set_gesture_joint(data: &mut GestureData, timestamp: f32, joint: Joint, position: Vec3) {
    data.joint = joint;
    data.joint_pos = position;
    data.timestamp = timestamp;
    data.state += 1;
}

pub fn set_gesture_cancelled(data: &mut GestureData) {
    data.state = 0;
    data.progress = 0.0;
    data.cancelled = true;
}

/// Hold check: progress is the held fraction of `duration`; the gesture
/// completes once the hold reaches it and is cancelled if the pose breaks.
pub fn check_pose_complete(
    data: &mut GestureData,
    timestamp: f32,
    position: Vec3,
    in_pose: bool,
    duration: f32,
) {
    if !in_pose {
        set_gesture_cancelled(data);
        return;
    }
    let held = timestamp - data.timestamp;
    data.progress = if duration > 0.0 {
        (held / duration).clamp(0.0, 1.0)
    } else {
        1.0
    };
    if held >= duration {
        data.timestamp = timestamp;
        data.joint_pos = position;
        data.state += 1;
        data.complete = true;
    }
}

/// Maps the latched hand into [0,1]x[0,1] using the user's shoulder width
/// and neck-to-hip height as the calibration frame.
pub fn set_screen_pos(data: &mut GestureData, frame: &SkeletonFrame) {
    let hand = data.joint;
    if !HANDS.contains(&hand) || !frame.is_tracked(hand) {
        return;
    }
    let body = [
        Joint::HipCenter,
        Joint::Neck,
        Joint::ShoulderLeft,
        Joint::ShoulderRight,
    ];
    if frame.all_tracked(&body) {
        let neck_to_hips = frame.position(Joint::Neck) - frame.position(Joint::HipCenter);
        let right_to_left =
            frame.position(Joint::ShoulderRight) - frame.position(Joint::ShoulderLeft);
        data.tag_vector2.x = right_to_left.x;
        data.tag_vector2.y = neck_to_hips.y;
        let shoulder = if hand == Joint::HandRight {
            Joint::ShoulderRight
        } else {
            Joint::ShoulderLeft
        };
        data.tag_vector.x = frame.position(shoulder).x - data.tag_vector2.x / 2.0;
        data.tag_vector.y = frame.position(Joint::HipCenter).y;
    }
    if data.tag_vector2.x != 0.0 && data.tag_vector2.y != 0.0 {
        let relative = frame.position(hand) - data.tag_vector;
        data.screen_pos.x = (relative.x / data.tag_vector2.x).clamp(0.0, 1.0);
        data.screen_pos.y = (relative.y / data.tag_vector2.y).clamp(0.0, 1.0);
    }
}

/// Zoom factor from the current hand distance relative to `tag_float`.
pub fn set_zoom_factor(user: u32, data: &mut GestureData, initial_zoom: f32, frame: &SkeletonFrame) {
    let span = frame.position(Joint::HandRight) - frame.position(Joint::HandLeft);
    if data.tag_float == 0.0 || data.user != user {
        data.tag_float = ZOOM_REFERENCE_DISTANCE;
    }
    data.screen_pos.z = initial_zoom + span.length() / data.tag_float;
}

/// Signed angle in degrees between the latched and current hand-to-hand
/// vectors; positive when the right hand has risen.
pub fn set_wheel_rotation(data: &mut GestureData, initial: Vec3, current: Vec3) {
    if initial.length_squared() == 0.0 || current.length_squared() == 0.0 {
        data.screen_pos.z = 0.0;
        return;
    }
    let sign = if current.y - initial.y >= 0.0 { 1.0 } else { -1.0 };
    data.screen_pos.z = initial.angle_between(current).to_degrees() * sign;
}

// ── Entry point ────────────────────────────────────────────

/// Advances `data` by one frame. Completed records are left untouched.
/// Returns the navigation key of a gesture that completed on this frame.
pub fn check_for_gesture(
    user: u32,
    data: &mut GestureData,
    timestamp: f32,
    frame: &SkeletonFrame,
    config: &GestureConfig,
) -> Option<NavigationKey> {
    if data.complete {
        return None;
    }
    let hold = config.pose_complete_duration;
    match data.gesture {
        Gesture::RaiseRightHand => {
            hold_pose(data, timestamp, frame, Joint::HandRight, right_hand_raised, hold)
        }
        Gesture::RaiseLeftHand => {
            hold_pose(data, timestamp, frame, Joint::HandLeft, left_hand_raised, hold)
        }
        Gesture::Psi => hold_pose(data, timestamp, frame, Joint::HandRight, psi_pose, hold),
        Gesture::Stop => hold_pose(data, timestamp, frame, Joint::HandRight, stop_pose, hold),
        Gesture::Wave => wave(data, timestamp, frame),
        Gesture::Click => click(data, timestamp, frame, config.click_stay_duration),
        Gesture::SwipeLeft => motion(
            data,
            timestamp,
            frame,
            SWIPE_SIDE_WINDOW,
            swipe_left_entry,
            swipe_left_done,
        ),
        Gesture::SwipeRight => motion(
            data,
            timestamp,
            frame,
            SWIPE_SIDE_WINDOW,
            swipe_right_entry,
            swipe_right_done,
        ),
        Gesture::SwipeUp => motion(
            data,
            timestamp,
            frame,
            MOTION_WINDOW,
            swipe_up_entry,
            swipe_up_done,
        ),
        Gesture::SwipeDown => motion(
            data,
            timestamp,
            frame,
            MOTION_WINDOW,
            swipe_down_entry,
            swipe_down_done,
        ),
        Gesture::RightHandCursor => cursor(data, timestamp, frame, Joint::HandRight, Joint::HipRight),
        Gesture::LeftHandCursor => cursor(data, timestamp, frame, Joint::HandLeft, Joint::HipLeft),
        Gesture::ZoomOut => zoom(user, data, timestamp, frame, false),
        Gesture::ZoomIn => zoom(user, data, timestamp, frame, true),
        Gesture::Wheel => wheel(data, timestamp, frame),
        Gesture::Jump => motion(data, timestamp, frame, MOTION_WINDOW, jump_entry, jump_done),
        Gesture::Squat => motion(data, timestamp, frame, MOTION_WINDOW, squat_entry, squat_done),
        Gesture::Push => motion(data, timestamp, frame, MOTION_WINDOW, push_entry, push_done),
        Gesture::Pull => motion(data, timestamp, frame, MOTION_WINDOW, pull_entry, pull_done),
        Gesture::HoldRightHandRaised => armed_hold(
            data,
            timestamp,
            frame,
            HOLD_RAISED_ARMING,
            right_hand_over_head,
            right_hand_over_head,
            hold,
        ),
        Gesture::HiddenGesture => armed_hold(
            data,
            timestamp,
            frame,
            HIDDEN_ARMING,
            hidden_entry,
            hidden_hold,
            hold,
        ),
    }
    if !data.complete {
        return None;
    }
    trace!("user {user} completed {}", data.gesture.as_str());
    data.gesture.navigation_key()
}

// ── Gesture shapes ─────────────────────────────────────────

type Pose = fn(&SkeletonFrame) -> bool;
type Entry = fn(&SkeletonFrame) -> Option<Joint>;
type FollowUp = fn(&SkeletonFrame, &GestureData) -> bool;

fn hold_pose(
    data: &mut GestureData,
    timestamp: f32,
    frame: &SkeletonFrame,
    joint: Joint,
    pose: Pose,
    duration: f32,
) {
    if data.state == 0 {
        if pose(frame) {
            set_gesture_joint(data, timestamp, joint, frame.position(joint));
        }
        return;
    }
    let position = frame.position(data.joint);
    check_pose_complete(data, timestamp, position, pose(frame), duration);
}

/// Pose hold that is only evaluated once the entry pose is `arming`
/// seconds old.
fn armed_hold(
    data: &mut GestureData,
    timestamp: f32,
    frame: &SkeletonFrame,
    arming: f32,
    entry: Pose,
    hold: Pose,
    duration: f32,
) {
    if data.state == 0 {
        if entry(frame) {
            let hand = Joint::HandRight;
            set_gesture_joint(data, timestamp, hand, frame.position(hand));
        }
        return;
    }
    if timestamp - data.timestamp > arming {
        let position = frame.position(data.joint);
        check_pose_complete(data, timestamp, position, hold(frame), duration);
    }
}

/// Entry pose followed by a motion that must happen within `window`.
fn motion(
    data: &mut GestureData,
    timestamp: f32,
    frame: &SkeletonFrame,
    window: f32,
    entry: Entry,
    done: FollowUp,
) {
    if data.state == 0 {
        if let Some(joint) = entry(frame) {
            set_gesture_joint(data, timestamp, joint, frame.position(joint));
            data.progress = SWIPE_ENTRY_PROGRESS;
        }
        return;
    }
    if timestamp - data.timestamp >= window {
        set_gesture_cancelled(data);
        return;
    }
    if done(frame, data) {
        let position = frame.position(data.joint);
        check_pose_complete(data, timestamp, position, true, 0.0);
    }
}

fn wave(data: &mut GestureData, timestamp: f32, frame: &SkeletonFrame) {
    match data.state {
        0 => {
            if let Some(hand) = HANDS.into_iter().find(|hand| wave_outward(frame, *hand)) {
                set_gesture_joint(data, timestamp, hand, frame.position(hand));
                data.progress = ENTRY_PROGRESS;
            }
        }
        1 => {
            if timestamp - data.timestamp >= WAVE_WINDOW {
                set_gesture_cancelled(data);
            } else if wave_inward(frame, data.joint) {
                data.timestamp = timestamp;
                data.state += 1;
                data.progress = ACTIVE_PROGRESS;
            }
        }
        _ => {
            if timestamp - data.timestamp >= WAVE_WINDOW {
                set_gesture_cancelled(data);
            } else if wave_outward(frame, data.joint) {
                let position = frame.position(data.joint);
                check_pose_complete(data, timestamp, position, true, 0.0);
            }
        }
    }
}

fn click(data: &mut GestureData, timestamp: f32, frame: &SkeletonFrame, stay: f32) {
    if data.state == 0 {
        if let Some(hand) = first_hand(frame, |arm| arm.y > -0.1) {
            set_gesture_joint(data, timestamp, hand, frame.position(hand));
            data.progress = ENTRY_PROGRESS;
            // the latch frame gives the most accurate click position
            set_screen_pos(data, frame);
        }
        return;
    }
    let position = frame.position(data.joint);
    let in_place = frame.is_tracked(data.joint)
        && (position - data.joint_pos).length() < CLICK_STAY_RADIUS;
    check_pose_complete(data, timestamp, position, in_place, stay);
}

fn cursor(data: &mut GestureData, timestamp: f32, frame: &SkeletonFrame, hand: Joint, hip: Joint) {
    if frame.offset(hand, hip).is_some_and(|d| d.y > -0.1) {
        data.joint = hand;
        data.timestamp = timestamp;
        set_screen_pos(data, frame);
        data.progress = ACTIVE_PROGRESS;
    } else {
        data.progress = 0.0;
    }
}

fn zoom(user: u32, data: &mut GestureData, timestamp: f32, frame: &SkeletonFrame, zoom_in: bool) {
    let (left_up, right_up) = hands_up(frame);
    let distance = (frame.position(Joint::HandRight) - frame.position(Joint::HandLeft)).length();
    if data.state == 0 {
        let apart = if zoom_in {
            distance >= 0.7
        } else {
            distance < 0.2
        };
        if left_up && right_up && apart {
            let hand = Joint::HandRight;
            set_gesture_joint(data, timestamp, hand, frame.position(hand));
            if zoom_in {
                data.tag_float = distance;
            }
            data.progress = ENTRY_PROGRESS;
        }
        return;
    }
    let in_pose = timestamp - data.timestamp < ZOOM_WINDOW
        && frame.all_tracked(&ARMS)
        && (left_up || right_up);
    if in_pose {
        let initial_zoom = if zoom_in { 0.0 } else { 1.0 };
        set_zoom_factor(user, data, initial_zoom, frame);
        data.timestamp = timestamp;
        data.progress = ACTIVE_PROGRESS;
    } else {
        release_continuous(data);
    }
}

fn wheel(data: &mut GestureData, timestamp: f32, frame: &SkeletonFrame) {
    let (left_up, right_up) = hands_up(frame);
    let span = frame.position(Joint::HandRight) - frame.position(Joint::HandLeft);
    let distance = span.length();
    if data.state == 0 {
        if left_up && right_up && distance > 0.2 && distance < 0.7 {
            let hand = Joint::HandRight;
            set_gesture_joint(data, timestamp, hand, frame.position(hand));
            data.tag_vector = span;
            data.tag_float = distance;
            data.progress = ENTRY_PROGRESS;
        }
        return;
    }
    let steady = (distance - data.tag_float).abs() < 0.1;
    let in_pose = timestamp - data.timestamp < WHEEL_WINDOW
        && frame.all_tracked(&ARMS)
        && (left_up || (right_up && steady));
    if in_pose {
        let initial = data.tag_vector;
        set_wheel_rotation(data, initial, span);
        data.timestamp = timestamp;
        data.tag_float = distance;
        data.progress = ACTIVE_PROGRESS;
    } else {
        release_continuous(data);
    }
}

/// Continuous gestures drop back to entry detection without cancelling.
fn release_continuous(data: &mut GestureData) {
    data.state = 0;
    data.progress = 0.0;
}

// ── Poses ──────────────────────────────────────────────────

fn hand_above(frame: &SkeletonFrame, hand: Joint, anchor: Joint, margin: f32) -> bool {
    frame.offset(hand, anchor).is_some_and(|d| d.y > margin)
}

fn right_hand_raised(frame: &SkeletonFrame) -> bool {
    hand_above(frame, Joint::HandRight, Joint::ShoulderRight, 0.1)
}

fn left_hand_raised(frame: &SkeletonFrame) -> bool {
    hand_above(frame, Joint::HandLeft, Joint::ShoulderLeft, 0.1)
}

fn psi_pose(frame: &SkeletonFrame) -> bool {
    right_hand_raised(frame) && left_hand_raised(frame)
}

fn stop_pose(frame: &SkeletonFrame) -> bool {
    let below = |hand, hip| frame.offset(hand, hip).is_some_and(|d: Vec3| d.y < 0.0);
    below(Joint::HandRight, Joint::HipRight) && below(Joint::HandLeft, Joint::HipLeft)
}

fn right_hand_over_head(frame: &SkeletonFrame) -> bool {
    hand_above(frame, Joint::HandRight, Joint::Head, 0.1)
}

/// Right hand below the hips and more than half a unit to their right.
fn hidden_entry(frame: &SkeletonFrame) -> bool {
    frame
        .offset(Joint::HandRight, Joint::HipCenter)
        .is_some_and(|d| d.y < 0.0 && d.x > 0.5)
}

fn hidden_hold(frame: &SkeletonFrame) -> bool {
    frame.is_tracked(Joint::Head) && hidden_entry(frame)
}

/// `(left hand above left elbow, right hand above right elbow)`.
fn hands_up(frame: &SkeletonFrame) -> (bool, bool) {
    let up = |hand, elbow| frame.offset(hand, elbow).is_some_and(|d: Vec3| d.y > 0.0);
    (
        up(Joint::HandLeft, Joint::ElbowLeft),
        up(Joint::HandRight, Joint::ElbowRight),
    )
}

/// First hand (right before left) whose hand-minus-elbow offset passes.
fn first_hand(frame: &SkeletonFrame, arm: impl Fn(Vec3) -> bool) -> Option<Joint> {
    HANDS.into_iter().find(|hand| {
        hand.elbow()
            .and_then(|elbow| frame.offset(*hand, elbow))
            .is_some_and(&arm)
    })
}

fn only_hand(frame: &SkeletonFrame, hand: Joint, arm: impl Fn(Vec3) -> bool) -> Option<Joint> {
    let elbow = hand.elbow()?;
    frame.offset(hand, elbow).is_some_and(arm).then_some(hand)
}

/// Latched hand position and its offset from the elbow, when both are
/// tracked.
fn latched_arm(frame: &SkeletonFrame, data: &GestureData) -> Option<(Vec3, Vec3)> {
    let elbow = data.joint.elbow()?;
    let arm = frame.offset(data.joint, elbow)?;
    Some((frame.position(data.joint), arm))
}

fn wave_outward(frame: &SkeletonFrame, hand: Joint) -> bool {
    let outward = |arm: Vec3| {
        arm.y > 0.1
            && if hand == Joint::HandRight {
                arm.x > 0.05
            } else {
                arm.x < -0.05
            }
    };
    only_hand(frame, hand, outward).is_some()
}

fn wave_inward(frame: &SkeletonFrame, hand: Joint) -> bool {
    let inward = |arm: Vec3| {
        arm.y > 0.1
            && if hand == Joint::HandRight {
                arm.x < -0.05
            } else {
                arm.x > 0.05
            }
    };
    only_hand(frame, hand, inward).is_some()
}

fn swipe_left_entry(frame: &SkeletonFrame) -> Option<Joint> {
    only_hand(frame, Joint::HandRight, |arm| arm.y > -0.05 && arm.x > 0.0)
}

fn swipe_right_entry(frame: &SkeletonFrame) -> Option<Joint> {
    only_hand(frame, Joint::HandLeft, |arm| arm.y > -0.05 && arm.x < 0.0)
}

fn swipe_sideways(frame: &SkeletonFrame, data: &GestureData, travel: impl Fn(f32) -> bool) -> bool {
    latched_arm(frame, data).is_some_and(|(hand, arm)| {
        arm.y.abs() < 0.1
            && (hand.y - data.joint_pos.y).abs() < 0.08
            && travel(hand.x - data.joint_pos.x)
    })
}

fn swipe_left_done(frame: &SkeletonFrame, data: &GestureData) -> bool {
    swipe_sideways(frame, data, |dx| dx < -0.15)
}

fn swipe_right_done(frame: &SkeletonFrame, data: &GestureData) -> bool {
    swipe_sideways(frame, data, |dx| dx > 0.15)
}

fn swipe_up_entry(frame: &SkeletonFrame) -> Option<Joint> {
    first_hand(frame, |arm| arm.y < -0.05 && arm.y > -0.15)
}

fn opposite_shoulder(hand: Joint) -> Joint {
    if hand == Joint::HandRight {
        Joint::ShoulderLeft
    } else {
        Joint::ShoulderRight
    }
}

fn swipe_up_done(frame: &SkeletonFrame, data: &GestureData) -> bool {
    let shoulder = opposite_shoulder(data.joint);
    latched_arm(frame, data).is_some()
        && frame.offset(data.joint, shoulder).is_some_and(|d| d.y > 0.05)
        && (frame.position(data.joint).x - data.joint_pos.x).abs() < 0.08
}

fn swipe_down_entry(frame: &SkeletonFrame) -> Option<Joint> {
    HANDS.into_iter().find(|hand| {
        frame
            .offset(*hand, opposite_shoulder(*hand))
            .is_some_and(|d| d.y >= 0.05)
    })
}

fn swipe_down_done(frame: &SkeletonFrame, data: &GestureData) -> bool {
    latched_arm(frame, data).is_some_and(|(hand, _)| {
        hand.y - data.joint_pos.y < -0.2 && (hand.x - data.joint_pos.x).abs() < 0.08
    })
}

fn jump_entry(frame: &SkeletonFrame) -> Option<Joint> {
    let hip = Joint::HipCenter;
    let y = frame.position(hip).y;
    (frame.is_tracked(hip) && y > 0.9 && y < 1.3).then_some(hip)
}

fn squat_entry(frame: &SkeletonFrame) -> Option<Joint> {
    let hip = Joint::HipCenter;
    (frame.is_tracked(hip) && frame.position(hip).y < 0.9).then_some(hip)
}

fn hip_travel(frame: &SkeletonFrame, data: &GestureData, rise: impl Fn(f32) -> bool) -> bool {
    let hip = Joint::HipCenter;
    let delta = frame.position(hip) - data.joint_pos;
    frame.is_tracked(hip) && rise(delta.y) && delta.x.abs() < 0.15
}

fn jump_done(frame: &SkeletonFrame, data: &GestureData) -> bool {
    hip_travel(frame, data, |dy| dy > 0.15)
}

fn squat_done(frame: &SkeletonFrame, data: &GestureData) -> bool {
    hip_travel(frame, data, |dy| dy < -0.15)
}

fn push_entry(frame: &SkeletonFrame) -> Option<Joint> {
    first_hand(frame, |arm| arm.y > -0.05 && arm.x.abs() < 0.15 && arm.z < -0.05)
}

fn pull_entry(frame: &SkeletonFrame) -> Option<Joint> {
    first_hand(frame, |arm| arm.y > -0.05 && arm.x.abs() < 0.15 && arm.z < -0.15)
}

fn depth_travel(frame: &SkeletonFrame, data: &GestureData, travel: impl Fn(f32) -> bool) -> bool {
    latched_arm(frame, data).is_some_and(|(hand, _)| {
        let delta = hand - data.joint_pos;
        delta.x.abs() < 0.15 && delta.y.abs() < 0.15 && travel(delta.z)
    })
}

fn push_done(frame: &SkeletonFrame, data: &GestureData) -> bool {
    depth_travel(frame, data, |dz| dz < -0.15)
}

fn pull_done(frame: &SkeletonFrame, data: &GestureData) -> bool {
    depth_travel(frame, data, |dz| dz > 0.15)
}
