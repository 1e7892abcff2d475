use serde::Deserialize;

/// Timing knobs for gesture recognition and the per-user tracker.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Seconds a static pose must be held to complete.
    pub pose_complete_duration: f32,
    /// Seconds a hand must stay in place to register a click.
    pub click_stay_duration: f32,
    /// Seconds after any completed gesture before the user's gestures are
    /// checked again.
    pub min_time_between_gestures: f32,
    /// Seconds before a reset gesture is tracked again.
    pub min_time_between_same_gestures: f32,
    /// Progress at which a gesture is reported as in progress.
    pub in_progress_threshold: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pose_complete_duration: 1.0,
            click_stay_duration: 2.5,
            min_time_between_gestures: 0.7,
            min_time_between_same_gestures: 0.0,
            in_progress_threshold: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GestureConfig = toml::from_str("click_stay_duration = 1.5").unwrap();
        assert_eq!(config.click_stay_duration, 1.5);
        assert_eq!(config.pose_complete_duration, 1.0);
        assert_eq!(config.min_time_between_gestures, 0.7);
    }
}
