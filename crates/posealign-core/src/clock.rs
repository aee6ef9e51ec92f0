//! Frame clock - playback time to frame index

use serde::{Deserialize, Serialize};

/// Sampling rate assumed for detected-pose timelines
pub const DEFAULT_FPS: f64 = 30.0;

/// Fixed-rate frame clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameClock {
    pub fps: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self { fps: DEFAULT_FPS }
    }
}

impl FrameClock {
    pub fn new(fps: f64) -> Self {
        Self { fps }
    }

    /// Frame shown at `seconds` (floor), `None` for negative or non-finite times
    pub fn frame_at(&self, seconds: f64) -> Option<usize> {
        let frame = (seconds * self.fps).floor();
        if !frame.is_finite() || frame < 0.0 {
            return None;
        }
        Some(frame as usize)
    }

    /// Start time of `frame` in seconds
    pub fn time_of(&self, frame: usize) -> f64 {
        frame as f64 / self.fps
    }

    /// Playback duration of `frames` frames
    pub fn duration(&self, frames: usize) -> f64 {
        self.time_of(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_at_floors() {
        let clock = FrameClock::default();
        assert_eq!(clock.frame_at(0.0), Some(0));
        assert_eq!(clock.frame_at(0.0333), Some(0));
        assert_eq!(clock.frame_at(1.0), Some(30));
        assert_eq!(clock.frame_at(2.51), Some(75));
    }

    #[test]
    fn test_frame_at_rejects_invalid() {
        let clock = FrameClock::default();
        assert_eq!(clock.frame_at(-0.5), None);
        assert_eq!(clock.frame_at(f64::NAN), None);
        assert_eq!(clock.frame_at(f64::INFINITY), None);
    }

    #[test]
    fn test_time_round_trip() {
        let clock = FrameClock::new(20.0);
        assert_eq!(clock.frame_at(clock.time_of(40)), Some(40));
        assert!((clock.duration(50) - 2.5).abs() < 1e-12);
    }
}
