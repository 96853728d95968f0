use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

pub const SENSITIVITY_MIN: f32 = 0.1;
pub const SENSITIVITY_MAX: f32 = 10.0;

/// Which classified device family frames are captured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AudioSource {
    Microphone,
    Speaker,
}

impl AudioSource {
    pub fn other(self) -> Self {
        match self {
            Self::Microphone => Self::Speaker,
            Self::Speaker => Self::Microphone,
        }
    }
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Microphone => write!(f, "microphone"),
            Self::Speaker => write!(f, "speaker"),
        }
    }
}

/// Configuration shared across the capture, analysis and render contexts.
///
/// Everything is an atomic: control commands land on the UI thread while
/// the analysis loop reads every iteration, and a torn sensitivity or
/// palette read mid-frame must be impossible. Sensitivity is an f32 stored
/// as its bit pattern.
pub struct SharedParams {
    sensitivity_bits: AtomicU32,
    palette_index: AtomicUsize,
    viewport_height: AtomicU32,
    running: AtomicBool,
}

impl SharedParams {
    pub fn new(sensitivity: f32, palette_index: usize, viewport_height: u32) -> Self {
        Self {
            sensitivity_bits: AtomicU32::new(clamp_sensitivity(sensitivity).to_bits()),
            palette_index: AtomicUsize::new(palette_index),
            viewport_height: AtomicU32::new(viewport_height),
            running: AtomicBool::new(true),
        }
    }

    pub fn sensitivity(&self) -> f32 {
        f32::from_bits(self.sensitivity_bits.load(Ordering::Relaxed))
    }

    /// Apply a sensitivity delta, clamped to the valid range.
    /// Returns the new value for display.
    pub fn adjust_sensitivity(&self, delta: f32) -> f32 {
        let next = clamp_sensitivity(self.sensitivity() + delta);
        self.sensitivity_bits.store(next.to_bits(), Ordering::Relaxed);
        next
    }

    pub fn palette_index(&self) -> usize {
        self.palette_index.load(Ordering::Relaxed)
    }

    /// Advance to the next palette, wrapping at `palette_count`.
    /// Returns the new index.
    pub fn cycle_palette(&self, palette_count: usize) -> usize {
        let next = (self.palette_index() + 1) % palette_count.max(1);
        self.palette_index.store(next, Ordering::Relaxed);
        next
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height.load(Ordering::Relaxed).max(1)
    }

    pub fn set_viewport_height(&self, height: u32) {
        self.viewport_height.store(height.max(1), Ordering::Relaxed);
    }

    pub fn running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

fn clamp_sensitivity(value: f32) -> f32 {
    value.clamp(SENSITIVITY_MIN, SENSITIVITY_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitivity_converges_to_upper_bound() {
        let params = SharedParams::new(9.95, 0, 400);
        for _ in 0..10 {
            params.adjust_sensitivity(0.1);
        }
        assert_eq!(params.sensitivity(), SENSITIVITY_MAX);
        params.adjust_sensitivity(0.1);
        assert_eq!(params.sensitivity(), SENSITIVITY_MAX);
    }

    #[test]
    fn sensitivity_converges_to_lower_bound() {
        let params = SharedParams::new(0.15, 0, 400);
        for _ in 0..10 {
            params.adjust_sensitivity(-0.1);
        }
        assert_eq!(params.sensitivity(), SENSITIVITY_MIN);
        params.adjust_sensitivity(-0.1);
        assert_eq!(params.sensitivity(), SENSITIVITY_MIN);
    }

    #[test]
    fn palette_cycles_and_wraps() {
        let params = SharedParams::new(3.0, 19, 400);
        assert_eq!(params.cycle_palette(20), 0);
        assert_eq!(params.cycle_palette(20), 1);
    }

    #[test]
    fn shutdown_flag_flips_once() {
        let params = SharedParams::new(3.0, 0, 400);
        assert!(params.running());
        params.shutdown();
        assert!(!params.running());
    }

    #[test]
    fn source_toggles_between_families() {
        assert_eq!(AudioSource::Microphone.other(), AudioSource::Speaker);
        assert_eq!(AudioSource::Speaker.other(), AudioSource::Microphone);
    }
}
