use crate::error::{IntroError, Result};
use crate::types::TimeMs;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reveal cadence for an image presenter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
	pub interval_ms: TimeMs,
	/// Time the last frame is held before the presenter settles
	pub hold_ms: TimeMs,
}

impl Cadence {
	pub const fn new(interval_ms: TimeMs, hold_ms: TimeMs) -> Self {
		Self { interval_ms, hold_ms }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterTiming {
	pub typewriter_interval_ms: TimeMs,
	pub typewriter_end_pause_ms: TimeMs,
	pub stack: Cadence,
	pub rotation: Cadence,
	pub cross_fade: Cadence,
	pub composite: Cadence,
}

impl PresenterTiming {
	pub const fn with_typewriter(mut self, interval_ms: TimeMs, end_pause_ms: TimeMs) -> Self {
		self.typewriter_interval_ms = interval_ms;
		self.typewriter_end_pause_ms = end_pause_ms;
		self
	}

	fn validate(&self) -> std::result::Result<(), String> {
		if self.typewriter_interval_ms <= 0 {
			return Err("typewriter interval must be positive".to_string());
		}
		if self.typewriter_end_pause_ms < 0 {
			return Err("typewriter end pause must not be negative".to_string());
		}
		for (name, cadence) in [("stack", self.stack), ("rotation", self.rotation), ("cross_fade", self.cross_fade), ("composite", self.composite)] {
			if cadence.interval_ms < 0 || cadence.hold_ms < 0 {
				return Err(format!("{name} cadence must not be negative"));
			}
		}
		Ok(())
	}
}

impl Default for PresenterTiming {
	fn default() -> Self {
		Self {
			typewriter_interval_ms: 100,
			typewriter_end_pause_ms: 2000,
			stack: Cadence::new(500, 1000),
			rotation: Cadence::new(700, 700),
			cross_fade: Cadence::new(800, 800),
			composite: Cadence::new(800, 500),
		}
	}
}

/// Playback configuration for one intro run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroConfig {
	#[serde(default = "default_fade_in_ms")]
	pub fade_in_ms: TimeMs,
	#[serde(default = "default_fade_in_steps")]
	pub fade_in_steps: u32,
	#[serde(default = "default_fade_out_ms")]
	pub fade_out_ms: TimeMs,
	#[serde(default = "default_fade_out_steps")]
	pub fade_out_steps: u32,
	#[serde(default = "default_target_volume")]
	pub target_volume: f64,
	/// Pause between one scene ending and the next starting
	#[serde(default = "default_settle_delay_ms")]
	pub settle_delay_ms: TimeMs,
	#[serde(default = "default_loop_video")]
	pub loop_video: bool,
	#[serde(default)]
	pub presenters: PresenterTiming,
}

fn default_fade_in_ms() -> TimeMs {
	5000
}

fn default_fade_in_steps() -> u32 {
	50
}

fn default_fade_out_ms() -> TimeMs {
	500
}

fn default_fade_out_steps() -> u32 {
	10
}

fn default_target_volume() -> f64 {
	0.8
}

fn default_settle_delay_ms() -> TimeMs {
	100
}

fn default_loop_video() -> bool {
	true
}

impl IntroConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_json(json: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(json)?;
		config.validate().map_err(IntroError::InvalidConfig)?;
		Ok(config)
	}

	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| IntroError::InvalidConfig(format!("{}: {e}", path.as_ref().display())))?;
		Self::from_json(&raw)
	}

	pub const fn with_fade_in(mut self, duration_ms: TimeMs, steps: u32) -> Self {
		self.fade_in_ms = duration_ms;
		self.fade_in_steps = steps;
		self
	}

	pub const fn with_fade_out(mut self, duration_ms: TimeMs, steps: u32) -> Self {
		self.fade_out_ms = duration_ms;
		self.fade_out_steps = steps;
		self
	}

	pub const fn with_target_volume(mut self, volume: f64) -> Self {
		self.target_volume = volume;
		self
	}

	pub const fn with_settle_delay(mut self, ms: TimeMs) -> Self {
		self.settle_delay_ms = ms;
		self
	}

	pub const fn with_loop_video(mut self, enable: bool) -> Self {
		self.loop_video = enable;
		self
	}

	pub const fn with_presenters(mut self, presenters: PresenterTiming) -> Self {
		self.presenters = presenters;
		self
	}

	pub fn validate(&self) -> std::result::Result<(), String> {
		if self.fade_in_ms < 0 || self.fade_out_ms < 0 {
			return Err("fade durations must not be negative".to_string());
		}
		if self.fade_in_steps == 0 || self.fade_out_steps == 0 {
			return Err("fade step counts must be at least 1".to_string());
		}
		if !(0.0..=1.0).contains(&self.target_volume) {
			return Err(format!("target volume {} is outside [0, 1]", self.target_volume));
		}
		if self.settle_delay_ms < 0 {
			return Err("settle delay must not be negative".to_string());
		}
		self.presenters.validate()
	}
}

impl Default for IntroConfig {
	fn default() -> Self {
		Self {
			fade_in_ms: default_fade_in_ms(),
			fade_in_steps: default_fade_in_steps(),
			fade_out_ms: default_fade_out_ms(),
			fade_out_steps: default_fade_out_steps(),
			target_volume: default_target_volume(),
			settle_delay_ms: default_settle_delay_ms(),
			loop_video: default_loop_video(),
			presenters: PresenterTiming::default(),
		}
	}
}
