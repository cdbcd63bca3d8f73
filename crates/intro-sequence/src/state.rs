use crate::media::MediaReport;
use crate::presenter::{PresenterView, RevealState};
use crate::types::TimeMs;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one intro run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencePhase {
	#[default]
	Idle,
	Running,
	/// Settle window between two scenes
	Transitioning,
	Completed,
	Skipped,
	Stopped,
}

impl SequencePhase {
	pub const fn is_terminal(self) -> bool {
		matches!(self, Self::Completed | Self::Skipped | Self::Stopped)
	}

	pub const fn outcome(self) -> Option<IntroOutcome> {
		match self {
			Self::Completed => Some(IntroOutcome::Completed),
			Self::Skipped => Some(IntroOutcome::Skipped),
			Self::Stopped => Some(IntroOutcome::Stopped),
			Self::Idle | Self::Running | Self::Transitioning => None,
		}
	}
}

impl fmt::Display for SequencePhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::Idle => "idle",
			Self::Running => "running",
			Self::Transitioning => "transitioning",
			Self::Completed => "completed",
			Self::Skipped => "skipped",
			Self::Stopped => "stopped",
		};
		f.write_str(label)
	}
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntroOutcome {
	/// Reached the end of the catalog on its own
	Completed,
	/// The user tapped through
	Skipped,
	Stopped,
}

/// Observable snapshot of the sequence, published after every change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntroState {
	pub phase: SequencePhase,
	pub scene_index: usize,
	pub scene_count: usize,
	pub active_scene: Option<String>,
	pub is_scene_transitioning: bool,
	pub media_opacity: f64,
	pub audio_volume: f64,
	pub presenter: PresenterView,
	pub reveal: RevealState,
	pub media: MediaReport,
	pub pending_callbacks: usize,
	pub current_time: TimeMs,
	pub released: bool,
}

impl IntroState {
	pub const fn is_finished(&self) -> bool {
		self.phase.is_terminal()
	}

	pub const fn outcome(&self) -> Option<IntroOutcome> {
		self.phase.outcome()
	}
}
