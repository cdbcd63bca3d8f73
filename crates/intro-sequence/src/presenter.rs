mod images;
mod typewriter;

pub use images::{ImageLayout, ImageSequencePresenter};
pub use typewriter::TypewriterPresenter;

use crate::config::PresenterTiming;
use crate::haptics::HapticDispatcher;
use crate::timer::TimerQueue;
use crate::types::{ResourceRef, Scene, SceneType};
use serde::{Deserialize, Serialize};

/// Deferred presenter work. Each tick carries the activation it was armed
/// for; ticks from an older activation are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterTick {
	/// Show item `index` (1-based count of visible characters or images)
	Reveal { activation: u64, index: usize },
	HoldElapsed { activation: u64 },
}

impl PresenterTick {
	pub const fn activation(&self) -> u64 {
		match self {
			Self::Reveal { activation, .. } | Self::HoldElapsed { activation } => *activation,
		}
	}
}

/// Signal from a presenter back to the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterSignal {
	SceneComplete,
}

/// Local reveal progress of one activation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum RevealState {
	#[default]
	Idle,
	Revealing(usize),
	Holding,
	Done,
}

/// What the renderer should draw for the active scene
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PresenterView {
	#[default]
	Empty,
	Text {
		text: String,
		cursor: bool,
	},
	Images {
		layout: ImageLayout,
		shown: Vec<String>,
		current: Option<String>,
	},
	Composite {
		text: Option<String>,
		current: Option<String>,
	},
	Video {
		reference: ResourceRef,
	},
}

/// Full screen video scene. Playback is the renderer's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPresenter {
	reference: ResourceRef,
	active: bool,
}

/// Presenter for whichever scene type is on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presenter {
	Typewriter(TypewriterPresenter),
	Images(ImageSequencePresenter),
	Video(VideoPresenter),
}

impl Presenter {
	/// Build the presenter for `scene`. `images` holds the scene's images that
	/// the asset store could resolve, in catalog order.
	pub fn for_scene(scene: &Scene, images: Vec<String>, timing: &PresenterTiming) -> Self {
		match &scene.scene_type {
			SceneType::Text(text) => Self::Typewriter(TypewriterPresenter::new(text, timing.typewriter_interval_ms, timing.typewriter_end_pause_ms)),
			SceneType::ImageStack(_) => Self::Images(ImageSequencePresenter::new(ImageLayout::Stack, images, None, timing.stack)),
			SceneType::ImageRotation(_) => Self::Images(ImageSequencePresenter::new(ImageLayout::Rotation, images, None, timing.rotation)),
			SceneType::ImageFade(_) => Self::Images(ImageSequencePresenter::new(ImageLayout::CrossFade, images, None, timing.cross_fade)),
			SceneType::Composite { text, .. } => Self::Images(ImageSequencePresenter::new(ImageLayout::Composite, images, Some(text.clone()), timing.composite)),
			SceneType::Video(reference) => Self::Video(VideoPresenter {
				reference: reference.clone(),
				active: false,
			}),
		}
	}

	pub fn activate<E: From<PresenterTick>>(&mut self, activation: u64, timers: &mut TimerQueue<E>) {
		match self {
			Self::Typewriter(p) => p.activate(activation, timers),
			Self::Images(p) => p.activate(activation, timers),
			Self::Video(p) => p.active = true,
		}
	}

	/// Stop reacting to ticks. The current frame stays visible.
	pub fn deactivate(&mut self) {
		match self {
			Self::Typewriter(p) => p.deactivate(),
			Self::Images(p) => p.deactivate(),
			Self::Video(p) => p.active = false,
		}
	}

	pub fn on_tick<E: From<PresenterTick>>(&mut self, tick: PresenterTick, timers: &mut TimerQueue<E>, haptics: &HapticDispatcher) -> Option<PresenterSignal> {
		match self {
			Self::Typewriter(p) => p.on_tick(tick, timers, haptics),
			Self::Images(p) => {
				p.on_tick(tick, timers, haptics);
				None
			}
			Self::Video(_) => None,
		}
	}

	/// Jump to the final frame without scheduling anything
	pub fn finish_immediately(&mut self) {
		match self {
			Self::Typewriter(p) => p.finish_immediately(),
			Self::Images(p) => p.finish_immediately(),
			Self::Video(p) => p.active = false,
		}
	}

	pub const fn is_active(&self) -> bool {
		match self {
			Self::Typewriter(p) => p.is_active(),
			Self::Images(p) => p.is_active(),
			Self::Video(p) => p.active,
		}
	}

	pub const fn reveal_state(&self) -> RevealState {
		match self {
			Self::Typewriter(p) => p.state(),
			Self::Images(p) => p.state(),
			Self::Video(_) => RevealState::Idle,
		}
	}

	pub fn view(&self) -> PresenterView {
		match self {
			Self::Typewriter(p) => p.view(),
			Self::Images(p) => p.view(),
			Self::Video(p) => PresenterView::Video { reference: p.reference.clone() },
		}
	}
}
