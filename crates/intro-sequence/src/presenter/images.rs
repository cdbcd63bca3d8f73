use super::{PresenterTick, PresenterView, RevealState};
use crate::config::Cadence;
use crate::haptics::HapticDispatcher;
use crate::timer::{TimerQueue, TimerScope};
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageLayout {
	/// Cards dropped on top of each other at an angle
	Stack,
	/// Horizontal carousel
	Rotation,
	CrossFade,
	/// Text overlay above a fast image sequence
	Composite,
}

/// Reveals images on a fixed cadence and holds the last frame.
///
/// Image scenes run for their catalog duration, so this presenter never
/// completes the scene itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSequencePresenter {
	layout: ImageLayout,
	images: Vec<String>,
	text: Option<String>,
	cadence: Cadence,
	active: bool,
	activation: u64,
	revealed: usize,
	state: RevealState,
}

impl ImageSequencePresenter {
	pub fn new(layout: ImageLayout, images: Vec<String>, text: Option<String>, cadence: Cadence) -> Self {
		Self {
			layout,
			images,
			text,
			cadence,
			active: false,
			activation: 0,
			revealed: 0,
			state: RevealState::Idle,
		}
	}

	pub const fn layout(&self) -> ImageLayout {
		self.layout
	}

	pub fn activate<E: From<PresenterTick>>(&mut self, activation: u64, timers: &mut TimerQueue<E>) {
		if self.active && self.activation == activation {
			trace!(activation, layout = ?self.layout, "image sequence already running");
			return;
		}

		self.active = true;
		self.activation = activation;
		self.revealed = 0;

		let token = timers.token(TimerScope::Presenter);
		if self.images.is_empty() {
			self.state = RevealState::Holding;
			timers.after(self.cadence.hold_ms, token, E::from(PresenterTick::HoldElapsed { activation }));
		} else {
			self.state = RevealState::Revealing(0);
			timers.after(0, token, E::from(PresenterTick::Reveal { activation, index: 1 }));
		}
	}

	pub fn deactivate(&mut self) {
		self.active = false;
	}

	pub fn on_tick<E: From<PresenterTick>>(&mut self, tick: PresenterTick, timers: &mut TimerQueue<E>, haptics: &HapticDispatcher) {
		if !self.active || tick.activation() != self.activation {
			trace!(?tick, active = self.active, "image sequence ignoring tick");
			return;
		}

		let token = timers.token(TimerScope::Presenter);
		match (tick, self.state) {
			(PresenterTick::Reveal { activation, index }, RevealState::Revealing(_)) => {
				self.revealed = index.min(self.images.len());
				if self.layout == ImageLayout::Stack {
					haptics.impact();
				}

				if self.revealed >= self.images.len() {
					self.state = RevealState::Holding;
					timers.after(self.cadence.hold_ms, token, E::from(PresenterTick::HoldElapsed { activation }));
				} else {
					self.state = RevealState::Revealing(self.revealed);
					timers.after(self.cadence.interval_ms, token, E::from(PresenterTick::Reveal { activation, index: self.revealed + 1 }));
				}
			}
			(PresenterTick::HoldElapsed { .. }, RevealState::Holding) => {
				self.state = RevealState::Done;
				trace!(layout = ?self.layout, "image sequence settled");
			}
			(tick, state) => trace!(?tick, ?state, "image tick out of order"),
		}
	}

	pub fn finish_immediately(&mut self) {
		self.revealed = self.images.len();
		self.state = RevealState::Done;
		self.active = false;
	}

	pub const fn is_active(&self) -> bool {
		self.active
	}

	pub const fn state(&self) -> RevealState {
		self.state
	}

	pub fn view(&self) -> PresenterView {
		let current = self.revealed.checked_sub(1).and_then(|i| self.images.get(i)).cloned();
		match self.layout {
			ImageLayout::Composite => PresenterView::Composite {
				text: (self.state != RevealState::Done).then(|| self.text.clone()).flatten(),
				current,
			},
			layout => PresenterView::Images {
				layout,
				shown: self.images[..self.revealed].to_vec(),
				current,
			},
		}
	}
}
