use super::{PresenterSignal, PresenterTick, PresenterView, RevealState};
use crate::haptics::HapticDispatcher;
use crate::timer::{TimerQueue, TimerScope};
use crate::types::TimeMs;
use tracing::{debug, trace};

/// Reveals text one character per interval, holds, then completes the scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypewriterPresenter {
	chars: Vec<char>,
	interval: TimeMs,
	end_pause: TimeMs,
	active: bool,
	activation: u64,
	revealed: usize,
	state: RevealState,
}

impl TypewriterPresenter {
	pub fn new(text: &str, interval: TimeMs, end_pause: TimeMs) -> Self {
		Self {
			chars: text.chars().collect(),
			interval,
			end_pause,
			active: false,
			activation: 0,
			revealed: 0,
			state: RevealState::Idle,
		}
	}

	/// Total time from activation to completion
	pub fn derived_duration(&self) -> TimeMs {
		let count = TimeMs::try_from(self.chars.len()).unwrap_or(TimeMs::MAX);
		count.saturating_mul(self.interval).saturating_add(self.end_pause)
	}

	pub fn activate<E: From<PresenterTick>>(&mut self, activation: u64, timers: &mut TimerQueue<E>) {
		if self.active && self.activation == activation {
			trace!(activation, "typewriter already running for this activation");
			return;
		}

		self.active = true;
		self.activation = activation;
		self.revealed = 0;

		let token = timers.token(TimerScope::Presenter);
		if self.chars.is_empty() {
			self.state = RevealState::Holding;
			timers.after(self.end_pause, token, E::from(PresenterTick::HoldElapsed { activation }));
		} else {
			self.state = RevealState::Revealing(0);
			timers.after(self.interval, token, E::from(PresenterTick::Reveal { activation, index: 1 }));
		}
		debug!(activation, chars = self.chars.len(), "typewriter started");
	}

	pub fn deactivate(&mut self) {
		self.active = false;
	}

	pub fn on_tick<E: From<PresenterTick>>(&mut self, tick: PresenterTick, timers: &mut TimerQueue<E>, haptics: &HapticDispatcher) -> Option<PresenterSignal> {
		if !self.active || tick.activation() != self.activation {
			trace!(?tick, active = self.active, "typewriter ignoring tick");
			return None;
		}

		let token = timers.token(TimerScope::Presenter);
		match (tick, self.state) {
			(PresenterTick::Reveal { activation, index }, RevealState::Revealing(_)) => {
				self.revealed = index.min(self.chars.len());
				haptics.typing();

				if self.revealed >= self.chars.len() {
					self.state = RevealState::Holding;
					timers.after(self.end_pause, token, E::from(PresenterTick::HoldElapsed { activation }));
				} else {
					self.state = RevealState::Revealing(self.revealed);
					timers.after(self.interval, token, E::from(PresenterTick::Reveal { activation, index: self.revealed + 1 }));
				}
				None
			}
			(PresenterTick::HoldElapsed { .. }, RevealState::Holding) => {
				self.state = RevealState::Done;
				debug!(activation = self.activation, "typewriter finished");
				Some(PresenterSignal::SceneComplete)
			}
			(tick, state) => {
				trace!(?tick, ?state, "typewriter tick out of order");
				None
			}
		}
	}

	pub fn finish_immediately(&mut self) {
		self.revealed = self.chars.len();
		self.state = RevealState::Done;
		self.active = false;
	}

	pub const fn is_active(&self) -> bool {
		self.active
	}

	pub const fn state(&self) -> RevealState {
		self.state
	}

	pub const fn revealed(&self) -> usize {
		self.revealed
	}

	pub fn view(&self) -> PresenterView {
		PresenterView::Text {
			text: self.chars[..self.revealed].iter().collect(),
			cursor: matches!(self.state, RevealState::Revealing(_)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{HapticCall, RecordingHaptics};
	use std::sync::Arc;

	fn run(presenter: &mut TypewriterPresenter, timers: &mut TimerQueue<PresenterTick>, haptics: &HapticDispatcher, until: TimeMs) -> Vec<(TimeMs, PresenterSignal)> {
		let mut signals = Vec::new();
		while let Some(fired) = timers.pop_due(until) {
			if let Some(signal) = presenter.on_tick(fired.event, timers, haptics) {
				signals.push((fired.deadline, signal));
			}
		}
		signals
	}

	#[test]
	fn reveals_each_character_then_completes_after_pause() {
		let device = RecordingHaptics::default();
		let haptics = HapticDispatcher::new(Arc::new(device.clone()));
		let mut timers = TimerQueue::new();
		let mut presenter = TypewriterPresenter::new("hi", 100, 500);

		presenter.activate(1, &mut timers);
		assert!(run(&mut presenter, &mut timers, &haptics, 100).is_empty());
		assert_eq!(presenter.view(), PresenterView::Text { text: "h".into(), cursor: true });

		assert!(run(&mut presenter, &mut timers, &haptics, 699).is_empty());
		assert_eq!(presenter.state(), RevealState::Holding);

		let signals = run(&mut presenter, &mut timers, &haptics, 10_000);
		assert_eq!(signals, vec![(700, PresenterSignal::SceneComplete)]);
		assert_eq!(presenter.derived_duration(), 700);
		assert_eq!(device.count(HapticCall::Typing), 2);
	}

	#[test]
	fn multibyte_text_reveals_by_character() {
		let haptics = HapticDispatcher::disabled();
		let mut timers = TimerQueue::new();
		let mut presenter = TypewriterPresenter::new("Né", 100, 0);

		presenter.activate(1, &mut timers);
		run(&mut presenter, &mut timers, &haptics, 200);
		assert_eq!(presenter.view(), PresenterView::Text { text: "Né".into(), cursor: false });
	}

	#[test]
	fn reactivating_the_same_activation_does_not_restart() {
		let haptics = HapticDispatcher::disabled();
		let mut timers = TimerQueue::new();
		let mut presenter = TypewriterPresenter::new("abc", 100, 500);

		presenter.activate(7, &mut timers);
		run(&mut presenter, &mut timers, &haptics, 200);
		presenter.activate(7, &mut timers);

		assert_eq!(presenter.revealed(), 2);
		assert_eq!(timers.pending(), 1);
	}

	#[test]
	fn inactive_presenter_never_completes() {
		let haptics = HapticDispatcher::disabled();
		let mut timers = TimerQueue::new();
		let mut presenter = TypewriterPresenter::new("", 100, 500);

		presenter.activate(1, &mut timers);
		assert_eq!(presenter.state(), RevealState::Holding);
		presenter.deactivate();

		assert!(run(&mut presenter, &mut timers, &haptics, 10_000).is_empty());
	}

	#[test]
	fn new_activation_resets_counters_and_ignores_old_ticks() {
		let haptics = HapticDispatcher::disabled();
		let mut timers = TimerQueue::new();
		let mut presenter = TypewriterPresenter::new("abc", 100, 500);

		presenter.activate(1, &mut timers);
		run(&mut presenter, &mut timers, &haptics, 300);
		assert_eq!(presenter.revealed(), 3);

		presenter.deactivate();
		presenter.activate(2, &mut timers);
		assert_eq!(presenter.revealed(), 0);

		// The hold armed by activation 1 is still queued but belongs to the old run
		let stale = presenter.on_tick(PresenterTick::HoldElapsed { activation: 1 }, &mut timers, &haptics);
		assert!(stale.is_none());
		assert_eq!(presenter.state(), RevealState::Revealing(0));
	}
}
