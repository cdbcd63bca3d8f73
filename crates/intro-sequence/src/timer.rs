use crate::types::TimeMs;
use std::collections::BTreeMap;
use tracing::trace;

/// Owner of a group of callbacks that are cancelled together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerScope {
	/// Scene deadlines and settle delays
	Scene,
	Video,
	Audio,
	Presenter,
}

impl TimerScope {
	pub const ALL: [Self; 4] = [Self::Scene, Self::Video, Self::Audio, Self::Presenter];

	const fn index(self) -> usize {
		match self {
			Self::Scene => 0,
			Self::Video => 1,
			Self::Audio => 2,
			Self::Presenter => 3,
		}
	}
}

/// Generation of a scope captured when a callback is armed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EpochToken {
	scope: TimerScope,
	epoch: u64,
}

impl EpochToken {
	pub const fn scope(&self) -> TimerScope {
		self.scope
	}

	pub const fn epoch(&self) -> u64 {
		self.epoch
	}
}

/// Handle for cancelling one armed callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
	key: (TimeMs, u64),
	token: EpochToken,
}

impl TimerHandle {
	pub const fn deadline(&self) -> TimeMs {
		self.key.0
	}

	pub const fn token(&self) -> EpochToken {
		self.token
	}
}

#[derive(Debug)]
struct Armed<E> {
	token: EpochToken,
	event: E,
}

/// A callback whose deadline has been reached and whose epoch is still current
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<E> {
	pub deadline: TimeMs,
	pub token: EpochToken,
	pub event: E,
}

/// Single-threaded deferred callback queue over a virtual clock.
///
/// Entries fire in `(deadline, arm order)` order. Cancellation works per
/// scope: bumping a scope's epoch purges its entries and rejects any token
/// captured before the bump.
#[derive(Debug)]
pub struct TimerQueue<E> {
	now: TimeMs,
	next_seq: u64,
	armed: BTreeMap<(TimeMs, u64), Armed<E>>,
	epochs: [u64; 4],
	stale_dropped: u64,
}

impl<E> TimerQueue<E> {
	pub fn new() -> Self {
		Self {
			now: 0,
			next_seq: 0,
			armed: BTreeMap::new(),
			epochs: [0; 4],
			stale_dropped: 0,
		}
	}

	pub const fn now(&self) -> TimeMs {
		self.now
	}

	pub fn token(&self, scope: TimerScope) -> EpochToken {
		EpochToken {
			scope,
			epoch: self.epochs[scope.index()],
		}
	}

	pub fn is_current(&self, token: EpochToken) -> bool {
		self.epochs[token.scope.index()] == token.epoch
	}

	/// Arm `event` to fire `delay` ms from now. Stale tokens are refused.
	pub fn after(&mut self, delay: TimeMs, token: EpochToken, event: E) -> Option<TimerHandle> {
		if !self.is_current(token) {
			trace!(scope = ?token.scope, epoch = token.epoch, "refusing to arm stale token");
			return None;
		}

		let deadline = self.now.saturating_add(delay.max(0));
		let key = (deadline, self.next_seq);
		self.next_seq += 1;
		self.armed.insert(key, Armed { token, event });

		Some(TimerHandle { key, token })
	}

	pub fn cancel(&mut self, handle: TimerHandle) -> bool {
		self.armed.remove(&handle.key).is_some()
	}

	/// Invalidate every callback armed under `scope`. Returns how many were purged.
	pub fn invalidate(&mut self, scope: TimerScope) -> usize {
		self.epochs[scope.index()] += 1;
		let before = self.armed.len();
		self.armed.retain(|_, armed| armed.token.scope != scope);
		before - self.armed.len()
	}

	pub fn invalidate_all(&mut self) -> usize {
		TimerScope::ALL.into_iter().map(|scope| self.invalidate(scope)).sum()
	}

	pub fn pending(&self) -> usize {
		self.armed.len()
	}

	pub fn pending_in(&self, scope: TimerScope) -> usize {
		self.armed.values().filter(|armed| armed.token.scope == scope).count()
	}

	pub fn next_deadline(&self) -> Option<TimeMs> {
		self.armed.keys().next().map(|(deadline, _)| *deadline)
	}

	pub const fn stale_dropped(&self) -> u64 {
		self.stale_dropped
	}

	/// Pop the earliest live callback due at or before `until`.
	///
	/// The clock moves to the popped deadline, so callbacks armed while
	/// handling it are positioned relative to that deadline.
	pub fn pop_due(&mut self, until: TimeMs) -> Option<Fired<E>> {
		loop {
			let entry = self.armed.first_entry()?;
			let (deadline, _) = *entry.key();
			if deadline > until {
				return None;
			}

			let armed = entry.remove();
			self.now = self.now.max(deadline);

			if !self.is_current(armed.token) {
				self.stale_dropped += 1;
				trace!(scope = ?armed.token.scope, deadline, "dropping stale callback");
				continue;
			}

			return Some(Fired {
				deadline,
				token: armed.token,
				event: armed.event,
			});
		}
	}

	/// Move the clock forward without firing anything
	pub fn advance_clock(&mut self, to: TimeMs) {
		self.now = self.now.max(to);
	}
}

impl<E> Default for TimerQueue<E> {
	fn default() -> Self {
		Self::new()
	}
}
