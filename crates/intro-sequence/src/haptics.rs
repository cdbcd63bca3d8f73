use crate::types::HapticPattern;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Device capability for tactile feedback. Unsupported hardware should make
/// every call a no-op rather than fail.
pub trait HapticFeedback: Send + Sync {
	/// Warm up feedback generators
	fn prepare(&self) {}

	fn play_typing(&self);
	fn play_impact(&self);
	fn play_success(&self);
}

/// Device without haptics
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl HapticFeedback for NoHaptics {
	fn play_typing(&self) {}
	fn play_impact(&self) {}
	fn play_success(&self) {}
}

/// Maps scene haptic tags onto the injected device
#[derive(Clone)]
pub struct HapticDispatcher {
	device: Arc<dyn HapticFeedback>,
	warmed: Arc<AtomicBool>,
	dispatched: Arc<AtomicU64>,
}

impl HapticDispatcher {
	pub fn new(device: Arc<dyn HapticFeedback>) -> Self {
		Self {
			device,
			warmed: Arc::new(AtomicBool::new(false)),
			dispatched: Arc::new(AtomicU64::new(0)),
		}
	}

	pub fn disabled() -> Self {
		Self::new(Arc::new(NoHaptics))
	}

	/// Prepare the device once. Later calls return `false` and do nothing.
	pub fn warm_up(&self) -> bool {
		if self.warmed.swap(true, Ordering::AcqRel) {
			return false;
		}
		self.device.prepare();
		debug!("haptic generators prepared");
		true
	}

	pub fn dispatch(&self, pattern: Option<HapticPattern>) {
		let Some(pattern) = pattern else { return };
		trace!(?pattern, "haptic");
		match pattern {
			HapticPattern::Typing | HapticPattern::Subtle => self.device.play_typing(),
			HapticPattern::Transition | HapticPattern::Impact => self.device.play_impact(),
			HapticPattern::Success => self.device.play_success(),
		}
		self.dispatched.fetch_add(1, Ordering::Relaxed);
	}

	pub fn typing(&self) {
		self.dispatch(Some(HapticPattern::Typing));
	}

	pub fn impact(&self) {
		self.dispatch(Some(HapticPattern::Impact));
	}

	pub fn dispatched(&self) -> u64 {
		self.dispatched.load(Ordering::Relaxed)
	}
}

impl Default for HapticDispatcher {
	fn default() -> Self {
		Self::disabled()
	}
}

impl std::fmt::Debug for HapticDispatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HapticDispatcher")
			.field("warmed", &self.warmed.load(Ordering::Relaxed))
			.field("dispatched", &self.dispatched())
			.finish_non_exhaustive()
	}
}
