use crate::assets::{AssetKind, AssetStore, MemoryAssetStore};
use crate::catalog::SceneCatalog;
use crate::config::IntroConfig;
use crate::error::{IntroError, Result};
use crate::fade::{FadeTick, MediaFadeEngine};
use crate::haptics::HapticDispatcher;
use crate::media::{MediaBackend, MediaReport};
use crate::presenter::{Presenter, PresenterSignal, PresenterTick, PresenterView, RevealState};
use crate::state::{IntroOutcome, IntroState, SequencePhase};
use crate::timer::{TimerQueue, TimerScope};
use crate::types::{Scene, TimeMs};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Callback invoked once when the intro reaches its natural end
pub type CompletionCallback = Box<dyn FnOnce() + Send>;

/// Everything the sequencer can have armed on its timer queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tick {
	SceneDeadline { scene_index: usize },
	Settle { next_index: usize },
	Fade(FadeTick),
	Presenter(PresenterTick),
}

impl From<FadeTick> for Tick {
	fn from(tick: FadeTick) -> Self {
		Self::Fade(tick)
	}
}

impl From<PresenterTick> for Tick {
	fn from(tick: PresenterTick) -> Self {
		Self::Presenter(tick)
	}
}

/// Inputs of the phase machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOp {
	Start,
	SceneComplete { last: bool },
	SettleElapsed,
	Skip,
	Stop,
}

impl SequenceOp {
	pub const fn name(self) -> &'static str {
		match self {
			Self::Start => "start",
			Self::SceneComplete { .. } => "scene_complete",
			Self::SettleElapsed => "settle_elapsed",
			Self::Skip => "skip",
			Self::Stop => "stop",
		}
	}
}

/// Pure FSM: validates transitions only
pub fn transition(phase: SequencePhase, op: SequenceOp) -> Result<SequencePhase> {
	use SequenceOp::*;
	use SequencePhase::*;

	Ok(match (phase, op) {
		(Idle, Start) => Running,

		(Running, SceneComplete { last: true }) => Completed,
		(Running, SceneComplete { last: false }) => Transitioning,

		(Transitioning, SettleElapsed) => Running,

		(Idle | Running | Transitioning, Skip) => Skipped,
		(Idle | Running | Transitioning, Stop) => Stopped,

		// Double-fire while settling, start while running, anything after the end
		_ => {
			return Err(IntroError::InvalidTransition {
				operation: op.name(),
				phase,
			})
		}
	})
}

/// Single owner of the sequence state.
///
/// Runs on a virtual millisecond clock: nothing happens until the host calls
/// [`Sequencer::advance_to`], which fires every due callback in deadline then
/// arm order. Every operation returns immediately after arming callbacks.
pub struct Sequencer {
	catalog: SceneCatalog,
	config: IntroConfig,
	store: Arc<dyn AssetStore>,
	haptics: HapticDispatcher,
	fades: MediaFadeEngine,
	timers: TimerQueue<Tick>,

	phase: SequencePhase,
	scene_index: usize,
	active: Option<usize>,
	presenter: Option<Presenter>,
	activation: u64,

	on_complete: Option<CompletionCallback>,
	media_prepared: bool,
	released: bool,
}

impl Sequencer {
	pub fn new(catalog: SceneCatalog, config: IntroConfig, backend: Box<dyn MediaBackend>) -> Result<Self> {
		config.validate().map_err(IntroError::InvalidConfig)?;

		Ok(Self {
			catalog,
			config,
			store: Arc::new(MemoryAssetStore::new()),
			haptics: HapticDispatcher::disabled(),
			fades: MediaFadeEngine::new(backend),
			timers: TimerQueue::new(),
			phase: SequencePhase::Idle,
			scene_index: 0,
			active: None,
			presenter: None,
			activation: 0,
			on_complete: None,
			media_prepared: false,
			released: false,
		})
	}

	pub fn with_asset_store(mut self, store: Arc<dyn AssetStore>) -> Self {
		self.store = store;
		self
	}

	pub fn with_haptics(mut self, haptics: HapticDispatcher) -> Self {
		self.haptics = haptics;
		self
	}

	pub fn on_complete(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
		self.on_complete = Some(Box::new(callback));
		self
	}

	// ========================================================================
	// Operations
	// ========================================================================

	/// Load background media and warm up haptics. Runs at most once; `start`
	/// calls it when the host did not.
	pub fn prepare(&mut self) -> MediaReport {
		if self.media_prepared || self.released {
			return self.fades.report();
		}
		let report = self.fades.prepare(self.catalog.background_assets(), self.store.as_ref(), self.config.loop_video);
		self.haptics.warm_up();
		self.media_prepared = true;
		report
	}

	pub fn start(&mut self) -> Result<()> {
		self.ensure_live()?;
		let next = transition(self.phase, SequenceOp::Start).inspect_err(|e| debug!(error = %e, "start ignored"))?;

		self.prepare();
		self.phase = next;
		self.fades.fade_in(&mut self.timers, self.config.fade_in_ms, self.config.fade_in_steps, self.config.target_volume);
		info!(scenes = self.catalog.len(), "intro started");
		self.enter_scene(0);
		Ok(())
	}

	/// Report that the active scene finished. Ignored while settling between scenes.
	pub fn scene_complete(&mut self) -> Result<()> {
		self.ensure_live()?;
		let last = self.scene_index + 1 >= self.catalog.len();
		let next = transition(self.phase, SequenceOp::SceneComplete { last }).inspect_err(|e| debug!(error = %e, scene_index = self.scene_index, "scene completion ignored"))?;

		match next {
			SequencePhase::Completed => self.complete(),
			_ => self.begin_transition(),
		}
		Ok(())
	}

	/// Jump to the final frame, silence media, and cancel everything pending
	pub fn skip(&mut self) -> Result<()> {
		self.ensure_live()?;
		let next = transition(self.phase, SequenceOp::Skip).inspect_err(|e| debug!(error = %e, "skip ignored"))?;

		let purged = self.timers.invalidate_all();
		self.fades.snap_out(&mut self.timers);

		let last = self.catalog.last_index();
		if self.active != Some(last) || self.presenter.is_none() {
			self.presenter = self.catalog.get(last).map(|scene| self.build_presenter(scene));
		}
		if let Some(presenter) = self.presenter.as_mut() {
			presenter.finish_immediately();
		}

		self.active = Some(last);
		self.scene_index = self.catalog.len();
		self.phase = next;
		info!(purged, "intro skipped");
		Ok(())
	}

	/// Fade media out and pause it, leaving the current frame on screen
	pub fn stop(&mut self) -> Result<()> {
		self.ensure_live()?;
		let next = transition(self.phase, SequenceOp::Stop).inspect_err(|e| debug!(error = %e, "stop ignored"))?;

		self.timers.invalidate(TimerScope::Scene);
		self.timers.invalidate(TimerScope::Presenter);
		if let Some(presenter) = self.presenter.as_mut() {
			presenter.deactivate();
		}
		self.fades.fade_out(&mut self.timers, self.config.fade_out_ms, self.config.fade_out_steps);
		self.phase = next;
		info!(scene_index = self.scene_index, "intro stopped");
		Ok(())
	}

	/// Release media and cancel every pending callback. Safe to call repeatedly.
	pub fn cleanup(&mut self) -> bool {
		if self.released {
			trace!("cleanup already done");
			return false;
		}

		let purged = self.timers.invalidate_all();
		if let Some(presenter) = self.presenter.as_mut() {
			presenter.deactivate();
		}
		self.fades.release(&mut self.timers);
		if !self.phase.is_terminal() {
			debug!(phase = %self.phase, "cleaned up before the intro ended");
			self.phase = SequencePhase::Stopped;
		}
		self.released = true;
		info!(purged, "intro resources released");
		true
	}

	/// The media backend reached the end of the background video
	pub fn video_reached_end(&mut self) {
		if !self.released {
			self.fades.on_video_end();
		}
	}

	// ========================================================================
	// Clock
	// ========================================================================

	/// Fire everything due at or before `now`. Returns the number of callbacks run.
	pub fn advance_to(&mut self, now: TimeMs) -> usize {
		let mut fired = 0;
		while let Some(due) = self.timers.pop_due(now) {
			self.dispatch(due.event);
			fired += 1;
		}
		self.timers.advance_clock(now);
		fired
	}

	pub fn advance_by(&mut self, delta: TimeMs) -> usize {
		self.advance_to(self.timers.now().saturating_add(delta))
	}

	pub const fn now(&self) -> TimeMs {
		self.timers.now()
	}

	pub fn next_deadline(&self) -> Option<TimeMs> {
		self.timers.next_deadline()
	}

	// ========================================================================
	// Observation
	// ========================================================================

	pub const fn phase(&self) -> SequencePhase {
		self.phase
	}

	pub const fn outcome(&self) -> Option<IntroOutcome> {
		self.phase.outcome()
	}

	pub const fn scene_index(&self) -> usize {
		self.scene_index
	}

	pub fn active_scene(&self) -> Option<&Scene> {
		self.active.and_then(|index| self.catalog.get(index))
	}

	pub const fn is_scene_transitioning(&self) -> bool {
		matches!(self.phase, SequencePhase::Transitioning)
	}

	pub const fn media_opacity(&self) -> f64 {
		self.fades.opacity()
	}

	pub const fn audio_volume(&self) -> f64 {
		self.fades.volume()
	}

	pub fn pending_callbacks(&self) -> usize {
		self.timers.pending()
	}

	pub const fn presenter(&self) -> Option<&Presenter> {
		self.presenter.as_ref()
	}

	pub const fn catalog(&self) -> &SceneCatalog {
		&self.catalog
	}

	pub const fn is_released(&self) -> bool {
		self.released
	}

	pub fn state(&self) -> IntroState {
		IntroState {
			phase: self.phase,
			scene_index: self.scene_index,
			scene_count: self.catalog.len(),
			active_scene: self.active_scene().map(|scene| scene.id.clone()),
			is_scene_transitioning: self.is_scene_transitioning(),
			media_opacity: self.fades.opacity(),
			audio_volume: self.fades.volume(),
			presenter: self.presenter.as_ref().map_or(PresenterView::Empty, Presenter::view),
			reveal: self.presenter.as_ref().map_or(RevealState::Idle, Presenter::reveal_state),
			media: self.fades.report(),
			pending_callbacks: self.timers.pending(),
			current_time: self.timers.now(),
			released: self.released,
		}
	}

	// ========================================================================
	// Internals
	// ========================================================================

	fn ensure_live(&self) -> Result<()> {
		if self.released {
			debug!(phase = %self.phase, "operation ignored after cleanup");
			return Err(IntroError::Released);
		}
		Ok(())
	}

	fn dispatch(&mut self, tick: Tick) {
		match tick {
			Tick::SceneDeadline { scene_index } => {
				if scene_index != self.scene_index {
					trace!(scene_index, current = self.scene_index, "deadline for another scene");
					return;
				}
				let _ = self.scene_complete();
			}
			Tick::Settle { next_index } => self.finish_transition(next_index),
			Tick::Fade(fade) => self.fades.on_tick(fade),
			Tick::Presenter(tick) => {
				let signal = self.presenter.as_mut().and_then(|presenter| presenter.on_tick(tick, &mut self.timers, &self.haptics));
				if signal == Some(PresenterSignal::SceneComplete) {
					let _ = self.scene_complete();
				}
			}
		}
	}

	fn begin_transition(&mut self) {
		self.timers.invalidate(TimerScope::Scene);
		self.timers.invalidate(TimerScope::Presenter);
		if let Some(mut presenter) = self.presenter.take() {
			presenter.deactivate();
		}
		self.active = None;
		self.phase = SequencePhase::Transitioning;

		let next_index = self.scene_index + 1;
		let token = self.timers.token(TimerScope::Scene);
		self.timers.after(self.config.settle_delay_ms, token, Tick::Settle { next_index });
		debug!(from = self.scene_index, to = next_index, "scene transition");
	}

	fn finish_transition(&mut self, next_index: usize) {
		if next_index != self.scene_index + 1 {
			trace!(next_index, current = self.scene_index, "settle for another transition");
			return;
		}
		match transition(self.phase, SequenceOp::SettleElapsed) {
			Ok(next) => {
				self.phase = next;
				self.enter_scene(next_index);
			}
			Err(e) => debug!(error = %e, "settle ignored"),
		}
	}

	fn complete(&mut self) {
		self.timers.invalidate(TimerScope::Scene);
		self.timers.invalidate(TimerScope::Presenter);
		if let Some(presenter) = self.presenter.as_mut() {
			presenter.finish_immediately();
		}
		self.scene_index = self.catalog.len();
		self.phase = SequencePhase::Completed;
		info!("intro completed");

		if let Some(callback) = self.on_complete.take() {
			callback();
		}
	}

	fn enter_scene(&mut self, index: usize) {
		let catalog = self.catalog.clone();
		let Some(scene) = catalog.get(index) else {
			warn!(index, "no scene at index");
			return;
		};

		self.scene_index = index;
		self.active = Some(index);
		self.haptics.dispatch(scene.haptics);

		self.activation += 1;
		let mut presenter = self.build_presenter(scene);
		presenter.activate(self.activation, &mut self.timers);
		self.presenter = Some(presenter);

		if !scene.scene_type.is_self_timed() {
			let token = self.timers.token(TimerScope::Scene);
			self.timers.after(scene.duration, token, Tick::SceneDeadline { scene_index: index });
		}

		info!(scene = %scene.id, index, kind = scene.scene_type.label(), at = self.timers.now(), "scene started");
	}

	fn build_presenter(&self, scene: &Scene) -> Presenter {
		let images = scene
			.scene_type
			.images()
			.iter()
			.filter(|name| match self.store.resolve(name, AssetKind::Image) {
				Ok(_) => true,
				Err(e) => {
					warn!(scene = %scene.id, error = %e, "skipping missing image");
					false
				}
			})
			.cloned()
			.collect();
		Presenter::for_scene(scene, images, &self.config.presenters)
	}
}

impl std::fmt::Debug for Sequencer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Sequencer")
			.field("phase", &self.phase)
			.field("scene_index", &self.scene_index)
			.field("active", &self.active)
			.field("pending", &self.timers.pending())
			.field("released", &self.released)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::PresenterTiming;
	use crate::media::ChannelStatus;
	use crate::test_support::{HapticCall, MediaCall, RecordingHaptics, RecordingMedia};
	use crate::types::{AnimationConfig, AnimationKind, BackgroundAssets, EasingCurve, SceneType};
	use approx::assert_abs_diff_eq;
	use std::sync::atomic::{AtomicUsize, Ordering};

	// ============================================================================
	// Fixtures
	// ============================================================================

	struct Harness {
		seq: Sequencer,
		media: RecordingMedia,
		haptics: RecordingHaptics,
		completions: Arc<AtomicUsize>,
	}

	fn full_store(catalog: &SceneCatalog) -> MemoryAssetStore {
		let mut store = MemoryAssetStore::new();
		for request in catalog.asset_manifest() {
			store.insert(request.name, request.kind);
		}
		store
	}

	fn harness(catalog: SceneCatalog, config: IntroConfig) -> Harness {
		let media = RecordingMedia::default();
		let haptics = RecordingHaptics::default();
		let completions = Arc::new(AtomicUsize::new(0));
		let counter = completions.clone();

		let seq = Sequencer::new(catalog.clone(), config, Box::new(media.clone()))
			.unwrap()
			.with_asset_store(Arc::new(full_store(&catalog)))
			.with_haptics(HapticDispatcher::new(Arc::new(haptics.clone())))
			.on_complete(move || {
				counter.fetch_add(1, Ordering::SeqCst);
			});

		Harness { seq, media, haptics, completions }
	}

	fn anim() -> AnimationConfig {
		AnimationConfig::new(AnimationKind::Fade, 500, EasingCurve::EaseInOut, 0)
	}

	/// Image stack for 2.0s, typewriter "hi", cross-fade for 1.0s
	fn three_scene_catalog() -> SceneCatalog {
		SceneCatalog::new(
			vec![
				Scene::new("stack", 2000, SceneType::ImageStack(vec!["a".into()]), anim()),
				Scene::new("typed", 0, SceneType::Text("hi".into()), anim()),
				Scene::new("fade", 1000, SceneType::ImageFade(vec!["c".into()]), anim()),
			],
			BackgroundAssets::new("bg", "music"),
		)
		.unwrap()
	}

	fn fast_typing() -> IntroConfig {
		IntroConfig::default().with_presenters(PresenterTiming::default().with_typewriter(100, 500))
	}

	/// Record every scene index the sequencer passes through
	fn run_collecting_indices(seq: &mut Sequencer, until: TimeMs, step: TimeMs) -> Vec<usize> {
		let mut seen = vec![seq.scene_index()];
		let mut t = seq.now();
		while t < until && !seq.phase().is_terminal() {
			t += step;
			seq.advance_to(t);
			if seen.last() != Some(&seq.scene_index()) {
				seen.push(seq.scene_index());
			}
		}
		seen
	}

	// ============================================================================
	// Phase machine
	// ============================================================================

	#[test]
	fn fsm_accepts_the_documented_transitions() {
		use SequencePhase::*;

		assert_eq!(transition(Idle, SequenceOp::Start).unwrap(), Running);
		assert_eq!(transition(Running, SequenceOp::SceneComplete { last: false }).unwrap(), Transitioning);
		assert_eq!(transition(Running, SequenceOp::SceneComplete { last: true }).unwrap(), Completed);
		assert_eq!(transition(Transitioning, SequenceOp::SettleElapsed).unwrap(), Running);

		for phase in [Idle, Running, Transitioning] {
			assert_eq!(transition(phase, SequenceOp::Skip).unwrap(), Skipped);
			assert_eq!(transition(phase, SequenceOp::Stop).unwrap(), Stopped);
		}
	}

	#[test]
	fn fsm_rejects_reentry_and_terminal_ops() {
		use SequencePhase::*;

		assert!(transition(Running, SequenceOp::Start).is_err());
		assert!(transition(Transitioning, SequenceOp::SceneComplete { last: false }).is_err());
		assert!(transition(Idle, SequenceOp::SceneComplete { last: false }).is_err());

		for phase in [Completed, Skipped, Stopped] {
			for op in [SequenceOp::Start, SequenceOp::Skip, SequenceOp::Stop, SequenceOp::SettleElapsed] {
				let err = transition(phase, op).unwrap_err();
				assert!(err.is_recoverable());
			}
		}
	}

	// ============================================================================
	// Scene progression
	// ============================================================================

	#[test]
	fn scene_index_advances_by_one_through_the_whole_catalog() {
		let mut h = harness(SceneCatalog::legacy(), IntroConfig::default());
		h.seq.start().unwrap();

		let seen = run_collecting_indices(&mut h.seq, 120_000, 10);
		let expected: Vec<usize> = (0..=13).collect();
		assert_eq!(seen, expected);
		assert_eq!(h.seq.phase(), SequencePhase::Completed);
		assert_eq!(h.completions.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn three_scene_run_completes_no_earlier_than_derived_total() {
		// 2000 + settle 100 + (2 * 100 + 500) + settle 100 + 1000
		let mut h = harness(three_scene_catalog(), fast_typing());
		h.seq.start().unwrap();

		h.seq.advance_to(3899);
		assert_eq!(h.seq.phase(), SequencePhase::Running);
		assert_eq!(h.seq.active_scene().map(|s| s.id.as_str()), Some("fade"));
		assert_eq!(h.completions.load(Ordering::SeqCst), 0);

		h.seq.advance_to(3900);
		assert_eq!(h.seq.phase(), SequencePhase::Completed);
		assert_eq!(h.seq.scene_index(), 3);
		assert_eq!(h.seq.active_scene().map(|s| s.id.as_str()), Some("fade"));

		h.seq.advance_to(60_000);
		assert_eq!(h.completions.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn transition_window_clears_the_active_scene() {
		let mut h = harness(three_scene_catalog(), fast_typing());
		h.seq.start().unwrap();

		h.seq.advance_to(2000);
		assert!(h.seq.is_scene_transitioning());
		assert!(h.seq.active_scene().is_none());
		assert_eq!(h.seq.scene_index(), 0);
		assert_eq!(h.seq.state().presenter, PresenterView::Empty);

		h.seq.advance_to(2100);
		assert_eq!(h.seq.phase(), SequencePhase::Running);
		assert_eq!(h.seq.scene_index(), 1);
		assert_eq!(h.seq.state().presenter, PresenterView::Text { text: String::new(), cursor: true });
	}

	#[test]
	fn without_settle_delay_scenes_follow_back_to_back() {
		let mut h = harness(three_scene_catalog(), fast_typing().with_settle_delay(0));
		h.seq.start().unwrap();

		h.seq.advance_to(3699);
		assert_eq!(h.seq.phase(), SequencePhase::Running);
		h.seq.advance_to(3700);
		assert_eq!(h.seq.phase(), SequencePhase::Completed);
	}

	#[test]
	fn double_completion_advances_once() {
		let mut h = harness(three_scene_catalog(), fast_typing());
		h.seq.start().unwrap();

		assert!(h.seq.scene_complete().is_ok());
		assert!(h.seq.scene_complete().is_err());
		h.seq.advance_by(100);
		assert_eq!(h.seq.scene_index(), 1);

		// Scene 0's own deadline was purged with the transition
		h.seq.advance_to(799);
		assert_eq!(h.seq.scene_index(), 1);
		assert_eq!(h.seq.active_scene().map(|s| s.id.as_str()), Some("typed"));

		h.seq.advance_to(900);
		assert_eq!(h.seq.scene_index(), 2);
	}

	#[test]
	fn start_is_a_no_op_when_already_running() {
		let mut h = harness(three_scene_catalog(), fast_typing());
		h.seq.start().unwrap();
		h.seq.advance_to(500);
		let pending = h.seq.pending_callbacks();

		assert!(matches!(h.seq.start(), Err(IntroError::InvalidTransition { operation: "start", .. })));
		assert_eq!(h.seq.pending_callbacks(), pending);
		assert_eq!(h.seq.scene_index(), 0);
	}

	#[test]
	fn entering_a_scene_dispatches_its_haptic() {
		let mut h = harness(SceneCatalog::legacy(), IntroConfig::default());
		h.seq.start().unwrap();

		// Warm-up once, then the subtle tag of the first scene
		assert_eq!(h.haptics.calls()[..2], [HapticCall::Prepare, HapticCall::Typing]);

		h.seq.advance_to(700);
		// "Legacy" is six characters, each one typed
		assert_eq!(h.haptics.count(HapticCall::Typing), 7);
	}

	// ============================================================================
	// Media
	// ============================================================================

	#[test]
	fn opacity_strictly_increases_during_fade_in() {
		let mut h = harness(SceneCatalog::legacy(), IntroConfig::default());
		h.seq.start().unwrap();

		let mut previous = h.seq.media_opacity();
		assert_abs_diff_eq!(previous, 0.0);
		for t in (100..=5000).step_by(100) {
			h.seq.advance_to(t);
			let opacity = h.seq.media_opacity();
			assert!(opacity > previous, "opacity {opacity} at {t} did not increase");
			assert!((0.0..=1.0).contains(&opacity));
			previous = opacity;
		}
		assert_abs_diff_eq!(h.seq.media_opacity(), 1.0, epsilon = 1e-9);
		assert_abs_diff_eq!(h.seq.audio_volume(), 0.8, epsilon = 1e-9);
	}

	#[test]
	fn missing_background_media_does_not_block_scenes() {
		let catalog = three_scene_catalog();
		let mut seq = Sequencer::new(catalog, fast_typing(), Box::new(RecordingMedia::default())).unwrap();
		let report = seq.prepare();
		assert!(report.is_degraded());
		assert!(matches!(report.audio, ChannelStatus::Degraded(_)));

		seq.start().unwrap();
		seq.advance_to(10_000);
		assert_eq!(seq.phase(), SequencePhase::Completed);
		assert_abs_diff_eq!(seq.media_opacity(), 0.0);
	}

	#[test]
	fn missing_images_are_skipped() {
		let catalog = three_scene_catalog();
		let store = MemoryAssetStore::new();
		let mut seq = Sequencer::new(catalog, fast_typing(), Box::new(RecordingMedia::default())).unwrap().with_asset_store(Arc::new(store));

		seq.start().unwrap();
		seq.advance_to(100);
		match seq.state().presenter {
			PresenterView::Images { shown, .. } => assert!(shown.is_empty()),
			other => panic!("expected image view, got {other:?}"),
		}
	}

	// ============================================================================
	// Skip / stop / cleanup
	// ============================================================================

	#[test]
	fn skip_from_any_scene_lands_on_the_last_scene_with_nothing_pending() {
		let catalog = SceneCatalog::legacy();
		for skip_at in [0, 1, 5, 12] {
			let mut h = harness(catalog.clone(), IntroConfig::default());
			h.seq.start().unwrap();
			while h.seq.scene_index() < skip_at {
				let deadline = h.seq.next_deadline().unwrap();
				h.seq.advance_to(deadline);
			}

			h.seq.skip().unwrap();
			assert_eq!(h.seq.phase(), SequencePhase::Skipped);
			assert_eq!(h.seq.active_scene(), catalog.last());
			assert_eq!(h.seq.scene_index(), catalog.len());
			assert_eq!(h.seq.pending_callbacks(), 0);
			assert_abs_diff_eq!(h.seq.audio_volume(), 0.0);
			assert_eq!(h.seq.state().presenter, PresenterView::Text { text: "Legacy AI".into(), cursor: false });

			h.seq.advance_to(120_000);
			assert_eq!(h.completions.load(Ordering::SeqCst), 0);
		}
	}

	#[test]
	fn skip_mid_transition_is_safe() {
		let mut h = harness(three_scene_catalog(), fast_typing());
		h.seq.start().unwrap();
		h.seq.advance_to(2050);
		assert!(h.seq.is_scene_transitioning());

		h.seq.skip().unwrap();
		assert_eq!(h.seq.active_scene().map(|s| s.id.as_str()), Some("fade"));
		assert_eq!(h.seq.pending_callbacks(), 0);
		assert!(h.media.calls().contains(&MediaCall::PauseAudio));
	}

	#[test]
	fn skip_from_idle_lands_on_last_scene() {
		let catalog = three_scene_catalog();
		let mut h = harness(catalog.clone(), fast_typing());

		h.seq.skip().unwrap();
		assert_eq!(h.seq.phase(), SequencePhase::Skipped);
		assert_eq!(h.seq.active_scene(), catalog.last());
		assert_eq!(h.seq.scene_index(), catalog.len());
		assert_eq!(h.seq.pending_callbacks(), 0);

		h.seq.advance_to(60_000);
		assert_eq!(h.completions.load(Ordering::SeqCst), 0);
		assert!(h.seq.start().is_err());
	}

	#[test]
	fn stop_mid_transition_enters_no_scene() {
		let mut h = harness(three_scene_catalog(), fast_typing());
		h.seq.start().unwrap();
		h.seq.advance_to(2050);
		assert!(h.seq.is_scene_transitioning());

		h.seq.stop().unwrap();
		assert_eq!(h.seq.phase(), SequencePhase::Stopped);

		// Past the settle deadline: the next scene never starts
		h.seq.advance_to(2200);
		assert!(h.seq.active_scene().is_none());
		assert_eq!(h.seq.scene_index(), 0);

		h.seq.advance_to(2600);
		assert_eq!(h.seq.pending_callbacks(), 0);
		assert!(h.seq.active_scene().is_none());
		assert_eq!(h.haptics.count(HapticCall::Typing), 0);
		assert_eq!(h.completions.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn stop_fades_out_then_pauses() {
		let mut h = harness(three_scene_catalog(), fast_typing());
		h.seq.start().unwrap();
		h.seq.advance_to(2500);
		let index = h.seq.scene_index();

		h.seq.stop().unwrap();
		assert_eq!(h.seq.phase(), SequencePhase::Stopped);
		assert!(h.seq.pending_callbacks() > 0);

		h.seq.advance_by(500);
		assert_eq!(h.seq.pending_callbacks(), 0);
		assert_abs_diff_eq!(h.seq.media_opacity(), 0.0, epsilon = 1e-9);
		assert_eq!(h.media.count(MediaCall::PauseVideo), 1);
		assert_eq!(h.media.count(MediaCall::PauseAudio), 1);
		assert_eq!(h.seq.scene_index(), index);
		assert!(h.seq.skip().is_err());
		assert_eq!(h.completions.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn cleanup_is_idempotent() {
		let mut h = harness(three_scene_catalog(), fast_typing());
		h.seq.start().unwrap();
		h.seq.advance_to(1000);
		h.seq.skip().unwrap();

		assert!(h.seq.cleanup());
		let first = h.seq.state();
		assert!(!h.seq.cleanup());
		assert_eq!(h.seq.state(), first);
		assert!(first.released);
		assert_eq!(first.pending_callbacks, 0);
		assert_eq!(h.media.count(MediaCall::Release), 1);
	}

	#[test]
	fn operations_after_cleanup_are_ignored() {
		let mut h = harness(three_scene_catalog(), fast_typing());
		h.seq.cleanup();

		assert!(matches!(h.seq.start(), Err(IntroError::Released)));
		assert!(h.seq.skip().is_err());
		assert_eq!(h.seq.phase(), SequencePhase::Stopped);
		assert_eq!(h.seq.advance_to(60_000), 0);
	}

	#[test]
	fn video_end_loops_until_released() {
		let mut h = harness(three_scene_catalog(), fast_typing());
		h.seq.start().unwrap();
		h.media.clear();

		h.seq.video_reached_end();
		assert_eq!(h.media.calls(), vec![MediaCall::SeekVideo, MediaCall::PlayVideo]);

		h.seq.cleanup();
		h.media.clear();
		h.seq.video_reached_end();
		assert!(h.media.calls().is_empty());
	}
}
