use crate::assets::{AssetKind, AssetStore};
use crate::media::{ChannelStatus, MediaBackend, MediaChannel, MediaReport};
use crate::timer::{TimerQueue, TimerScope};
use crate::types::{BackgroundAssets, EasingCurve, TimeMs};
use tracing::{debug, info, trace, warn};

impl MediaChannel {
	pub const fn scope(self) -> TimerScope {
		match self {
			Self::Video => TimerScope::Video,
			Self::Audio => TimerScope::Audio,
		}
	}
}

/// One step of a ramp, addressed by position rather than by elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeTick {
	pub channel: MediaChannel,
	pub step: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ramp {
	from: f64,
	to: f64,
	steps: u32,
	curve: EasingCurve,
	pause_on_finish: bool,
}

impl Ramp {
	fn value_at(&self, step: u32) -> f64 {
		let progress = f64::from(step.min(self.steps)) / f64::from(self.steps.max(1));
		self.from + (self.to - self.from) * self.curve.apply(progress)
	}

	const fn is_last(&self, step: u32) -> bool {
		step >= self.steps
	}
}

#[derive(Debug, Default)]
struct Channel {
	status: ChannelStatus,
	level: f64,
	ramp: Option<Ramp>,
	playing: bool,
}

/// Drives background video opacity and music volume on independent ramps.
///
/// Owns the media backend. Every ramp step is a separate callback in the
/// channel's own timer scope, so restarting a ramp never leaves stragglers.
pub struct MediaFadeEngine {
	backend: Box<dyn MediaBackend>,
	video: Channel,
	audio: Channel,
	looping: bool,
	released: bool,
}

impl MediaFadeEngine {
	pub fn new(backend: Box<dyn MediaBackend>) -> Self {
		Self {
			backend,
			video: Channel::default(),
			audio: Channel::default(),
			looping: true,
			released: false,
		}
	}

	/// Resolve and load the background pair. Each channel degrades on its own.
	pub fn prepare(&mut self, background: &BackgroundAssets, store: &dyn AssetStore, looping: bool) -> MediaReport {
		self.looping = looping;

		self.video.status = match store.resolve(background.video.name(), AssetKind::Video) {
			Ok(asset) => match self.backend.load_video(&asset) {
				Ok(()) => {
					self.backend.set_video_looping(looping);
					info!(video = %background.video, size = asset.size, "background video ready");
					ChannelStatus::Ready
				}
				Err(e) => {
					warn!(video = %background.video, error = %e, "background video failed to load, continuing without video");
					ChannelStatus::Degraded(e.to_string())
				}
			},
			Err(e) => {
				warn!(video = %background.video, error = %e, "background video missing, continuing without video");
				ChannelStatus::Degraded(e.to_string())
			}
		};

		self.audio.status = match store.resolve(background.music.name(), AssetKind::Audio) {
			Ok(asset) => match self.backend.load_audio(&asset) {
				Ok(()) => {
					info!(music = %background.music, size = asset.size, "background music ready");
					ChannelStatus::Ready
				}
				Err(e) => {
					warn!(music = %background.music, error = %e, "background music failed to load, continuing muted");
					ChannelStatus::Degraded(e.to_string())
				}
			},
			Err(e) => {
				warn!(music = %background.music, error = %e, "background music missing, continuing muted");
				ChannelStatus::Degraded(e.to_string())
			}
		};

		self.report()
	}

	/// Start both channels from the top and ramp them up over `duration`.
	pub fn fade_in<E: From<FadeTick>>(&mut self, timers: &mut TimerQueue<E>, duration: TimeMs, steps: u32, target_volume: f64) {
		self.cancel(timers);
		if self.released {
			return;
		}

		if self.video.status.is_ready() {
			self.backend.seek_video_to_start();
			self.backend.play_video();
			self.video.playing = true;
			self.video.level = 0.0;
			let ramp = Ramp {
				from: 0.0,
				to: 1.0,
				steps,
				curve: EasingCurve::Linear,
				pause_on_finish: false,
			};
			Self::schedule(&mut self.video, timers, MediaChannel::Video, ramp, duration);
		}

		if self.audio.status.is_ready() {
			self.backend.set_volume(0.0);
			self.backend.seek_audio_to_start();
			self.backend.play_audio();
			self.audio.playing = true;
			self.audio.level = 0.0;
			let ramp = Ramp {
				from: 0.0,
				to: target_volume.clamp(0.0, 1.0),
				steps,
				curve: EasingCurve::EaseInOut,
				pause_on_finish: false,
			};
			Self::schedule(&mut self.audio, timers, MediaChannel::Audio, ramp, duration);
		}

		debug!(duration, steps, target_volume, "fade in scheduled");
	}

	/// Ramp both channels down from wherever they are, then pause them.
	pub fn fade_out<E: From<FadeTick>>(&mut self, timers: &mut TimerQueue<E>, duration: TimeMs, steps: u32) {
		self.cancel(timers);
		if self.released {
			return;
		}

		for (channel, state) in [(MediaChannel::Video, &mut self.video), (MediaChannel::Audio, &mut self.audio)] {
			if !state.status.is_ready() {
				state.level = 0.0;
				continue;
			}
			let ramp = Ramp {
				from: state.level,
				to: 0.0,
				steps,
				curve: EasingCurve::Linear,
				pause_on_finish: true,
			};
			Self::schedule(state, timers, channel, ramp, duration);
		}

		debug!(duration, steps, "fade out scheduled");
	}

	/// Drop to silence and black immediately, leaving nothing scheduled
	pub fn snap_out<E>(&mut self, timers: &mut TimerQueue<E>) {
		self.cancel(timers);
		self.video.level = 0.0;
		self.audio.level = 0.0;
		if self.released {
			return;
		}
		self.pause(MediaChannel::Video);
		self.pause(MediaChannel::Audio);
	}

	/// Invalidate every pending step on both channels
	pub fn cancel<E>(&mut self, timers: &mut TimerQueue<E>) {
		let purged = timers.invalidate(TimerScope::Video) + timers.invalidate(TimerScope::Audio);
		self.video.ramp = None;
		self.audio.ramp = None;
		if purged > 0 {
			trace!(purged, "fade steps cancelled");
		}
	}

	pub fn on_tick(&mut self, tick: FadeTick) {
		let state = self.channel_mut(tick.channel);
		let Some(ramp) = state.ramp else {
			trace!(channel = ?tick.channel, step = tick.step, "fade step without a ramp");
			return;
		};

		state.level = ramp.value_at(tick.step).clamp(0.0, 1.0);
		let level = state.level;
		let finished = ramp.is_last(tick.step);
		if finished {
			state.ramp = None;
		}

		if tick.channel == MediaChannel::Audio {
			#[allow(clippy::cast_possible_truncation)]
			self.backend.set_volume(level as f32);
		}

		if finished && ramp.pause_on_finish {
			self.pause(tick.channel);
			debug!(channel = ?tick.channel, "fade out finished, media paused");
		}
	}

	/// The backend reached the end of the background video
	pub fn on_video_end(&mut self) {
		if self.released || !self.looping || !self.video.playing || !self.video.status.is_ready() {
			return;
		}
		trace!("looping background video");
		self.backend.seek_video_to_start();
		self.backend.play_video();
	}

	/// Release players and decoded media. Only the first call does anything.
	pub fn release<E>(&mut self, timers: &mut TimerQueue<E>) -> bool {
		self.cancel(timers);
		if self.released {
			return false;
		}

		self.pause(MediaChannel::Video);
		self.pause(MediaChannel::Audio);
		self.backend.release();
		self.video = Channel {
			status: ChannelStatus::Released,
			..Channel::default()
		};
		self.audio = Channel {
			status: ChannelStatus::Released,
			..Channel::default()
		};
		self.released = true;
		info!("background media released");
		true
	}

	pub const fn opacity(&self) -> f64 {
		self.video.level
	}

	pub const fn volume(&self) -> f64 {
		self.audio.level
	}

	pub const fn is_fading(&self, channel: MediaChannel) -> bool {
		match channel {
			MediaChannel::Video => self.video.ramp.is_some(),
			MediaChannel::Audio => self.audio.ramp.is_some(),
		}
	}

	pub const fn is_released(&self) -> bool {
		self.released
	}

	pub fn report(&self) -> MediaReport {
		MediaReport {
			video: self.video.status.clone(),
			audio: self.audio.status.clone(),
		}
	}

	fn pause(&mut self, channel: MediaChannel) {
		let state = self.channel_mut(channel);
		if !state.playing {
			return;
		}
		state.playing = false;
		match channel {
			MediaChannel::Video => self.backend.pause_video(),
			MediaChannel::Audio => self.backend.pause_audio(),
		}
	}

	fn channel_mut(&mut self, channel: MediaChannel) -> &mut Channel {
		match channel {
			MediaChannel::Video => &mut self.video,
			MediaChannel::Audio => &mut self.audio,
		}
	}

	fn schedule<E: From<FadeTick>>(state: &mut Channel, timers: &mut TimerQueue<E>, channel: MediaChannel, ramp: Ramp, duration: TimeMs) {
		let steps = ramp.steps.max(1);
		let ramp = Ramp { steps, ..ramp };
		let token = timers.token(channel.scope());
		let duration = duration.max(0);

		for step in 0..=steps {
			let offset = duration * TimeMs::from(step) / TimeMs::from(steps);
			timers.after(offset, token, E::from(FadeTick { channel, step }));
		}

		state.ramp = Some(ramp);
	}
}
