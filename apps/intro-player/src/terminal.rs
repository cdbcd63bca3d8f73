use intro_sequence::{HapticFeedback, MediaBackend, MediaError, ResolvedAsset};
use std::io::Write;
use tracing::{debug, info, trace};

/// Media backend that narrates playback instead of decoding it
#[derive(Debug, Default)]
pub struct TerminalMedia {
	video: Option<String>,
	audio: Option<String>,
	volume: f32,
}

impl MediaBackend for TerminalMedia {
	fn load_video(&mut self, asset: &ResolvedAsset) -> Result<(), MediaError> {
		info!(location = %asset.location.display(), size = asset.size, "video loaded");
		self.video = Some(asset.name.clone());
		Ok(())
	}

	fn load_audio(&mut self, asset: &ResolvedAsset) -> Result<(), MediaError> {
		info!(location = %asset.location.display(), size = asset.size, "audio loaded");
		self.audio = Some(asset.name.clone());
		Ok(())
	}

	fn set_video_looping(&mut self, looping: bool) {
		debug!(looping, "video looping");
	}

	fn play_video(&mut self) {
		debug!(video = ?self.video, "video playing");
	}

	fn pause_video(&mut self) {
		debug!(video = ?self.video, "video paused");
	}

	fn seek_video_to_start(&mut self) {
		trace!("video rewound");
	}

	fn play_audio(&mut self) {
		debug!(audio = ?self.audio, "audio playing");
	}

	fn pause_audio(&mut self) {
		debug!(audio = ?self.audio, volume = self.volume, "audio paused");
	}

	fn seek_audio_to_start(&mut self) {
		trace!("audio rewound");
	}

	fn set_volume(&mut self, volume: f32) {
		self.volume = volume;
		trace!(volume, "volume");
	}

	fn release(&mut self) {
		debug!("media released");
		self.video = None;
		self.audio = None;
	}
}

/// Haptics rendered as the terminal bell on impacts
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalHaptics;

impl HapticFeedback for TerminalHaptics {
	fn prepare(&self) {
		trace!("haptics ready");
	}

	fn play_typing(&self) {
		trace!("tick");
	}

	fn play_impact(&self) {
		let mut stdout = std::io::stdout();
		let _ = stdout.write_all(b"\x07");
		let _ = stdout.flush();
	}

	fn play_success(&self) {
		trace!("success");
	}
}
