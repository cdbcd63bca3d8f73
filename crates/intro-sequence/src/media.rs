use crate::assets::{AssetError, ResolvedAsset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
	#[error("Failed to decode '{name}': {reason}")]
	Decode { name: String, reason: String },

	#[error("Unsupported media: {0}")]
	Unsupported(String),

	#[error(transparent)]
	Asset(#[from] AssetError),
}

/// Playback capability for the background video and the music track.
///
/// The fade engine is the only caller. Implementations should be cheap and
/// never block: every call happens on the sequencing thread.
pub trait MediaBackend: Send {
	fn load_video(&mut self, asset: &ResolvedAsset) -> Result<(), MediaError>;
	fn load_audio(&mut self, asset: &ResolvedAsset) -> Result<(), MediaError>;

	fn set_video_looping(&mut self, looping: bool);
	fn play_video(&mut self);
	fn pause_video(&mut self);
	fn seek_video_to_start(&mut self);

	fn play_audio(&mut self);
	fn pause_audio(&mut self);
	fn seek_audio_to_start(&mut self);
	fn set_volume(&mut self, volume: f32);

	/// Drop decoded media and players
	fn release(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaChannel {
	Video,
	Audio,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ChannelStatus {
	#[default]
	Unloaded,
	Ready,
	/// Muted or blank for the rest of the run
	Degraded(String),
	Released,
}

impl ChannelStatus {
	pub const fn is_ready(&self) -> bool {
		matches!(self, Self::Ready)
	}
}

/// Outcome of preparing the background media
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReport {
	pub video: ChannelStatus,
	pub audio: ChannelStatus,
}

impl MediaReport {
	pub const fn is_degraded(&self) -> bool {
		matches!(self.video, ChannelStatus::Degraded(_)) || matches!(self.audio, ChannelStatus::Degraded(_))
	}
}

/// Backend that accepts everything and plays nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMediaBackend;

impl MediaBackend for NullMediaBackend {
	fn load_video(&mut self, _asset: &ResolvedAsset) -> Result<(), MediaError> {
		Ok(())
	}
	fn load_audio(&mut self, _asset: &ResolvedAsset) -> Result<(), MediaError> {
		Ok(())
	}
	fn set_video_looping(&mut self, _looping: bool) {}
	fn play_video(&mut self) {}
	fn pause_video(&mut self) {}
	fn seek_video_to_start(&mut self) {}
	fn play_audio(&mut self) {}
	fn pause_audio(&mut self) {}
	fn seek_audio_to_start(&mut self) {}
	fn set_volume(&mut self, _volume: f32) {}
	fn release(&mut self) {}
}
