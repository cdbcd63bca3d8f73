//! Recording doubles for the injected capabilities

use crate::assets::ResolvedAsset;
use crate::haptics::HapticFeedback;
use crate::media::{MediaBackend, MediaError};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaCall {
	LoadVideo,
	LoadAudio,
	Looping(bool),
	PlayVideo,
	PauseVideo,
	SeekVideo,
	PlayAudio,
	PauseAudio,
	SeekAudio,
	Volume(f32),
	Release,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingMedia {
	calls: Arc<Mutex<Vec<MediaCall>>>,
}

impl RecordingMedia {
	fn push(&self, call: MediaCall) {
		self.calls.lock().unwrap().push(call);
	}

	pub fn calls(&self) -> Vec<MediaCall> {
		self.calls.lock().unwrap().clone()
	}

	pub fn volumes(&self) -> Vec<f32> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				MediaCall::Volume(v) => Some(v),
				_ => None,
			})
			.collect()
	}

	pub fn count(&self, call: MediaCall) -> usize {
		self.calls().into_iter().filter(|c| *c == call).count()
	}

	pub fn clear(&self) {
		self.calls.lock().unwrap().clear();
	}
}

impl MediaBackend for RecordingMedia {
	fn load_video(&mut self, _asset: &ResolvedAsset) -> Result<(), MediaError> {
		self.push(MediaCall::LoadVideo);
		Ok(())
	}
	fn load_audio(&mut self, _asset: &ResolvedAsset) -> Result<(), MediaError> {
		self.push(MediaCall::LoadAudio);
		Ok(())
	}
	fn set_video_looping(&mut self, looping: bool) {
		self.push(MediaCall::Looping(looping));
	}
	fn play_video(&mut self) {
		self.push(MediaCall::PlayVideo);
	}
	fn pause_video(&mut self) {
		self.push(MediaCall::PauseVideo);
	}
	fn seek_video_to_start(&mut self) {
		self.push(MediaCall::SeekVideo);
	}
	fn play_audio(&mut self) {
		self.push(MediaCall::PlayAudio);
	}
	fn pause_audio(&mut self) {
		self.push(MediaCall::PauseAudio);
	}
	fn seek_audio_to_start(&mut self) {
		self.push(MediaCall::SeekAudio);
	}
	fn set_volume(&mut self, volume: f32) {
		self.push(MediaCall::Volume(volume));
	}
	fn release(&mut self) {
		self.push(MediaCall::Release);
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticCall {
	Prepare,
	Typing,
	Impact,
	Success,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingHaptics {
	calls: Arc<Mutex<Vec<HapticCall>>>,
}

impl RecordingHaptics {
	fn push(&self, call: HapticCall) {
		self.calls.lock().unwrap().push(call);
	}

	pub fn calls(&self) -> Vec<HapticCall> {
		self.calls.lock().unwrap().clone()
	}

	pub fn count(&self, call: HapticCall) -> usize {
		self.calls().into_iter().filter(|c| *c == call).count()
	}
}

impl HapticFeedback for RecordingHaptics {
	fn prepare(&self) {
		self.push(HapticCall::Prepare);
	}
	fn play_typing(&self) {
		self.push(HapticCall::Typing);
	}
	fn play_impact(&self) {
		self.push(HapticCall::Impact);
	}
	fn play_success(&self) {
		self.push(HapticCall::Success);
	}
}
