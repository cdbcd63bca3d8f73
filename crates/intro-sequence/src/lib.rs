//! Timed playback of the scripted intro: scenes, background media fades,
//! haptics and skip/stop/cleanup with epoch-checked cancellation.

pub mod assets;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fade;
pub mod haptics;
pub mod media;
pub mod presenter;
pub mod sequencer;
pub mod state;
pub mod timer;
pub mod types;

#[cfg(feature = "runtime")]
mod commands;
#[cfg(feature = "runtime")]
mod engine;
#[cfg(feature = "runtime")]
mod player;

#[cfg(test)]
mod test_support;

pub use assets::{AssetError, AssetKind, AssetStore, DirAssetStore, MemoryAssetStore, ResolvedAsset};
pub use catalog::{AssetRequest, PreloadReport, SceneCatalog};
pub use config::{Cadence, IntroConfig, PresenterTiming};
pub use error::{IntroError, Result};
pub use fade::MediaFadeEngine;
pub use haptics::{HapticDispatcher, HapticFeedback, NoHaptics};
pub use media::{ChannelStatus, MediaBackend, MediaChannel, MediaError, MediaReport, NullMediaBackend};
pub use presenter::{PresenterView, RevealState};
pub use sequencer::{CompletionCallback, Sequencer};
pub use state::{IntroOutcome, IntroState, SequencePhase};
pub use types::{AnimationConfig, AnimationKind, BackgroundAssets, EasingCurve, HapticPattern, ResourceRef, Scene, SceneAssets, SceneType, TimeMs};

#[cfg(feature = "runtime")]
pub use player::IntroPlayer;
