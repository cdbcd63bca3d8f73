use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Time in milliseconds
pub type TimeMs = i64;

/// Symbolic name of a resource held by the external asset store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRef(String);

impl ResourceRef {
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	pub fn name(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ResourceRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Content variant of a scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum SceneType {
	/// Typewriter text overlay
	Text(String),
	/// Images stacked on top of each other at an angle
	ImageStack(Vec<String>),
	/// Horizontally rotating carousel
	ImageRotation(Vec<String>),
	/// Cross-fading images
	ImageFade(Vec<String>),
	/// Text over a rapidly changing image background
	Composite { text: String, images: Vec<String> },
	/// Full screen video
	Video(ResourceRef),
}

impl SceneType {
	pub fn images(&self) -> &[String] {
		match self {
			Self::ImageStack(images) | Self::ImageRotation(images) | Self::ImageFade(images) | Self::Composite { images, .. } => images,
			Self::Text(_) | Self::Video(_) => &[],
		}
	}

	pub fn text(&self) -> Option<&str> {
		match self {
			Self::Text(text) | Self::Composite { text, .. } => Some(text),
			_ => None,
		}
	}

	/// Whether the presenter for this scene decides when the scene ends.
	/// Every other scene type runs for its declared duration.
	pub const fn is_self_timed(&self) -> bool {
		matches!(self, Self::Text(_))
	}

	pub const fn requires_images(&self) -> bool {
		matches!(self, Self::ImageStack(_) | Self::ImageRotation(_) | Self::ImageFade(_) | Self::Composite { .. })
	}

	pub const fn label(&self) -> &'static str {
		match self {
			Self::Text(_) => "text",
			Self::ImageStack(_) => "image_stack",
			Self::ImageRotation(_) => "image_rotation",
			Self::ImageFade(_) => "image_fade",
			Self::Composite { .. } => "composite",
			Self::Video(_) => "video",
		}
	}
}

/// Assets required for a scene
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneAssets {
	pub images: Option<Vec<String>>,
	pub video_ref: Option<ResourceRef>,
	pub audio_ref: Option<ResourceRef>,
}

impl SceneAssets {
	pub fn none() -> Self {
		Self::default()
	}

	pub fn images(images: &[String]) -> Self {
		Self {
			images: Some(images.to_vec()),
			..Self::default()
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
	Typewriter,
	StackWithAngle,
	HorizontalRotation,
	CrossFade,
	SlideUp,
	Flash,
	RapidSequence,
	Fade,
}

/// Timing curve mapping linear progress in `[0, 1]` onto eased progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingCurve {
	Linear,
	EaseIn,
	EaseOut,
	#[default]
	EaseInOut,
}

impl EasingCurve {
	pub fn apply(self, progress: f64) -> f64 {
		let p = progress.clamp(0.0, 1.0);
		let eased = match self {
			Self::Linear => p,
			Self::EaseIn => 1.0 - (p * PI / 2.0).cos(),
			Self::EaseOut => (p * PI / 2.0).sin(),
			Self::EaseInOut => (1.0 - (p * PI).cos()) / 2.0,
		};
		eased.clamp(0.0, 1.0)
	}
}

/// Renderer hints for a scene. Scheduling never depends on these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationConfig {
	pub kind: AnimationKind,
	pub duration: TimeMs,
	#[serde(default)]
	pub curve: EasingCurve,
	#[serde(default)]
	pub delay: TimeMs,
}

impl AnimationConfig {
	pub const fn new(kind: AnimationKind, duration: TimeMs, curve: EasingCurve, delay: TimeMs) -> Self {
		Self { kind, duration, curve, delay }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticPattern {
	/// Light tick, e.g. per typed character
	Typing,
	/// Scene change
	Transition,
	/// Strong impact for dramatic moments
	Impact,
	Subtle,
	Success,
}

/// One scripted step of the intro
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
	pub id: String,
	/// Authoritative length unless the scene type is self-timed
	pub duration: TimeMs,
	pub scene_type: SceneType,
	#[serde(default)]
	pub assets: SceneAssets,
	pub animation: AnimationConfig,
	#[serde(default)]
	pub haptics: Option<HapticPattern>,
}

impl Scene {
	/// Build a scene whose assets mirror the images carried by its type.
	pub fn new(id: impl Into<String>, duration: TimeMs, scene_type: SceneType, animation: AnimationConfig) -> Self {
		let assets = match &scene_type {
			SceneType::Video(video) => SceneAssets {
				video_ref: Some(video.clone()),
				..SceneAssets::default()
			},
			other if other.requires_images() => SceneAssets::images(other.images()),
			_ => SceneAssets::none(),
		};

		Self {
			id: id.into(),
			duration,
			scene_type,
			assets,
			animation,
			haptics: None,
		}
	}

	pub fn with_haptics(mut self, pattern: HapticPattern) -> Self {
		self.haptics = Some(pattern);
		self
	}

	pub fn with_assets(mut self, assets: SceneAssets) -> Self {
		self.assets = assets;
		self
	}
}

/// Background loop video and music track, shared read-only by one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundAssets {
	pub video: ResourceRef,
	pub music: ResourceRef,
}

impl BackgroundAssets {
	pub fn new(video: impl Into<String>, music: impl Into<String>) -> Self {
		Self {
			video: ResourceRef::new(video),
			music: ResourceRef::new(music),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;

	#[test]
	fn easing_curves_hit_both_ends() {
		for curve in [EasingCurve::Linear, EasingCurve::EaseIn, EasingCurve::EaseOut, EasingCurve::EaseInOut] {
			assert_abs_diff_eq!(curve.apply(0.0), 0.0, epsilon = 1e-9);
			assert_abs_diff_eq!(curve.apply(1.0), 1.0, epsilon = 1e-9);
		}
	}

	#[test]
	fn ease_in_out_is_symmetric_around_midpoint() {
		assert_abs_diff_eq!(EasingCurve::EaseInOut.apply(0.5), 0.5, epsilon = 1e-9);
		let early = EasingCurve::EaseInOut.apply(0.25);
		let late = EasingCurve::EaseInOut.apply(0.75);
		assert_abs_diff_eq!(early + late, 1.0, epsilon = 1e-9);
	}

	#[test]
	fn image_scenes_mirror_their_images_into_assets() {
		let images = vec!["a".to_string(), "b".to_string()];
		let scene = Scene::new(
			"stack",
			3000,
			SceneType::ImageStack(images.clone()),
			AnimationConfig::new(AnimationKind::StackWithAngle, 800, EasingCurve::EaseOut, 200),
		);
		assert_eq!(scene.assets.images, Some(images));
		assert!(!scene.scene_type.is_self_timed());
	}

	#[test]
	fn scene_type_serializes_with_kind_tag() {
		let json = serde_json::to_value(SceneType::Text("Legacy".into())).unwrap();
		assert_eq!(json, serde_json::json!({ "kind": "text", "content": "Legacy" }));
	}
}
