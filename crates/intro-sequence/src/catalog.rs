use crate::assets::{AssetKind, AssetStore};
use crate::error::{IntroError, Result};
use crate::types::{AnimationConfig, AnimationKind, BackgroundAssets, EasingCurve, HapticPattern, Scene, SceneAssets, SceneType, TimeMs};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One asset the catalog needs at runtime
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRequest {
	pub name: String,
	pub kind: AssetKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadReport {
	pub resolved: Vec<AssetRequest>,
	pub missing: Vec<AssetRequest>,
}

impl PreloadReport {
	pub fn is_complete(&self) -> bool {
		self.missing.is_empty()
	}
}

#[derive(Debug, Deserialize, Serialize)]
struct CatalogDocument {
	background: BackgroundAssets,
	scenes: Vec<Scene>,
}

/// Validated, immutable, ordered list of scenes plus the background pair.
/// Cloning is cheap and clones share the scene table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneCatalog {
	scenes: Arc<[Scene]>,
	background: BackgroundAssets,
}

impl SceneCatalog {
	pub fn new(scenes: Vec<Scene>, background: BackgroundAssets) -> Result<Self> {
		if scenes.is_empty() {
			return Err(IntroError::EmptyCatalog);
		}

		let mut seen = HashSet::new();
		for scene in &scenes {
			if !seen.insert(scene.id.as_str()) {
				return Err(IntroError::DuplicateSceneId(scene.id.clone()));
			}
			validate_scene(scene)?;
		}

		debug!(scenes = scenes.len(), "scene catalog validated");
		Ok(Self {
			scenes: scenes.into(),
			background,
		})
	}

	pub fn from_json(json: &str) -> Result<Self> {
		let document: CatalogDocument = serde_json::from_str(json)?;
		Self::new(document.scenes, document.background)
	}

	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| IntroError::InvalidConfig(format!("{}: {e}", path.as_ref().display())))?;
		Self::from_json(&raw)
	}

	pub fn to_json(&self) -> Result<String> {
		let document = CatalogDocument {
			background: self.background.clone(),
			scenes: self.scenes.to_vec(),
		};
		Ok(serde_json::to_string_pretty(&document)?)
	}

	/// The "Legacy AI" intro as shipped
	pub fn legacy() -> Self {
		Self {
			scenes: legacy_scenes().into(),
			background: BackgroundAssets::new("intro_background", "intro_music"),
		}
	}

	pub fn scenes(&self) -> &[Scene] {
		&self.scenes
	}

	pub const fn background_assets(&self) -> &BackgroundAssets {
		&self.background
	}

	pub fn len(&self) -> usize {
		self.scenes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.scenes.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&Scene> {
		self.scenes.get(index)
	}

	pub fn last_index(&self) -> usize {
		self.scenes.len().saturating_sub(1)
	}

	pub fn last(&self) -> Option<&Scene> {
		self.scenes.last()
	}

	pub fn position(&self, id: &str) -> Option<usize> {
		self.scenes.iter().position(|scene| scene.id == id)
	}

	/// Every asset named by the catalog, background first, without duplicates
	pub fn asset_manifest(&self) -> Vec<AssetRequest> {
		let mut seen = HashSet::new();
		let mut manifest = Vec::new();
		let mut push = |name: &str, kind: AssetKind| {
			if seen.insert((name.to_string(), kind)) {
				manifest.push(AssetRequest { name: name.to_string(), kind });
			}
		};

		push(self.background.video.name(), AssetKind::Video);
		push(self.background.music.name(), AssetKind::Audio);

		for scene in self.scenes.iter() {
			for image in scene.scene_type.images() {
				push(image, AssetKind::Image);
			}
			if let Some(video) = &scene.assets.video_ref {
				push(video.name(), AssetKind::Video);
			}
			if let SceneType::Video(video) = &scene.scene_type {
				push(video.name(), AssetKind::Video);
			}
			if let Some(audio) = &scene.assets.audio_ref {
				push(audio.name(), AssetKind::Audio);
			}
		}

		manifest
	}

	/// Resolve every asset up front so missing files show up before playback
	pub fn preload_assets(&self, store: &dyn AssetStore) -> PreloadReport {
		let mut report = PreloadReport::default();
		for request in self.asset_manifest() {
			match store.resolve(&request.name, request.kind) {
				Ok(_) => report.resolved.push(request),
				Err(e) => {
					warn!(error = %e, "intro asset unavailable");
					report.missing.push(request);
				}
			}
		}
		info!(resolved = report.resolved.len(), missing = report.missing.len(), "intro assets preloaded");
		report
	}
}

impl Default for SceneCatalog {
	fn default() -> Self {
		Self::legacy()
	}
}

fn invalid(scene: &Scene, reason: impl Into<String>) -> IntroError {
	IntroError::InvalidScene {
		id: scene.id.clone(),
		reason: reason.into(),
	}
}

fn validate_scene(scene: &Scene) -> Result<()> {
	if scene.id.trim().is_empty() {
		return Err(invalid(scene, "id must not be empty"));
	}

	if scene.duration < 0 || (scene.duration == 0 && !scene.scene_type.is_self_timed()) {
		return Err(invalid(scene, format!("duration {}ms must be positive", scene.duration)));
	}

	if scene.animation.duration < 0 || scene.animation.delay < 0 {
		return Err(invalid(scene, "animation timing must not be negative"));
	}

	let images = scene.scene_type.images();
	if scene.scene_type.requires_images() && images.is_empty() {
		return Err(invalid(scene, format!("{} needs at least one image", scene.scene_type.label())));
	}
	if let Some(declared) = &scene.assets.images {
		if declared.as_slice() != images {
			return Err(invalid(scene, "assets.images does not match the scene content"));
		}
	}

	if let SceneType::Video(reference) = &scene.scene_type {
		if reference.name().is_empty() {
			return Err(invalid(scene, "video reference must not be empty"));
		}
	}

	Ok(())
}

fn text(id: &str, duration: TimeMs, body: &str, animation_ms: TimeMs, curve: EasingCurve, delay: TimeMs) -> Scene {
	Scene::new(id, duration, SceneType::Text(body.to_string()), AnimationConfig::new(AnimationKind::Typewriter, animation_ms, curve, delay)).with_haptics(HapticPattern::Typing)
}

fn names(prefix: &str, count: usize) -> Vec<String> {
	(1..=count).map(|i| format!("{prefix}{i}")).collect()
}

fn legacy_scenes() -> Vec<Scene> {
	use AnimationKind::{CrossFade, Fade, HorizontalRotation, RapidSequence, StackWithAngle};
	use EasingCurve::{EaseIn, EaseInOut, EaseOut};

	vec![
		text("legacy", 4000, "Legacy", 1000, EaseInOut, 0).with_haptics(HapticPattern::Subtle),
		Scene::new("jordan_montage", 3000, SceneType::ImageStack(names("jordan", 3)), AnimationConfig::new(StackWithAngle, 800, EaseOut, 200)).with_haptics(HapticPattern::Impact),
		text("looks_like", 2500, "We know what it\nlooks like", 2000, EaseInOut, 300),
		Scene::new("montage2", 3000, SceneType::ImageRotation(names("montage1_", 3)), AnimationConfig::new(HorizontalRotation, 2500, EaseInOut, 0)).with_haptics(HapticPattern::Transition),
		text("feels_like", 2500, "We know what it\nfeels like", 2000, EaseInOut, 300),
		Scene::new("montage3", 3000, SceneType::ImageFade(names("montage2_", 3)), AnimationConfig::new(CrossFade, 2500, EaseInOut, 0)).with_haptics(HapticPattern::Transition),
		text("takes_to_build", 2500, "We know what it\ntakes to build", 2000, EaseInOut, 300),
		Scene::new("montage4", 3000, SceneType::ImageRotation(names("montage3_", 3)), AnimationConfig::new(HorizontalRotation, 2500, EaseInOut, 0)).with_haptics(HapticPattern::Transition),
		text("what_if", 2000, "But what if...", 1500, EaseInOut, 300),
		Scene::new(
			"rapid_sequence",
			5000,
			SceneType::Composite {
				text: "But what if...\nwe never heard the stories?\nBut what if...\nwe never wrote it down?\nBut what if...\nwe lost the memories?\nBut what if...\nno one remembered?".to_string(),
				images: names("legacy_", 4),
			},
			AnimationConfig::new(RapidSequence, 4000, EaseIn, 0),
		)
		.with_haptics(HapticPattern::Impact),
		text("forgotten", 3000, "It would all be\nforgotten", 2500, EaseInOut, 300),
		text("preserve", 3000, "Preserve your legacy", 2500, EaseInOut, 300),
		Scene::new("app_title", 4000, SceneType::Text("Legacy AI".to_string()), AnimationConfig::new(Fade, 1500, EaseInOut, 0))
			.with_assets(SceneAssets::images(&[]))
			.with_haptics(HapticPattern::Success),
	]
}
