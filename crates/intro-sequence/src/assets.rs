use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum AssetError {
	#[error("{kind} asset '{name}' not found (tried {tried:?})")]
	NotFound { name: String, kind: AssetKind, tried: Vec<String> },

	#[error("{kind} asset '{name}' is unreadable: {source}")]
	Unreadable {
		name: String,
		kind: AssetKind,
		#[source]
		source: std::io::Error,
	},

	#[error("{kind} asset '{name}' is empty")]
	Empty { name: String, kind: AssetKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
	Video,
	Audio,
	Image,
}

impl AssetKind {
	const fn folder(self) -> &'static str {
		match self {
			Self::Video => "Video",
			Self::Audio => "Audio",
			Self::Image => "Images",
		}
	}

	const fn extensions(self) -> &'static [&'static str] {
		match self {
			Self::Video => &["mp4", "mov", "m4v"],
			Self::Audio => &["mp3", "m4a", "aac", "wav"],
			Self::Image => &["png", "jpg", "jpeg", "heic"],
		}
	}
}

impl fmt::Display for AssetKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::Video => "video",
			Self::Audio => "audio",
			Self::Image => "image",
		};
		f.write_str(label)
	}
}

/// A resource located by the store, ready to hand to a media backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
	pub name: String,
	pub kind: AssetKind,
	pub location: PathBuf,
	pub size: u64,
}

/// Resolves symbolic resource names. Implementations report failures; callers degrade.
pub trait AssetStore: Send + Sync {
	fn resolve(&self, name: &str, kind: AssetKind) -> Result<ResolvedAsset, AssetError>;

	fn contains(&self, name: &str, kind: AssetKind) -> bool {
		self.resolve(name, kind).is_ok()
	}
}

/// Relative paths searched for a resource, most specific first
pub fn candidate_paths(name: &str, kind: AssetKind) -> Vec<String> {
	let folder = kind.folder();
	vec![format!("Intro/{folder}/{name}.dataset/{name}"), format!("Intro/{folder}/{name}.dataset"), name.to_string()]
}

/// Asset store backed by a directory tree laid out like the app bundle
#[derive(Debug, Clone)]
pub struct DirAssetStore {
	root: PathBuf,
}

impl DirAssetStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn probe(&self, relative: &str, kind: AssetKind) -> Option<PathBuf> {
		let base = self.root.join(relative);
		if base.is_file() {
			return Some(base);
		}

		if base.is_dir() {
			// A `.dataset` directory holds the payload under an arbitrary file name
			let stem = relative.rsplit('/').next().unwrap_or(relative).trim_end_matches(".dataset");
			let entries = std::fs::read_dir(&base).ok()?;
			return entries
				.filter_map(std::result::Result::ok)
				.map(|entry| entry.path())
				.filter(|path| path.is_file())
				.find(|path| path.file_stem().is_some_and(|s| s == stem) || path.file_name().is_some_and(|n| n == stem));
		}

		kind.extensions().iter().map(|ext| base.with_extension(ext)).find(|path| path.is_file())
	}
}

impl AssetStore for DirAssetStore {
	fn resolve(&self, name: &str, kind: AssetKind) -> Result<ResolvedAsset, AssetError> {
		let tried = candidate_paths(name, kind);

		for candidate in &tried {
			let Some(location) = self.probe(candidate, kind) else {
				trace!(%kind, candidate, "asset candidate missing");
				continue;
			};

			let metadata = std::fs::metadata(&location).map_err(|source| AssetError::Unreadable {
				name: name.to_string(),
				kind,
				source,
			})?;

			if metadata.len() == 0 {
				return Err(AssetError::Empty { name: name.to_string(), kind });
			}

			debug!(%kind, name, location = %location.display(), size = metadata.len(), "asset resolved");
			return Ok(ResolvedAsset {
				name: name.to_string(),
				kind,
				location,
				size: metadata.len(),
			});
		}

		Err(AssetError::NotFound { name: name.to_string(), kind, tried })
	}
}

/// In-memory store, useful for hosts that bundle assets elsewhere and for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
	entries: HashMap<(AssetKind, String), ResolvedAsset>,
}

impl MemoryAssetStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, name: impl Into<String>, kind: AssetKind) -> Self {
		self.insert(name, kind);
		self
	}

	pub fn insert(&mut self, name: impl Into<String>, kind: AssetKind) {
		let name = name.into();
		let asset = ResolvedAsset {
			location: PathBuf::from(format!("memory://{kind}/{name}")),
			name: name.clone(),
			kind,
			size: 1,
		};
		self.entries.insert((kind, name), asset);
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl AssetStore for MemoryAssetStore {
	fn resolve(&self, name: &str, kind: AssetKind) -> Result<ResolvedAsset, AssetError> {
		self.entries.get(&(kind, name.to_string())).cloned().ok_or_else(|| AssetError::NotFound {
			name: name.to_string(),
			kind,
			tried: vec![name.to_string()],
		})
	}
}
