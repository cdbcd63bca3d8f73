use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Host-side preferences that outlive a single run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
	pub has_seen_intro: bool,
}

impl Settings {
	/// Missing files read as defaults
	pub fn load(path: &Path) -> Result<Self> {
		if !path.exists() {
			debug!(path = %path.display(), "no settings file, using defaults");
			return Ok(Self::default());
		}

		let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
		serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
	}

	pub fn save(&self, path: &Path) -> Result<()> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
		}
		let json = serde_json::to_string_pretty(self)?;
		std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
		debug!(path = %path.display(), "settings saved");
		Ok(())
	}

	pub const fn should_show_intro(&self, force: bool) -> bool {
		force || !self.has_seen_intro
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_file_means_unseen() {
		let dir = tempfile::tempdir().unwrap();
		let settings = Settings::load(&dir.path().join("nope.json")).unwrap();
		assert!(!settings.has_seen_intro);
		assert!(settings.should_show_intro(false));
	}

	#[test]
	fn flag_round_trips_through_disk() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested/settings.json");

		Settings { has_seen_intro: true }.save(&path).unwrap();
		let raw = std::fs::read_to_string(&path).unwrap();
		assert!(raw.contains("hasSeenIntro"));

		let loaded = Settings::load(&path).unwrap();
		assert!(!loaded.should_show_intro(false));
		assert!(loaded.should_show_intro(true));
	}

	#[test]
	fn corrupt_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("settings.json");
		std::fs::write(&path, "{ not json").unwrap();
		assert!(Settings::load(&path).is_err());
	}
}
