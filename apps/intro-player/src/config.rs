use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "intro-player")]
#[command(about = "Plays the Legacy AI onboarding intro in the terminal", long_about = None)]
pub struct Config {
	/// Root of the asset bundle (expects Intro/<Kind>/<name>.dataset layout)
	#[arg(long, env = "INTRO_ASSETS_DIR", default_value = "assets")]
	pub assets_dir: PathBuf,

	/// Scene catalog JSON. The built-in catalog is used when omitted
	#[arg(long, env = "INTRO_CATALOG")]
	pub catalog: Option<PathBuf>,

	/// Playback timing JSON (fades, settle delay, presenter cadence)
	#[arg(long, env = "INTRO_CONFIG")]
	pub intro_config: Option<PathBuf>,

	/// Where the "seen intro" flag is persisted
	#[arg(long, env = "INTRO_SETTINGS", default_value = ".intro-settings.json")]
	pub settings_path: PathBuf,

	/// Show the intro even if it was already seen
	#[arg(long, env = "INTRO_FORCE")]
	pub force: bool,

	/// Simulate a tap after this many milliseconds
	#[arg(long, env = "INTRO_SKIP_AFTER_MS")]
	pub skip_after_ms: Option<u64>,

	/// Length of the background video; the player reports its end on this period
	#[arg(long, env = "INTRO_VIDEO_LOOP_MS")]
	pub video_loop_ms: Option<u64>,

	/// Resolve every asset before playback and report what is missing
	#[arg(long, env = "INTRO_PRELOAD")]
	pub preload: bool,

	/// Disable haptic feedback output
	#[arg(long, env = "INTRO_NO_HAPTICS")]
	pub no_haptics: bool,

	/// Log filter, e.g. "info,intro_sequence=debug"
	#[arg(long, env = "RUST_LOG", default_value = "info")]
	pub rust_log: String,

	/// Emit logs as JSON
	#[arg(long, env = "LOG_JSON")]
	pub log_json: bool,
}

impl Config {
	/// Validate configuration values
	pub fn validate(&self) -> Result<(), String> {
		if self.skip_after_ms == Some(0) {
			return Err("skip_after_ms must be greater than 0".to_string());
		}

		if self.video_loop_ms == Some(0) {
			return Err("video_loop_ms must be greater than 0".to_string());
		}

		if self.settings_path.as_os_str().is_empty() {
			return Err("settings_path must not be empty".to_string());
		}

		Ok(())
	}
}
