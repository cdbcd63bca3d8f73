mod config;
mod render;
mod settings;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use intro_sequence::{DirAssetStore, HapticDispatcher, IntroConfig, IntroOutcome, IntroPlayer, SceneCatalog, Sequencer, TimeMs};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use config::Config;
use settings::Settings;
use terminal::{TerminalHaptics, TerminalMedia};

#[tokio::main]
async fn main() -> Result<()> {
	dotenv().ok();

	let config = Config::parse();
	config.validate().map_err(|e| anyhow::anyhow!(e))?;

	init_tracing(&config);

	let mut settings = Settings::load(&config.settings_path)?;
	if !settings.should_show_intro(config.force) {
		info!(settings = %config.settings_path.display(), "intro already seen, pass --force to replay");
		return Ok(());
	}

	let catalog = match &config.catalog {
		Some(path) => SceneCatalog::from_file(path).with_context(|| format!("loading catalog {}", path.display()))?,
		None => SceneCatalog::legacy(),
	};
	let intro_config = match &config.intro_config {
		Some(path) => IntroConfig::from_file(path).with_context(|| format!("loading intro config {}", path.display()))?,
		None => IntroConfig::default(),
	};
	let fade_out = millis(intro_config.fade_out_ms);

	let store = DirAssetStore::new(config.assets_dir.clone());
	if config.preload {
		let report = catalog.preload_assets(&store);
		for missing in &report.missing {
			warn!(name = %missing.name, kind = ?missing.kind, "asset missing");
		}
		info!(resolved = report.resolved.len(), missing = report.missing.len(), "preload finished");
	}

	let haptics = if config.no_haptics { HapticDispatcher::disabled() } else { HapticDispatcher::new(Arc::new(TerminalHaptics)) };

	info!(scenes = catalog.len(), assets = %config.assets_dir.display(), "🎬 Starting intro");

	let sequencer = Sequencer::new(catalog, intro_config, Box::new(TerminalMedia::default()))?
		.with_asset_store(Arc::new(store))
		.with_haptics(haptics)
		.on_complete(|| info!("intro finished, handing over to the app"));

	let player = IntroPlayer::spawn(sequencer);
	player.prepare().await?;
	let report = player.current_state().media;
	if report.is_degraded() {
		warn!(video = ?report.video, audio = ?report.audio, "background media degraded, continuing without it");
	}

	let renderer = tokio::spawn(render::follow(player.subscribe()));
	player.start().await?;

	let outcome = run_until_finished(&player, &config, fade_out, wait_for_enter()).await;

	if let Err(e) = player.cleanup().await {
		warn!(error = %e, "cleanup after run");
	}
	player.shutdown().await;
	renderer.abort();

	match outcome {
		Ok(outcome) => {
			info!(?outcome, "intro over");
			settings.has_seen_intro = true;
			settings.save(&config.settings_path)?;
			Ok(())
		}
		Err(e) => {
			error!(error = %e, "intro aborted");
			Err(e)
		}
	}
}

/// Wall-clock span for a configured millisecond value; negative values clamp to zero
fn millis(ms: TimeMs) -> Duration {
	Duration::from_millis(u64::try_from(ms).unwrap_or(0))
}

/// Race natural completion against a tap, ctrl-c and the scripted skip
async fn run_until_finished(player: &IntroPlayer, config: &Config, fade_out: Duration, tap: impl Future<Output = ()>) -> Result<IntroOutcome> {
	let skip_after = async {
		match config.skip_after_ms {
			Some(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
			None => std::future::pending().await,
		}
	};

	let video_clock = async {
		let Some(ms) = config.video_loop_ms else {
			return std::future::pending::<()>().await;
		};
		let mut interval = tokio::time::interval(Duration::from_millis(ms));
		interval.tick().await;
		loop {
			interval.tick().await;
			if player.video_reached_end().is_err() {
				return std::future::pending().await;
			}
		}
	};

	tokio::select! {
		outcome = player.wait_until_finished() => Ok(outcome?),
		() = tap => {
			info!("⏭ Tap received, skipping");
			Ok(player.dismiss().await?)
		}
		() = skip_after => {
			info!("⏭ Scripted skip");
			Ok(player.dismiss().await?)
		}
		_ = signal::ctrl_c() => {
			info!("🛑 Received shutdown signal, fading out");
			player.stop().await?;
			tokio::time::sleep(fade_out).await;
			Ok(IntroOutcome::Stopped)
		}
		() = video_clock => Err(anyhow::anyhow!("video clock stopped")),
	}
}

/// Resolves on the first line from stdin; EOF never resolves
async fn wait_for_enter() {
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	match lines.next_line().await {
		Ok(Some(_)) => {}
		Ok(None) | Err(_) => std::future::pending().await,
	}
}

fn init_tracing(config: &Config) {
	let filter = EnvFilter::try_new(&config.rust_log).unwrap_or_else(|_| EnvFilter::new("info"));

	let layer = if config.log_json {
		fmt::layer().json().with_target(true).with_writer(std::io::stderr).boxed()
	} else {
		fmt::layer().with_target(true).with_writer(std::io::stderr).boxed()
	};

	tracing_subscriber::registry().with(filter).with(layer).init();
}
