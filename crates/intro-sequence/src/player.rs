use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::commands::IntroCommand;
use crate::engine::IntroEngine;
use crate::error::{IntroError, Result};
use crate::sequencer::Sequencer;
use crate::state::{IntroOutcome, IntroState};

/// The intro actor façade
pub struct IntroPlayer {
	command_tx: mpsc::UnboundedSender<IntroCommand>,
	state_rx: watch::Receiver<IntroState>,
	task_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
	cancel_token: CancellationToken,
}

impl IntroPlayer {
	/// Move `sequencer` onto its own task. Must be called inside a tokio runtime.
	pub fn spawn(sequencer: Sequencer) -> Self {
		let cancel_token = CancellationToken::new();
		let (command_tx, command_rx) = mpsc::unbounded_channel();

		let engine = IntroEngine::new();
		let state_rx = engine.subscribe();

		let task_handle = tokio::spawn(engine.run(sequencer, command_rx, cancel_token.clone()));

		info!("IntroPlayer created");

		Self {
			command_tx,
			state_rx,
			task_handle: Arc::new(Mutex::new(Some(task_handle))),
			cancel_token,
		}
	}

	/// Send a sequencer command and await its result
	async fn send(&self, build: impl FnOnce(oneshot::Sender<Result<()>>) -> IntroCommand) -> Result<()> {
		let (tx, rx) = oneshot::channel();
		self.command_tx.send(build(tx)).map_err(|_| IntroError::Internal("Failed to send command".into()))?;

		rx.await.map_err(|_| IntroError::Internal("Engine dropped".into()))?
	}

	pub async fn prepare(&self) -> Result<()> {
		self.send(|response| IntroCommand::Prepare { response }).await
	}
	pub async fn start(&self) -> Result<()> {
		self.send(|response| IntroCommand::Start { response }).await
	}
	pub async fn scene_complete(&self) -> Result<()> {
		self.send(|response| IntroCommand::SceneComplete { response }).await
	}
	pub async fn skip(&self) -> Result<()> {
		self.send(|response| IntroCommand::Skip { response }).await
	}
	pub async fn stop(&self) -> Result<()> {
		self.send(|response| IntroCommand::Stop { response }).await
	}
	pub async fn cleanup(&self) -> Result<()> {
		self.send(|response| IntroCommand::Cleanup { response }).await
	}

	/// User tapped through the intro: skip to the last frame and release media.
	/// A run that already finished keeps its outcome.
	pub async fn dismiss(&self) -> Result<IntroOutcome> {
		if let Err(e) = self.skip().await {
			if !e.is_recoverable() {
				return Err(e);
			}
			debug!(error = %e, "dismiss without skip");
		}
		self.cleanup().await?;

		self.current_state().outcome().ok_or_else(|| IntroError::Internal("intro not finished after dismiss".into()))
	}

	// Fire-and-forget commands
	pub fn video_reached_end(&self) -> Result<()> {
		self.command_tx.send(IntroCommand::VideoReachedEnd).map_err(|_| IntroError::Internal("Failed to send command".into()))
	}

	// Access state
	pub fn subscribe(&self) -> watch::Receiver<IntroState> {
		self.state_rx.clone()
	}
	pub fn current_state(&self) -> IntroState {
		self.state_rx.borrow().clone()
	}

	/// Resolve once the run reaches a terminal phase
	pub async fn wait_until_finished(&self) -> Result<IntroOutcome> {
		let mut rx = self.state_rx.clone();
		let state = rx.wait_for(IntroState::is_finished).await.map_err(|_| IntroError::Internal("Engine dropped".into()))?;
		state.outcome().ok_or_else(|| IntroError::Internal("finished state without outcome".into()))
	}

	// Shutdown the player; the engine releases media on its way out
	pub async fn shutdown(&self) {
		self.cancel_token.cancel();
		if let Some(handle) = self.task_handle.lock().await.take() {
			let _ = handle.await;
		}
	}
}

impl Drop for IntroPlayer {
	fn drop(&mut self) {
		self.cancel_token.cancel();
	}
}
