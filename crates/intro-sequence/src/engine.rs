use crate::commands::IntroCommand;
use crate::sequencer::Sequencer;
use crate::state::IntroState;
use crate::types::TimeMs;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Drives a [`Sequencer`] in wall-clock time and publishes its state
pub(crate) struct IntroEngine {
	state_tx: watch::Sender<IntroState>,
	state_rx: watch::Receiver<IntroState>,
}

impl IntroEngine {
	pub(crate) fn new() -> Self {
		let (state_tx, state_rx) = watch::channel(IntroState::default());
		Self { state_tx, state_rx }
	}

	pub(crate) fn subscribe(&self) -> watch::Receiver<IntroState> {
		self.state_rx.clone()
	}

	pub(crate) async fn run(self, mut sequencer: Sequencer, mut command_rx: mpsc::UnboundedReceiver<IntroCommand>, cancel: CancellationToken) {
		let origin = Instant::now();
		self.state_tx.send_replace(sequencer.state());
		info!(scenes = sequencer.catalog().len(), "intro engine started");

		loop {
			let wake_at = sequencer.next_deadline().map(|deadline| origin + Duration::from_millis(u64::try_from(deadline).unwrap_or(0)));

			tokio::select! {
				// Sleep only while something is armed
				() = async {
					match wake_at {
						Some(at) => sleep_until(at).await,
						None => std::future::pending::<()>().await,
					}
				} => {
					let fired = sequencer.advance_to(elapsed_ms(origin));
					if fired > 0 {
						self.state_tx.send_replace(sequencer.state());
					}
				}

				cmd = command_rx.recv() => {
					let Some(cmd) = cmd else {
						info!("intro command channel closed");
						break;
					};

					// Catch up before applying the command so it lands at the right virtual time
					sequencer.advance_to(elapsed_ms(origin));
					Self::handle_command(&mut sequencer, cmd, &self.state_tx);
				}

				() = cancel.cancelled() => {
					info!("intro engine cancelled");
					break;
				}
			}
		}

		sequencer.cleanup();
		self.state_tx.send_replace(sequencer.state());
	}

	fn handle_command(sequencer: &mut Sequencer, cmd: IntroCommand, state_tx: &watch::Sender<IntroState>) {
		debug!(command = cmd.name(), at = sequencer.now(), "intro command");

		let (result, response) = match cmd {
			IntroCommand::Prepare { response } => {
				sequencer.prepare();
				(Ok(()), Some(response))
			}
			IntroCommand::Start { response } => (sequencer.start(), Some(response)),
			IntroCommand::SceneComplete { response } => (sequencer.scene_complete(), Some(response)),
			IntroCommand::Skip { response } => (sequencer.skip(), Some(response)),
			IntroCommand::Stop { response } => (sequencer.stop(), Some(response)),
			IntroCommand::Cleanup { response } => {
				sequencer.cleanup();
				(Ok(()), Some(response))
			}
			IntroCommand::VideoReachedEnd => {
				sequencer.video_reached_end();
				(Ok(()), None)
			}
		};

		// Publish before answering so callers observe their own command
		state_tx.send_replace(sequencer.state());

		if let Some(response) = response {
			let _ = response.send(result);
		}
	}
}

fn elapsed_ms(origin: Instant) -> TimeMs {
	TimeMs::try_from(origin.elapsed().as_millis()).unwrap_or(TimeMs::MAX)
}
