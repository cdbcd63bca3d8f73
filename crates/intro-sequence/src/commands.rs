use crate::error::Result;
use tokio::sync::oneshot;

/// Internal command type used inside the intro engine
#[derive(Debug)]
pub(crate) enum IntroCommand {
	// Sequencer operations with response
	Prepare {
		response: oneshot::Sender<Result<()>>,
	},
	Start {
		response: oneshot::Sender<Result<()>>,
	},
	SceneComplete {
		response: oneshot::Sender<Result<()>>,
	},
	Skip {
		response: oneshot::Sender<Result<()>>,
	},
	Stop {
		response: oneshot::Sender<Result<()>>,
	},
	Cleanup {
		response: oneshot::Sender<Result<()>>,
	},

	// Fire-and-forget
	VideoReachedEnd,
}

impl IntroCommand {
	pub(crate) const fn name(&self) -> &'static str {
		match self {
			Self::Prepare { .. } => "prepare",
			Self::Start { .. } => "start",
			Self::SceneComplete { .. } => "scene_complete",
			Self::Skip { .. } => "skip",
			Self::Stop { .. } => "stop",
			Self::Cleanup { .. } => "cleanup",
			Self::VideoReachedEnd => "video_reached_end",
		}
	}
}
