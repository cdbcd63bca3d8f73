use crate::state::SequencePhase;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IntroError>;

#[derive(Debug, Error)]
pub enum IntroError {
	#[error("Scene catalog is empty")]
	EmptyCatalog,

	#[error("Duplicate scene id: {0}")]
	DuplicateSceneId(String),

	#[error("Invalid scene '{id}': {reason}")]
	InvalidScene { id: String, reason: String },

	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("Operation '{operation}' is not valid in phase {phase:?}")]
	InvalidTransition { operation: &'static str, phase: SequencePhase },

	#[error("Intro resources were already released")]
	Released,

	#[error("Parse error: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("Internal error: {0}")]
	Internal(String),
}

impl IntroError {
	/// Errors the sequence absorbs locally instead of surfacing to the host
	pub const fn is_recoverable(&self) -> bool {
		matches!(self, Self::InvalidTransition { .. } | Self::Released)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejected_operations_are_recoverable() {
		let rejected = IntroError::InvalidTransition {
			operation: "start",
			phase: SequencePhase::Running,
		};
		assert!(rejected.is_recoverable());
		assert!(IntroError::Released.is_recoverable());
	}

	#[test]
	fn definition_errors_are_not_recoverable() {
		assert!(!IntroError::EmptyCatalog.is_recoverable());
		assert!(!IntroError::DuplicateSceneId("intro".into()).is_recoverable());
		assert!(!IntroError::InvalidConfig("fade_in_steps must be > 0".into()).is_recoverable());
		assert!(!IntroError::Internal("engine dropped".into()).is_recoverable());
	}
}
