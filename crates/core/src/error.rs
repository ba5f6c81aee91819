use beamer_protocol::{ActionResponse, ContentIdError};
use thiserror::Error;

use crate::host::SurfaceId;

pub type Result<T> = std::result::Result<T, Error>;

/// A browser call was rejected or threw.
///
/// Always logged where it happens; callers either fall back or wrap it in [`Error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct HostError {
	/// Browser API that failed, e.g. `windows.create`.
	pub operation: &'static str,
	pub message: String,
}

impl HostError {
	pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
		Self {
			operation,
			message: message.into(),
		}
	}
}

#[derive(Debug, Error)]
pub enum Error {
	#[error("no fullscreen window is open")]
	NoActiveSurface,

	#[error("fullscreen window {0} has no tab to address")]
	SurfaceUnaddressable(SurfaceId),

	/// The only fatal path of opening: nothing was created or persisted.
	#[error("failed to open fullscreen window: {0}")]
	CreationFailure(#[source] HostError),

	#[error(transparent)]
	InvalidContent(#[from] ContentIdError),

	#[error("player element {0} not found")]
	PlayerMissing(&'static str),

	#[error(transparent)]
	Host(#[from] HostError),
}

impl Error {
	/// Converts this error to the `{success:false, message}` reply sent over a message channel.
	pub fn to_response(&self) -> ActionResponse {
		ActionResponse::failure(self.to_string())
	}

	/// True for failures caused by the caller's state rather than the browser.
	pub fn is_caller_facing(&self) -> bool {
		matches!(
			self,
			Error::NoActiveSurface | Error::SurfaceUnaddressable(_) | Error::InvalidContent(_)
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn responses_carry_readable_messages() {
		let resp = Error::NoActiveSurface.to_response();
		assert!(!resp.success);
		assert_eq!(resp.message.as_deref(), Some("no fullscreen window is open"));

		let resp = Error::CreationFailure(HostError::new("windows.create", "quota exceeded")).to_response();
		assert_eq!(
			resp.message.as_deref(),
			Some("failed to open fullscreen window: windows.create failed: quota exceeded")
		);
	}

	#[test]
	fn caller_facing_classification() {
		assert!(Error::NoActiveSurface.is_caller_facing());
		assert!(Error::SurfaceUnaddressable(SurfaceId(3)).is_caller_facing());
		assert!(!Error::Host(HostError::new("tabs.query", "boom")).is_caller_facing());
	}
}
