//! Replies sent back through a message channel.

use serde::{Deserialize, Serialize};

/// Outcome of a control action: `{success, message?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
	pub success: bool,
	/// Human-readable detail, mostly present on failure.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl ActionResponse {
	pub fn ok() -> Self {
		Self {
			success: true,
			message: None,
		}
	}

	pub fn ok_with(message: impl Into<String>) -> Self {
		Self {
			success: true,
			message: Some(message.into()),
		}
	}

	pub fn failure(message: impl Into<String>) -> Self {
		Self {
			success: false,
			message: Some(message.into()),
		}
	}
}

/// Reply to `getVideoId`: `{videoId: string|null, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoIdResponse {
	pub video_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

/// Acknowledgement from the presentation page: `{status}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
	pub status: String,
}

/// Any reply a context can send.
///
/// Untagged on the wire; variant order matters for decoding since
/// [`VideoIdResponse`] accepts a missing `videoId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
	Action(ActionResponse),
	Status(StatusResponse),
	VideoId(VideoIdResponse),
}

impl Response {
	/// Returns `false` only for an explicit `{success:false}` or a `getVideoId` error.
	pub fn is_success(&self) -> bool {
		match self {
			Response::Action(r) => r.success,
			Response::Status(_) => true,
			Response::VideoId(r) => r.error.is_none(),
		}
	}
}

impl From<ActionResponse> for Response {
	fn from(value: ActionResponse) -> Self {
		Response::Action(value)
	}
}

impl From<VideoIdResponse> for Response {
	fn from(value: VideoIdResponse) -> Self {
		Response::VideoId(value)
	}
}

impl From<StatusResponse> for Response {
	fn from(value: StatusResponse) -> Self {
		Response::Status(value)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn success_omits_message() {
		let json = serde_json::to_value(Response::from(ActionResponse::ok())).unwrap();
		assert_eq!(json, json!({"success": true}));
	}

	#[test]
	fn video_id_serializes_null_when_absent() {
		let resp = VideoIdResponse {
			video_id: None,
			error: None,
		};
		assert_eq!(serde_json::to_value(resp).unwrap(), json!({"videoId": null}));
	}

	#[test]
	fn untagged_decoding_picks_the_matching_shape() {
		let status: Response = serde_json::from_value(json!({"status": "Fullscreen requested."})).unwrap();
		assert!(matches!(status, Response::Status(_)));

		let failure: Response = serde_json::from_value(json!({"success": false, "message": "nope"})).unwrap();
		assert_eq!(failure, Response::Action(ActionResponse::failure("nope")));
		assert!(!failure.is_success());

		let video: Response = serde_json::from_value(json!({"videoId": "dQw4w9WgXcQ"})).unwrap();
		assert_eq!(
			video,
			Response::VideoId(VideoIdResponse {
				video_id: Some("dQw4w9WgXcQ".into()),
				error: None,
			})
		);
	}
}
