//! Control messages exchanged between extension contexts.
//!
//! Every message is a JSON object carrying an `action` discriminant:
//!
//! 1. The control panel sends [`Request::OpenFullscreen`], [`Request::CloseFullscreen`]
//!    and [`Request::RequestFullscreen`] to the background worker
//! 2. The source observer reports [`Request::VideoChanged`] to the background worker
//! 3. The control panel asks the source observer for [`Request::GetVideoId`]
//! 4. The background worker forwards [`Request::EnterFullscreen`] to the presentation page

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Discriminant of a [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
	OpenFullscreen,
	CloseFullscreen,
	VideoChanged,
	RequestFullscreen,
	GetVideoId,
	EnterFullscreen,
}

impl Action {
	pub const ALL: [Action; 6] = [
		Action::OpenFullscreen,
		Action::CloseFullscreen,
		Action::VideoChanged,
		Action::RequestFullscreen,
		Action::GetVideoId,
		Action::EnterFullscreen,
	];

	/// Returns the wire name used in the `action` field.
	pub fn as_str(self) -> &'static str {
		match self {
			Action::OpenFullscreen => "openFullscreen",
			Action::CloseFullscreen => "closeFullscreen",
			Action::VideoChanged => "videoChanged",
			Action::RequestFullscreen => "requestFullscreen",
			Action::GetVideoId => "getVideoId",
			Action::EnterFullscreen => "enterFullscreen",
		}
	}

	/// Parses a wire name, returning [`None`] for unknown actions.
	pub fn from_wire(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|action| action.as_str() == name)
	}

	/// Whether the sender waits for a reply.
	///
	/// `videoChanged` is fire-and-forget; everything else gets exactly one response.
	pub fn expects_reply(self) -> bool {
		!matches!(self, Action::VideoChanged)
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Inbound control message.
///
/// `tabId` is sent by the control panel for diagnostics only; the background
/// worker never targets a tab by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
	/// Show `video_id` in the presentation surface, opening it if needed.
	OpenFullscreen {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		video_id: Option<String>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		tab_id: Option<i64>,
	},
	/// Close the presentation surface.
	CloseFullscreen {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		tab_id: Option<i64>,
	},
	/// The source page switched videos; retarget an open surface.
	VideoChanged {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		video_id: Option<String>,
	},
	/// Ask the presentation surface to enter element fullscreen.
	RequestFullscreen {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		tab_id: Option<i64>,
	},
	/// Ask the source observer for the video id of its page.
	GetVideoId,
	/// Ask the receiving page to enter fullscreen.
	EnterFullscreen,
}

impl Request {
	pub fn action(&self) -> Action {
		match self {
			Request::OpenFullscreen { .. } => Action::OpenFullscreen,
			Request::CloseFullscreen { .. } => Action::CloseFullscreen,
			Request::VideoChanged { .. } => Action::VideoChanged,
			Request::RequestFullscreen { .. } => Action::RequestFullscreen,
			Request::GetVideoId => Action::GetVideoId,
			Request::EnterFullscreen => Action::EnterFullscreen,
		}
	}

	/// Decodes a raw message, distinguishing unknown actions from malformed payloads.
	pub fn from_value(value: &Value) -> Result<Self, MessageError> {
		let name = value
			.get("action")
			.and_then(Value::as_str)
			.ok_or(MessageError::MissingAction)?;

		let action = Action::from_wire(name).ok_or_else(|| MessageError::UnknownAction(name.to_string()))?;

		serde_json::from_value(value.clone()).map_err(|source| MessageError::Malformed { action, source })
	}

	pub fn to_value(&self) -> Value {
		serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({ "action": self.action().as_str() }))
	}
}

/// Failure to decode an inbound message.
#[derive(Debug, Error)]
pub enum MessageError {
	#[error("message has no action")]
	MissingAction,

	#[error("unknown action: {0}")]
	UnknownAction(String),

	#[error("malformed {action} message")]
	Malformed {
		action: Action,
		#[source]
		source: serde_json::Error,
	},
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn open_fullscreen_uses_camel_case_fields() {
		let msg = Request::OpenFullscreen {
			video_id: Some("dQw4w9WgXcQ".into()),
			tab_id: Some(42),
		};
		let json = serde_json::to_string(&msg).unwrap();
		assert!(json.contains(r#""action":"openFullscreen""#));
		assert!(json.contains(r#""videoId":"dQw4w9WgXcQ""#));
		assert!(json.contains(r#""tabId":42"#));
	}

	#[test]
	fn unit_actions_ignore_extra_fields() {
		let req = Request::from_value(&json!({"action": "getVideoId", "tabId": 7})).unwrap();
		assert_eq!(req, Request::GetVideoId);
	}

	#[test]
	fn null_video_id_decodes_as_none() {
		let req = Request::from_value(&json!({"action": "videoChanged", "videoId": null})).unwrap();
		assert_eq!(req, Request::VideoChanged { video_id: None });
	}

	#[test]
	fn unknown_action_is_reported_by_name() {
		let err = Request::from_value(&json!({"action": "teleport"})).unwrap_err();
		assert!(matches!(err, MessageError::UnknownAction(ref name) if name == "teleport"));
	}

	#[test]
	fn missing_action_is_rejected() {
		let err = Request::from_value(&json!({"videoId": "dQw4w9WgXcQ"})).unwrap_err();
		assert!(matches!(err, MessageError::MissingAction));

		let err = Request::from_value(&json!("openFullscreen")).unwrap_err();
		assert!(matches!(err, MessageError::MissingAction));
	}

	#[test]
	fn wrong_field_type_is_malformed() {
		let err = Request::from_value(&json!({"action": "openFullscreen", "videoId": 12})).unwrap_err();
		assert!(matches!(
			err,
			MessageError::Malformed {
				action: Action::OpenFullscreen,
				..
			}
		));
	}

	#[test]
	fn only_video_changed_is_fire_and_forget() {
		for action in Action::ALL {
			assert_eq!(action.expects_reply(), action != Action::VideoChanged, "{action}");
			assert_eq!(Action::from_wire(action.as_str()), Some(action));
		}
	}
}
