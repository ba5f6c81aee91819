//! Content identifiers and the presentation URL contract.
//!
//! The background worker builds `<page>?<param>=<id>` with the id percent-encoded;
//! the presentation page extracts it again and refuses anything that is not an
//! 11-character video id before touching the player.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use url::form_urlencoded;

/// Pattern a video id must match before the presentation page loads it.
pub const CONTENT_ID_PATTERN: &str = r"^[A-Za-z0-9_-]{11}$";

/// Player embed endpoint the presentation page points its frame at.
pub const EMBED_BASE: &str = "https://www.youtube.com/embed/";

static VIDEO_ID: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(CONTENT_ID_PATTERN).expect("content id pattern is valid"));

/// Opaque token naming the media to display. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
	/// Wraps any non-blank token. Validation against [`CONTENT_ID_PATTERN`] is left
	/// to the presentation page.
	pub fn new(raw: impl Into<String>) -> Result<Self, ContentIdError> {
		let raw = raw.into();
		if raw.trim().is_empty() {
			return Err(ContentIdError::Empty);
		}
		Ok(Self(raw))
	}

	/// Accepts only tokens matching [`CONTENT_ID_PATTERN`].
	pub fn parse_video_id(raw: &str) -> Result<Self, ContentIdError> {
		if raw.is_empty() {
			return Err(ContentIdError::Empty);
		}
		if !VIDEO_ID.is_match(raw) {
			return Err(ContentIdError::Invalid(raw.to_string()));
		}
		Ok(Self(raw.to_string()))
	}

	pub fn is_video_id(&self) -> bool {
		VIDEO_ID.is_match(&self.0)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ContentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl TryFrom<String> for ContentId {
	type Error = ContentIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl From<ContentId> for String {
	fn from(value: ContentId) -> Self {
		value.0
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentIdError {
	#[error("content identifier is empty")]
	Empty,

	#[error("content identifier {0:?} is not a valid video id")]
	Invalid(String),
}

/// Builds the presentation page URL carrying `id` in the `param` query parameter.
pub fn surface_url(page: &str, param: &str, id: &ContentId) -> String {
	let query = form_urlencoded::Serializer::new(String::new())
		.append_pair(param, id.as_str())
		.finish();
	format!("{page}?{query}")
}

/// Reads `param` from a query string, with or without the leading `?`.
pub fn content_param(query: &str, param: &str) -> Option<String> {
	let query = query.strip_prefix('?').unwrap_or(query);
	form_urlencoded::parse(query.as_bytes())
		.find(|(key, _)| key == param)
		.map(|(_, value)| value.into_owned())
}

/// Player URL for a validated id, with autoplay and the fullscreen control enabled.
pub fn embed_url(id: &ContentId) -> String {
	let mut url = Url::parse(EMBED_BASE).expect("embed base is a valid URL");
	url.path_segments_mut()
		.expect("https URLs have path segments")
		.pop_if_empty()
		.push(id.as_str());
	url.query_pairs_mut().append_pair("autoplay", "1").append_pair("fs", "1");
	url.into()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn video_id_pattern() {
		assert!(ContentId::parse_video_id("dQw4w9WgXcQ").is_ok());
		assert!(ContentId::parse_video_id("a-b_c-d_e-f").is_ok());

		assert_eq!(ContentId::parse_video_id(""), Err(ContentIdError::Empty));
		for bad in ["dQw4w9WgXc", "dQw4w9WgXcQQ", "dQw4w9WgX Q", "dQw4w9WgX%Q", "dQw4w9WgXc\n"] {
			assert!(
				matches!(ContentId::parse_video_id(bad), Err(ContentIdError::Invalid(_))),
				"{bad:?} should be rejected"
			);
		}
	}

	#[test]
	fn opaque_ids_only_need_content() {
		assert_eq!(ContentId::new("   "), Err(ContentIdError::Empty));
		let id = ContentId::new("not a video id").unwrap();
		assert!(!id.is_video_id());
	}

	#[test]
	fn surface_url_round_trips_video_ids() {
		let id = ContentId::parse_video_id("dQw4w9WgXcQ").unwrap();
		let url = surface_url("fullscreen/fullscreen.html", "videoId", &id);
		assert_eq!(url, "fullscreen/fullscreen.html?videoId=dQw4w9WgXcQ");

		let query = url.split_once('?').map(|(_, q)| q).unwrap();
		assert_eq!(content_param(query, "videoId").as_deref(), Some("dQw4w9WgXcQ"));
	}

	#[test]
	fn surface_url_percent_encodes_arbitrary_tokens() {
		let id = ContentId::new("a&b=c/d").unwrap();
		let url = surface_url("page.html", "videoId", &id);
		assert_eq!(url, "page.html?videoId=a%26b%3Dc%2Fd");
		assert_eq!(content_param("?videoId=a%26b%3Dc%2Fd", "videoId").as_deref(), Some("a&b=c/d"));
	}

	#[test]
	fn content_param_missing() {
		assert_eq!(content_param("", "videoId"), None);
		assert_eq!(content_param("?other=1", "videoId"), None);
	}

	#[test]
	fn embed_url_enables_autoplay_and_fullscreen() {
		let id = ContentId::parse_video_id("dQw4w9WgXcQ").unwrap();
		assert_eq!(embed_url(&id), "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&fs=1");
	}
}
