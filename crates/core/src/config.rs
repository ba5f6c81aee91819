//! Orchestrator settings.
//!
//! Every field has a default, so an override document only needs the keys it
//! changes:
//!
//! ```json
//! { "defaultBounds": { "left": 1920, "top": 0, "width": 1920, "height": 1080 }, "logLevel": "debug" }
//! ```

use serde::{Deserialize, Serialize};

use crate::host::{Bounds, SurfaceKind};

/// Storage key the background worker reads an override document from.
pub const CONFIG_STORAGE_KEY: &str = "beamerConfig";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
	/// Storage key of the registry slot.
	pub storage_key: String,
	/// Extension-relative page shown in the presentation surface.
	pub surface_page: String,
	/// Script injected into a freshly created surface.
	pub surface_script: String,
	/// Query parameter carrying the content id.
	pub content_param: String,
	/// Geometry used when no display can be queried.
	pub default_bounds: Bounds,
	pub surface_kind: SurfaceKind,
	pub focus_on_open: bool,
	/// `tracing` level name for the extension's console subscriber.
	pub log_level: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			storage_key: "fullscreenWindowId".into(),
			surface_page: "fullscreen/fullscreen.html".into(),
			surface_script: "fullscreen/fullscreen.js".into(),
			content_param: "videoId".into(),
			default_bounds: Bounds::new(0, 0, 1280, 720),
			surface_kind: SurfaceKind::Popup,
			focus_on_open: true,
			log_level: "info".into(),
		}
	}
}

impl Config {
	/// Parses an override document; missing keys keep their defaults.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}

	/// Same as [`from_json`](Self::from_json) for an already-decoded value.
	pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
		serde_json::from_value(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_document_is_default() {
		assert_eq!(Config::from_json("{}").unwrap(), Config::default());
	}

	#[test]
	fn partial_override_keeps_other_defaults() {
		let config = Config::from_json(r#"{"logLevel":"debug","defaultBounds":{"left":1920,"top":0,"width":1920,"height":1080}}"#)
			.unwrap();
		assert_eq!(config.log_level, "debug");
		assert_eq!(config.default_bounds, Bounds::new(1920, 0, 1920, 1080));
		assert_eq!(config.storage_key, "fullscreenWindowId");
		assert_eq!(config.surface_kind, SurfaceKind::Popup);
	}

	#[test]
	fn wrong_types_are_rejected() {
		assert!(Config::from_json(r#"{"focusOnOpen":"yes"}"#).is_err());
	}
}
