//! Seams between the orchestration logic and the browser.
//!
//! The background worker implements these over `chrome.*` APIs; tests use the
//! in-memory doubles from [`crate::testing`]. Every call may suspend, and every
//! failure comes back as a [`HostError`] so callers decide between fallback and
//! propagation.

use std::fmt;

use async_trait::async_trait;
use beamer_protocol::Request;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HostError;

/// Window id of a presentation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub i32);

impl fmt::Display for SurfaceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Tab id of the page hosted inside a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub i32);

impl fmt::Display for UnitId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Screen rectangle in desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
	pub left: i32,
	pub top: i32,
	pub width: i32,
	pub height: i32,
}

impl Bounds {
	pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
		Self {
			left,
			top,
			width,
			height,
		}
	}
}

/// A physical output as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayDescriptor {
	pub id: String,
	pub bounds: Bounds,
}

/// A live surface: its id and, when the host reports it, its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceHandle {
	pub id: SurfaceId,
	pub bounds: Option<Bounds>,
}

/// Window decoration requested at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
	/// Undecorated window without tab strip or toolbar.
	Popup,
	Normal,
}

/// Everything needed to open a presentation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSpec {
	pub url: String,
	pub kind: SurfaceKind,
	pub bounds: Bounds,
	pub focused: bool,
}

/// Enumerates attached displays.
#[async_trait(?Send)]
pub trait DisplayHost {
	async fn displays(&self) -> Result<Vec<DisplayDescriptor>, HostError>;
}

/// Window and tab operations against presentation surfaces.
#[async_trait(?Send)]
pub trait SurfaceHost {
	/// Resolves a surface by id; an error means it no longer exists.
	async fn surface(&self, id: SurfaceId) -> Result<SurfaceHandle, HostError>;

	async fn create_surface(&self, spec: &SurfaceSpec) -> Result<SurfaceHandle, HostError>;

	async fn maximize_surface(&self, id: SurfaceId) -> Result<(), HostError>;

	async fn remove_surface(&self, id: SurfaceId) -> Result<(), HostError>;

	/// First page hosted by the surface, if any.
	async fn primary_unit(&self, id: SurfaceId) -> Result<Option<UnitId>, HostError>;

	async fn navigate_unit(&self, unit: UnitId, url: &str) -> Result<(), HostError>;

	/// Runs an extension script file inside the unit.
	async fn inject_script(&self, unit: UnitId, file: &str) -> Result<(), HostError>;

	/// Sends a control message to the unit and returns its raw reply.
	async fn send_to_unit(&self, unit: UnitId, request: &Request) -> Result<Value, HostError>;
}

/// Durable key-value storage backing the surface registry.
#[async_trait(?Send)]
pub trait SlotStore {
	async fn read(&self, key: &str) -> Result<Option<Value>, HostError>;

	async fn write(&self, key: &str, value: Value) -> Result<(), HostError>;

	async fn remove(&self, key: &str) -> Result<(), HostError>;
}

/// The page a source observer lives in.
#[async_trait(?Send)]
pub trait PageHost {
	/// Full URL of the page.
	fn location(&self) -> Result<String, HostError>;

	fn is_fullscreen(&self) -> bool;

	/// Requests fullscreen for the whole document.
	async fn request_fullscreen(&self) -> Result<(), HostError>;
}

/// The presentation page's document.
#[async_trait(?Send)]
pub trait SurfacePage {
	/// Marks the document as driven by a presentation script.
	///
	/// Returns `false` when an earlier run already marked it. The mark must live
	/// in the document itself, since a re-injected script starts with fresh state.
	fn claim(&self) -> bool;

	/// Query string of the page, including the leading `?` when present.
	fn query(&self) -> Result<String, HostError>;

	/// Points the player frame at `url`; `false` when the frame is missing.
	fn set_player_source(&self, url: &str) -> bool;

	fn alert(&self, message: &str);

	fn is_fullscreen(&self) -> bool;

	/// Requests fullscreen for the player container.
	async fn request_player_fullscreen(&self) -> Result<(), HostError>;
}
