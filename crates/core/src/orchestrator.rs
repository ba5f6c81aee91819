//! Presentation surface orchestration.
//!
//! The orchestrator keeps at most one presentation surface alive. It holds no
//! state of its own: the [`SurfaceRegistry`] slot is the only record, and it is
//! written at three commit points (after creation, after a close request, after
//! a stale id is detected). Racing opens therefore degrade to reuse instead of
//! producing a second window.

use std::future::Future;

use beamer_protocol::{ActionResponse, ContentId, Request, Response, surface_url};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::display::DisplaySelector;
use crate::error::{Error, HostError, Result};
use crate::host::{DisplayHost, SlotStore, SurfaceHandle, SurfaceHost, SurfaceId, SurfaceSpec};
use crate::registry::SurfaceRegistry;

/// Registry view of the surface, unverified against the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
	NoSurface,
	SurfaceOpen(SurfaceId),
}

/// How [`Orchestrator::ensure_surface`] satisfied the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
	/// The registered surface was alive and got retargeted.
	Reused(SurfaceHandle),
	/// A new surface was opened.
	Created(SurfaceHandle),
}

impl EnsureOutcome {
	pub fn handle(&self) -> SurfaceHandle {
		match self {
			EnsureOutcome::Reused(handle) | EnsureOutcome::Created(handle) => *handle,
		}
	}
}

pub struct Orchestrator<H, S> {
	host: H,
	registry: SurfaceRegistry<S>,
	selector: DisplaySelector,
	config: Config,
}

impl<H, S> Orchestrator<H, S>
where
	H: DisplayHost + SurfaceHost,
	S: SlotStore,
{
	pub fn new(host: H, store: S, config: Config) -> Self {
		let registry = SurfaceRegistry::new(store, config.storage_key.clone());
		Self {
			host,
			registry,
			selector: DisplaySelector,
			config,
		}
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn registry(&self) -> &SurfaceRegistry<S> {
		&self.registry
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub async fn state(&self) -> SurfaceState {
		match self.registry.get().await {
			Some(id) => SurfaceState::SurfaceOpen(id),
			None => SurfaceState::NoSurface,
		}
	}

	/// Shows `content` in the presentation surface, reusing a live one or opening a new one.
	pub async fn ensure_surface(&self, content: &ContentId) -> Result<EnsureOutcome> {
		if !content.is_video_id() {
			warn!(target = "beamer.orchestrator", content = %content, "not a video id, the presentation page will reject it");
		}
		if let Some(id) = self.registry.get().await {
			match self.host.surface(id).await {
				Ok(handle) => {
					info!(target = "beamer.orchestrator", surface = %id, content = %content, "surface already open, retargeting");
					self.update_surface(content, id).await?;
					return Ok(EnsureOutcome::Reused(handle));
				}
				Err(err) => {
					warn!(target = "beamer.orchestrator", surface = %id, error = %err, "registered surface no longer exists");
					self.registry.clear().await;
				}
			}
		}

		self.create_surface(content).await.map(EnsureOutcome::Created)
	}

	async fn create_surface(&self, content: &ContentId) -> Result<SurfaceHandle> {
		let bounds = match self.selector.select_target(&self.host).await {
			Some(chosen) => {
				info!(target = "beamer.orchestrator", display = %chosen.id, "selected display");
				chosen.bounds
			}
			None => {
				warn!(target = "beamer.orchestrator", "no display available, using default geometry");
				self.config.default_bounds
			}
		};
		debug!(
			target = "beamer.orchestrator",
			left = bounds.left,
			top = bounds.top,
			width = bounds.width,
			height = bounds.height,
			"positioning surface"
		);

		let spec = SurfaceSpec {
			url: self.surface_url(content),
			kind: self.config.surface_kind,
			bounds,
			focused: self.config.focus_on_open,
		};

		let handle = self.host.create_surface(&spec).await.map_err(|err| {
			error!(target = "beamer.orchestrator", error = %err, "failed to create surface");
			Error::CreationFailure(err)
		})?;
		info!(target = "beamer.orchestrator", surface = %handle.id, "surface created");

		self.registry.set(handle.id).await;
		best_effort("maximize", self.host.maximize_surface(handle.id)).await;
		best_effort("inject control script", self.inject_control_script(handle.id)).await;

		Ok(handle)
	}

	async fn inject_control_script(&self, id: SurfaceId) -> std::result::Result<(), HostError> {
		let unit = self
			.host
			.primary_unit(id)
			.await?
			.ok_or_else(|| HostError::new("tabs.query", format!("no tab in window {id}")))?;
		self.host.inject_script(unit, &self.config.surface_script).await
	}

	/// Navigates the page inside surface `id` to `content`.
	pub async fn update_surface(&self, content: &ContentId, id: SurfaceId) -> Result<()> {
		let unit = self
			.host
			.primary_unit(id)
			.await?
			.ok_or(Error::SurfaceUnaddressable(id))?;

		self.host.navigate_unit(unit, &self.surface_url(content)).await?;
		info!(target = "beamer.orchestrator", surface = %id, content = %content, "surface retargeted");
		Ok(())
	}

	/// Retargets the registered surface; returns `false` when none is registered.
	pub async fn content_changed(&self, content: &ContentId) -> Result<bool> {
		let Some(id) = self.registry.get().await else {
			debug!(target = "beamer.orchestrator", content = %content, "content changed with no surface open");
			return Ok(false);
		};
		self.update_surface(content, id).await?;
		Ok(true)
	}

	/// Destroys the registered surface. The slot is cleared even when destruction fails.
	pub async fn close_surface(&self) -> Result<()> {
		let Some(id) = self.registry.get().await else {
			warn!(target = "beamer.orchestrator", "no surface open to close");
			return Err(Error::NoActiveSurface);
		};

		let removed = self.host.remove_surface(id).await;
		self.registry.clear().await;

		match removed {
			Ok(()) => {
				info!(target = "beamer.orchestrator", surface = %id, "surface closed");
				Ok(())
			}
			Err(err) => {
				error!(target = "beamer.orchestrator", surface = %id, error = %err, "failed to close surface");
				Err(err.into())
			}
		}
	}

	/// Asks the page inside the registered surface to enter element fullscreen.
	pub async fn trigger_remote_fullscreen(&self) -> Result<ActionResponse> {
		let Some(id) = self.registry.get().await else {
			warn!(target = "beamer.orchestrator", "no surface open to put in fullscreen");
			return Err(Error::NoActiveSurface);
		};

		let unit = self
			.host
			.primary_unit(id)
			.await?
			.ok_or(Error::SurfaceUnaddressable(id))?;

		let reply = self.host.send_to_unit(unit, &Request::EnterFullscreen).await?;
		info!(target = "beamer.orchestrator", surface = %id, unit = %unit, "sent enterFullscreen");

		Ok(match serde_json::from_value::<Response>(reply) {
			Ok(Response::Action(resp)) => resp,
			Ok(Response::Status(status)) => ActionResponse::ok_with(status.status),
			_ => ActionResponse::ok(),
		})
	}

	fn surface_url(&self, content: &ContentId) -> String {
		surface_url(&self.config.surface_page, &self.config.content_param, content)
	}
}

/// Runs a post-creation step whose failure must not undo the creation.
async fn best_effort<F>(step: &'static str, fut: F)
where
	F: Future<Output = std::result::Result<(), HostError>>,
{
	match fut.await {
		Ok(()) => debug!(target = "beamer.orchestrator", step, "post-creation step done"),
		Err(err) => error!(target = "beamer.orchestrator", step, error = %err, "post-creation step failed"),
	}
}
