//! Reacts to surfaces destroyed outside the orchestrator.

use tracing::{debug, info};

use crate::host::{SlotStore, SurfaceId};
use crate::registry::SurfaceRegistry;

/// Clears the registry when the registered surface is closed by the user or the OS.
///
/// Fed from the host's window-removed notification. Closes initiated by the
/// orchestrator have already cleared the slot, so those notifications are no-ops.
pub struct LifecycleWatcher<S> {
	registry: SurfaceRegistry<S>,
}

impl<S: SlotStore> LifecycleWatcher<S> {
	pub fn new(registry: SurfaceRegistry<S>) -> Self {
		Self { registry }
	}

	/// Handles one removal notification; returns whether the registry was cleared.
	pub async fn surface_removed(&self, removed: SurfaceId) -> bool {
		match self.registry.get().await {
			Some(registered) if registered == removed => {
				info!(target = "beamer.watcher", surface = %removed, "fullscreen window was closed");
				self.registry.clear().await;
				true
			}
			_ => {
				debug!(target = "beamer.watcher", surface = %removed, "unrelated window removed");
				false
			}
		}
	}
}
