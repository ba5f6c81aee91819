//! Single-slot registry of the open presentation surface.
//!
//! Absent means no surface is open. A present id is only a hint: it may name a
//! window that died with a previous session, so the orchestrator verifies it
//! before reuse.

use serde_json::Value;
use tracing::{error, info, warn};

use crate::host::{SlotStore, SurfaceId};

#[derive(Debug, Clone)]
pub struct SurfaceRegistry<S> {
	store: S,
	key: String,
}

impl<S: SlotStore> SurfaceRegistry<S> {
	pub fn new(store: S, key: impl Into<String>) -> Self {
		Self {
			store,
			key: key.into(),
		}
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	/// Returns the registered id; read failures and undecodable values count as absent.
	pub async fn get(&self) -> Option<SurfaceId> {
		let value = match self.store.read(&self.key).await {
			Ok(value) => value?,
			Err(err) => {
				error!(target = "beamer.registry", key = %self.key, error = %err, "failed to read surface id");
				return None;
			}
		};

		let id = decode_id(&value);
		if id.is_none() && !value.is_null() {
			warn!(target = "beamer.registry", key = %self.key, %value, "ignoring undecodable surface id");
		}
		id
	}

	/// Overwrites the slot. Failure is logged; reuse degrades to re-creation.
	pub async fn set(&self, id: SurfaceId) {
		match self.store.write(&self.key, Value::from(id.0)).await {
			Ok(()) => info!(target = "beamer.registry", surface = %id, "surface id stored"),
			Err(err) => error!(target = "beamer.registry", surface = %id, error = %err, "failed to store surface id"),
		}
	}

	pub async fn clear(&self) {
		match self.store.remove(&self.key).await {
			Ok(()) => info!(target = "beamer.registry", "surface id removed"),
			Err(err) => error!(target = "beamer.registry", error = %err, "failed to remove surface id"),
		}
	}
}

// JS storage hands numbers back as doubles.
fn decode_id(value: &Value) -> Option<SurfaceId> {
	let raw = value
		.as_i64()
		.or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))?;
	i32::try_from(raw).ok().map(SurfaceId)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::testing::MemorySlots;

	fn registry() -> SurfaceRegistry<MemorySlots> {
		SurfaceRegistry::new(MemorySlots::new(), "fullscreenWindowId")
	}

	#[tokio::test]
	async fn set_overwrites_and_clear_is_idempotent() {
		let registry = registry();
		assert_eq!(registry.get().await, None);

		registry.set(SurfaceId(1)).await;
		registry.set(SurfaceId(2)).await;
		assert_eq!(registry.get().await, Some(SurfaceId(2)));
		assert_eq!(registry.store().get("fullscreenWindowId"), Some(json!(2)));

		registry.clear().await;
		registry.clear().await;
		assert_eq!(registry.get().await, None);
	}

	#[tokio::test]
	async fn store_failures_degrade_to_absent() {
		let registry = registry();
		registry.set(SurfaceId(5)).await;

		registry.store().fail_reads(true);
		assert_eq!(registry.get().await, None);

		registry.store().fail_reads(false);
		registry.store().fail_writes(true);
		registry.set(SurfaceId(6)).await;
		registry.clear().await;
		registry.store().fail_writes(false);
		assert_eq!(registry.get().await, Some(SurfaceId(5)));
	}

	#[tokio::test]
	async fn garbage_values_read_as_absent() {
		let registry = registry();
		registry.store().insert("fullscreenWindowId", json!("not-a-window"));
		assert_eq!(registry.get().await, None);

		registry.store().insert("fullscreenWindowId", Value::Null);
		assert_eq!(registry.get().await, None);

		registry.store().insert("fullscreenWindowId", json!(2.5));
		assert_eq!(registry.get().await, None);
	}

	#[tokio::test]
	async fn whole_doubles_decode() {
		let registry = registry();
		registry.store().insert("fullscreenWindowId", json!(1234.0));
		assert_eq!(registry.get().await, Some(SurfaceId(1234)));
	}
}
