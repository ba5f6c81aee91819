//! Target display selection.

use tracing::{debug, error};

use crate::host::{DisplayDescriptor, DisplayHost};

/// Picks the display a new presentation surface opens on.
///
/// With two or more displays the second enumerated one wins, leaving the
/// primary to the control panel. A failed query counts as no displays.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplaySelector;

impl DisplaySelector {
	pub async fn select_target<H: DisplayHost + ?Sized>(&self, host: &H) -> Option<DisplayDescriptor> {
		let displays = match host.displays().await {
			Ok(displays) => displays,
			Err(err) => {
				error!(target = "beamer.display", error = %err, "failed to query displays");
				Vec::new()
			}
		};
		debug!(target = "beamer.display", count = displays.len(), "displays enumerated");

		pick(displays)
	}
}

fn pick(mut displays: Vec<DisplayDescriptor>) -> Option<DisplayDescriptor> {
	match displays.len() {
		0 => None,
		1 => displays.pop(),
		_ => Some(displays.swap_remove(1)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::host::Bounds;
	use crate::testing::FakeHost;

	fn display(id: &str, left: i32) -> DisplayDescriptor {
		DisplayDescriptor {
			id: id.into(),
			bounds: Bounds::new(left, 0, 1920, 1080),
		}
	}

	#[test]
	fn pick_prefers_second_display() {
		assert_eq!(pick(vec![]), None);
		assert_eq!(pick(vec![display("a", 0)]).unwrap().id, "a");
		assert_eq!(pick(vec![display("a", 0), display("b", 1920)]).unwrap().id, "b");
		assert_eq!(
			pick(vec![display("a", 0), display("b", 1920), display("c", 3840)]).unwrap().id,
			"b"
		);
	}

	#[tokio::test]
	async fn failed_query_selects_nothing() {
		let host = FakeHost::new();
		host.fail_display_query();

		assert_eq!(DisplaySelector.select_target(&host).await, None);
	}

	#[tokio::test]
	async fn queries_fresh_on_every_call() {
		let host = FakeHost::with_displays(vec![display("a", 0)]);
		assert_eq!(DisplaySelector.select_target(&host).await.unwrap().id, "a");

		host.set_displays(vec![display("a", 0), display("b", 1920)]);
		assert_eq!(DisplaySelector.select_target(&host).await.unwrap().id, "b");
	}
}
