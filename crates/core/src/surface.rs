//! The presentation page shown inside the surface window.

use async_trait::async_trait;
use beamer_protocol::{Action, ActionResponse, ContentId, Request, StatusResponse, content_param, embed_url};
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::host::SurfacePage;
use crate::router::{Handler, Responder};

/// Alert shown when the page was opened without a usable video id.
pub const INVALID_CONTENT_ALERT: &str = "No valid video specified.";

pub const PLAYER_FRAME: &str = "#player";
pub const PLAYER_CONTAINER: &str = "#player-container";

pub struct PresentationSurface<P> {
	page: P,
	param: String,
}

impl<P: SurfacePage> PresentationSurface<P> {
	pub fn new(page: P, param: impl Into<String>) -> Self {
		Self {
			page,
			param: param.into(),
		}
	}

	pub fn page(&self) -> &P {
		&self.page
	}

	/// Claims the page for this script run; `false` means another run already owns
	/// it and this one must not load or listen.
	pub fn claim_page(&self) -> bool {
		let claimed = self.page.claim();
		if !claimed {
			info!(target = "beamer.surface", "presentation script already running in this page");
		}
		claimed
	}

	/// Loads the video named in the page URL into the player frame.
	///
	/// Ids not matching the video id pattern alert the user and leave the player untouched.
	pub fn load(&self) -> Result<ContentId> {
		let query = self.page.query()?;
		let raw = content_param(&query, &self.param).unwrap_or_default();

		let content = ContentId::parse_video_id(&raw).inspect_err(|err| {
			error!(target = "beamer.surface", error = %err, "invalid or missing video id");
			self.page.alert(INVALID_CONTENT_ALERT);
		})?;
		info!(target = "beamer.surface", %content, "video id read from URL");

		if !self.page.set_player_source(&embed_url(&content)) {
			error!(target = "beamer.surface", selector = PLAYER_FRAME, "player frame not found");
			return Err(Error::PlayerMissing(PLAYER_FRAME));
		}
		info!(target = "beamer.surface", "player frame updated");
		Ok(content)
	}

	/// Requests fullscreen on the player container.
	pub async fn enter_fullscreen(&self) -> Result<StatusResponse> {
		if self.page.is_fullscreen() {
			info!(target = "beamer.surface", "already in fullscreen");
			return Ok(StatusResponse {
				status: "Already in fullscreen.".into(),
			});
		}
		self.page.request_player_fullscreen().await?;
		info!(target = "beamer.surface", "fullscreen requested");
		Ok(StatusResponse {
			status: "Fullscreen requested.".into(),
		})
	}
}

#[async_trait(?Send)]
impl<P: SurfacePage> Handler for PresentationSurface<P> {
	fn accepts(action: Action) -> bool {
		action == Action::EnterFullscreen
	}

	async fn handle(&self, request: Request, responder: Responder) {
		if request != Request::EnterFullscreen {
			responder.send(ActionResponse::failure(format!(
				"{} is not handled by the presentation page",
				request.action()
			)));
			return;
		}
		match self.enter_fullscreen().await {
			Ok(status) => responder.send(status),
			Err(err) => {
				warn!(target = "beamer.surface", error = %err, "failed to enter fullscreen");
				responder.send(err.to_response());
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::FakeSurfacePage;

	fn presenting(query: &str) -> PresentationSurface<FakeSurfacePage> {
		PresentationSurface::new(FakeSurfacePage::new(query), "videoId")
	}

	#[test]
	fn valid_id_points_the_player_at_the_embed() {
		let surface = presenting("?videoId=dQw4w9WgXcQ");
		assert_eq!(surface.load().unwrap().as_str(), "dQw4w9WgXcQ");
		assert_eq!(
			surface.page().player_source().as_deref(),
			Some("https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&fs=1")
		);
		assert!(surface.page().alerts().is_empty());
	}

	#[test]
	fn invalid_ids_alert_and_leave_the_player_alone() {
		for query in ["", "?videoId=", "?videoId=short", "?videoId=dQw4w9WgXcQ%3Cscript%3E", "?other=dQw4w9WgXcQ"] {
			let surface = presenting(query);
			assert!(matches!(surface.load(), Err(Error::InvalidContent(_))), "{query}");
			assert_eq!(surface.page().player_source(), None, "{query}");
			assert_eq!(surface.page().alerts(), vec![INVALID_CONTENT_ALERT.to_string()], "{query}");
		}
	}

	#[test]
	fn second_script_run_does_not_reload_the_player() {
		let page = FakeSurfacePage::new("?videoId=dQw4w9WgXcQ");
		let first = PresentationSurface::new(page.clone(), "videoId");
		assert!(first.claim_page());
		first.load().unwrap();

		let second = PresentationSurface::new(page.clone(), "videoId");
		assert!(!second.claim_page());
		assert!(!first.claim_page());
		assert_eq!(page.source_changes(), 1);
	}

	#[test]
	fn missing_frame_is_an_error() {
		let surface = presenting("?videoId=dQw4w9WgXcQ");
		surface.page().remove_player();
		assert!(matches!(surface.load(), Err(Error::PlayerMissing(PLAYER_FRAME))));
	}

	#[tokio::test]
	async fn fullscreen_status() {
		let surface = presenting("?videoId=dQw4w9WgXcQ");
		assert_eq!(surface.enter_fullscreen().await.unwrap().status, "Fullscreen requested.");
		assert_eq!(surface.enter_fullscreen().await.unwrap().status, "Already in fullscreen.");

		let surface = presenting("?videoId=dQw4w9WgXcQ");
		surface.page().remove_player();
		assert!(matches!(surface.enter_fullscreen().await, Err(Error::Host(_))));
	}
}
