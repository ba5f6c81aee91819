//! Source observer: the side of the extension living in the video page.

use async_trait::async_trait;
use beamer_protocol::{Action, ActionResponse, Request, VideoIdResponse};
use tracing::{error, info, warn};
use url::Url;

use crate::error::HostError;
use crate::host::PageHost;
use crate::router::{Handler, Responder};

/// Query parameter the watch page keeps its video id in.
pub const WATCH_PARAM: &str = "v";

pub struct SourceObserver<P> {
	page: P,
}

impl<P: PageHost> SourceObserver<P> {
	pub fn new(page: P) -> Self {
		Self { page }
	}

	pub fn page(&self) -> &P {
		&self.page
	}

	/// Video id of the current page, `None` when the page is not a watch page.
	pub fn video_id(&self) -> Result<Option<String>, HostError> {
		let href = self.page.location()?;
		let url = Url::parse(&href).map_err(|err| HostError::new("location.href", err.to_string()))?;
		Ok(url
			.query_pairs()
			.find(|(key, _)| key == WATCH_PARAM)
			.map(|(_, value)| value.into_owned())
			.filter(|value| !value.is_empty()))
	}

	fn video_id_response(&self) -> VideoIdResponse {
		match self.video_id() {
			Ok(Some(video_id)) => {
				info!(target = "beamer.observer", %video_id, "video id found");
				VideoIdResponse {
					video_id: Some(video_id),
					error: None,
				}
			}
			Ok(None) => {
				warn!(target = "beamer.observer", "video id not found");
				VideoIdResponse {
					video_id: None,
					error: None,
				}
			}
			Err(err) => {
				error!(target = "beamer.observer", error = %err, "failed to extract video id");
				VideoIdResponse {
					video_id: None,
					error: Some(err.to_string()),
				}
			}
		}
	}

	/// Puts the whole document in fullscreen unless it already is.
	pub async fn enter_fullscreen(&self) -> ActionResponse {
		if self.page.is_fullscreen() {
			return ActionResponse::ok();
		}
		match self.page.request_fullscreen().await {
			Ok(()) => {
				info!(target = "beamer.observer", "entered fullscreen");
				ActionResponse::ok()
			}
			Err(err) => {
				error!(target = "beamer.observer", error = %err, "failed to enter fullscreen");
				ActionResponse::failure(format!("Failed to enter fullscreen: {}", err.message))
			}
		}
	}
}

#[async_trait(?Send)]
impl<P: PageHost> Handler for SourceObserver<P> {
	fn accepts(action: Action) -> bool {
		matches!(action, Action::GetVideoId | Action::EnterFullscreen)
	}

	async fn handle(&self, request: Request, responder: Responder) {
		match request {
			Request::GetVideoId => responder.send(self.video_id_response()),
			Request::EnterFullscreen => responder.send(self.enter_fullscreen().await),
			other => responder.send(ActionResponse::failure(format!(
				"{} is not handled by the page observer",
				other.action()
			))),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use beamer_protocol::Response;
	use serde_json::json;

	use super::*;
	use crate::router::Router;
	use crate::testing::FakePage;

	#[test]
	fn reads_watch_param() {
		let observer = SourceObserver::new(FakePage::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s"));
		assert_eq!(observer.video_id().unwrap().as_deref(), Some("dQw4w9WgXcQ"));

		observer.page().set_location("https://www.youtube.com/feed/subscriptions");
		assert_eq!(observer.video_id().unwrap(), None);

		observer.page().set_location("https://www.youtube.com/watch?v=");
		assert_eq!(observer.video_id().unwrap(), None);
	}

	#[tokio::test]
	async fn get_video_id_reports_errors_in_payload() {
		let router = Router::new(SourceObserver::new(FakePage::new("not a url")));
		let replies = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&replies);

		router
			.route(&json!({"action": "getVideoId"}), move |r| sink.borrow_mut().push(r))
			.await;

		let replies = replies.borrow();
		let Response::VideoId(resp) = &replies[0] else {
			panic!("expected a video id reply, got {:?}", replies[0]);
		};
		assert_eq!(resp.video_id, None);
		assert!(resp.error.as_deref().unwrap().starts_with("location.href failed"));
	}

	#[tokio::test]
	async fn enter_fullscreen_skips_when_already_fullscreen() {
		let observer = SourceObserver::new(FakePage::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
		assert_eq!(observer.enter_fullscreen().await, ActionResponse::ok());
		assert_eq!(observer.page().fullscreen_requests(), 1);

		assert_eq!(observer.enter_fullscreen().await, ActionResponse::ok());
		assert_eq!(observer.page().fullscreen_requests(), 1);
	}

	#[tokio::test]
	async fn enter_fullscreen_failure_is_reported() {
		let observer = SourceObserver::new(FakePage::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
		observer.page().reject_fullscreen("not allowed");

		assert_eq!(
			observer.enter_fullscreen().await,
			ActionResponse::failure("Failed to enter fullscreen: not allowed")
		);
	}

	#[test]
	fn background_actions_are_left_alone() {
		let taken = Router::<SourceObserver<FakePage>>::accept(&json!({"action": "openFullscreen"}), |_| {});
		assert!(taken.is_none());
	}
}
