//! Request routing for one extension context.
//!
//! Every context (background worker, source observer, presentation page) hears
//! every runtime message, so routing has to decide synchronously, before any
//! work starts, whether this context answers:
//!
//! - [`Router::accept`] decodes the message and returns a [`PendingRequest`] only
//!   for actions the context's [`Handler`] accepts
//! - the listener keeps the channel open only when the pending request carries a
//!   live [`Responder`]
//! - [`Router::dispatch`] runs the handler, which consumes the responder
//!
//! Unknown, malformed, or foreign actions yield no pending request, so the
//! listener closes the channel instead of leaving the sender waiting.

use async_trait::async_trait;
use beamer_protocol::{Action, ActionResponse, ContentId, MessageError, Request, Response};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::host::{DisplayHost, SlotStore, SurfaceHost};
use crate::orchestrator::Orchestrator;

type ReplyFn = Box<dyn FnOnce(Response)>;

/// One-shot reply channel for a single request.
///
/// [`send`](Self::send) consumes it, so a request is answered at most once. A
/// live responder dropped unsent answers `{success:false}` so the sender never
/// hangs.
pub struct Responder {
	action: Action,
	reply: Option<ReplyFn>,
}

impl Responder {
	pub fn new(action: Action, reply: impl FnOnce(Response) + 'static) -> Self {
		Self {
			action,
			reply: Some(Box::new(reply)),
		}
	}

	/// Responder for fire-and-forget actions; sending is a no-op.
	pub fn detached(action: Action) -> Self {
		Self { action, reply: None }
	}

	pub fn is_detached(&self) -> bool {
		self.reply.is_none()
	}

	pub fn send(mut self, response: impl Into<Response>) {
		if let Some(reply) = self.reply.take() {
			reply(response.into());
		}
	}
}

impl Drop for Responder {
	fn drop(&mut self) {
		if let Some(reply) = self.reply.take() {
			warn!(target = "beamer.router", action = %self.action, "request finished without a response");
			reply(ActionResponse::failure(format!("{} finished without a response", self.action)).into());
		}
	}
}

/// An accepted request and the responder it must be answered through.
pub struct PendingRequest {
	pub request: Request,
	pub responder: Responder,
}

impl PendingRequest {
	/// What the message listener should return to the browser.
	pub fn keeps_channel_open(&self) -> bool {
		!self.responder.is_detached()
	}
}

/// Per-context request handling.
#[async_trait(?Send)]
pub trait Handler {
	/// Actions this context answers; everything else is left to other listeners.
	fn accepts(action: Action) -> bool
	where
		Self: Sized;

	async fn handle(&self, request: Request, responder: Responder);
}

pub struct Router<H> {
	handler: H,
}

impl<H: Handler> Router<H> {
	pub fn new(handler: H) -> Self {
		Self { handler }
	}

	pub fn handler(&self) -> &H {
		&self.handler
	}

	/// Decodes `raw` and pairs it with `reply` when this context answers it.
	pub fn accept(raw: &Value, reply: impl FnOnce(Response) + 'static) -> Option<PendingRequest> {
		let request = match Request::from_value(raw) {
			Ok(request) => request,
			Err(MessageError::UnknownAction(name)) => {
				warn!(target = "beamer.router", action = %name, "unknown action received");
				return None;
			}
			Err(err) => {
				warn!(target = "beamer.router", error = %err, "ignoring undecodable message");
				return None;
			}
		};

		let action = request.action();
		if !H::accepts(action) {
			debug!(target = "beamer.router", %action, "action handled by another context");
			return None;
		}
		info!(target = "beamer.router", %action, "received action");

		let responder = if action.expects_reply() {
			Responder::new(action, reply)
		} else {
			Responder::detached(action)
		};
		Some(PendingRequest { request, responder })
	}

	pub async fn dispatch(&self, pending: PendingRequest) {
		self.handler.handle(pending.request, pending.responder).await;
	}

	/// [`accept`](Self::accept) then [`dispatch`](Self::dispatch); returns whether the message was taken.
	pub async fn route(&self, raw: &Value, reply: impl FnOnce(Response) + 'static) -> bool {
		match Self::accept(raw, reply) {
			Some(pending) => {
				self.dispatch(pending).await;
				true
			}
			None => false,
		}
	}
}

/// Reads the content id carried by a control message.
pub fn content_from(video_id: Option<String>) -> Result<ContentId> {
	Ok(ContentId::new(video_id.unwrap_or_default())?)
}

fn into_reply(result: Result<ActionResponse>) -> ActionResponse {
	result.unwrap_or_else(|err| {
		if err.is_caller_facing() {
			info!(target = "beamer.router", error = %err, "request refused");
		} else {
			error!(target = "beamer.router", error = %err, "request failed");
		}
		err.to_response()
	})
}

#[async_trait(?Send)]
impl<H, S> Handler for Orchestrator<H, S>
where
	H: DisplayHost + SurfaceHost,
	S: SlotStore,
{
	fn accepts(action: Action) -> bool {
		matches!(
			action,
			Action::OpenFullscreen | Action::CloseFullscreen | Action::VideoChanged | Action::RequestFullscreen
		)
	}

	async fn handle(&self, request: Request, responder: Responder) {
		match request {
			Request::OpenFullscreen { video_id, .. } => {
				let result = match content_from(video_id) {
					Ok(content) => self.ensure_surface(&content).await.map(|_| ActionResponse::ok()),
					Err(err) => Err(err),
				};
				responder.send(into_reply(result));
			}
			Request::CloseFullscreen { .. } => {
				responder.send(into_reply(self.close_surface().await.map(|()| ActionResponse::ok())));
			}
			Request::VideoChanged { video_id } => {
				match content_from(video_id) {
					Ok(content) => {
						if let Err(err) = self.content_changed(&content).await {
							warn!(target = "beamer.router", error = %err, "failed to retarget surface");
						}
					}
					Err(err) => debug!(target = "beamer.router", error = %err, "videoChanged without a video"),
				}
				responder.send(ActionResponse::ok());
			}
			Request::RequestFullscreen { .. } => {
				responder.send(into_reply(self.trigger_remote_fullscreen().await));
			}
			other => {
				responder.send(ActionResponse::failure(format!(
					"{} is not handled by the background worker",
					other.action()
				)));
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use serde_json::json;

	use super::*;
	use crate::config::Config;
	use crate::testing::{FakeHost, MemorySlots};

	type Background = Router<Orchestrator<FakeHost, MemorySlots>>;

	fn capture() -> (Rc<RefCell<Vec<Response>>>, impl FnOnce(Response) + 'static) {
		let replies = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&replies);
		(replies, move |resp| sink.borrow_mut().push(resp))
	}

	fn background() -> Background {
		Router::new(Orchestrator::new(FakeHost::new(), MemorySlots::new(), Config::default()))
	}

	#[test]
	fn unknown_and_foreign_actions_are_not_accepted() {
		let (replies, reply) = capture();
		assert!(Background::accept(&json!({"action": "teleport"}), reply).is_none());

		let (_, reply) = capture();
		assert!(Background::accept(&json!({"action": "getVideoId"}), reply).is_none());

		let (_, reply) = capture();
		assert!(Background::accept(&json!(null), reply).is_none());

		assert!(replies.borrow().is_empty());
	}

	#[test]
	fn fire_and_forget_closes_the_channel() {
		let (replies, reply) = capture();
		let pending = Background::accept(&json!({"action": "videoChanged", "videoId": "dQw4w9WgXcQ"}), reply).unwrap();
		assert!(!pending.keeps_channel_open());
		drop(pending);
		assert!(replies.borrow().is_empty());
	}

	#[test]
	fn dropped_responder_answers_once() {
		let (replies, reply) = capture();
		let pending = Background::accept(&json!({"action": "closeFullscreen"}), reply).unwrap();
		assert!(pending.keeps_channel_open());
		drop(pending);

		let replies = replies.borrow();
		assert_eq!(replies.len(), 1);
		assert!(!replies[0].is_success());
	}

	#[tokio::test]
	async fn open_replies_exactly_once() {
		let router = background();
		let (replies, reply) = capture();

		let taken = router
			.route(&json!({"action": "openFullscreen", "videoId": "dQw4w9WgXcQ", "tabId": 3}), reply)
			.await;

		assert!(taken);
		assert_eq!(*replies.borrow(), vec![Response::Action(ActionResponse::ok())]);
	}

	#[tokio::test]
	async fn open_without_video_fails_without_a_surface() {
		let router = background();
		let (replies, reply) = capture();

		router.route(&json!({"action": "openFullscreen"}), reply).await;

		assert_eq!(
			*replies.borrow(),
			vec![Response::Action(ActionResponse::failure("content identifier is empty"))]
		);
		assert_eq!(router.handler().host().live_surfaces(), 0);
	}

	#[tokio::test]
	async fn close_with_nothing_open_reports_failure() {
		let router = background();
		let (replies, reply) = capture();

		router.route(&json!({"action": "closeFullscreen"}), reply).await;

		assert_eq!(
			*replies.borrow(),
			vec![Response::Action(ActionResponse::failure("no fullscreen window is open"))]
		);
	}

	#[tokio::test]
	async fn video_changed_sends_nothing() {
		let router = background();
		let (replies, reply) = capture();

		router
			.route(&json!({"action": "videoChanged", "videoId": "dQw4w9WgXcQ"}), reply)
			.await;

		assert!(replies.borrow().is_empty());
	}
}
