//! Wire types shared by the beamer extension contexts.
//!
//! The background worker, the source observer running in the video page, and the
//! presentation page exchange JSON messages tagged by `action`. This crate owns
//! those shapes plus the content identifier and presentation URL contract, so
//! every context agrees on them.
//!
//! # Main Types
//!
//! - [`Request`] - Inbound control messages, discriminated by [`Action`]
//! - [`Response`] - Replies: [`ActionResponse`], [`VideoIdResponse`], [`StatusResponse`]
//! - [`ContentId`] - Token naming the media shown in the presentation surface

mod content_id;
mod message;
mod response;

pub use content_id::{
	CONTENT_ID_PATTERN, ContentId, ContentIdError, EMBED_BASE, content_param, embed_url, surface_url,
};
pub use message::{Action, MessageError, Request};
pub use response::{ActionResponse, Response, StatusResponse, VideoIdResponse};
