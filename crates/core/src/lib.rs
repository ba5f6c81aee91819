//! Mirrors a video from a browsing context into one maximized presentation
//! window on a secondary display.
//!
//! Three extension contexts cooperate through runtime messages:
//!
//! - the background worker runs the [`Orchestrator`] behind a [`Router`], and a
//!   [`LifecycleWatcher`] fed by window-removed events
//! - the video page runs a [`SourceObserver`]
//! - the presentation window runs a [`PresentationSurface`]
//!
//! Browser access goes through the traits in [`host`]; the `beamer-ext-*`
//! crates implement them over `chrome.*`, and [`testing`] provides in-memory
//! doubles.

pub mod config;
pub mod display;
pub mod error;
pub mod host;
pub mod observer;
pub mod orchestrator;
pub mod registry;
pub mod router;
pub mod surface;
pub mod testing;
pub mod watcher;

pub use beamer_protocol as protocol;
pub use config::{CONFIG_STORAGE_KEY, Config};
pub use display::DisplaySelector;
pub use error::{Error, HostError, Result};
pub use host::{
	Bounds, DisplayDescriptor, DisplayHost, PageHost, SlotStore, SurfaceHandle, SurfaceHost, SurfaceId, SurfaceKind,
	SurfacePage, SurfaceSpec, UnitId,
};
pub use observer::SourceObserver;
pub use orchestrator::{EnsureOutcome, Orchestrator, SurfaceState};
pub use registry::SurfaceRegistry;
pub use router::{Handler, PendingRequest, Responder, Router};
pub use surface::PresentationSurface;
pub use watcher::LifecycleWatcher;
