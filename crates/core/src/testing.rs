//! In-memory hosts for exercising the orchestrator without a browser.
//!
//! Every double is a cheap `Rc` handle: clone it into the component under test
//! and keep the original to script failures and inspect state.
//!
//! - [`FakeHost`]: displays, windows and tabs, with [`FailPoint`] injection
//! - [`MemorySlots`]: key-value storage with read/write failure switches
//! - [`FakePage`]: a source page for [`SourceObserver`](crate::SourceObserver)
//! - [`FakeSurfacePage`]: the presentation document for [`PresentationSurface`](crate::PresentationSurface)

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use async_trait::async_trait;
use beamer_protocol::Request;
use serde_json::Value;

use crate::error::HostError;
use crate::host::{
	Bounds, DisplayDescriptor, DisplayHost, PageHost, SlotStore, SurfaceHandle, SurfaceHost, SurfaceId, SurfaceKind,
	SurfacePage, SurfaceSpec, UnitId,
};

/// Host call that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
	Displays,
	Create,
	Maximize,
	Remove,
	QueryTabs,
	Navigate,
	Inject,
	Send,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeTab {
	pub id: UnitId,
	pub url: String,
	pub injected: Vec<String>,
	pub messages: Vec<Request>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeWindow {
	pub id: SurfaceId,
	pub kind: SurfaceKind,
	pub bounds: Bounds,
	pub focused: bool,
	pub maximized: bool,
	pub tabs: Vec<FakeTab>,
}

#[derive(Debug, Default)]
struct HostState {
	displays: Vec<DisplayDescriptor>,
	windows: BTreeMap<SurfaceId, FakeWindow>,
	next_id: i32,
	failing: HashSet<FailPoint>,
	unit_reply: Option<Value>,
	created: usize,
}

/// Browser double tracking windows and their tabs.
#[derive(Debug, Clone, Default)]
pub struct FakeHost {
	state: Rc<RefCell<HostState>>,
}

impl FakeHost {
	/// A host with no displays.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_displays(displays: Vec<DisplayDescriptor>) -> Self {
		let host = Self::new();
		host.set_displays(displays);
		host
	}

	pub fn set_displays(&self, displays: Vec<DisplayDescriptor>) {
		self.state.borrow_mut().displays = displays;
	}

	pub fn fail_display_query(&self) {
		self.fail(FailPoint::Displays);
	}

	pub fn fail(&self, point: FailPoint) {
		self.state.borrow_mut().failing.insert(point);
	}

	pub fn recover(&self, point: FailPoint) {
		self.state.borrow_mut().failing.remove(&point);
	}

	/// Reply returned by the page for [`SurfaceHost::send_to_unit`].
	pub fn set_unit_reply(&self, reply: Value) {
		self.state.borrow_mut().unit_reply = Some(reply);
	}

	/// Closes a window behind the orchestrator's back, as the user would.
	pub fn destroy_externally(&self, id: SurfaceId) -> bool {
		self.state.borrow_mut().windows.remove(&id).is_some()
	}

	/// Empties a window of its tabs.
	pub fn strip_tabs(&self, id: SurfaceId) {
		if let Some(window) = self.state.borrow_mut().windows.get_mut(&id) {
			window.tabs.clear();
		}
	}

	pub fn window(&self, id: SurfaceId) -> Option<FakeWindow> {
		self.state.borrow().windows.get(&id).cloned()
	}

	pub fn live_surfaces(&self) -> usize {
		self.state.borrow().windows.len()
	}

	/// Number of successful `create_surface` calls so far.
	pub fn created(&self) -> usize {
		self.state.borrow().created
	}

	fn check(&self, point: FailPoint, operation: &'static str) -> Result<(), HostError> {
		if self.state.borrow().failing.contains(&point) {
			return Err(HostError::new(operation, "injected failure"));
		}
		Ok(())
	}

	fn with_tab<T>(&self, unit: UnitId, f: impl FnOnce(&mut FakeTab) -> T) -> Result<T, HostError> {
		let mut state = self.state.borrow_mut();
		state
			.windows
			.values_mut()
			.flat_map(|window| window.tabs.iter_mut())
			.find(|tab| tab.id == unit)
			.map(f)
			.ok_or_else(|| HostError::new("tabs", format!("No tab with id: {unit}.")))
	}
}

fn no_window(id: SurfaceId) -> HostError {
	HostError::new("windows.get", format!("No window with id: {id}."))
}

#[async_trait(?Send)]
impl DisplayHost for FakeHost {
	async fn displays(&self) -> Result<Vec<DisplayDescriptor>, HostError> {
		self.check(FailPoint::Displays, "system.display.getInfo")?;
		Ok(self.state.borrow().displays.clone())
	}
}

#[async_trait(?Send)]
impl SurfaceHost for FakeHost {
	async fn surface(&self, id: SurfaceId) -> Result<SurfaceHandle, HostError> {
		let state = self.state.borrow();
		let window = state.windows.get(&id).ok_or_else(|| no_window(id))?;
		Ok(SurfaceHandle {
			id,
			bounds: Some(window.bounds),
		})
	}

	async fn create_surface(&self, spec: &SurfaceSpec) -> Result<SurfaceHandle, HostError> {
		self.check(FailPoint::Create, "windows.create")?;
		let mut state = self.state.borrow_mut();
		state.next_id += 1;
		let id = SurfaceId(state.next_id);
		let tab = FakeTab {
			id: UnitId(id.0 * 100 + 1),
			url: spec.url.clone(),
			injected: Vec::new(),
			messages: Vec::new(),
		};
		state.windows.insert(
			id,
			FakeWindow {
				id,
				kind: spec.kind,
				bounds: spec.bounds,
				focused: spec.focused,
				maximized: false,
				tabs: vec![tab],
			},
		);
		state.created += 1;
		Ok(SurfaceHandle {
			id,
			bounds: Some(spec.bounds),
		})
	}

	async fn maximize_surface(&self, id: SurfaceId) -> Result<(), HostError> {
		self.check(FailPoint::Maximize, "windows.update")?;
		let mut state = self.state.borrow_mut();
		let window = state.windows.get_mut(&id).ok_or_else(|| no_window(id))?;
		window.maximized = true;
		Ok(())
	}

	async fn remove_surface(&self, id: SurfaceId) -> Result<(), HostError> {
		self.check(FailPoint::Remove, "windows.remove")?;
		self.state
			.borrow_mut()
			.windows
			.remove(&id)
			.map(|_| ())
			.ok_or_else(|| no_window(id))
	}

	async fn primary_unit(&self, id: SurfaceId) -> Result<Option<UnitId>, HostError> {
		self.check(FailPoint::QueryTabs, "tabs.query")?;
		let state = self.state.borrow();
		Ok(state
			.windows
			.get(&id)
			.and_then(|window| window.tabs.first())
			.map(|tab| tab.id))
	}

	async fn navigate_unit(&self, unit: UnitId, url: &str) -> Result<(), HostError> {
		self.check(FailPoint::Navigate, "tabs.update")?;
		self.with_tab(unit, |tab| tab.url = url.to_string())
	}

	async fn inject_script(&self, unit: UnitId, file: &str) -> Result<(), HostError> {
		self.check(FailPoint::Inject, "scripting.executeScript")?;
		self.with_tab(unit, |tab| tab.injected.push(file.to_string()))
	}

	async fn send_to_unit(&self, unit: UnitId, request: &Request) -> Result<Value, HostError> {
		self.check(FailPoint::Send, "tabs.sendMessage")?;
		self.with_tab(unit, |tab| tab.messages.push(request.clone()))?;
		Ok(self.state.borrow().unit_reply.clone().unwrap_or(Value::Null))
	}
}

#[derive(Debug, Default)]
struct SlotState {
	values: HashMap<String, Value>,
	fail_reads: bool,
	fail_writes: bool,
}

/// Key-value storage double.
#[derive(Debug, Clone, Default)]
pub struct MemorySlots {
	state: Rc<RefCell<SlotState>>,
}

impl MemorySlots {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<Value> {
		self.state.borrow().values.get(key).cloned()
	}

	/// Seeds a raw value, bypassing the failure switches.
	pub fn insert(&self, key: &str, value: Value) {
		self.state.borrow_mut().values.insert(key.to_string(), value);
	}

	pub fn fail_reads(&self, fail: bool) {
		self.state.borrow_mut().fail_reads = fail;
	}

	/// Fails both writes and removals.
	pub fn fail_writes(&self, fail: bool) {
		self.state.borrow_mut().fail_writes = fail;
	}
}

#[async_trait(?Send)]
impl SlotStore for MemorySlots {
	async fn read(&self, key: &str) -> Result<Option<Value>, HostError> {
		let state = self.state.borrow();
		if state.fail_reads {
			return Err(HostError::new("storage.local.get", "injected failure"));
		}
		Ok(state.values.get(key).cloned())
	}

	async fn write(&self, key: &str, value: Value) -> Result<(), HostError> {
		let mut state = self.state.borrow_mut();
		if state.fail_writes {
			return Err(HostError::new("storage.local.set", "injected failure"));
		}
		state.values.insert(key.to_string(), value);
		Ok(())
	}

	async fn remove(&self, key: &str) -> Result<(), HostError> {
		let mut state = self.state.borrow_mut();
		if state.fail_writes {
			return Err(HostError::new("storage.local.remove", "injected failure"));
		}
		state.values.remove(key);
		Ok(())
	}
}

#[derive(Debug, Default)]
struct PageState {
	location: String,
	fullscreen: bool,
	fullscreen_requests: usize,
	reject: Option<String>,
}

/// Video page double.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
	state: Rc<RefCell<PageState>>,
}

impl FakePage {
	pub fn new(location: &str) -> Self {
		let page = Self::default();
		page.set_location(location);
		page
	}

	pub fn set_location(&self, location: &str) {
		self.state.borrow_mut().location = location.to_string();
	}

	/// Makes fullscreen requests fail with `message`.
	pub fn reject_fullscreen(&self, message: &str) {
		self.state.borrow_mut().reject = Some(message.to_string());
	}

	pub fn fullscreen_requests(&self) -> usize {
		self.state.borrow().fullscreen_requests
	}
}

#[async_trait(?Send)]
impl PageHost for FakePage {
	fn location(&self) -> Result<String, HostError> {
		Ok(self.state.borrow().location.clone())
	}

	fn is_fullscreen(&self) -> bool {
		self.state.borrow().fullscreen
	}

	async fn request_fullscreen(&self) -> Result<(), HostError> {
		let mut state = self.state.borrow_mut();
		state.fullscreen_requests += 1;
		if let Some(message) = &state.reject {
			return Err(HostError::new("requestFullscreen", message.clone()));
		}
		state.fullscreen = true;
		Ok(())
	}
}

#[derive(Debug)]
struct SurfacePageState {
	query: String,
	has_player: bool,
	player_source: Option<String>,
	source_changes: usize,
	alerts: Vec<String>,
	fullscreen: bool,
	claimed: bool,
}

/// Presentation document double.
#[derive(Debug, Clone)]
pub struct FakeSurfacePage {
	state: Rc<RefCell<SurfacePageState>>,
}

impl FakeSurfacePage {
	pub fn new(query: &str) -> Self {
		Self {
			state: Rc::new(RefCell::new(SurfacePageState {
				query: query.to_string(),
				has_player: true,
				player_source: None,
				source_changes: 0,
				alerts: Vec::new(),
				fullscreen: false,
				claimed: false,
			})),
		}
	}

	/// Removes the player frame and its container from the document.
	pub fn remove_player(&self) {
		self.state.borrow_mut().has_player = false;
	}

	pub fn player_source(&self) -> Option<String> {
		self.state.borrow().player_source.clone()
	}

	/// Number of times the player frame was pointed somewhere.
	pub fn source_changes(&self) -> usize {
		self.state.borrow().source_changes
	}

	pub fn alerts(&self) -> Vec<String> {
		self.state.borrow().alerts.clone()
	}
}

#[async_trait(?Send)]
impl SurfacePage for FakeSurfacePage {
	fn claim(&self) -> bool {
		!std::mem::replace(&mut self.state.borrow_mut().claimed, true)
	}

	fn query(&self) -> Result<String, HostError> {
		Ok(self.state.borrow().query.clone())
	}

	fn set_player_source(&self, url: &str) -> bool {
		let mut state = self.state.borrow_mut();
		if !state.has_player {
			return false;
		}
		state.player_source = Some(url.to_string());
		state.source_changes += 1;
		true
	}

	fn alert(&self, message: &str) {
		self.state.borrow_mut().alerts.push(message.to_string());
	}

	fn is_fullscreen(&self) -> bool {
		self.state.borrow().fullscreen
	}

	async fn request_player_fullscreen(&self) -> Result<(), HostError> {
		let mut state = self.state.borrow_mut();
		if !state.has_player {
			return Err(HostError::new("requestFullscreen", "#player-container not found"));
		}
		state.fullscreen = true;
		Ok(())
	}
}
