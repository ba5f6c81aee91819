//! Script of the presentation page opened inside the surface window.

use std::rc::Rc;

use async_trait::async_trait;
use beamer::surface::{PLAYER_CONTAINER, PLAYER_FRAME};
use beamer::{Config, HostError, PresentationSurface, Router, SurfacePage};
use beamer_ext_common::{call, logging, stringify_js_error};
use js_sys::Promise;
use tracing::{debug, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Window};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(extends = Element)]
    type FullscreenElement;

    #[wasm_bindgen(method, catch, js_name = requestFullscreen)]
    fn request_fullscreen_promise(this: &FullscreenElement) -> Result<Promise, JsValue>;
}

type Presenter = PresentationSurface<DomSurface>;

/// Root attribute marking a page whose presentation script already started.
const STARTED_MARKER: &str = "data-beamer-presenter";

struct DomSurface {
    window: Window,
    document: Document,
}

impl DomSurface {
    fn element(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }
}

#[async_trait(?Send)]
impl SurfacePage for DomSurface {
    fn claim(&self) -> bool {
        let Some(root) = self.document.document_element() else {
            return true;
        };
        if root.has_attribute(STARTED_MARKER) {
            return false;
        }
        let _ = root.set_attribute(STARTED_MARKER, "");
        true
    }

    fn query(&self) -> Result<String, HostError> {
        self.window
            .location()
            .search()
            .map_err(|err| HostError::new("location.search", stringify_js_error(&err)))
    }

    fn set_player_source(&self, url: &str) -> bool {
        self.element(PLAYER_FRAME)
            .is_some_and(|frame| frame.set_attribute("src", url).is_ok())
    }

    fn alert(&self, message: &str) {
        let _ = self.window.alert_with_message(message);
    }

    fn is_fullscreen(&self) -> bool {
        self.document.fullscreen_element().is_some()
    }

    async fn request_player_fullscreen(&self) -> Result<(), HostError> {
        let container = self
            .element(PLAYER_CONTAINER)
            .ok_or_else(|| HostError::new("requestFullscreen", format!("{PLAYER_CONTAINER} not found")))?;
        call("requestFullscreen", container.unchecked_ref::<FullscreenElement>().request_fullscreen_promise())
            .await
            .map(drop)
    }
}

fn load(router: &Router<Presenter>) {
    // Failures were already logged and alerted.
    if let Ok(content) = router.handler().load() {
        debug!(target = "beamer.surface", %content, "presentation ready");
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let config = Config::default();
    logging::init(&config.log_level);

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let page = DomSurface {
        window,
        document: document.clone(),
    };
    let router = Rc::new(Router::new(PresentationSurface::new(page, config.content_param)));
    if !router.handler().claim_page() {
        return Ok(());
    }

    {
        let router = Rc::clone(&router);
        beamer_ext_common::listen::<Presenter, _>(move |pending| {
            let router = Rc::clone(&router);
            spawn_local(async move { router.dispatch(pending).await });
        });
    }

    if document.ready_state() == "loading" {
        let on_ready = Closure::once(move || load(&router));
        document.add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())?;
        on_ready.forget();
    } else {
        load(&router);
    }

    info!(target = "beamer.surface", "presentation page started");
    Ok(())
}
