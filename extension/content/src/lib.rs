//! Content script injected into the video page.

use std::rc::Rc;

use async_trait::async_trait;
use beamer::{Config, HostError, PageHost, Router, SourceObserver};
use beamer_ext_common::{call, logging, stringify_js_error};
use js_sys::Promise;
use tracing::info;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Window};

#[wasm_bindgen]
extern "C" {
    // web-sys binds the pre-promise signature; the promise carries the rejection reason.
    #[wasm_bindgen(extends = Element)]
    type FullscreenElement;

    #[wasm_bindgen(method, catch, js_name = requestFullscreen)]
    fn request_fullscreen_promise(this: &FullscreenElement) -> Result<Promise, JsValue>;
}

/// The page this script runs in.
struct DomPage {
    window: Window,
}

impl DomPage {
    fn document(&self) -> Result<Document, HostError> {
        self.window
            .document()
            .ok_or_else(|| HostError::new("window.document", "no document"))
    }
}

#[async_trait(?Send)]
impl PageHost for DomPage {
    fn location(&self) -> Result<String, HostError> {
        self.window
            .location()
            .href()
            .map_err(|err| HostError::new("location.href", stringify_js_error(&err)))
    }

    fn is_fullscreen(&self) -> bool {
        self.document()
            .ok()
            .and_then(|doc| doc.fullscreen_element())
            .is_some()
    }

    async fn request_fullscreen(&self) -> Result<(), HostError> {
        let root = self
            .document()?
            .document_element()
            .ok_or_else(|| HostError::new("requestFullscreen", "document has no root element"))?;
        call("requestFullscreen", root.unchecked_ref::<FullscreenElement>().request_fullscreen_promise())
            .await
            .map(drop)
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logging::init(&Config::default().log_level);

    let window = web_sys::window().ok_or("no window")?;
    let router = Rc::new(Router::new(SourceObserver::new(DomPage { window })));

    beamer_ext_common::listen::<SourceObserver<DomPage>, _>(move |pending| {
        let router = Rc::clone(&router);
        spawn_local(async move { router.dispatch(pending).await });
    });

    info!(target = "beamer.observer", "content script injected");
    Ok(())
}
