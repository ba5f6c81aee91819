//! `chrome.runtime.onMessage` wiring for a [`Router`].

use beamer::protocol::Response;
use beamer::{Handler, PendingRequest, Router};
use js_sys::Function;
use serde_json::Value;
use tracing::warn;
use wasm_bindgen::prelude::*;

use crate::js::{from_js, stringify_js_error, to_js};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn runtime_on_message_add_listener(cb: &Closure<dyn FnMut(JsValue, JsValue, Function) -> JsValue>);
}

/// Registers a message listener answering the actions `H` accepts.
///
/// Accepted requests go to `dispatch`, which usually spawns the handler. The
/// listener returns `true` only when a reply will follow, so senders of
/// foreign or fire-and-forget actions are not left waiting.
pub fn listen<H, D>(dispatch: D)
where
    H: Handler + 'static,
    D: Fn(PendingRequest) + 'static,
{
    let listener = Closure::<dyn FnMut(JsValue, JsValue, Function) -> JsValue>::new(
        move |message: JsValue, _sender: JsValue, send_response: Function| {
            let raw: Value = match from_js(message) {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(target = "beamer.runtime", error = %err, "ignoring non-JSON message");
                    return JsValue::FALSE;
                }
            };

            let reply = move |response: Response| {
                let value = match to_js(&response) {
                    Ok(value) => value,
                    Err(err) => {
                        warn!(target = "beamer.runtime", error = %err, "failed to encode response");
                        return;
                    }
                };
                if let Err(err) = send_response.call1(&JsValue::NULL, &value) {
                    warn!(target = "beamer.runtime", error = %stringify_js_error(&err), "sendResponse failed");
                }
            };

            match Router::<H>::accept(&raw, reply) {
                Some(pending) => {
                    let keep_open = pending.keeps_channel_open();
                    dispatch(pending);
                    JsValue::from_bool(keep_open)
                }
                None => JsValue::FALSE,
            }
        },
    );
    runtime_on_message_add_listener(&listener);
    listener.forget();
}
