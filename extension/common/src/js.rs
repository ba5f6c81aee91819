use beamer::HostError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

/// Serializes into plain JS objects (never `Map`), as `chrome.*` APIs expect.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

pub fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, serde_wasm_bindgen::Error> {
    serde_wasm_bindgen::from_value(value)
}

pub fn stringify_js_error(err: &JsValue) -> String {
    if let Some(message) = js_sys::Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
    {
        return message;
    }
    err.as_string()
        .or_else(|| js_sys::JSON::stringify(err).ok()?.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

/// Awaits a promise-returning API call.
///
/// Synchronous throws and rejections both become a [`HostError`] tagged with `operation`.
pub async fn call(
    operation: &'static str,
    promise: Result<js_sys::Promise, JsValue>,
) -> Result<JsValue, HostError> {
    let promise = promise.map_err(|err| HostError::new(operation, stringify_js_error(&err)))?;
    JsFuture::from(promise)
        .await
        .map_err(|err| HostError::new(operation, stringify_js_error(&err)))
}

/// Decodes an API result, reporting shape mismatches against `operation`.
pub fn decode<T: DeserializeOwned>(operation: &'static str, value: JsValue) -> Result<T, HostError> {
    from_js(value).map_err(|err| HostError::new(operation, format!("unexpected result: {err}")))
}

pub fn encode<T: Serialize + ?Sized>(operation: &'static str, value: &T) -> Result<JsValue, HostError> {
    to_js(value).map_err(|err| HostError::new(operation, format!("unencodable argument: {err}")))
}
