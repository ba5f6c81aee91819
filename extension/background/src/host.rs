//! Host traits over `chrome.*`.

use async_trait::async_trait;
use beamer::protocol::Request;
use beamer::{
    Bounds, DisplayDescriptor, DisplayHost, HostError, SlotStore, SurfaceHandle, SurfaceHost, SurfaceId, SurfaceKind,
    SurfaceSpec, UnitId,
};
use beamer_ext_common::{call, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use wasm_bindgen::JsValue;

use crate::chrome;

#[derive(Debug, Deserialize)]
struct WindowInfo {
    id: Option<i32>,
    left: Option<i32>,
    top: Option<i32>,
    width: Option<i32>,
    height: Option<i32>,
}

impl WindowInfo {
    fn into_handle(self, operation: &'static str) -> Result<SurfaceHandle, HostError> {
        let id = self
            .id
            .map(SurfaceId)
            .ok_or_else(|| HostError::new(operation, "window has no id"))?;
        let bounds = match (self.left, self.top, self.width, self.height) {
            (Some(left), Some(top), Some(width), Some(height)) => Some(Bounds::new(left, top, width, height)),
            _ => None,
        };
        Ok(SurfaceHandle { id, bounds })
    }
}

#[derive(Debug, Serialize)]
struct CreateData<'a> {
    url: &'a str,
    #[serde(rename = "type")]
    kind: SurfaceKind,
    left: i32,
    top: i32,
    width: i32,
    height: i32,
    focused: bool,
}

#[derive(Debug, Deserialize)]
struct TabInfo {
    id: Option<i32>,
}

/// Displays, windows and tabs of the running browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeHost;

#[async_trait(?Send)]
impl DisplayHost for ChromeHost {
    async fn displays(&self) -> Result<Vec<DisplayDescriptor>, HostError> {
        const OP: &str = "system.display.getInfo";
        decode(OP, call(OP, chrome::display_get_info()).await?)
    }
}

#[async_trait(?Send)]
impl SurfaceHost for ChromeHost {
    async fn surface(&self, id: SurfaceId) -> Result<SurfaceHandle, HostError> {
        const OP: &str = "windows.get";
        let info: WindowInfo = decode(OP, call(OP, chrome::windows_get(id.0)).await?)?;
        info.into_handle(OP)
    }

    async fn create_surface(&self, spec: &SurfaceSpec) -> Result<SurfaceHandle, HostError> {
        const OP: &str = "windows.create";
        let data = encode(
            OP,
            &CreateData {
                url: &spec.url,
                kind: spec.kind,
                left: spec.bounds.left,
                top: spec.bounds.top,
                width: spec.bounds.width,
                height: spec.bounds.height,
                focused: spec.focused,
            },
        )?;
        let info: WindowInfo = decode(OP, call(OP, chrome::windows_create(&data)).await?)?;
        info.into_handle(OP)
    }

    async fn maximize_surface(&self, id: SurfaceId) -> Result<(), HostError> {
        const OP: &str = "windows.update";
        let info = encode(OP, &json!({"state": "maximized"}))?;
        call(OP, chrome::windows_update(id.0, &info)).await.map(drop)
    }

    async fn remove_surface(&self, id: SurfaceId) -> Result<(), HostError> {
        call("windows.remove", chrome::windows_remove(id.0)).await.map(drop)
    }

    async fn primary_unit(&self, id: SurfaceId) -> Result<Option<UnitId>, HostError> {
        const OP: &str = "tabs.query";
        let query = encode(OP, &json!({"windowId": id.0}))?;
        let tabs: Vec<TabInfo> = decode(OP, call(OP, chrome::tabs_query(&query)).await?)?;
        Ok(tabs.first().and_then(|tab| tab.id).map(UnitId))
    }

    async fn navigate_unit(&self, unit: UnitId, url: &str) -> Result<(), HostError> {
        const OP: &str = "tabs.update";
        let props = encode(OP, &json!({"url": url}))?;
        call(OP, chrome::tabs_update(unit.0, &props)).await.map(drop)
    }

    async fn inject_script(&self, unit: UnitId, file: &str) -> Result<(), HostError> {
        const OP: &str = "scripting.executeScript";
        let injection = encode(OP, &json!({"target": {"tabId": unit.0}, "files": [file]}))?;
        call(OP, chrome::scripting_execute_script(&injection)).await.map(drop)
    }

    async fn send_to_unit(&self, unit: UnitId, request: &Request) -> Result<Value, HostError> {
        const OP: &str = "tabs.sendMessage";
        let message = encode(OP, &request.to_value())?;
        decode(OP, call(OP, chrome::tabs_send_message(unit.0, &message)).await?)
    }
}

/// `chrome.storage.local`, which outlives service worker restarts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStorage;

#[async_trait(?Send)]
impl SlotStore for ChromeStorage {
    async fn read(&self, key: &str) -> Result<Option<Value>, HostError> {
        const OP: &str = "storage.local.get";
        let items = call(OP, chrome::storage_local_get(&JsValue::from_str(key))).await?;
        let value = js_sys::Reflect::get(&items, &JsValue::from_str(key))
            .map_err(|_| HostError::new(OP, "result is not an object"))?;
        if value.is_undefined() {
            return Ok(None);
        }
        decode(OP, value).map(Some)
    }

    async fn write(&self, key: &str, value: Value) -> Result<(), HostError> {
        const OP: &str = "storage.local.set";
        let mut items = serde_json::Map::new();
        items.insert(key.to_string(), value);
        let items = encode(OP, &items)?;
        call(OP, chrome::storage_local_set(&items)).await.map(drop)
    }

    async fn remove(&self, key: &str) -> Result<(), HostError> {
        call("storage.local.remove", chrome::storage_local_remove(&JsValue::from_str(key)))
            .await
            .map(drop)
    }
}
