//! Glue shared by the extension's wasm entry points.

pub mod js;
pub mod logging;
pub mod runtime;

pub use js::{call, decode, encode, from_js, stringify_js_error, to_js};
pub use runtime::listen;
