//! `tracing` output for extension contexts.
//!
//! Each formatted event is buffered and handed to the devtools console method
//! matching its level when the writer drops. The level threshold can be
//! changed after init, so the background worker can apply `logLevel` once its
//! config has loaded.

use std::cell::Cell;
use std::io;

use tracing::level_filters::LevelFilter;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;
use web_sys::console;

thread_local! {
    static MAX_LEVEL: Cell<LevelFilter> = const { Cell::new(LevelFilter::INFO) };
}

pub fn init(level: &str) {
    set_level(level);
    let _ = tracing_subscriber::fmt()
        .without_time()
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .compact()
        .with_max_level(Level::TRACE)
        .with_writer(Console)
        .try_init();
}

/// Sets the console threshold from a level name; unknown names keep the current one.
pub fn set_level(level: &str) {
    match level.parse::<LevelFilter>() {
        Ok(filter) => MAX_LEVEL.with(|max| max.set(filter)),
        Err(_) => console::warn_1(&JsValue::from_str(&format!("unknown log level {level:?}"))),
    }
}

fn enabled(level: Level) -> bool {
    MAX_LEVEL.with(|max| level <= max.get())
}

struct Console;

struct ConsoleLine {
    level: Level,
    enabled: bool,
    buf: Vec<u8>,
}

impl ConsoleLine {
    fn new(level: Level) -> Self {
        Self {
            level,
            enabled: enabled(level),
            buf: Vec::new(),
        }
    }
}

impl io::Write for ConsoleLine {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        if self.enabled {
            self.buf.extend_from_slice(bytes);
        }
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf);
        let line = JsValue::from_str(text.trim_end());
        if self.level == Level::ERROR {
            console::error_1(&line);
        } else if self.level == Level::WARN {
            console::warn_1(&line);
        } else if self.level == Level::INFO {
            console::log_1(&line);
        } else {
            console::debug_1(&line);
        }
    }
}

impl<'a> MakeWriter<'a> for Console {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleLine::new(*meta.level())
    }
}
