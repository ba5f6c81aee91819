//! Background service worker.
//!
//! Listeners are registered synchronously at start so events that woke the
//! worker are not missed; the orchestrator and its config are built on first use.

mod chrome;
mod host;

use std::cell::RefCell;
use std::rc::Rc;

use beamer::{
    Config, LifecycleWatcher, Orchestrator, Router, SlotStore, SurfaceId, SurfaceRegistry, CONFIG_STORAGE_KEY,
};
use beamer_ext_common::logging;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::host::{ChromeHost, ChromeStorage};

type Background = Orchestrator<ChromeHost, ChromeStorage>;

thread_local! {
    static WORKER: RefCell<Option<Rc<Worker>>> = const { RefCell::new(None) };
}

struct Worker {
    router: Router<Background>,
    watcher: LifecycleWatcher<ChromeStorage>,
}

impl Worker {
    async fn get() -> Rc<Self> {
        if let Some(worker) = WORKER.with(|w| w.borrow().clone()) {
            return worker;
        }

        let config = load_config(&ChromeStorage).await;
        logging::set_level(&config.log_level);
        let worker = Rc::new(Self {
            watcher: LifecycleWatcher::new(SurfaceRegistry::new(ChromeStorage, config.storage_key.clone())),
            router: Router::new(Orchestrator::new(ChromeHost, ChromeStorage, config)),
        });

        // Another event may have finished initializing while config was loading.
        WORKER.with(|w| Rc::clone(w.borrow_mut().get_or_insert(worker)))
    }
}

async fn load_config(store: &impl SlotStore) -> Config {
    match store.read(CONFIG_STORAGE_KEY).await {
        Ok(None) => Config::default(),
        Ok(Some(value)) => Config::from_value(value).unwrap_or_else(|err| {
            warn!(target = "beamer.background", error = %err, "invalid config override, using defaults");
            Config::default()
        }),
        Err(err) => {
            warn!(target = "beamer.background", error = %err, "failed to read config, using defaults");
            Config::default()
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logging::init(&Config::default().log_level);

    beamer_ext_common::listen::<Background, _>(|pending| {
        spawn_local(async move {
            let worker = Worker::get().await;
            worker.router.dispatch(pending).await;
        });
    });

    let on_removed = Closure::<dyn FnMut(JsValue)>::new(|window_id: JsValue| {
        let Some(id) = window_id.as_f64() else {
            return;
        };
        spawn_local(async move {
            let worker = Worker::get().await;
            worker.watcher.surface_removed(SurfaceId(id as i32)).await;
        });
    });
    chrome::windows_on_removed_add_listener(&on_removed);
    on_removed.forget();

    info!(target = "beamer.background", "listeners registered");
}
