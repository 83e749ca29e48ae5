//! # Browser integration
//!
//! Available with the `web` feature.
//!
//! - [`LocalStorage`]: a [`Storage`] over `window.localStorage`.
//! - [`init_logging`]: route `log` records to the browser console and
//!   report panics there.
//! - On wasm32 the scheduler arms a `setTimeout` for every scheduled
//!   callback, so debounced work runs without anyone calling
//!   [`run_due`](crate::schedule::run_due).
use wasm_bindgen::JsValue;

use crate::{error::StorageError, storage::Storage};

/// Send log records at or above `level` to the browser console and install
/// the console panic hook.
pub fn init_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(level).is_err() {
        log::debug!("a logger was already installed");
    }
}

/// [`Storage`] backed by `window.localStorage`.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn new() -> Result<Self, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("there is no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".into()))?;
        Ok(LocalStorage { storage })
    }
}

fn js_error(err: JsValue) -> StorageError {
    StorageError::Backend(format!("{err:?}"))
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(js_error)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let len = self.storage.length().map_err(js_error)?;
        let mut keys = Vec::with_capacity(len as usize);
        for index in 0..len {
            if let Some(key) = self.storage.key(index).map_err(js_error)? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

/// Call [`run_due`](crate::schedule::run_due) after `delay`.
#[cfg(target_arch = "wasm32")]
pub(crate) fn arm_timer(delay: std::time::Duration) {
    use wasm_bindgen::{JsCast, prelude::Closure};

    let Some(window) = web_sys::window() else {
        log::error!("there is no window to arm a timer on");
        return;
    };
    let callback = Closure::once_into_js(|| {
        crate::schedule::run_due();
    });
    let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    if let Err(err) = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
    {
        log::error!("could not arm a timer: {err:?}");
    }
}
