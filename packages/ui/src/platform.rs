//! Thin wrappers over browser APIs. Native builds get inert stand-ins so the
//! components still render in tests and on the desktop renderer.

#[cfg(not(target_arch = "wasm32"))]
use std::cell::RefCell;
#[cfg(not(target_arch = "wasm32"))]
use std::collections::HashMap;

#[cfg(not(target_arch = "wasm32"))]
thread_local! {
    static STORAGE: RefCell<HashMap<String, String>> = RefCell::new(HashMap::new());
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

#[cfg(target_arch = "wasm32")]
pub fn storage_get(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_get(key: &str) -> Option<String> {
    STORAGE.with(|s| s.borrow().get(key).cloned())
}

#[cfg(target_arch = "wasm32")]
pub fn storage_set(key: &str, value: &str) {
    if let Some(ls) = local_storage() {
        if ls.set_item(key, value).is_err() {
            tracing::warn!(key, "localStorage write failed");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_set(key: &str, value: &str) {
    STORAGE.with(|s| {
        s.borrow_mut().insert(key.to_string(), value.to_string());
    });
}

#[cfg(target_arch = "wasm32")]
pub fn storage_remove(key: &str) {
    if let Some(ls) = local_storage() {
        let _ = ls.remove_item(key);
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_remove(key: &str) {
    STORAGE.with(|s| {
        s.borrow_mut().remove(key);
    });
}

/// Store `value` as JSON.
pub fn save_json<T: serde::Serialize>(key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => storage_set(key, &json),
        Err(e) => tracing::warn!(key, "could not serialize value: {}", e),
    }
}

/// Read a JSON value; malformed entries are dropped.
pub fn load_json<T: serde::de::DeserializeOwned>(key: &str) -> Option<T> {
    let raw = storage_get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, "discarding malformed stored value: {}", e);
            storage_remove(key);
            None
        }
    }
}

/// `navigator.onLine`; always true off the browser.
pub fn browser_online() -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .map(|w| w.navigator().on_line())
            .unwrap_or(true)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        true
    }
}

/// Page origin, e.g. `http://localhost:8080`.
pub fn origin() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        "http://localhost:8080".to_string()
    }
}

/// Current URL fragment without the leading `#`.
pub fn location_hash() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .map(|h| h.trim_start_matches('#').to_string())
            .unwrap_or_default()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        String::new()
    }
}

/// Leave the app for an external URL (the Google consent screen).
pub fn redirect(url: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(url) {
                tracing::error!("failed to redirect: {:?}", e);
            }
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        tracing::info!(url, "external redirect requested");
    }
}

/// Run `callback` whenever `window` fires `event`. The listener lives as long as the page.
#[cfg(target_arch = "wasm32")]
pub fn on_window_event(event: &str, callback: impl FnMut() + 'static) {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::<dyn FnMut()>::wrap(Box::new(callback));
    if window
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .is_err()
    {
        tracing::warn!(event, "could not register window listener");
        return;
    }
    closure.forget();
}

#[cfg(not(target_arch = "wasm32"))]
pub fn on_window_event(_event: &str, _callback: impl FnMut() + 'static) {}

/// Run a future outside any component, e.g. from a DOM listener.
pub fn spawn_detached(fut: impl std::future::Future<Output = ()> + 'static) {
    #[cfg(target_arch = "wasm32")]
    wasm_bindgen_futures::spawn_local(fut);
    #[cfg(not(target_arch = "wasm32"))]
    drop(fut);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_storage_roundtrip_and_cleanup() {
        save_json("test.key", &vec![1, 2, 3]);
        assert_eq!(load_json::<Vec<i32>>("test.key"), Some(vec![1, 2, 3]));

        storage_set("test.bad", "{not json");
        assert_eq!(load_json::<Vec<i32>>("test.bad"), None);
        assert_eq!(storage_get("test.bad"), None);
    }
}
