use std::sync::Mutex;

use serde_json::Value;

/// Access to the page globals vendor snippets install (`window.ga`, `window.dataLayer`, ...).
pub trait WindowBridge: Send + Sync {
    /// Calls `window[name](...args)` when it is a function.
    fn call_global(&self, name: &str, args: Vec<Value>);

    /// Pushes onto the array `window[name]`, creating it when missing.
    fn push_global(&self, name: &str, value: Value);

    /// Assigns `window[name] = value`.
    fn set_global(&self, name: &str, value: Value);
}

#[derive(Clone, Debug, PartialEq)]
pub enum WindowCommand {
    Call { global: String, args: Vec<Value> },
    Push { global: String, value: Value },
    Set { global: String, value: Value },
}

/// Records commands instead of executing them, for hosts that forward them elsewhere.
#[derive(Debug, Default)]
pub struct BufferedWindow {
    commands: Mutex<Vec<WindowCommand>>,
}

impl BufferedWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<WindowCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Returns and forgets every recorded command.
    pub fn drain(&self) -> Vec<WindowCommand> {
        std::mem::take(&mut *self.commands.lock().unwrap())
    }

    fn record(&self, command: WindowCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

impl WindowBridge for BufferedWindow {
    fn call_global(&self, name: &str, args: Vec<Value>) {
        self.record(WindowCommand::Call {
            global: name.to_string(),
            args,
        });
    }

    fn push_global(&self, name: &str, value: Value) {
        self.record(WindowCommand::Push {
            global: name.to_string(),
            value,
        });
    }

    fn set_global(&self, name: &str, value: Value) {
        self.record(WindowCommand::Set {
            global: name.to_string(),
            value,
        });
    }
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub use wasm::BrowserWindow;

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
mod wasm {
    use serde_json::Value;
    use wasm_bindgen::{JsCast, JsValue};

    use super::WindowBridge;

    /// Executes commands against the real `window` object.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct BrowserWindow;

    fn to_js(value: &Value) -> JsValue {
        serde_json::to_string(value)
            .ok()
            .and_then(|text| js_sys::JSON::parse(&text).ok())
            .unwrap_or(JsValue::NULL)
    }

    fn global(name: &str) -> Option<(web_sys::Window, JsValue)> {
        let window = web_sys::window()?;
        let value = js_sys::Reflect::get(&window, &JsValue::from_str(name)).ok()?;
        Some((window, value))
    }

    impl WindowBridge for BrowserWindow {
        fn call_global(&self, name: &str, args: Vec<Value>) {
            let Some((_, value)) = global(name) else {
                return;
            };
            let Ok(function) = value.dyn_into::<js_sys::Function>() else {
                log::debug!("window.{name} is not a function; dropping call");
                return;
            };
            let arguments = js_sys::Array::new();
            for arg in &args {
                arguments.push(&to_js(arg));
            }
            if let Err(err) = function.apply(&JsValue::NULL, &arguments) {
                log::debug!("window.{name}() failed: {err:?}");
            }
        }

        fn push_global(&self, name: &str, value: Value) {
            let Some((window, mut layer)) = global(name) else {
                return;
            };
            if layer.is_undefined() || layer.is_null() {
                layer = js_sys::Array::new().into();
                if js_sys::Reflect::set(&window, &JsValue::from_str(name), &layer).is_err() {
                    return;
                }
            }
            let push = js_sys::Reflect::get(&layer, &JsValue::from_str("push"))
                .ok()
                .and_then(|push| push.dyn_into::<js_sys::Function>().ok());
            match push {
                Some(push) => {
                    if let Err(err) = push.call1(&layer, &to_js(&value)) {
                        log::debug!("window.{name}.push failed: {err:?}");
                    }
                }
                None => log::debug!("window.{name} has no push method"),
            }
        }

        fn set_global(&self, name: &str, value: Value) {
            if let Some(window) = web_sys::window() {
                let _ = js_sys::Reflect::set(&window, &JsValue::from_str(name), &to_js(&value));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn buffered_window_records_in_order() {
        let window = BufferedWindow::new();
        window.call_global("ga", vec![json!("send"), json!({"hitType": "event"})]);
        window.push_global("dataLayer", json!({"event": "x"}));

        let commands = window.drain();
        assert_eq!(commands.len(), 2);
        assert_eq!(
            commands[1],
            WindowCommand::Push {
                global: "dataLayer".into(),
                value: json!({"event": "x"}),
            }
        );
        assert!(window.commands().is_empty());
    }
}
