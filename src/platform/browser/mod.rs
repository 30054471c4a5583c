//! Small helpers shared by the browser bindings (camera, barcode detector, geolocation).

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
mod wasm {
    use js_sys::Reflect;
    use wasm_bindgen::{JsCast, JsValue};

    /// Renders a thrown JS value; `DOMException`s keep their `name` so callers can classify them.
    pub fn js_value_to_string(value: &JsValue) -> String {
        if let Some(exception) = value.dyn_ref::<web_sys::DomException>() {
            format!("{}: {}", exception.name(), exception.message())
        } else if let Some(text) = value.as_string() {
            text
        } else {
            format!("{:?}", value)
        }
    }

    pub fn dom_exception_name(value: &JsValue) -> Option<String> {
        value
            .dyn_ref::<web_sys::DomException>()
            .map(|exception| exception.name())
    }

    pub fn format_js_error(operation: &str, err: &JsValue) -> String {
        format!("{operation} failed: {}", js_value_to_string(err))
    }

    /// Reads `target[property]`, treating `undefined`/`null` and reflection failures as absent.
    pub fn property(target: &JsValue, property: &str) -> Option<JsValue> {
        Reflect::get(target, &JsValue::from_str(property))
            .ok()
            .filter(|value| !value.is_undefined() && !value.is_null())
    }
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub use wasm::{dom_exception_name, format_js_error, js_value_to_string, property};
