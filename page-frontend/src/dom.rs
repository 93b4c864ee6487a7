use js_sys::{Object, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Window};

use crate::error::FrontendError;
use crate::initializer::PresenceProbe;

pub fn window() -> Result<Window, FrontendError> {
    web_sys::window().ok_or(FrontendError::MissingGlobal("window"))
}

pub fn document() -> Result<Document, FrontendError> {
    window()?
        .document()
        .ok_or(FrontendError::MissingGlobal("document"))
}

/// All elements matching `selector`; an invalid selector matches nothing.
pub fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn query_html(document: &Document, selector: &str) -> Result<Option<HtmlElement>, FrontendError> {
    match document.query_selector(selector)? {
        Some(el) => el
            .dyn_into::<HtmlElement>()
            .map(Some)
            .map_err(|_| FrontendError::WrongElement {
                selector: selector.to_string(),
                expected: "HTMLElement",
            }),
        None => Ok(None),
    }
}

/// Writes text into the element with `id`; absent targets are ignored.
pub fn set_text_by_id(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

/// String global set by the host page, e.g. `window.PORTFOLIO_CONFIG`.
pub fn read_global(key: &str) -> Option<String> {
    Reflect::get(&js_sys::global(), &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_string())
}

/// Serde value to a plain JS object.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, FrontendError> {
    let json = serde_json::to_string(value)?;
    Ok(js_sys::JSON::parse(&json)?)
}

/// Plain JS object from key/value pairs.
pub fn js_object(entries: &[(&str, JsValue)]) -> Result<Object, FrontendError> {
    let obj = Object::new();
    for (key, value) in entries {
        Reflect::set(&obj, &JsValue::from_str(key), value)?;
    }
    Ok(obj)
}

pub fn viewport_height(window: &Window) -> f64 {
    window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

pub fn viewport_width(window: &Window) -> f64 {
    window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

/// Presence checks against the live document.
pub struct DocumentProbe {
    document: Document,
}

impl DocumentProbe {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl PresenceProbe for DocumentProbe {
    fn is_present(&self, selector: &str) -> bool {
        matches!(self.document.query_selector(selector), Ok(Some(_)))
    }
}
