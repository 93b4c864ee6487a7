use site_config::ConfigError;
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};

#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("no global `{0}`")]
    MissingGlobal(&'static str),
    #[error("element `{selector}` is not a {expected}")]
    WrongElement {
        selector: String,
        expected: &'static str,
    },
    #[error("no chart configured for `{0}`")]
    UnknownChart(String),
    #[error("javascript: {0}")]
    Js(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(target_arch = "wasm32")]
impl From<JsValue> for FrontendError {
    fn from(value: JsValue) -> Self {
        let text = value
            .as_string()
            .or_else(|| {
                value
                    .dyn_ref::<js_sys::Error>()
                    .and_then(|e| e.message().as_string())
            })
            .or_else(|| {
                js_sys::JSON::stringify(&value)
                    .ok()
                    .and_then(|s| s.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));
        FrontendError::Js(text)
    }
}

#[cfg(target_arch = "wasm32")]
impl From<FrontendError> for JsValue {
    fn from(err: FrontendError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
