pub const HOVER_SELECTOR: &str = ".hover-lift";

const TOAST_BASE_CLASS: &str = "fixed top-4 right-4 z-50 p-4 rounded-lg text-white";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    Success,
    Error,
    #[default]
    Info,
}

impl NotificationKind {
    /// Unknown kinds fall back to info.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "success" => Self::Success,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }

    pub fn background_class(self) -> &'static str {
        match self {
            Self::Success => "bg-green-600",
            Self::Error => "bg-red-600",
            Self::Info => "bg-blue-600",
        }
    }

    pub fn toast_class(self) -> String {
        format!("{TOAST_BASE_CLASS} {}", self.background_class())
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{show_notification, HoverLift};

#[cfg(target_arch = "wasm32")]
mod browser {
    use gloo_timers::callback::Timeout;
    use js_sys::Array;
    use site_config::Timings;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element};

    use super::{NotificationKind, HOVER_SELECTOR};
    use crate::dom::{js_object, query_all};
    use crate::error::FrontendError;
    use crate::listener::EventListener;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_name = anime, catch)]
        fn anime(params: &JsValue) -> Result<JsValue, JsValue>;
    }

    fn tween(
        target: &Element,
        props: &[(&str, JsValue)],
        duration_ms: u32,
        easing: &str,
    ) -> Result<js_sys::Object, FrontendError> {
        let mut entries = vec![
            ("targets", JsValue::from(target.clone())),
            ("duration", JsValue::from(duration_ms)),
            ("easing", JsValue::from_str(easing)),
        ];
        entries.extend(props.iter().cloned());
        js_object(&entries)
    }

    fn scale_to(el: &Element, scale: f64, duration_ms: u32) {
        let params = tween(el, &[("scale", JsValue::from_f64(scale))], duration_ms, "easeOutQuad");
        if let Err(err) = params.map_err(JsValue::from).and_then(|p| anime(&p)) {
            log::warn!("hover animation: {:?}", err.as_string());
        }
    }

    /// Scales `.hover-lift` cards up while hovered.
    pub struct HoverLift {
        _listeners: Vec<EventListener>,
    }

    impl HoverLift {
        pub fn attach(document: &Document, timings: &Timings) -> Result<Self, FrontendError> {
            let mut listeners = Vec::new();
            let (scale, duration) = (timings.hover_scale, timings.hover_duration_ms);
            for card in query_all(document, HOVER_SELECTOR) {
                let el = card.clone();
                listeners.push(EventListener::new(&card, "mouseenter", move |_| {
                    scale_to(&el, scale, duration)
                })?);
                let el = card.clone();
                listeners.push(EventListener::new(&card, "mouseleave", move |_| {
                    scale_to(&el, 1.0, duration)
                })?);
            }
            Ok(Self {
                _listeners: listeners,
            })
        }
    }

    /// Slides a toast in from the right, then out and away after `timings.notification_ms`.
    pub fn show_notification(
        document: &Document,
        message: &str,
        kind: NotificationKind,
        timings: &Timings,
    ) -> Result<(), FrontendError> {
        let body = document
            .body()
            .ok_or(FrontendError::MissingGlobal("document.body"))?;
        let toast = document.create_element("div")?;
        toast.set_class_name(&kind.toast_class());
        toast.set_text_content(Some(message));
        body.append_child(&toast)?;

        let slide = timings.notification_slide_ms;
        let enter = tween(
            &toast,
            &[
                ("translateX", Array::of2(&JsValue::from_f64(300.0), &JsValue::from_f64(0.0)).into()),
                ("opacity", Array::of2(&JsValue::from_f64(0.0), &JsValue::from_f64(1.0)).into()),
            ],
            slide,
            "easeOutQuad",
        )?;
        anime(&enter)?;

        Timeout::new(timings.notification_ms, move || {
            let removed = toast.clone();
            let complete = Closure::once_into_js(move || removed.remove());
            let leave = tween(
                &toast,
                &[
                    ("translateX", JsValue::from_f64(300.0)),
                    ("opacity", JsValue::from_f64(0.0)),
                    ("complete", complete),
                ],
                slide,
                "easeInQuad",
            );
            match leave.map_err(JsValue::from).and_then(|p| anime(&p)) {
                Ok(_) => {}
                Err(_) => toast.remove(),
            }
        })
        .forget();
        Ok(())
    }
}
