pub const ANCHOR_SELECTOR: &str = r##"a[href^="#"]"##;

/// Selector for an in-page anchor's target. A bare `#` or anything with
/// whitespace has no usable target.
pub fn anchor_selector(href: &str) -> Option<&str> {
    let id = href.strip_prefix('#')?;
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        return None;
    }
    Some(href)
}

/// Scroll position that leaves `offset` pixels above the target for the fixed header.
pub fn scroll_top(target_offset_top: f64, offset: f64) -> f64 {
    (target_offset_top - offset).max(0.0)
}

#[cfg(target_arch = "wasm32")]
pub use browser::SmoothScroll;

#[cfg(target_arch = "wasm32")]
mod browser {
    use wasm_bindgen::JsCast;
    use web_sys::{Document, HtmlElement, ScrollBehavior, ScrollToOptions, Window};

    use super::{anchor_selector, scroll_top, ANCHOR_SELECTOR};
    use crate::dom::query_all;
    use crate::error::FrontendError;
    use crate::listener::EventListener;

    pub struct SmoothScroll {
        _clicks: Vec<EventListener>,
    }

    impl SmoothScroll {
        pub fn attach(window: &Window, document: &Document, offset: f64) -> Result<Self, FrontendError> {
            let mut clicks = Vec::new();
            for anchor in query_all(document, ANCHOR_SELECTOR) {
                let Some(href) = anchor.get_attribute("href") else {
                    continue;
                };
                let win = window.clone();
                let doc = document.clone();
                clicks.push(EventListener::new(&anchor, "click", move |event| {
                    event.prevent_default();
                    let Some(selector) = anchor_selector(&href) else {
                        return;
                    };
                    let Ok(Some(target)) = doc.query_selector(selector) else {
                        return;
                    };
                    let Some(target) = target.dyn_ref::<HtmlElement>() else {
                        return;
                    };
                    let options = ScrollToOptions::new();
                    options.set_top(scroll_top(f64::from(target.offset_top()), offset));
                    options.set_behavior(ScrollBehavior::Smooth);
                    win.scroll_to_with_scroll_to_options(&options);
                })?);
            }
            log::debug!("smooth scroll on {} anchors", clicks.len());
            Ok(Self { _clicks: clicks })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usable_anchors_resolve_to_their_href() {
        assert_eq!(anchor_selector("#skills"), Some("#skills"));
        assert_eq!(anchor_selector("#"), None);
        assert_eq!(anchor_selector("# bad"), None);
        assert_eq!(anchor_selector("contact.html"), None);
    }

    #[test]
    fn header_offset_is_subtracted_and_clamped() {
        assert_eq!(scroll_top(900.0, 100.0), 800.0);
        assert_eq!(scroll_top(40.0, 100.0), 0.0);
    }
}
