use js_sys::Array;
use site_config::RevealOptions;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlImageElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit,
};

use crate::dom::query_all;
use crate::error::FrontendError;

pub const REVEAL_SELECTOR: &str = ".scroll-reveal";
pub const LAZY_IMAGE_SELECTOR: &str = "img[data-src]";

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// Intersection observer over a fixed element set; disconnects on drop.
pub struct Observer {
    observer: IntersectionObserver,
    _callback: ObserverCallback,
}

impl Observer {
    fn watch(
        document: &Document,
        selector: &str,
        init: Option<&IntersectionObserverInit>,
        mut on_visible: impl FnMut(&Element, &IntersectionObserver) + 'static,
    ) -> Result<Self, FrontendError> {
        let callback: ObserverCallback = Closure::wrap(Box::new(
            move |entries: Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    if entry.is_intersecting() {
                        on_visible(&entry.target(), &observer);
                    }
                }
            },
        ));
        let observer = match init {
            Some(init) => {
                IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), init)?
            }
            None => IntersectionObserver::new(callback.as_ref().unchecked_ref())?,
        };
        for el in query_all(document, selector) {
            observer.observe(&el);
        }
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Adds the revealed class to `.scroll-reveal` elements as they scroll into view.
pub fn scroll_reveal(document: &Document, options: &RevealOptions) -> Result<Observer, FrontendError> {
    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(options.threshold));
    init.set_root_margin(&options.root_margin);
    let class = options.revealed_class.clone();
    Observer::watch(document, REVEAL_SELECTOR, Some(&init), move |el, _| {
        let _ = el.class_list().add_1(&class);
    })
}

/// Swaps `data-src` into `src` once an image becomes visible, then stops watching it.
pub fn lazy_images(document: &Document) -> Result<Observer, FrontendError> {
    Observer::watch(document, LAZY_IMAGE_SELECTOR, None, |el, observer| {
        let Some(img) = el.dyn_ref::<HtmlImageElement>() else {
            return;
        };
        if let Some(src) = img.get_attribute("data-src") {
            img.set_src(&src);
        }
        let _ = img.class_list().remove_1("lazy");
        observer.unobserve(img);
    })
}
