/// Count-up animation for elements whose text starts with an integer, e.g. `15+`.
///
/// Yields one text per frame and finishes on the element's original text.
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    original: String,
    suffix: String,
    target: f64,
    step: f64,
    current: f64,
    finished: bool,
}

/// Leading integer with `parseInt` rules: optional whitespace, optional sign, digits.
pub fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}

impl CounterAnimation {
    pub fn new(text: &str, frames: u32) -> Option<Self> {
        let target = leading_integer(text)? as f64;
        Some(Self {
            original: text.to_string(),
            suffix: text.chars().filter(|c| !c.is_ascii_digit()).collect(),
            target,
            step: target / frames.max(1) as f64,
            current: 0.0,
            finished: false,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }
}

impl Iterator for CounterAnimation {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.finished {
            return None;
        }
        if self.current < self.target {
            self.current += self.step;
            let shown = self.current.ceil().min(self.target) as i64;
            return Some(format!("{shown}{}", self.suffix));
        }
        self.finished = true;
        Some(self.original.clone())
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{Counters, COUNTER_SELECTOR};

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use gloo_timers::callback::Timeout;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{Document, DocumentReadyState, Element, Window};

    use super::CounterAnimation;
    use crate::dom::query_all;
    use crate::error::FrontendError;
    use crate::frame_loop::FrameSlot;
    use crate::listener::EventListener;

    pub const COUNTER_SELECTOR: &str = ".gradient-text";

    /// Starts the counters a fixed delay after window `load`.
    pub struct Counters {
        _load: Option<EventListener>,
        pending: Rc<RefCell<Option<Timeout>>>,
        stopped: Rc<Cell<bool>>,
    }

    impl Counters {
        pub fn start(
            window: &Window,
            document: &Document,
            delay_ms: u32,
            frames: u32,
        ) -> Result<Self, FrontendError> {
            let pending = Rc::new(RefCell::new(None));
            let stopped = Rc::new(Cell::new(false));

            let schedule = {
                let window = window.clone();
                let document = document.clone();
                let pending = pending.clone();
                let stopped = stopped.clone();
                move || {
                    let window = window.clone();
                    let document = document.clone();
                    let stopped = stopped.clone();
                    let timeout = Timeout::new(delay_ms, move || {
                        for el in query_all(&document, COUNTER_SELECTOR) {
                            animate(&window, el, frames, stopped.clone());
                        }
                    });
                    *pending.borrow_mut() = Some(timeout);
                }
            };

            let load = if document.ready_state() == DocumentReadyState::Complete {
                schedule();
                None
            } else {
                Some(EventListener::new(window, "load", move |_| schedule())?)
            };

            Ok(Self {
                _load: load,
                pending,
                stopped,
            })
        }
    }

    impl Drop for Counters {
        fn drop(&mut self) {
            self.stopped.set(true);
            self.pending.borrow_mut().take();
        }
    }

    fn animate(window: &Window, el: Element, frames: u32, stopped: Rc<Cell<bool>>) {
        let text = el.text_content().unwrap_or_default();
        let Some(mut frames) = CounterAnimation::new(&text, frames) else {
            return;
        };

        let slot: FrameSlot<Closure<dyn FnMut(f64)>> = FrameSlot::new();
        let own = slot.clone();
        let win = window.clone();
        slot.set(Closure::wrap(Box::new(move |_ts: f64| {
            if stopped.get() {
                el.set_text_content(Some(frames.original()));
                own.release();
                return;
            }
            match frames.next() {
                Some(frame) => el.set_text_content(Some(&frame)),
                None => {
                    own.release();
                    return;
                }
            }
            own.with(|cb| win.request_animation_frame(cb.as_ref().unchecked_ref()));
        }) as Box<dyn FnMut(f64)>));

        slot.with(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()));
    }
}
