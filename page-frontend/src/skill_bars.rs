pub const SKILL_BAR_SELECTOR: &str = "[data-width]";

/// True when any part of the box `[top, bottom)` overlaps a viewport of `height`.
pub fn in_viewport(top: f64, bottom: f64, height: f64) -> bool {
    top < height && bottom > 0.0
}

/// One pending timer per bar. Scheduling again replaces (and so cancels)
/// that bar's previous timer, so the set never outgrows the bar count.
#[derive(Debug)]
pub struct PendingSlots<T> {
    slots: Vec<Option<T>>,
}

impl<T> PendingSlots<T> {
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| None).collect(),
        }
    }

    /// Stores `value` for bar `index` and hands back whatever it displaced.
    pub fn replace(&mut self, index: usize, value: T) -> Option<T> {
        self.slots.get_mut(index).and_then(|slot| slot.replace(value))
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    pub fn active(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::SkillBars;

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::cell::RefCell;
    use std::rc::Rc;

    use gloo_timers::callback::Timeout;
    use site_config::Timings;
    use wasm_bindgen::JsCast;
    use web_sys::{Document, HtmlElement, Window};

    use super::{in_viewport, PendingSlots, SKILL_BAR_SELECTOR};
    use crate::dom::{query_all, viewport_height};
    use crate::error::FrontendError;
    use crate::listener::EventListener;

    struct BarState {
        bars: Vec<HtmlElement>,
        pending: PendingSlots<Timeout>,
    }

    /// Animates `data-width` bars on scroll until the handle is dropped.
    pub struct SkillBars {
        state: Rc<RefCell<BarState>>,
        _scroll: EventListener,
        _initial: Timeout,
    }

    impl SkillBars {
        pub fn attach(window: &Window, document: &Document, timings: &Timings) -> Result<Self, FrontendError> {
            let bars: Vec<HtmlElement> = query_all(document, SKILL_BAR_SELECTOR)
                .into_iter()
                .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
                .collect();
            let pending = PendingSlots::new(bars.len());
            let state = Rc::new(RefCell::new(BarState { bars, pending }));

            let delay = timings.skill_bar_delay_ms;
            let transition = timings.skill_bar_transition.clone();

            let scroll = {
                let state = state.clone();
                let win = window.clone();
                let transition = transition.clone();
                EventListener::new(window, "scroll", move |_| {
                    animate(&state, &win, delay, &transition);
                })?
            };
            let initial = {
                let state = state.clone();
                let win = window.clone();
                Timeout::new(timings.skill_bar_initial_ms, move || {
                    animate(&state, &win, delay, &transition);
                })
            };

            Ok(Self {
                state,
                _scroll: scroll,
                _initial: initial,
            })
        }
    }

    impl Drop for SkillBars {
        fn drop(&mut self) {
            self.state.borrow_mut().pending.clear();
        }
    }

    fn animate(state: &Rc<RefCell<BarState>>, window: &Window, delay: u32, transition: &str) {
        let height = viewport_height(window);
        let mut guard = state.borrow_mut();
        let BarState { bars, pending } = &mut *guard;
        for (index, bar) in bars.iter().enumerate() {
            let Some(target) = bar.get_attribute("data-width") else {
                continue;
            };
            let rect = bar.get_bounding_client_rect();
            if !in_viewport(rect.top(), rect.bottom(), height) {
                continue;
            }
            let style = bar.style();
            let _ = style.set_property("width", "0%");
            let transition = transition.to_string();
            // The displaced timer is cancelled on drop; this one still grows the bar.
            pending.replace(
                index,
                Timeout::new(delay, move || {
                    let _ = style.set_property("transition", &transition);
                    let _ = style.set_property("width", &target);
                }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partially_visible_bars_count() {
        assert!(in_viewport(-10.0, 5.0, 800.0));
        assert!(in_viewport(790.0, 820.0, 800.0));
    }

    #[test]
    fn bars_outside_the_viewport_do_not() {
        assert!(!in_viewport(800.0, 820.0, 800.0));
        assert!(!in_viewport(-30.0, 0.0, 800.0));
    }

    #[test]
    fn rescheduling_a_bar_displaces_its_previous_timer() {
        let mut pending = PendingSlots::new(2);
        assert_eq!(pending.replace(0, "first"), None);
        for _ in 0..600 {
            pending.replace(0, "scroll");
        }
        assert_eq!(pending.replace(0, "last"), Some("scroll"));
        assert_eq!(pending.active(), 1);
    }

    #[test]
    fn clearing_drops_every_pending_timer() {
        use std::rc::Rc;

        let timer = Rc::new(());
        let mut pending = PendingSlots::new(3);
        pending.replace(0, timer.clone());
        pending.replace(2, timer.clone());
        assert_eq!(Rc::strong_count(&timer), 3);
        pending.clear();
        assert_eq!(pending.active(), 0);
        assert_eq!(Rc::strong_count(&timer), 1);
    }

    #[test]
    fn out_of_range_bar_is_ignored() {
        let mut pending = PendingSlots::new(1);
        assert_eq!(pending.replace(5, 1), None);
        assert_eq!(pending.active(), 0);
    }
}
