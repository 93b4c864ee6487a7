use site_config::{TypewriterSequence, TypewriterStage};

use crate::initializer::PresenceProbe;

/// Stages that will actually play: absent targets are dropped, and nothing
/// after a looping stage is kept because a loop never reports completion.
pub fn plan_stages<P: PresenceProbe + ?Sized>(
    sequence: &TypewriterSequence,
    probe: &P,
) -> Vec<TypewriterStage> {
    let mut plan = Vec::new();
    for stage in &sequence.stages {
        if !probe.is_present(&stage.selector) {
            log::debug!("{}: skipping stage `{}`", sequence.name, stage.selector);
            continue;
        }
        plan.push(stage.clone());
        if stage.options.looped {
            break;
        }
    }
    plan
}

#[cfg(target_arch = "wasm32")]
pub use browser::TypewriterRunner;

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::cell::RefCell;
    use std::rc::Rc;

    use gloo_timers::callback::Timeout;
    use js_sys::Reflect;
    use site_config::TypewriterStage;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::prelude::*;
    use web_sys::Document;

    use crate::dom::to_js;
    use crate::error::FrontendError;

    #[wasm_bindgen]
    extern "C" {
        /// Typewriter library instance.
        pub type Typed;

        #[wasm_bindgen(constructor, catch)]
        fn new(selector: &str, options: &JsValue) -> Result<Typed, JsValue>;

        #[wasm_bindgen(method)]
        fn destroy(this: &Typed);
    }

    #[derive(Default)]
    struct RunnerState {
        instances: Vec<Typed>,
        pending: Option<Timeout>,
        stopped: bool,
    }

    /// Plays stages one after another; stage n+1 starts from stage n's completion.
    pub struct TypewriterRunner {
        state: Rc<RefCell<RunnerState>>,
    }

    impl TypewriterRunner {
        pub fn start(document: &Document, stages: Vec<TypewriterStage>) -> Result<Self, FrontendError> {
            for stage in &stages {
                if let Ok(Some(el)) = document.query_selector(&stage.selector) {
                    el.set_inner_html("");
                }
            }
            let state = Rc::new(RefCell::new(RunnerState::default()));
            start_stage(state.clone(), Rc::new(stages), 0)?;
            Ok(Self { state })
        }
    }

    impl Drop for TypewriterRunner {
        fn drop(&mut self) {
            let mut state = self.state.borrow_mut();
            state.stopped = true;
            state.pending.take();
            for typed in state.instances.drain(..) {
                typed.destroy();
            }
        }
    }

    fn start_stage(
        state: Rc<RefCell<RunnerState>>,
        stages: Rc<Vec<TypewriterStage>>,
        index: usize,
    ) -> Result<(), FrontendError> {
        let Some(stage) = stages.get(index) else {
            return Ok(());
        };
        let options = to_js(&stage.options)?;

        if let Some(next) = stages.get(index + 1) {
            let delay = next.start_delay_ms;
            let state_for_next = state.clone();
            let stages_for_next = stages.clone();
            let on_complete = Closure::once_into_js(move || {
                if state_for_next.borrow().stopped {
                    return;
                }
                let state = state_for_next.clone();
                let timeout = Timeout::new(delay, move || {
                    if let Err(err) = start_stage(state, stages_for_next, index + 1) {
                        log::error!("typewriter stage {} failed: {err}", index + 1);
                    }
                });
                state_for_next.borrow_mut().pending = Some(timeout);
            });
            Reflect::set(&options, &JsValue::from_str("onComplete"), &on_complete)?;
        }

        let typed = Typed::new(&stage.selector, &options)?;
        let mut st = state.borrow_mut();
        if st.stopped {
            typed.destroy();
        } else {
            st.instances.push(typed);
        }
        Ok(())
    }
}
