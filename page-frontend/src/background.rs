use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use site_config::ParticleSettings;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

use crate::dom::{viewport_height, viewport_width};
use crate::error::FrontendError;
use crate::frame_loop::FrameSlot;
use crate::listener::EventListener;
use crate::particles::ParticleField;

struct BackgroundInner {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    field: ParticleField,
    node_color: String,
    link_color: String,
    destroyed: bool,
}

impl BackgroundInner {
    fn resize(&mut self, width: f64, height: f64) {
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        self.field.resize(width, height);
    }

    fn frame(&mut self) {
        let (w, h) = self.field.size();
        self.field.step();

        let ctx = &self.ctx;
        ctx.clear_rect(0.0, 0.0, w, h);

        ctx.set_fill_style_str(&self.node_color);
        for p in self.field.particles() {
            ctx.begin_path();
            let _ = ctx.arc(p.x, p.y, p.size / 2.0, 0.0, TAU);
            ctx.fill();
        }

        ctx.set_stroke_style_str(&self.link_color);
        ctx.set_line_width(1.0);
        for (x1, y1, x2, y2) in self.field.links() {
            ctx.begin_path();
            ctx.move_to(x1, y1);
            ctx.line_to(x2, y2);
            ctx.stroke();
        }
    }
}

/// Full-window particle network drawn into a canvas inside `container_id`.
pub struct Background {
    inner: Rc<RefCell<BackgroundInner>>,
    _resize: EventListener,
}

impl Background {
    pub fn start(
        window: &Window,
        document: &Document,
        container_id: &str,
        settings: &ParticleSettings,
    ) -> Result<Self, FrontendError> {
        let container = document
            .get_element_by_id(container_id)
            .ok_or(FrontendError::MissingGlobal("background container"))?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| FrontendError::WrongElement {
                selector: "canvas".into(),
                expected: "HTMLCanvasElement",
            })?;
        container.append_child(&canvas)?;

        let ctx = canvas
            .get_context("2d")?
            .ok_or(FrontendError::MissingGlobal("2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| FrontendError::MissingGlobal("2d context"))?;

        let (w, h) = (viewport_width(window), viewport_height(window));
        let mut rng = StdRng::seed_from_u64(js_sys::Date::now() as u64);
        let field = ParticleField::new(settings, w, h, &mut rng);

        let inner = Rc::new(RefCell::new(BackgroundInner {
            canvas,
            ctx,
            field,
            node_color: settings.node_color(),
            link_color: settings.link_color(),
            destroyed: false,
        }));
        inner.borrow_mut().resize(w, h);

        let resize = {
            let inner = inner.clone();
            let win = window.clone();
            EventListener::new(window, "resize", move |_| {
                inner
                    .borrow_mut()
                    .resize(viewport_width(&win), viewport_height(&win));
            })?
        };

        start_render_loop(window.clone(), inner.clone());
        Ok(Self {
            inner,
            _resize: resize,
        })
    }
}

impl Drop for Background {
    fn drop(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.destroyed = true;
        inner.canvas.remove();
    }
}

fn start_render_loop(window: Window, inner_rc: Rc<RefCell<BackgroundInner>>) {
    let slot: FrameSlot<Closure<dyn FnMut(f64)>> = FrameSlot::new();
    let own = slot.clone();
    let win = window.clone();

    slot.set(Closure::wrap(Box::new(move |_timestamp: f64| {
        {
            let mut inner = inner_rc.borrow_mut();
            if inner.destroyed {
                drop(inner);
                own.release();
                return;
            }
            inner.frame();
        }
        own.with(|cb| win.request_animation_frame(cb.as_ref().unchecked_ref()));
    }) as Box<dyn FnMut(f64)>));

    slot.with(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()));
}
