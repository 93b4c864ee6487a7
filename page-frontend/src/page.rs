use std::cell::RefCell;
use std::rc::Rc;

use site_config::SiteConfig;
use wasm_bindgen::prelude::*;
use web_sys::{Document, DocumentReadyState, Window};

use crate::background::Background;
use crate::charts::RadarChart;
use crate::contact::{ContactForm, FORM_ID};
use crate::counters::{Counters, COUNTER_SELECTOR};
use crate::dom::{self, DocumentProbe};
use crate::effects::{HoverLift, NotificationKind, HOVER_SELECTOR};
use crate::error::FrontendError;
use crate::initializer::{Feature, FeatureRegistry, InitReport, PendingRun, Readiness};
use crate::listener::EventListener;
use crate::menu::MobileMenu;
use crate::reveal::{self, Observer, LAZY_IMAGE_SELECTOR, REVEAL_SELECTOR};
use crate::scroll::{SmoothScroll, ANCHOR_SELECTOR};
use crate::skill_bars::{SkillBars, SKILL_BAR_SELECTOR};
use crate::typewriter::{plan_stages, TypewriterRunner};
use crate::work_clock::WorkClock;

const BACKGROUND_ID: &str = "neural-bg";
const CONFIG_GLOBAL: &str = "PORTFOLIO_CONFIG";

type PageFeature = Feature<Page, FrontendError>;

/// Everything a mounted page owns. Dropping it stops timers, removes
/// listeners and disposes charts.
#[allow(dead_code)] // handles are held for their Drop
pub struct Page {
    window: Window,
    document: Document,
    config: SiteConfig,
    background: Option<Background>,
    typewriters: Vec<TypewriterRunner>,
    charts: Vec<RadarChart>,
    observers: Vec<Observer>,
    menu: Option<MobileMenu>,
    smooth_scroll: Option<SmoothScroll>,
    skill_bars: Option<SkillBars>,
    hover: Option<HoverLift>,
    counters: Option<Counters>,
    work_clock: Option<WorkClock>,
    contact: Option<ContactForm>,
    loaded: Option<EventListener>,
}

impl Page {
    fn new(window: Window, document: Document, config: SiteConfig) -> Self {
        Self {
            window,
            document,
            config,
            background: None,
            typewriters: Vec::new(),
            charts: Vec::new(),
            observers: Vec::new(),
            menu: None,
            smooth_scroll: None,
            skill_bars: None,
            hover: None,
            counters: None,
            work_clock: None,
            contact: None,
            loaded: None,
        }
    }

    fn stop(&mut self) {
        if let Some(clock) = self.work_clock.as_mut() {
            clock.stop();
        }
    }
}

/// Feature table for `config`: one entry per chart and typewriter sequence,
/// plus the fixed page behaviors.
pub fn features(config: &SiteConfig) -> FeatureRegistry<Page, FrontendError> {
    let mut registry: FeatureRegistry<Page, FrontendError> = FeatureRegistry::new();

    registry.register(PageFeature::new("background", format!("#{BACKGROUND_ID}"), |page: &mut Page| {
        page.background = Some(Background::start(
            &page.window,
            &page.document,
            BACKGROUND_ID,
            &page.config.particles,
        )?);
        Ok(())
    }));

    for (index, sequence) in config.typewriters.iter().enumerate() {
        let Some(lead) = sequence.lead_selector() else {
            continue;
        };
        registry.register(PageFeature::new(
            format!("typewriter:{}", sequence.name),
            lead,
            move |page: &mut Page| {
                let sequence = page
                    .config
                    .typewriters
                    .get(index)
                    .ok_or(FrontendError::MissingGlobal("typewriter sequence"))?;
                let stages = plan_stages(sequence, &DocumentProbe::new(page.document.clone()));
                page.typewriters
                    .push(TypewriterRunner::start(&page.document, stages)?);
                Ok(())
            },
        ));
    }

    for chart in &config.charts {
        let id = chart.container_id.clone();
        registry.register(PageFeature::new(
            format!("chart:{id}"),
            format!("#{id}"),
            move |page: &mut Page| {
                let chart = page
                    .config
                    .chart(&id)
                    .ok_or_else(|| FrontendError::UnknownChart(id.clone()))?;
                let handle = RadarChart::mount(
                    &page.window,
                    &page.document,
                    chart,
                    &page.config.chart_theme,
                )?;
                page.charts.push(handle);
                Ok(())
            },
        ));
    }

    registry
        .register(PageFeature::new("scroll-reveal", REVEAL_SELECTOR, |page: &mut Page| {
            let observer = reveal::scroll_reveal(&page.document, &page.config.reveal)?;
            page.observers.push(observer);
            Ok(())
        }))
        .register(PageFeature::new("mobile-menu", "#mobile-menu-btn", |page: &mut Page| {
            page.menu = Some(MobileMenu::attach(
                &page.document,
                page.config.nav_links.clone(),
            )?);
            Ok(())
        }))
        .register(PageFeature::new("smooth-scroll", ANCHOR_SELECTOR, |page: &mut Page| {
            page.smooth_scroll = Some(SmoothScroll::attach(
                &page.window,
                &page.document,
                page.config.timings.smooth_scroll_offset,
            )?);
            Ok(())
        }))
        .register(PageFeature::new("skill-bars", SKILL_BAR_SELECTOR, |page: &mut Page| {
            page.skill_bars = Some(SkillBars::attach(
                &page.window,
                &page.document,
                &page.config.timings,
            )?);
            Ok(())
        }))
        .register(PageFeature::new("hover-lift", HOVER_SELECTOR, |page: &mut Page| {
            page.hover = Some(HoverLift::attach(&page.document, &page.config.timings)?);
            Ok(())
        }))
        .register(PageFeature::new("lazy-images", LAZY_IMAGE_SELECTOR, |page: &mut Page| {
            let observer = reveal::lazy_images(&page.document)?;
            page.observers.push(observer);
            Ok(())
        }))
        .register(PageFeature::new("counters", COUNTER_SELECTOR, |page: &mut Page| {
            page.counters = Some(Counters::start(
                &page.window,
                &page.document,
                page.config.timings.counter_start_ms,
                page.config.timings.counter_frames,
            )?);
            Ok(())
        }))
        .register(PageFeature::new(
            "work-clock",
            "#work-time, #work-hours, #work-status",
            |page: &mut Page| {
                page.work_clock = Some(WorkClock::start(
                    &page.window,
                    &page.document,
                    page.config.schedule.clone(),
                    page.config.timings.work_clock_refresh_ms,
                )?);
                Ok(())
            },
        ))
        .register(PageFeature::new("contact-form", format!("#{FORM_ID}"), |page: &mut Page| {
            page.contact = Some(ContactForm::attach(
                &page.window,
                &page.document,
                page.config.contact.clone(),
            )?);
            Ok(())
        }));

    registry
}

/// Built-in configuration, or the host page's `window.PORTFOLIO_CONFIG` override when it parses.
pub fn load_config() -> SiteConfig {
    let Some(json) = dom::read_global(CONFIG_GLOBAL) else {
        return SiteConfig::default();
    };
    match SiteConfig::from_json(&json) {
        Ok(config) => {
            log::info!("using {CONFIG_GLOBAL} override");
            config
        }
        Err(err) => {
            log::warn!("ignoring {CONFIG_GLOBAL}: {err}");
            SiteConfig::default()
        }
    }
}

fn mark_loaded(window: &Window, document: &Document) -> Result<Option<EventListener>, FrontendError> {
    let add_class = {
        let document = document.clone();
        move || {
            if let Some(body) = document.body() {
                let _ = body.class_list().add_1("loaded");
            }
        }
    };
    if document.ready_state() == DocumentReadyState::Complete {
        add_class();
        return Ok(None);
    }
    Ok(Some(EventListener::new(window, "load", move |_| add_class())?))
}

fn readiness(document: &Document) -> Readiness {
    match document.ready_state() {
        DocumentReadyState::Loading => Readiness::Loading,
        DocumentReadyState::Interactive => Readiness::Interactive,
        _ => Readiness::Complete,
    }
}

struct Mounted {
    page: Option<Page>,
    report: InitReport,
    pending: PendingRun<Page, FrontendError>,
}

fn run_pending(state: &Rc<RefCell<Mounted>>, document: &Document) {
    let mut guard = state.borrow_mut();
    let Mounted {
        page,
        report,
        pending,
    } = &mut *guard;
    let Some(page) = page.as_mut() else {
        return;
    };
    let Some(done) = pending.fire(&DocumentProbe::new(document.clone()), page) else {
        return;
    };
    log::info!(
        "portfolio mounted: {} ran, {} skipped, {} failed",
        done.ran.len(),
        done.skipped.len(),
        done.failed.len()
    );
    *report = done;
}

/// Handle returned to the host page by [`mount`].
#[wasm_bindgen]
pub struct Portfolio {
    state: Rc<RefCell<Mounted>>,
    ready: Option<EventListener>,
}

#[wasm_bindgen]
impl Portfolio {
    /// `{ ran, skipped, failed }` from the feature run; empty until the DOM is ready.
    #[wasm_bindgen(js_name = reportJson)]
    pub fn report_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.borrow().report)
            .map_err(|e| JsValue::from(FrontendError::from(e)))
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.state.borrow().page.is_some()
    }

    /// False while the features are still waiting for `DOMContentLoaded`.
    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.state.borrow().pending.has_run()
    }

    /// Stops every timer, listener, animation and chart owned by the page.
    pub fn unmount(&mut self) {
        self.ready = None;
        let page = self.state.borrow_mut().page.take();
        if let Some(mut page) = page {
            page.stop();
            log::info!("portfolio unmounted");
        }
    }
}

/// Runs the page behavior layer against the current document. Called while
/// the document is still loading, the features wait for `DOMContentLoaded`.
#[wasm_bindgen]
pub fn mount() -> Result<Portfolio, JsValue> {
    console_error_panic_hook::set_once();
    // A second mount keeps the first logger.
    let _ = console_log::init_with_level(log::Level::Info);

    let window = dom::window()?;
    let document = dom::document()?;
    let config = load_config();
    let registry = features(&config);

    let mut page = Page::new(window.clone(), document.clone(), config);
    page.loaded = mark_loaded(&window, &document)?;

    let state = Rc::new(RefCell::new(Mounted {
        page: Some(page),
        report: InitReport::default(),
        pending: PendingRun::new(registry),
    }));

    let ready = if readiness(&document).dom_ready() {
        run_pending(&state, &document);
        None
    } else {
        log::debug!("document still loading, waiting for DOMContentLoaded");
        let state = state.clone();
        let doc = document.clone();
        Some(EventListener::new(&document, "DOMContentLoaded", move |_| {
            run_pending(&state, &doc)
        })?)
    };

    Ok(Portfolio { state, ready })
}

/// Toast notification; `kind` is `success`, `error` or `info`.
#[wasm_bindgen(js_name = showNotification)]
pub fn show_notification(message: &str, kind: Option<String>) -> Result<(), JsValue> {
    let kind = kind.as_deref().map(NotificationKind::parse).unwrap_or_default();
    let timings = load_config().timings;
    crate::effects::show_notification(&dom::document()?, message, kind, &timings)?;
    Ok(())
}
