use serde::Serialize;
use std::fmt::Display;

/// Answers "is there an element matching this selector on the page".
pub trait PresenceProbe {
    fn is_present(&self, selector: &str) -> bool;
}

pub type SetupFn<C, E> = Box<dyn Fn(&mut C) -> Result<(), E>>;

/// One optional page feature, gated on its selector.
pub struct Feature<C, E> {
    pub name: String,
    pub selector: String,
    setup: SetupFn<C, E>,
}

impl<C, E> Feature<C, E> {
    pub fn new(
        name: impl Into<String>,
        selector: impl Into<String>,
        setup: impl Fn(&mut C) -> Result<(), E> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            setup: Box::new(setup),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureFailure {
    pub name: String,
    pub error: String,
}

/// What happened to each registered feature during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub ran: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<FeatureFailure>,
}

/// Declarative feature table run once at page-ready.
pub struct FeatureRegistry<C, E> {
    features: Vec<Feature<C, E>>,
}

impl<C, E> Default for FeatureRegistry<C, E> {
    fn default() -> Self {
        Self {
            features: Vec::new(),
        }
    }
}

impl<C, E: Display> FeatureRegistry<C, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, feature: Feature<C, E>) -> &mut Self {
        self.features.push(feature);
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Runs every feature whose selector is present. A failing setup is recorded
    /// and logged; the remaining features still run.
    pub fn run<P: PresenceProbe + ?Sized>(&self, probe: &P, ctx: &mut C) -> InitReport {
        let mut report = InitReport::default();
        for feature in &self.features {
            if !probe.is_present(&feature.selector) {
                log::debug!("{}: `{}` not on page", feature.name, feature.selector);
                report.skipped.push(feature.name.clone());
                continue;
            }
            match (feature.setup)(ctx) {
                Ok(()) => report.ran.push(feature.name.clone()),
                Err(err) => {
                    log::error!("{} setup failed: {err}", feature.name);
                    report.failed.push(FeatureFailure {
                        name: feature.name.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
        report
    }
}

/// Document parse state, as `document.readyState` reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Loading,
    Interactive,
    Complete,
}

impl Readiness {
    /// Features query the DOM, so they may only run once parsing has finished.
    pub fn dom_ready(self) -> bool {
        !matches!(self, Readiness::Loading)
    }
}

/// A registry that runs exactly once, whenever the page turns out to be ready.
pub struct PendingRun<C, E> {
    registry: Option<FeatureRegistry<C, E>>,
}

impl<C, E: Display> PendingRun<C, E> {
    pub fn new(registry: FeatureRegistry<C, E>) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    pub fn has_run(&self) -> bool {
        self.registry.is_none()
    }

    /// Runs the registry on the first call; later calls return `None`.
    pub fn fire<P: PresenceProbe + ?Sized>(&mut self, probe: &P, ctx: &mut C) -> Option<InitReport> {
        let registry = self.registry.take()?;
        Some(registry.run(probe, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FakePage(HashSet<&'static str>);

    impl PresenceProbe for FakePage {
        fn is_present(&self, selector: &str) -> bool {
            self.0.contains(selector)
        }
    }

    #[derive(Default)]
    struct Ctx {
        calls: Vec<&'static str>,
    }

    fn registry() -> FeatureRegistry<Ctx, String> {
        let mut reg = FeatureRegistry::new();
        reg.register(Feature::new("background", "#neural-bg", |c: &mut Ctx| {
            c.calls.push("background");
            Ok(())
        }))
        .register(Feature::new("chart", "#skills-chart", |c: &mut Ctx| {
            c.calls.push("chart");
            Err("echarts is not loaded".to_string())
        }))
        .register(Feature::new("menu", "#mobile-menu-btn", |c: &mut Ctx| {
            c.calls.push("menu");
            Ok(())
        }));
        reg
    }

    #[test]
    fn absent_features_are_never_set_up() {
        let page = FakePage(["#mobile-menu-btn"].into_iter().collect());
        let mut ctx = Ctx::default();
        let report = registry().run(&page, &mut ctx);
        assert_eq!(ctx.calls, vec!["menu"]);
        assert_eq!(report.ran, vec!["menu"]);
        assert_eq!(report.skipped, vec!["background", "chart"]);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn failing_setup_does_not_stop_siblings() {
        let page = FakePage(
            ["#neural-bg", "#skills-chart", "#mobile-menu-btn"]
                .into_iter()
                .collect(),
        );
        let mut ctx = Ctx::default();
        let report = registry().run(&page, &mut ctx);
        assert_eq!(ctx.calls, vec!["background", "chart", "menu"]);
        assert_eq!(report.ran, vec!["background", "menu"]);
        assert_eq!(
            report.failed,
            vec![FeatureFailure {
                name: "chart".into(),
                error: "echarts is not loaded".into(),
            }]
        );
    }

    #[test]
    fn empty_page_skips_everything() {
        let reg = registry();
        let report = reg.run(&FakePage(HashSet::new()), &mut Ctx::default());
        assert_eq!(report.skipped.len(), reg.len());
        assert!(report.ran.is_empty());
    }

    #[test]
    fn report_serializes_for_hosts() {
        let report = InitReport {
            ran: vec!["menu".into()],
            skipped: Vec::new(),
            failed: vec![FeatureFailure {
                name: "chart".into(),
                error: "boom".into(),
            }],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"ran":["menu"],"skipped":[],"failed":[{"name":"chart","error":"boom"}]}"#
        );
    }

    #[test]
    fn only_a_parsed_document_is_ready() {
        assert!(!Readiness::Loading.dom_ready());
        assert!(Readiness::Interactive.dom_ready());
        assert!(Readiness::Complete.dom_ready());
    }

    #[test]
    fn deferred_run_happens_once() {
        let mut pending = PendingRun::new(registry());
        let page = FakePage(["#neural-bg", "#mobile-menu-btn"].into_iter().collect());
        let mut ctx = Ctx::default();
        assert!(!pending.has_run());

        let report = pending.fire(&page, &mut ctx).unwrap();
        assert_eq!(report.ran, vec!["background", "menu"]);
        assert!(pending.has_run());

        assert!(pending.fire(&page, &mut ctx).is_none());
        assert_eq!(ctx.calls, vec!["background", "menu"]);
    }
}
