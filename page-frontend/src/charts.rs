use std::rc::Rc;

use site_config::{radar_option, ChartTheme, RadarChartConfig};
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, Window};

use crate::dom::to_js;
use crate::error::FrontendError;
use crate::listener::EventListener;

#[wasm_bindgen]
extern "C" {
    pub type EChartsInstance;

    #[wasm_bindgen(js_namespace = echarts, js_name = init, catch)]
    fn echarts_init(dom: &HtmlElement) -> Result<EChartsInstance, JsValue>;

    #[wasm_bindgen(method, js_name = setOption, catch)]
    fn set_option(this: &EChartsInstance, option: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn resize(this: &EChartsInstance);

    #[wasm_bindgen(method)]
    fn dispose(this: &EChartsInstance);
}

/// A mounted radar chart; disposing happens on drop.
pub struct RadarChart {
    container_id: String,
    instance: Rc<EChartsInstance>,
    _resize: EventListener,
}

impl RadarChart {
    pub fn mount(
        window: &Window,
        document: &Document,
        chart: &RadarChartConfig,
        theme: &ChartTheme,
    ) -> Result<Self, FrontendError> {
        chart.validate()?;
        let selector = format!("#{}", chart.container_id);
        let container = crate::dom::query_html(document, &selector)?
            .ok_or(FrontendError::UnknownChart(chart.container_id.clone()))?;

        let instance = Rc::new(echarts_init(&container)?);
        instance.set_option(&to_js(&radar_option(chart, theme))?)?;

        let resize = {
            let instance = instance.clone();
            EventListener::new(window, "resize", move |_| instance.resize())?
        };

        log::debug!("radar chart `{}` mounted", chart.container_id);
        Ok(Self {
            container_id: chart.container_id.clone(),
            instance,
            _resize: resize,
        })
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn resize(&self) {
        self.instance.resize();
    }
}

impl Drop for RadarChart {
    fn drop(&mut self) {
        self.instance.dispose();
    }
}
