use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use gloo_timers::callback::Interval;
use js_sys::Date;
use wasm_bindgen::JsValue;
use web_sys::{Document, Window};
use work_schedule::{describe, ClockFormat, ScheduleConfig};

use crate::dom::{js_object, set_text_by_id};
use crate::error::FrontendError;

pub const HOURS_TARGETS: [&str; 2] = ["work-time", "work-hours"];
pub const STATUS_TARGET: &str = "work-status";

/// Formats times in the viewer's locale with two-digit hour and minute.
pub struct BrowserClock {
    locale: String,
    options: JsValue,
}

impl BrowserClock {
    pub fn new(window: &Window) -> Result<Self, FrontendError> {
        let locale = window
            .navigator()
            .language()
            .unwrap_or_else(|| "en-US".to_string());
        let options = js_object(&[
            ("hour", JsValue::from_str("2-digit")),
            ("minute", JsValue::from_str("2-digit")),
        ])?;
        Ok(Self {
            locale,
            options: options.into(),
        })
    }
}

impl ClockFormat for BrowserClock {
    fn format_time(&self, at: NaiveDateTime) -> String {
        let date = Date::new_with_year_month_day_hr_min_sec(
            at.year() as u32,
            at.month0() as i32,
            at.day() as i32,
            at.hour() as i32,
            at.minute() as i32,
            0,
        );
        date.to_locale_time_string_with_options(&self.locale, &self.options)
            .into()
    }
}

/// Local wall-clock time from the browser.
pub fn local_now() -> Result<NaiveDateTime, FrontendError> {
    let now = Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .and_then(|d| d.and_hms_opt(now.get_hours(), now.get_minutes(), now.get_seconds()))
        .ok_or_else(|| FrontendError::Js("browser clock out of range".into()))
}

fn refresh(document: &Document, schedule: &ScheduleConfig, clock: &BrowserClock) -> Result<(), FrontendError> {
    let text = describe(schedule, local_now()?, clock);
    for id in HOURS_TARGETS {
        set_text_by_id(document, id, &text.hours);
    }
    set_text_by_id(document, STATUS_TARGET, &text.status);
    Ok(())
}

/// Keeps the work-hours and status lines current.
pub struct WorkClock {
    interval: Option<Interval>,
}

impl WorkClock {
    pub fn start(
        window: &Window,
        document: &Document,
        schedule: ScheduleConfig,
        refresh_ms: u32,
    ) -> Result<Self, FrontendError> {
        schedule.validate().map_err(site_config::ConfigError::from)?;
        let clock = BrowserClock::new(window)?;
        refresh(document, &schedule, &clock)?;

        let document = document.clone();
        let interval = Interval::new(refresh_ms, move || {
            if let Err(err) = refresh(&document, &schedule, &clock) {
                log::warn!("work clock refresh: {err}");
            }
        });
        Ok(Self {
            interval: Some(interval),
        })
    }

    pub fn stop(&mut self) {
        self.interval = None;
    }
}
