use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use thiserror::Error;
use work_schedule::{ScheduleConfig, ScheduleError};

pub const MAX_SKILL_VALUE: u8 = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("chart `{chart}` has no indicators")]
    EmptyChart { chart: String },
    #[error("chart `{chart}` has {indicators} indicators but {values} values")]
    LengthMismatch {
        chart: String,
        indicators: usize,
        values: usize,
    },
    #[error("chart `{chart}` axis `{label}` has max {max}, above 100")]
    MaxTooLarge { chart: String, label: String, max: u8 },
    #[error("chart `{chart}` axis `{label}` value {value} exceeds max {max}")]
    ValueOutOfRange {
        chart: String,
        label: String,
        value: u8,
        max: u8,
    },
    #[error("chart container `{0}` is configured twice")]
    DuplicateChart(String),
    #[error("typewriter sequence `{0}` has no stages")]
    EmptySequence(String),
    #[error("typewriter stage `{0}` has no strings")]
    EmptyStrings(String),
    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// One radar axis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Indicator {
    pub name: String,
    pub max: u8,
}

impl Indicator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max: MAX_SKILL_VALUE,
        }
    }
}

/// A radar chart bound to a container id. `values` align with `indicators`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RadarChartConfig {
    pub container_id: String,
    pub series_name: String,
    pub data_name: String,
    pub indicators: Vec<Indicator>,
    pub values: Vec<u8>,
}

impl RadarChartConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chart = || self.container_id.clone();
        if self.indicators.is_empty() {
            return Err(ConfigError::EmptyChart { chart: chart() });
        }
        if self.indicators.len() != self.values.len() {
            return Err(ConfigError::LengthMismatch {
                chart: chart(),
                indicators: self.indicators.len(),
                values: self.values.len(),
            });
        }
        for (ind, &value) in self.indicators.iter().zip(&self.values) {
            if ind.max > MAX_SKILL_VALUE {
                return Err(ConfigError::MaxTooLarge {
                    chart: chart(),
                    label: ind.name.clone(),
                    max: ind.max,
                });
            }
            if value > ind.max {
                return Err(ConfigError::ValueOutOfRange {
                    chart: chart(),
                    label: ind.name.clone(),
                    value,
                    max: ind.max,
                });
            }
        }
        Ok(())
    }

    /// Axis labels in render order.
    pub fn labels(&self) -> Vec<&str> {
        self.indicators.iter().map(|i| i.name.as_str()).collect()
    }
}

/// Styling shared by every radar chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartTheme {
    pub axis_color: String,
    pub axis_font_size: u32,
    pub split_number: u32,
    pub split_line_color: String,
    pub axis_line_color: String,
    pub area_color: String,
    pub line_color: String,
    pub line_width: u32,
    pub item_color: String,
    pub animation_duration_ms: u32,
    pub animation_easing: String,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            axis_color: "#00D4AA".into(),
            axis_font_size: 12,
            split_number: 4,
            split_line_color: "rgba(0, 212, 170, 0.2)".into(),
            axis_line_color: "rgba(0, 212, 170, 0.3)".into(),
            area_color: "rgba(0, 212, 170, 0.2)".into(),
            line_color: "#00D4AA".into(),
            line_width: 2,
            item_color: "#FFB800".into(),
            animation_duration_ms: 2000,
            animation_easing: "cubicOut".into(),
        }
    }
}

/// Option object handed to the charting library's `setOption`.
pub fn radar_option(chart: &RadarChartConfig, theme: &ChartTheme) -> Value {
    let indicators: Vec<Value> = chart
        .indicators
        .iter()
        .map(|i| json!({ "name": i.name, "max": i.max }))
        .collect();
    json!({
        "backgroundColor": "transparent",
        "radar": {
            "indicator": indicators,
            "shape": "polygon",
            "splitNumber": theme.split_number,
            "axisName": { "color": theme.axis_color, "fontSize": theme.axis_font_size },
            "splitLine": { "lineStyle": { "color": theme.split_line_color } },
            "splitArea": { "show": false },
            "axisLine": { "lineStyle": { "color": theme.axis_line_color } },
        },
        "series": [{
            "name": chart.series_name,
            "type": "radar",
            "data": [{
                "value": chart.values,
                "name": chart.data_name,
                "areaStyle": { "color": theme.area_color },
                "lineStyle": { "color": theme.line_color, "width": theme.line_width },
                "itemStyle": { "color": theme.item_color },
            }],
            "animationDuration": theme.animation_duration_ms,
            "animationEasing": theme.animation_easing,
        }],
    })
}

/// Options understood by the typewriter library, in its own key casing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypedOptions {
    pub strings: Vec<String>,
    pub type_speed: u32,
    pub back_speed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_delay: Option<u32>,
    #[serde(rename = "loop")]
    pub looped: bool,
    pub show_cursor: bool,
    pub cursor_char: String,
}

/// One typewriter animation. `start_delay_ms` counts from the previous stage's completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypewriterStage {
    pub selector: String,
    pub options: TypedOptions,
    #[serde(default)]
    pub start_delay_ms: u32,
}

/// Stages played back to back; a looping stage never completes, so it ends the chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypewriterSequence {
    pub name: String,
    pub stages: Vec<TypewriterStage>,
}

impl TypewriterSequence {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stages.is_empty() {
            return Err(ConfigError::EmptySequence(self.name.clone()));
        }
        for stage in &self.stages {
            if stage.options.strings.is_empty() {
                return Err(ConfigError::EmptyStrings(stage.selector.clone()));
            }
        }
        Ok(())
    }

    /// Selector whose presence gates the whole sequence.
    pub fn lead_selector(&self) -> Option<&str> {
        self.stages.first().map(|s| s.selector.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub primary: bool,
}

impl NavLink {
    fn new(label: &str, href: &str) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            primary: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RevealOptions {
    pub threshold: f64,
    pub root_margin: String,
    pub revealed_class: String,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".into(),
            revealed_class: "revealed".into(),
        }
    }
}

/// Particle-network background.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticleSettings {
    pub count: usize,
    /// Per-axis speed bound in px/frame; velocities fall in `[-max_speed, max_speed)`.
    pub max_speed: f64,
    pub min_size: f64,
    pub max_size: f64,
    pub link_distance: f64,
    pub rgb: [u8; 3],
    pub node_alpha: u8,
    pub link_alpha: u8,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            count: 50,
            max_speed: 0.5,
            min_size: 2.0,
            max_size: 6.0,
            link_distance: 100.0,
            rgb: [0, 212, 170],
            node_alpha: 150,
            link_alpha: 50,
        }
    }
}

impl ParticleSettings {
    pub fn node_color(&self) -> String {
        rgba(self.rgb, self.node_alpha)
    }

    pub fn link_color(&self) -> String {
        rgba(self.rgb, self.link_alpha)
    }
}

fn rgba(rgb: [u8; 3], alpha: u8) -> String {
    format!(
        "rgba({}, {}, {}, {:.3})",
        rgb[0],
        rgb[1],
        rgb[2],
        alpha as f64 / 255.0
    )
}

/// Timing and motion constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Timings {
    pub work_clock_refresh_ms: u32,
    pub skill_bar_delay_ms: u32,
    pub skill_bar_initial_ms: u32,
    pub skill_bar_transition: String,
    pub counter_start_ms: u32,
    pub counter_frames: u32,
    pub smooth_scroll_offset: f64,
    pub hover_scale: f64,
    pub hover_duration_ms: u32,
    pub notification_ms: u32,
    pub notification_slide_ms: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            work_clock_refresh_ms: 60_000,
            skill_bar_delay_ms: 200,
            skill_bar_initial_ms: 1_000,
            skill_bar_transition: "width 1.5s ease-out".into(),
            counter_start_ms: 2_000,
            counter_frames: 100,
            smooth_scroll_offset: 100.0,
            hover_scale: 1.02,
            hover_duration_ms: 300,
            notification_ms: 3_000,
            notification_slide_ms: 300,
        }
    }
}

/// User-facing texts for contact form outcomes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContactMessages {
    pub success: String,
    pub rejected: String,
    pub network_error: String,
}

impl Default for ContactMessages {
    fn default() -> Self {
        Self {
            success: "✅ Your message has been sent successfully!".into(),
            rejected: "❌ Something went wrong. Please try again.".into(),
            network_error: "⚠️ Network error. Please try again.".into(),
        }
    }
}

/// Everything the page behavior layer needs; partial JSON overrides fill the rest from defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub schedule: ScheduleConfig,
    pub charts: Vec<RadarChartConfig>,
    pub chart_theme: ChartTheme,
    pub typewriters: Vec<TypewriterSequence>,
    pub nav_links: Vec<NavLink>,
    pub reveal: RevealOptions,
    pub particles: ParticleSettings,
    pub timings: Timings,
    pub contact: ContactMessages,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig::default(),
            charts: default_charts(),
            chart_theme: ChartTheme::default(),
            typewriters: default_typewriters(),
            nav_links: default_nav_links(),
            reveal: RevealOptions::default(),
            particles: ParticleSettings::default(),
            timings: Timings::default(),
            contact: ContactMessages::default(),
        }
    }
}

impl SiteConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.schedule.validate()?;
        let mut seen = HashSet::new();
        for chart in &self.charts {
            chart.validate()?;
            if !seen.insert(chart.container_id.as_str()) {
                return Err(ConfigError::DuplicateChart(chart.container_id.clone()));
            }
        }
        for seq in &self.typewriters {
            seq.validate()?;
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON override and validate the merged result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: SiteConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn chart(&self, container_id: &str) -> Option<&RadarChartConfig> {
        self.charts.iter().find(|c| c.container_id == container_id)
    }
}

fn radar(container_id: &str, series: &str, data: &str, axes: &[(&str, u8)]) -> RadarChartConfig {
    RadarChartConfig {
        container_id: container_id.into(),
        series_name: series.into(),
        data_name: data.into(),
        indicators: axes.iter().map(|(name, _)| Indicator::new(*name)).collect(),
        values: axes.iter().map(|(_, v)| *v).collect(),
    }
}

pub fn default_charts() -> Vec<RadarChartConfig> {
    vec![
        radar(
            "skills-chart",
            "Skills",
            "Technical Skills",
            &[
                ("Python", 69),
                ("Scikit-learn", 72),
                ("TensorFlow", 68),
                ("PyTorch", 86),
                ("OpenCV", 63),
                ("ML Models", 95),
                ("Data\n Visualization", 87),
                ("NLP", 88),
            ],
        ),
        radar(
            "skills-chart-kotlin",
            "KMP Skills",
            "Kotlin Multiplatform",
            &[
                ("Compose Multiplatform", 95),
                ("Ktor", 87),
                ("Koin", 82),
                ("Kotlinx Serialization", 88),
                ("Coroutines", 84),
                ("SQLDelight", 69),
                ("Gradle &\n Kotlin DSL", 77),
                ("Shared Code", 80),
            ],
        ),
    ]
}

fn owned(strings: &[&str]) -> Vec<String> {
    strings.iter().map(|s| s.to_string()).collect()
}

pub fn default_typewriters() -> Vec<TypewriterSequence> {
    vec![
        TypewriterSequence {
            name: "hero".into(),
            stages: vec![
                TypewriterStage {
                    selector: "#typed-name".into(),
                    options: TypedOptions {
                        strings: owned(&["Abdullah Almousa"]),
                        type_speed: 100,
                        back_speed: 50,
                        back_delay: None,
                        looped: false,
                        show_cursor: true,
                        cursor_char: "|".into(),
                    },
                    start_delay_ms: 0,
                },
                TypewriterStage {
                    selector: "#typed-title".into(),
                    options: TypedOptions {
                        strings: owned(&[
                            "Machine Learning Practitioner",
                            "AI Specialist",
                            "Data Science",
                            "Android App developer",
                        ]),
                        type_speed: 80,
                        back_speed: 40,
                        back_delay: Some(2000),
                        looped: true,
                        show_cursor: true,
                        cursor_char: "|".into(),
                    },
                    start_delay_ms: 200,
                },
            ],
        },
        TypewriterSequence {
            name: "portfolio-name".into(),
            stages: vec![TypewriterStage {
                selector: "#portfolio-name-animate".into(),
                options: TypedOptions {
                    strings: owned(&["Abdullah Almousa"]),
                    type_speed: 70,
                    back_speed: 50,
                    back_delay: Some(2000),
                    looped: true,
                    show_cursor: true,
                    cursor_char: "|".into(),
                },
                start_delay_ms: 0,
            }],
        },
    ]
}

pub fn default_nav_links() -> Vec<NavLink> {
    vec![
        NavLink::new("Home", "#home"),
        NavLink::new("Skills", "#skills"),
        NavLink::new("Projects", "#projects"),
        NavLink::new("Achievements", "#achievements"),
        NavLink::new("Portfolio", "portfolio.html"),
        NavLink {
            primary: true,
            ..NavLink::new("Contact", "contact.html")
        },
    ]
}
