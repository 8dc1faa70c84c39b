use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::scale::{ContinuousScale, SCHEME_SET2, SCHEME_SPECTRAL_4};
use crate::core::{LinearScale, Margins, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

const INK: &str = "#1d2228";

/// Text size that grows linearly with the surface width.
///
/// The width domain is niced before mapping, so `[450, 2000]` behaves as
/// `[400, 2000]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidthScaled {
    pub width_domain: (f64, f64),
    pub output: (f64, f64),
}

impl WidthScaled {
    #[must_use]
    pub const fn new(width_domain: (f64, f64), output: (f64, f64)) -> Self {
        Self {
            width_domain,
            output,
        }
    }

    pub fn at(&self, width: f64) -> ChartResult<f64> {
        Ok(LinearScale::new(self.width_domain, self.output)?
            .nice(10)
            .map(width))
    }
}

macro_rules! json_config {
    ($name:ident) => {
        impl $name {
            /// Serializes config to pretty JSON.
            pub fn to_json_pretty(&self) -> ChartResult<String> {
                serde_json::to_string_pretty(self).map_err(|e| {
                    ChartError::InvalidData(format!("failed to serialize config: {e}"))
                })
            }

            /// Deserializes config from JSON; missing fields take defaults.
            pub fn from_json_str(input: &str) -> ChartResult<Self> {
                serde_json::from_str(input)
                    .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))
            }
        }
    };
}

fn parse_palette(palette: &[String]) -> ChartResult<Vec<Color>> {
    palette.iter().map(|hex| Color::from_hex(hex)).collect()
}

fn default_palette(scheme: &[&str]) -> Vec<String> {
    scheme.iter().map(|hex| (*hex).to_owned()).collect()
}

/// Revenue bar chart setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarChartConfig {
    pub viewport: Viewport,
    pub margins: Margins,
    pub category_field: String,
    pub value_field: String,
    pub padding_inner: f64,
    pub bar_color: String,
    pub text_color: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub title_size: WidthScaled,
    pub tick_size: WidthScaled,
    pub axis_label_size: WidthScaled,
    pub y_label_x: WidthScaled,
    pub x_label_bottom: WidthScaled,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        let widths = (450.0, 2000.0);
        Self {
            viewport: Viewport::new(1200, 800),
            margins: Margins::new(150.0, 10.0, 100.0, 150.0),
            category_field: "month".to_owned(),
            value_field: "profit".to_owned(),
            padding_inner: 0.3,
            bar_color: INK.to_owned(),
            text_color: INK.to_owned(),
            title: "Revenue Bar Chart".to_owned(),
            x_label: "Month".to_owned(),
            y_label: "Revenue".to_owned(),
            title_size: WidthScaled::new(widths, (20.0, 80.0)),
            tick_size: WidthScaled::new(widths, (10.0, 24.0)),
            axis_label_size: WidthScaled::new(widths, (17.0, 47.0)),
            y_label_x: WidthScaled::new(widths, (90.0, 45.0)),
            x_label_bottom: WidthScaled::new(widths, (60.0, 20.0)),
        }
    }
}

impl BarChartConfig {
    pub fn bar_color(&self) -> ChartResult<Color> {
        Color::from_hex(&self.bar_color)
    }

    pub fn text_color(&self) -> ChartResult<Color> {
        Color::from_hex(&self.text_color)
    }
}

json_config!(BarChartConfig);

/// Animated bubble chart setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleChartConfig {
    pub viewport: Viewport,
    pub margins: Margins,
    pub key_field: String,
    pub x_field: String,
    pub y_field: String,
    pub radius_field: String,
    pub color_field: String,
    /// Lower bound of the log x domain.
    pub x_floor: f64,
    pub radius_range: (f64, f64),
    pub x_tick_values: Vec<f64>,
    pub palette: Vec<String>,
    pub opacity: f64,
    pub transition_ms: u64,
    pub playback_interval_ms: u64,
    pub text_color: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub title_font_size: f64,
    pub label_font_size: f64,
    pub tick_font_size: f64,
}

impl Default for BubbleChartConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(700, 500),
            margins: Margins::new(150.0, 10.0, 100.0, 150.0),
            key_field: "country".to_owned(),
            x_field: "income".to_owned(),
            y_field: "life_exp".to_owned(),
            radius_field: "population".to_owned(),
            color_field: "continent".to_owned(),
            x_floor: 142.0,
            radius_range: (5.0, 40.0),
            x_tick_values: vec![400.0, 4_000.0, 40_000.0],
            palette: default_palette(&SCHEME_SPECTRAL_4),
            opacity: 0.3,
            transition_ms: 100,
            playback_interval_ms: 100,
            text_color: INK.to_owned(),
            title: "Countries GDP through Time".to_owned(),
            x_label: "GDP Per Capita ($)".to_owned(),
            y_label: "Life Expectancy (years)".to_owned(),
            title_font_size: 32.0,
            label_font_size: 18.0,
            tick_font_size: 10.0,
        }
    }
}

impl BubbleChartConfig {
    #[must_use]
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    #[must_use]
    pub fn playback_interval(&self) -> Duration {
        Duration::from_millis(self.playback_interval_ms)
    }

    pub fn palette(&self) -> ChartResult<Vec<Color>> {
        parse_palette(&self.palette)
    }

    pub fn text_color(&self) -> ChartResult<Color> {
        Color::from_hex(&self.text_color)
    }
}

json_config!(BubbleChartConfig);

/// Force-directed graph setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceGraphConfig {
    pub viewport: Viewport,
    pub link_color: String,
    pub node_radius: f64,
    pub palette: Vec<String>,
    pub charge_strength: f64,
    pub collide_radius: f64,
    pub collide_strength: f64,
    pub link_distance: f64,
    pub drag_alpha_target: f64,
}

impl Default for ForceGraphConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(800, 700),
            link_color: "#D0D0D0".to_owned(),
            node_radius: 5.0,
            palette: default_palette(&SCHEME_SET2),
            charge_strength: -50.0,
            collide_radius: 10.0,
            collide_strength: 0.9,
            link_distance: 30.0,
            drag_alpha_target: 0.7,
        }
    }
}

impl ForceGraphConfig {
    pub fn palette(&self) -> ChartResult<Vec<Color>> {
        parse_palette(&self.palette)
    }

    pub fn link_color(&self) -> ChartResult<Color> {
        Color::from_hex(&self.link_color)
    }
}

json_config!(ForceGraphConfig);

/// Coin line chart setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinChartConfig {
    pub viewport: Viewport,
    pub margins: Margins,
    pub date_field: String,
    pub line_color: String,
    pub stroke_width: f64,
    pub transition_ms: u64,
    pub slider_label_pattern: String,
    pub text_color: String,
    pub title: String,
    pub x_label: String,
    pub title_font_size: f64,
    pub label_font_size: f64,
    pub tick_font_size: f64,
}

impl Default for CoinChartConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(700, 500),
            margins: Margins::new(50.0, 20.0, 50.0, 70.0),
            date_field: "date".to_owned(),
            line_color: INK.to_owned(),
            stroke_width: 1.0,
            transition_ms: 300,
            slider_label_pattern: "%Y %m %d".to_owned(),
            text_color: INK.to_owned(),
            title: "Coins Stats".to_owned(),
            x_label: "Time".to_owned(),
            title_font_size: 32.0,
            label_font_size: 18.0,
            tick_font_size: 10.0,
        }
    }
}

impl CoinChartConfig {
    #[must_use]
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn line_color(&self) -> ChartResult<Color> {
        Color::from_hex(&self.line_color)
    }

    pub fn text_color(&self) -> ChartResult<Color> {
        Color::from_hex(&self.text_color)
    }
}

json_config!(CoinChartConfig);
