use std::time::Duration;

use indexmap::IndexSet;
use tracing::debug;

use crate::core::dataset::max;
use crate::core::scale::ContinuousScale;
use crate::core::{LinearScale, LogScale, OrdinalScale, RecordKey, Viewport};
use crate::error::ChartResult;
use crate::interaction::{Playback, TooltipState, hit_test};
use crate::render::{Attr, Color, LayerKind, Primitive, RenderFrame, Scene, TransitionController};

use super::axis::{Axis, AxisScale};
use super::config::BubbleChartConfig;
use super::fixtures::YearFrame;
use super::label_format::TickFormat;
use super::page::{ChartPage, PageHost, Surface, animate, caption, vertical_caption};

const PAGE: &str = "bubble_chart";

/// Largest values over every frame, fixing the scales for the whole animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleMaxima {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Animated scatter of one circle per entity and frame, stepped by a playback
/// timer and keyed so circles glide between frames.
#[derive(Debug)]
pub struct BubbleChart {
    config: BubbleChartConfig,
    frames: Vec<YearFrame>,
    maxima: BubbleMaxima,
    categories: Vec<String>,
    playback: Playback,
    transitions: TransitionController<RecordKey>,
    tooltip: TooltipState,
    host: PageHost,
}

impl BubbleChart {
    #[must_use]
    pub fn new(config: BubbleChartConfig) -> Self {
        let playback = Playback::new(0, config.playback_interval());
        let host = PageHost::new(config.viewport);
        Self {
            config,
            frames: Vec::new(),
            maxima: BubbleMaxima {
                x: 0.0,
                y: 0.0,
                radius: 0.0,
            },
            categories: Vec::new(),
            playback,
            transitions: TransitionController::default(),
            tooltip: TooltipState::default(),
            host,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BubbleChartConfig {
        &self.config
    }

    /// Replaces all frames. Entities without a positive x or y value are
    /// dropped, then maxima and color categories are taken from this snapshot.
    pub fn set_frames(&mut self, frames: Vec<YearFrame>) {
        let config = &self.config;
        let frames: Vec<YearFrame> = frames
            .into_iter()
            .map(|frame| {
                let countries = frame
                    .countries
                    .filtered(|record| {
                        record.number(&config.x_field).is_some_and(|v| v > 0.0)
                            && record.number(&config.y_field).is_some_and(|v| v > 0.0)
                    })
                    .with_key_field(config.key_field.clone());
                YearFrame {
                    year: frame.year,
                    countries,
                }
            })
            .collect();

        let frame_max = |field: &str| {
            frames
                .iter()
                .filter_map(|frame| max(&frame.countries, field))
                .fold(0.0_f64, f64::max)
        };
        self.maxima = BubbleMaxima {
            x: frame_max(&config.x_field),
            y: frame_max(&config.y_field),
            radius: frame_max(&config.radius_field),
        };
        self.categories = frames
            .first()
            .map(|frame| {
                frame
                    .countries
                    .iter()
                    .filter_map(|record| record.text(&config.color_field))
                    .map(str::to_owned)
                    .collect::<IndexSet<String>>()
                    .into_iter()
                    .collect()
            })
            .unwrap_or_default();

        debug!(
            frames = frames.len(),
            max_x = self.maxima.x,
            max_y = self.maxima.y,
            max_radius = self.maxima.radius,
            "bubble frames set"
        );
        self.playback.set_frame_count(frames.len());
        self.frames = frames;
        self.transitions.cancel_all();
    }

    #[must_use]
    pub fn frames(&self) -> &[YearFrame] {
        &self.frames
    }

    #[must_use]
    pub fn maxima(&self) -> BubbleMaxima {
        self.maxima
    }

    #[must_use]
    pub fn frame_index(&self) -> usize {
        self.playback.index()
    }

    /// Last index the scrubber can reach.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn start(&mut self, now: Duration) -> bool {
        self.playback.start(now)
    }

    pub fn stop(&mut self) -> bool {
        self.playback.stop()
    }

    pub fn reset(&mut self) {
        self.playback.reset();
    }

    pub fn scrub(&mut self, index: usize) -> usize {
        self.playback.scrub(index)
    }

    #[must_use]
    pub fn tooltip(&self) -> &TooltipState {
        &self.tooltip
    }

    /// Shows the tooltip for the bubble under the pointer, if any.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<RecordKey> {
        let layer = self.host.scene().layer("circles")?;
        let Some(key) = hit_test(layer, x, y).cloned() else {
            self.tooltip.clear();
            return None;
        };
        let lines = self.tooltip_lines(&key);
        self.tooltip.pointer_enter(key.clone(), x, y, lines);
        Some(key)
    }

    pub fn pointer_leave(&mut self) {
        self.tooltip.clear();
    }

    fn tooltip_lines(&self, key: &RecordKey) -> Vec<String> {
        let Some(frame) = self.frames.get(self.playback.index()) else {
            return Vec::new();
        };
        let Some((_, record)) = frame.countries.keyed().find(|(candidate, _)| candidate == key)
        else {
            return Vec::new();
        };
        let config = &self.config;
        let number = |field: &str| {
            record
                .number(field)
                .map_or_else(|| "n/a".to_owned(), |value| TickFormat::Raw.format(value))
        };
        vec![
            key.to_string(),
            format!("{}: {}", config.x_field, number(&config.x_field)),
            format!("{}: {}", config.y_field, number(&config.y_field)),
            format!("{}: {}", config.radius_field, number(&config.radius_field)),
        ]
    }

    fn draw(&mut self, viewport: Viewport, now: Duration) -> ChartResult<()> {
        let Some(frame) = self.frames.get(self.playback.index()) else {
            self.transitions.cancel_all();
            self.host.scene_mut().clear();
            return Ok(());
        };
        let config = &self.config;
        let plot = config.margins.inner(viewport);
        let (width, height) = (f64::from(viewport.width), f64::from(viewport.height));

        let x = LogScale::new(
            (config.x_floor, self.maxima.x.max(config.x_floor)),
            (0.0, plot.width),
        )?;
        let y = LinearScale::new((0.0, self.maxima.y), (plot.height, 0.0))?;
        let radius = LinearScale::new((0.0, self.maxima.radius), config.radius_range)?;
        let mut colors = OrdinalScale::new(self.categories.iter().cloned(), config.palette()?);
        let text_color = config.text_color()?;

        let scene = self.host.scene_mut();
        Axis::bottom(AxisScale::Log(x))
            .with_tick_values(config.x_tick_values.clone())
            .with_format(TickFormat::Currency)
            .with_font_size(config.tick_font_size)
            .with_offset(plot.left, plot.top + plot.height)
            .draw(scene.layer_mut("x-axis", LayerKind::Axis));
        Axis::left(AxisScale::Linear(y))
            .with_font_size(config.tick_font_size)
            .with_offset(plot.left, plot.top)
            .draw(scene.layer_mut("y-axis", LayerKind::Axis));

        let circles = scene.layer_mut("circles", LayerKind::Series);
        circles.set_translate(plot.left, plot.top);
        let outcome = circles.bind(&frame.countries, |record, _| {
            let fill = match record.text(&config.color_field) {
                Some(category) => colors.resolve(category).copied(),
                None => None,
            }
            .unwrap_or(Color::BLACK);
            Primitive::circle(
                x.map(record.number(&config.x_field).unwrap_or(config.x_floor)),
                y.map(record.number(&config.y_field).unwrap_or(0.0)),
                radius.map(record.number(&config.radius_field).unwrap_or(0.0)),
            )
            .with_color(Attr::Fill, fill)
            .with_number(Attr::Opacity, config.opacity)
        });
        animate(
            &mut self.transitions,
            circles,
            outcome,
            config.transition_duration(),
            now,
        );

        let labels = [
            (
                "year",
                caption(
                    &format!("year {}", frame.year),
                    plot.left + width * 0.6,
                    plot.top + plot.height - 40.0,
                    config.label_font_size,
                    text_color,
                ),
            ),
            (
                "title",
                caption(
                    &config.title,
                    plot.left + width * 0.1,
                    plot.top,
                    config.title_font_size,
                    text_color,
                ),
            ),
            (
                "x-label",
                caption(
                    &config.x_label,
                    plot.left + 200.0,
                    plot.top + height / 2.0 + 40.0,
                    config.label_font_size,
                    text_color,
                ),
            ),
            (
                "y-label",
                vertical_caption(
                    &config.y_label,
                    plot.left - 70.0,
                    plot.top + 200.0,
                    config.label_font_size,
                    text_color,
                ),
            ),
        ];
        scene
            .layer_mut("labels", LayerKind::Annotation)
            .bind_keyed(labels.map(|(key, label)| (RecordKey::from(key), label)));

        self.tooltip.draw(
            scene.layer_mut("tooltip", LayerKind::Overlay),
            config.tick_font_size * 1.2,
        );
        Ok(())
    }
}

impl ChartPage for BubbleChart {
    fn mount(&mut self, surface: Surface) {
        self.host.mount(surface, PAGE);
    }

    fn unmount(&mut self) -> Option<Surface> {
        self.playback.stop();
        self.transitions.cancel_all();
        self.tooltip.clear();
        self.host.unmount(PAGE)
    }

    fn is_mounted(&self) -> bool {
        self.host.is_mounted()
    }

    fn resize(&mut self, viewport: Viewport) {
        self.host.resize(viewport);
    }

    fn render(&mut self, now: Duration) -> ChartResult<()> {
        let Some(viewport) = self.host.viewport() else {
            return Ok(());
        };
        self.playback.poll(now);
        if !viewport.is_valid() {
            self.transitions.cancel_all();
            self.host.present_cleared();
            return Ok(());
        }
        self.draw(viewport, now)?;
        self.host.present();
        Ok(())
    }

    fn scene(&self) -> &Scene {
        self.host.scene()
    }

    fn frame(&self) -> Option<&RenderFrame> {
        self.host.frame()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_relative_eq;

    use super::BubbleChart;
    use crate::api::config::BubbleChartConfig;
    use crate::api::fixtures::YearFrame;
    use crate::api::page::{ChartPage, Surface};
    use crate::core::{Dataset, Record, RecordKey, Value};
    use crate::render::Attr;

    fn country(name: &str, income: f64, life_exp: f64) -> Record {
        Record::new()
            .with("country", Value::Text(name.to_owned()))
            .with("continent", Value::Text("europe".to_owned()))
            .with("income", Value::Number(income))
            .with("life_exp", Value::Number(life_exp))
            .with("population", Value::Number(1_000.0))
    }

    fn frames() -> Vec<YearFrame> {
        vec![
            YearFrame {
                year: 1800,
                countries: Dataset::new(vec![country("A", 1_000.0, 30.0), country("B", 0.0, 40.0)]),
            },
            YearFrame {
                year: 1801,
                countries: Dataset::new(vec![country("A", 2_000.0, 60.0)]),
            },
        ]
    }

    fn circle_cy(chart: &BubbleChart) -> f64 {
        chart
            .scene()
            .layer("circles")
            .and_then(|layer| layer.get(&RecordKey::from("A")))
            .and_then(|circle| circle.number(Attr::Cy))
            .expect("circle A")
    }

    #[test]
    fn maxima_span_all_frames_and_skip_empty_incomes() {
        let mut chart = BubbleChart::new(BubbleChartConfig::default());
        chart.set_frames(frames());
        assert_eq!(chart.frames()[0].countries.len(), 1);
        assert_relative_eq!(chart.maxima().x, 2_000.0);
        assert_relative_eq!(chart.maxima().y, 60.0);
    }

    #[test]
    fn playback_glides_circles_between_frames() {
        let mut chart = BubbleChart::new(BubbleChartConfig::default());
        chart.set_frames(frames());
        chart.mount(Surface::new(chart.config().viewport));
        chart.render(Duration::ZERO).expect("first frame");
        let start_cy = circle_cy(&chart);

        assert!(chart.start(Duration::ZERO));
        chart.render(Duration::from_millis(100)).expect("advance");
        assert_eq!(chart.frame_index(), 1);
        assert!(chart.stop());
        assert_relative_eq!(circle_cy(&chart), start_cy);

        chart.render(Duration::from_millis(150)).expect("mid transition");
        let mid_cy = circle_cy(&chart);
        assert!(mid_cy < start_cy);

        chart.render(Duration::from_millis(250)).expect("settled");
        let end_cy = circle_cy(&chart);
        assert!(end_cy < mid_cy);
        // Life expectancy 60 is the top of the domain.
        assert_relative_eq!(end_cy, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn year_label_follows_the_scrubber() {
        let mut chart = BubbleChart::new(BubbleChartConfig::default());
        chart.set_frames(frames());
        chart.mount(Surface::new(chart.config().viewport));
        assert_eq!(chart.scrub(9), 1);
        chart.render(Duration::ZERO).expect("render");
        let year = chart
            .scene()
            .layer("labels")
            .and_then(|layer| layer.get(&RecordKey::from("year")))
            .and_then(|label| label.text_value(Attr::Text).map(str::to_owned));
        assert_eq!(year.as_deref(), Some("year 1801"));
    }

    #[test]
    fn scrubbing_while_playing_shows_the_scrubbed_year() {
        let frames = (0..5)
            .map(|offset| YearFrame {
                year: 1800 + offset,
                countries: Dataset::new(vec![country("A", 1_000.0, 30.0 + f64::from(offset))]),
            })
            .collect();
        let mut chart = BubbleChart::new(BubbleChartConfig::default());
        chart.set_frames(frames);
        chart.mount(Surface::new(chart.config().viewport));
        assert!(chart.start(Duration::ZERO));
        chart.render(Duration::from_millis(50)).expect("render");

        chart.scrub(3);
        chart.render(Duration::from_millis(100)).expect("render scrubbed");
        assert_eq!(chart.frame_index(), 3);
        let year = chart
            .scene()
            .layer("labels")
            .and_then(|layer| layer.get(&RecordKey::from("year")))
            .and_then(|label| label.text_value(Attr::Text).map(str::to_owned));
        assert_eq!(year.as_deref(), Some("year 1803"));

        chart.render(Duration::from_millis(200)).expect("render next");
        assert_eq!(chart.frame_index(), 4);
    }

    #[test]
    fn hovering_a_bubble_shows_its_tooltip() {
        let mut chart = BubbleChart::new(BubbleChartConfig::default());
        chart.set_frames(frames());
        chart.mount(Surface::new(chart.config().viewport));
        chart.render(Duration::ZERO).expect("render");
        let layer = chart.scene().layer("circles").expect("circles layer");
        let circle = layer.get(&RecordKey::from("A")).expect("circle A");
        let (dx, dy) = layer.translate();
        let x = circle.number(Attr::Cx).expect("cx") + dx;
        let y = circle.number(Attr::Cy).expect("cy") + dy;

        assert_eq!(chart.pointer_move(x, y), Some(RecordKey::from("A")));
        let tooltip = chart.tooltip().current().expect("tooltip");
        assert_eq!(tooltip.lines[0], "A");
        chart.pointer_leave();
        assert!(chart.tooltip().current().is_none());
    }

    #[test]
    fn unmount_stops_playback() {
        let mut chart = BubbleChart::new(BubbleChartConfig::default());
        chart.set_frames(frames());
        chart.mount(Surface::new(chart.config().viewport));
        chart.start(Duration::ZERO);
        assert!(chart.unmount().is_some());
        assert!(!chart.is_playing());
        chart.render(Duration::from_secs(5)).expect("unmounted render");
        assert_eq!(chart.frame_index(), 0);
    }
}
