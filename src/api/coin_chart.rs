//! Line chart of one coin metric over time with a date range slider.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::dataset::date_extent;
use crate::core::date::format_date;
use crate::core::scale::ContinuousScale;
use crate::core::{Dataset, LinearScale, Record, RecordKey, TimeScale, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{RANGE_MAX, RANGE_MIN, RangeFilter, RangeSelection, filter_by_range};
use crate::render::{Attr, Curve, LayerKind, Primitive, RenderFrame, Scene, TransitionController};

use super::axis::{Axis, AxisScale};
use super::config::CoinChartConfig;
use super::fixtures::CoinFixture;
use super::label_format::TickFormat;
use super::page::{ChartPage, PageHost, Surface, animate, caption, vertical_caption};

const PAGE: &str = "coin_chart";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coin {
    #[default]
    Bitcoin,
    BitcoinCash,
    Ethereum,
    Litecoin,
    Ripple,
}

impl Coin {
    pub const ALL: [Self; 5] = [
        Self::Bitcoin,
        Self::BitcoinCash,
        Self::Ethereum,
        Self::Litecoin,
        Self::Ripple,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bitcoin => "bitcoin",
            Self::BitcoinCash => "bitcoin_cash",
            Self::Ethereum => "ethereum",
            Self::Litecoin => "litecoin",
            Self::Ripple => "ripple",
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Coin {
    type Err = ChartError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|coin| coin.name() == value)
            .ok_or_else(|| ChartError::UnknownChoice {
                kind: "coin",
                value: value.to_owned(),
            })
    }
}

/// Plotted quantity; each maps to one fixture field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Metric {
    #[default]
    #[serde(rename = "price_usd")]
    PriceUsd,
    #[serde(rename = "market_cap")]
    MarketCap,
    #[serde(rename = "24h_vol")]
    Volume24h,
}

impl Metric {
    pub const ALL: [Self; 3] = [Self::PriceUsd, Self::MarketCap, Self::Volume24h];

    #[must_use]
    pub fn field(self) -> &'static str {
        match self {
            Self::PriceUsd => "price_usd",
            Self::MarketCap => "market_cap",
            Self::Volume24h => "24h_vol",
        }
    }

    /// Caption for the y axis.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::PriceUsd => "Price in dollars",
            Self::MarketCap => "Market capitalization",
            Self::Volume24h => "24 Hour trading volume",
        }
    }

    #[must_use]
    pub fn tick_format(self) -> TickFormat {
        match self {
            Self::PriceUsd => TickFormat::Currency,
            Self::MarketCap | Self::Volume24h => TickFormat::SiBillion,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

impl FromStr for Metric {
    type Err = ChartError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.field() == value)
            .ok_or_else(|| ChartError::UnknownChoice {
                kind: "metric",
                value: value.to_owned(),
            })
    }
}

#[derive(Debug)]
pub struct CoinChart {
    config: CoinChartConfig,
    coins: IndexMap<Coin, Dataset>,
    coin: Coin,
    metric: Metric,
    range: RangeFilter,
    transitions: TransitionController<RecordKey>,
    x_axis_transitions: TransitionController<RecordKey>,
    y_axis_transitions: TransitionController<RecordKey>,
    host: PageHost,
}

impl CoinChart {
    #[must_use]
    pub fn new(config: CoinChartConfig) -> Self {
        let host = PageHost::new(config.viewport);
        Self {
            config,
            coins: IndexMap::new(),
            coin: Coin::default(),
            metric: Metric::default(),
            range: RangeFilter::default(),
            transitions: TransitionController::default(),
            x_axis_transitions: TransitionController::default(),
            y_axis_transitions: TransitionController::default(),
            host,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CoinChartConfig {
        &self.config
    }

    /// Loads every known coin from `fixture`, keeping only records with a
    /// valid date and all three metrics.
    pub fn set_data(&mut self, fixture: CoinFixture) {
        let date_field = self.config.date_field.as_str();
        let mut coins = IndexMap::new();
        for (name, dataset) in fixture.coins {
            let Ok(coin) = name.parse::<Coin>() else {
                warn!(coin = %name, "skipping unknown coin");
                continue;
            };
            let cleaned = clean_coin(&dataset, date_field);
            debug!(
                coin = %coin,
                loaded = dataset.len(),
                kept = cleaned.len(),
                "coin data set"
            );
            coins.insert(coin, cleaned);
        }
        self.coins = coins;
        self.cancel_transitions();
    }

    /// Cleaned records of `coin`.
    #[must_use]
    pub fn data(&self, coin: Coin) -> Option<&Dataset> {
        self.coins.get(&coin)
    }

    /// Coins available in the loaded data, in fixture order.
    pub fn coins(&self) -> impl Iterator<Item = Coin> + '_ {
        self.coins.keys().copied()
    }

    #[must_use]
    pub fn coin(&self) -> Coin {
        self.coin
    }

    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn set_coin(&mut self, coin: Coin) {
        self.coin = coin;
    }

    pub fn set_metric(&mut self, metric: Metric) {
        self.metric = metric;
    }

    /// Selector change by option value, e.g. `"ethereum"`.
    pub fn select_coin(&mut self, value: &str) -> ChartResult<Coin> {
        let coin = value.parse()?;
        self.set_coin(coin);
        Ok(coin)
    }

    /// Selector change by option value, e.g. `"24h_vol"`.
    pub fn select_metric(&mut self, value: &str) -> ChartResult<Metric> {
        let metric = value.parse()?;
        self.set_metric(metric);
        Ok(metric)
    }

    /// Queues a slider selection; the next render applies the latest one.
    pub fn set_range(&mut self, low: f64, high: f64) -> RangeSelection {
        self.range.set(low, high)
    }

    /// Selection used by the last render.
    #[must_use]
    pub fn range(&self) -> RangeSelection {
        self.range.current()
    }

    /// Dates under the slider handles of the pending or current selection.
    #[must_use]
    pub fn slider_labels(&self, low: f64, high: f64) -> Option<(String, String)> {
        let dataset = self.coins.get(&self.coin)?;
        let extent = date_extent(dataset, &self.config.date_field)?;
        let slider = TimeScale::new(extent, (RANGE_MIN, RANGE_MAX)).ok()?;
        let selection = RangeSelection::new(low, high);
        let pattern = self.config.slider_label_pattern.as_str();
        Some((
            format_date(slider.invert_date(selection.low())?, pattern),
            format_date(slider.invert_date(selection.high())?, pattern),
        ))
    }

    fn cancel_transitions(&mut self) {
        self.transitions.cancel_all();
        self.x_axis_transitions.cancel_all();
        self.y_axis_transitions.cancel_all();
    }

    fn draw(&mut self, viewport: Viewport, now: Duration) -> ChartResult<()> {
        let Some(dataset) = self.coins.get(&self.coin) else {
            self.cancel_transitions();
            self.host.scene_mut().clear();
            return Ok(());
        };
        let config = &self.config;
        let metric = self.metric;
        let date_field = config.date_field.as_str();
        let slice = filter_by_range(dataset, date_field, self.range.current())?;

        let plot = config.margins.inner(viewport);
        let width = f64::from(viewport.width);
        let x = TimeScale::from_dataset(&slice, date_field, (0.0, plot.width))?;
        let y = LinearScale::from_dataset(&slice, metric.field(), (plot.height, 0.0))?.nice(10);
        let text_color = config.text_color()?;

        let duration = config.transition_duration();
        let scene = self.host.scene_mut();
        let x_axis = scene.layer_mut("x-axis", LayerKind::Axis);
        let outcome = Axis::bottom(AxisScale::Time(x))
            .with_font_size(config.tick_font_size)
            .with_offset(plot.left, plot.top + plot.height)
            .draw(x_axis);
        animate(&mut self.x_axis_transitions, x_axis, outcome, duration, now);
        let y_axis = scene.layer_mut("y-axis", LayerKind::Axis);
        let outcome = Axis::left(AxisScale::Linear(y))
            .with_format(metric.tick_format())
            .with_font_size(config.tick_font_size)
            .with_offset(plot.left, plot.top)
            .draw(y_axis);
        animate(&mut self.y_axis_transitions, y_axis, outcome, duration, now);

        let points: Vec<(f64, f64)> = slice
            .iter()
            .filter_map(|record| {
                let date = record.date(date_field)?;
                let value = record.number(metric.field())?;
                Some((x.map_date(date), y.map(value)))
            })
            .collect();
        let line = Primitive::path(points, Curve::Basis)
            .with_color(Attr::Stroke, config.line_color()?)
            .with_number(Attr::StrokeWidth, config.stroke_width);
        let layer = scene.layer_mut("line", LayerKind::Series);
        layer.set_translate(plot.left, plot.top);
        let outcome = layer.bind_keyed([(RecordKey::from("line"), line)]);
        animate(&mut self.transitions, layer, outcome, duration, now);

        let labels = [
            (
                "title",
                caption(
                    &config.title,
                    plot.left + width * 0.4,
                    plot.top,
                    config.title_font_size,
                    text_color,
                ),
            ),
            (
                "x-label",
                caption(
                    &config.x_label,
                    plot.left + 288.0,
                    plot.top + 447.0,
                    config.label_font_size,
                    text_color,
                ),
            ),
            (
                "y-label",
                vertical_caption(
                    metric.label(),
                    plot.left - 50.0,
                    plot.top + 280.0,
                    config.label_font_size,
                    text_color,
                ),
            ),
        ];
        scene
            .layer_mut("labels", LayerKind::Annotation)
            .bind_keyed(labels.map(|(key, label)| (RecordKey::from(key), label)));
        Ok(())
    }
}

/// Coerces metrics and dates, dropping records that cannot be plotted.
fn clean_coin(dataset: &Dataset, date_field: &str) -> Dataset {
    let fields: Vec<&str> = Metric::ALL.iter().map(|metric| metric.field()).collect();
    let records: Vec<Record> = dataset
        .iter()
        .filter_map(|record| {
            let mut record = record.clone();
            for field in &fields {
                record.coerce_number(field);
            }
            if let Err(err) = record.coerce_swapped_date(date_field) {
                warn!(error = %err, "dropping coin record with unusable date");
                return None;
            }
            Some(record)
        })
        .collect();
    let mut cleaned = Dataset::new(records);
    cleaned.retain_complete(&fields);
    cleaned
}

impl ChartPage for CoinChart {
    fn mount(&mut self, surface: Surface) {
        self.host.mount(surface, PAGE);
    }

    fn unmount(&mut self) -> Option<Surface> {
        self.cancel_transitions();
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
        if let Some(selection) = self.range.take_pending() {
            debug!(low = selection.low(), high = selection.high(), "range applied");
        }
        if !viewport.is_valid() {
            self.cancel_transitions();
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
    use indexmap::IndexMap;

    use super::{Coin, CoinChart, Metric};
    use crate::api::config::CoinChartConfig;
    use crate::api::fixtures::CoinFixture;
    use crate::api::page::{ChartPage, Surface};
    use crate::core::{Dataset, Record, RecordKey, Value};
    use crate::error::ChartError;
    use crate::render::Attr;

    fn day(date: &str, price: &str) -> Record {
        Record::new()
            .with("date", Value::Text(date.to_owned()))
            .with("price_usd", Value::Text(price.to_owned()))
            .with("market_cap", Value::Number(1.0e9))
            .with("24h_vol", Value::Number(2.0e8))
    }

    fn fixture() -> CoinFixture {
        let mut coins = IndexMap::new();
        coins.insert(
            "bitcoin".to_owned(),
            Dataset::new(vec![
                day("1/5/2013", "100"),
                day("2/5/2013", "110"),
                day("3/5/2013", ""),
                day("31/2/2013", "120"),
                day("4/5/2013", "130"),
            ]),
        );
        coins.insert("dogecoin".to_owned(), Dataset::new(vec![day("1/5/2013", "1")]));
        CoinFixture { coins }
    }

    fn line_points(chart: &CoinChart) -> usize {
        chart
            .scene()
            .layer("line")
            .and_then(|layer| layer.get(&RecordKey::from("line")))
            .and_then(|path| path.points().map(<[(f64, f64)]>::len))
            .expect("line path")
    }

    #[test]
    fn cleaning_drops_missing_metrics_and_impossible_dates() {
        let mut chart = CoinChart::new(CoinChartConfig::default());
        chart.set_data(fixture());
        assert_eq!(chart.coins().collect::<Vec<_>>(), vec![Coin::Bitcoin]);
        assert_eq!(chart.data(Coin::Bitcoin).expect("bitcoin").len(), 3);
    }

    #[test]
    fn selectors_reject_unknown_values() {
        let mut chart = CoinChart::new(CoinChartConfig::default());
        assert_eq!(chart.select_metric("24h_vol").expect("metric"), Metric::Volume24h);
        assert!(matches!(
            chart.select_coin("dogecoin"),
            Err(ChartError::UnknownChoice { kind: "coin", .. })
        ));
        assert_eq!(chart.coin(), Coin::Bitcoin);
    }

    #[test]
    fn range_applies_on_the_next_render() {
        let mut chart = CoinChart::new(CoinChartConfig::default());
        chart.set_data(fixture());
        chart.mount(Surface::new(chart.config().viewport));
        chart.render(Duration::ZERO).expect("render");
        assert_eq!(line_points(&chart), 3);

        chart.set_range(10.0, 90.0);
        // May 1st to 4th: 30..40 covers only May 2nd.
        chart.set_range(40.0, 30.0);
        assert!(chart.range().is_full());
        chart.render(Duration::from_millis(16)).expect("render");
        assert_relative_eq!(chart.range().low(), 30.0);
        assert_eq!(line_points(&chart), 1);
    }

    fn label_positions(chart: &CoinChart, layer: &str) -> Vec<(RecordKey, f64)> {
        chart
            .scene()
            .layer(layer)
            .expect("axis layer")
            .iter()
            .filter(|(key, _)| matches!(key, RecordKey::Field(name) if name.starts_with("label:")))
            .filter_map(|(key, label)| Some((key.clone(), label.number(Attr::X)?)))
            .collect()
    }

    #[test]
    fn axis_ticks_glide_when_the_range_changes() {
        let mut chart = CoinChart::new(CoinChartConfig::default());
        chart.set_data(fixture());
        chart.mount(Surface::new(chart.config().viewport));
        chart.render(Duration::ZERO).expect("render");
        let before = label_positions(&chart, "x-axis");

        chart.set_range(0.0, 67.0);
        chart.render(Duration::from_secs(1)).expect("range start");
        let started = label_positions(&chart, "x-axis");
        chart.render(Duration::from_secs(2)).expect("settled");
        let settled = label_positions(&chart, "x-axis");

        let moved: Vec<_> = before
            .iter()
            .filter_map(|(key, old_x)| {
                let (_, new_x) = settled.iter().find(|(candidate, _)| candidate == key)?;
                ((new_x - old_x).abs() > 1.0).then_some((key, *old_x))
            })
            .collect();
        assert!(!moved.is_empty());
        for (key, old_x) in moved {
            let (_, x) = started
                .iter()
                .find(|(candidate, _)| candidate == key)
                .expect("surviving tick");
            assert_relative_eq!(*x, old_x, epsilon = 1e-9);
        }
    }

    #[test]
    fn slider_labels_use_the_date_pattern() {
        let mut chart = CoinChart::new(CoinChartConfig::default());
        chart.set_data(fixture());
        let (low, high) = chart.slider_labels(0.0, 100.0).expect("labels");
        assert_eq!(low, "2013 05 01");
        assert_eq!(high, "2013 05 04");
    }
}
