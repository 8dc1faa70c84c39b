use std::time::Duration;

use vizbind::api::{
    BarChart, BarChartConfig, BubbleChart, BubbleChartConfig, ChartPage, Coin, CoinChart,
    CoinChartConfig, ForceGraph, ForceGraphConfig, Metric, Surface, coins_from_json,
    countries_from_json, graph_from_json, revenues_from_json,
};
use vizbind::core::{Dataset, Record, RecordKey, Value, Viewport};
use vizbind::render::{Attr, NullRenderer, Renderer, ShapeKind, SvgRenderer};

const REVENUES: &str = include_str!("../fixtures/revenues.json");
const COUNTRIES: &str = include_str!("../fixtures/countries.json");
const MISERABLES: &str = include_str!("../fixtures/miserables.json");
const COINS: &str = include_str!("../fixtures/coins.json");

fn month(name: &str, profit: f64) -> Record {
    Record::new()
        .with("month", Value::Text(name.to_owned()))
        .with("profit", Value::Number(profit))
}

#[test]
fn bar_heights_follow_profit_ratio() {
    let mut chart = BarChart::new(BarChartConfig::default());
    chart.set_data(Dataset::new(vec![month("Jan", 10.0), month("Feb", 30.0)]));
    chart.mount(Surface::new(Viewport::new(900, 700)));
    chart.render(Duration::ZERO).expect("render");

    let bars = chart.scene().layer("bars").expect("bars layer");
    assert_eq!(bars.len(), 2);
    let jan = bars.get(&RecordKey::from("Jan")).expect("Jan bar");
    let feb = bars.get(&RecordKey::from("Feb")).expect("Feb bar");
    let height = |bar: &vizbind::render::Primitive| bar.number(Attr::Height).expect("height");

    assert!((height(feb) / height(jan) - 3.0).abs() < 1e-9);
    assert!(jan.number(Attr::X).expect("x") < feb.number(Attr::X).expect("x"));
    assert_eq!(bars.keys(), vec![RecordKey::from("Jan"), RecordKey::from("Feb")]);
}

#[test]
fn bar_rerender_is_idempotent() {
    let mut chart = BarChart::new(BarChartConfig::default());
    chart.set_data(revenues_from_json(REVENUES).expect("revenues"));
    chart.mount(Surface::new(chart.config().viewport));
    chart.render(Duration::ZERO).expect("render");
    let first = chart.frame().expect("mounted").clone();
    chart.render(Duration::from_millis(16)).expect("render");
    assert_eq!(chart.frame().expect("mounted"), &first);
}

#[test]
fn rendering_an_unmounted_page_is_a_no_op() {
    let mut chart = BarChart::new(BarChartConfig::default());
    chart.set_data(Dataset::new(vec![month("Jan", 10.0)]));
    chart.render(Duration::ZERO).expect("no-op render");
    assert!(chart.frame().is_none());
    assert_eq!(chart.scene().primitive_count(), 0);
}

#[test]
fn unmount_hands_the_surface_back() {
    let mut chart = BarChart::new(BarChartConfig::default());
    chart.set_data(Dataset::new(vec![month("Jan", 10.0)]));
    chart.mount(Surface::new(Viewport::new(640, 480)));
    chart.render(Duration::ZERO).expect("render");

    let surface = chart.unmount().expect("mounted surface");
    assert!(!chart.is_mounted());
    assert_eq!(surface.presented(), 1);
    assert_eq!(surface.frame().count(ShapeKind::Rect), 1);
    assert!(chart.unmount().is_none());

    let mut other = BarChart::new(BarChartConfig::default());
    other.mount(surface);
    assert!(other.is_mounted());
}

#[test]
fn resizing_to_zero_clears_the_page() {
    let mut chart = BarChart::new(BarChartConfig::default());
    chart.set_data(revenues_from_json(REVENUES).expect("revenues"));
    chart.mount(Surface::new(chart.config().viewport));
    chart.render(Duration::ZERO).expect("render");
    assert!(!chart.frame().expect("mounted").is_empty());

    chart.resize(Viewport::new(0, 480));
    chart.render(Duration::from_millis(16)).expect("render");
    assert!(chart.frame().expect("mounted").is_empty());
}

#[test]
fn bubble_fixture_plays_through_every_year() {
    let frames = countries_from_json(COUNTRIES).expect("countries");
    let years = frames.len();
    let mut chart = BubbleChart::new(BubbleChartConfig::default());
    chart.set_frames(frames);
    chart.mount(Surface::new(chart.config().viewport));

    chart.start(Duration::ZERO);
    let mut renderer = NullRenderer::default();
    for tick in 0..=years as u64 {
        chart.render(Duration::from_millis(tick * 100)).expect("render");
        renderer.render(chart.frame().expect("mounted")).expect("valid frame");
    }
    assert_eq!(chart.frame_index(), 0);
    assert_eq!(renderer.frames_rendered, years + 1);
    assert!(chart.scene().layer("circles").is_some_and(|layer| !layer.is_empty()));
}

#[test]
fn force_fixture_settles_after_enough_frames() {
    let mut page = ForceGraph::new(ForceGraphConfig::default());
    page.set_graph(graph_from_json(MISERABLES).expect("graph")).expect("valid graph");
    page.mount(Surface::new(page.config().viewport));
    for frame in 0..320u64 {
        page.render(Duration::from_millis(frame * 16)).expect("render");
    }
    let simulation = page.simulation().expect("graph set");
    assert!(simulation.is_converged());
    let frame = page.frame().expect("mounted");
    assert_eq!(frame.count(ShapeKind::Circle), simulation.nodes().len());
    assert_eq!(frame.count(ShapeKind::Line), simulation.links().len());
}

#[test]
fn coin_fixture_switches_metric_and_coin() {
    let mut chart = CoinChart::new(CoinChartConfig::default());
    chart.set_data(coins_from_json(COINS).expect("coins"));
    assert_eq!(chart.coins().count(), Coin::ALL.len());
    assert_eq!(chart.data(Coin::Ripple).expect("ripple").len(), 19);

    chart.mount(Surface::new(chart.config().viewport));
    chart.select_coin("ethereum").expect("coin");
    chart.select_metric("market_cap").expect("metric");
    chart.render(Duration::ZERO).expect("render");

    let label = chart
        .scene()
        .layer("labels")
        .and_then(|layer| layer.get(&RecordKey::from("y-label")))
        .and_then(|label| label.text_value(Attr::Text).map(str::to_owned));
    assert_eq!(label.as_deref(), Some(Metric::MarketCap.label()));

    let mut svg = SvgRenderer::new();
    svg.render(chart.frame().expect("mounted")).expect("svg");
    assert!(svg.document().starts_with("<svg"));
    assert!(svg.document().contains("<path"));
}
