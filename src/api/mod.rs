//! Chart pages and the pieces they share: axes, tick formats, configuration,
//! fixture loaders and the mount/render lifecycle.

mod axis;
mod bar_chart;
mod bubble_chart;
mod coin_chart;
mod config;
mod fixtures;
mod force_graph;
mod label_format;
mod page;

pub use axis::{Axis, AxisOrientation, AxisScale, AxisTick};
pub use bar_chart::BarChart;
pub use bubble_chart::{BubbleChart, BubbleMaxima};
pub use coin_chart::{Coin, CoinChart, Metric};
pub use config::{
    BarChartConfig, BubbleChartConfig, CoinChartConfig, ForceGraphConfig, WidthScaled,
};
pub use fixtures::{
    CoinFixture, GraphFixture, GraphNode, YearFrame, coins_from_json, countries_from_json,
    graph_from_json, revenues_from_json,
};
pub use force_graph::ForceGraph;
pub use label_format::TickFormat;
pub use page::{ChartPage, Surface};
