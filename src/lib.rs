//! vizbind: headless declarative charting.
//!
//! Data flows from a [`core::Dataset`] through scales into keyed shape layers;
//! transitions and interactions mutate those layers and renderers consume the
//! flattened [`render::RenderFrame`]. Hosts drive all timing by passing `now`.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{BarChart, BubbleChart, ChartPage, CoinChart, ForceGraph, Surface};
pub use error::{ChartError, ChartResult};
