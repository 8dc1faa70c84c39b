use std::time::Duration;

use tracing::debug;

use crate::core::dataset::max;
use crate::core::scale::ContinuousScale;
use crate::core::{BandScale, Dataset, LinearScale, RecordKey, Viewport};
use crate::error::ChartResult;
use crate::render::{Attr, LayerKind, Primitive, RenderFrame, Scene};

use super::axis::{Axis, AxisScale};
use super::config::BarChartConfig;
use super::label_format::TickFormat;
use super::page::{ChartPage, PageHost, Surface, caption, vertical_caption};

const PAGE: &str = "bar_chart";

/// Static bar chart of one value per category.
#[derive(Debug)]
pub struct BarChart {
    config: BarChartConfig,
    data: Dataset,
    host: PageHost,
}

impl BarChart {
    #[must_use]
    pub fn new(config: BarChartConfig) -> Self {
        let host = PageHost::new(config.viewport);
        Self {
            config,
            data: Dataset::default(),
            host,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BarChartConfig {
        &self.config
    }

    /// Replaces the data; records lacking the category or value are dropped.
    pub fn set_data(&mut self, data: Dataset) {
        let category = self.config.category_field.clone();
        let mut data = data
            .filtered(|record| record.get(&category).is_some())
            .with_key_field(category.clone());
        data.retain_complete(&[self.config.value_field.as_str()]);
        debug!(records = data.len(), "bar chart data set");
        self.data = data;
    }

    #[must_use]
    pub fn data(&self) -> &Dataset {
        &self.data
    }

    fn draw(&mut self, viewport: Viewport) -> ChartResult<()> {
        let config = &self.config;
        let plot = config.margins.inner(viewport);
        let width = f64::from(viewport.width);
        let height = f64::from(viewport.height);

        let x = BandScale::from_dataset(
            &self.data,
            &config.category_field,
            (0.0, plot.width),
            config.padding_inner,
        )?;
        let top = max(&self.data, &config.value_field).unwrap_or(0.0).max(0.0);
        let y = LinearScale::new((0.0, top), (plot.height, 0.0))?.nice(10);

        let tick_size = config.tick_size.at(width)?;
        let label_size = config.axis_label_size.at(width)?;
        let text_color = config.text_color()?;
        let bar_color = config.bar_color()?;

        let scene = self.host.scene_mut();
        Axis::bottom(AxisScale::Band(x.clone()))
            .with_offset(plot.left, plot.top + plot.height)
            .with_font_size(tick_size)
            .draw(scene.layer_mut("x-axis", LayerKind::Axis));
        Axis::left(AxisScale::Linear(y))
            .with_format(TickFormat::Currency)
            .with_offset(plot.left, plot.top)
            .with_font_size(tick_size)
            .draw(scene.layer_mut("y-axis", LayerKind::Axis));

        let bars = scene.layer_mut("bars", LayerKind::Series);
        bars.set_translate(plot.left, plot.top);
        bars.bind(&self.data, |record, _| {
            let left = record
                .get(&config.category_field)
                .and_then(|category| x.position(&category.to_string()))
                .unwrap_or(0.0);
            let value = record.number(&config.value_field).unwrap_or(0.0);
            let bar_top = y.map(value);
            Primitive::rect(left, bar_top, x.bandwidth(), (plot.height - bar_top).max(0.0))
                .with_color(Attr::Fill, bar_color)
        });

        let labels = [
            (
                "title",
                caption(&config.title, width / 2.0, 100.0, config.title_size.at(width)?, text_color),
            ),
            (
                "x-label",
                caption(
                    &config.x_label,
                    width / 2.0,
                    height - config.x_label_bottom.at(width)?,
                    label_size,
                    text_color,
                ),
            ),
            (
                "y-label",
                vertical_caption(
                    &config.y_label,
                    config.y_label_x.at(width)?,
                    height / 1.7,
                    label_size,
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

impl ChartPage for BarChart {
    fn mount(&mut self, surface: Surface) {
        self.host.mount(surface, PAGE);
    }

    fn unmount(&mut self) -> Option<Surface> {
        self.host.unmount(PAGE)
    }

    fn is_mounted(&self) -> bool {
        self.host.is_mounted()
    }

    fn resize(&mut self, viewport: Viewport) {
        self.host.resize(viewport);
    }

    fn render(&mut self, _now: Duration) -> ChartResult<()> {
        let Some(viewport) = self.host.viewport() else {
            return Ok(());
        };
        if !viewport.is_valid() {
            self.host.present_cleared();
            return Ok(());
        }
        self.draw(viewport)?;
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
