use std::time::Duration;

use tracing::debug;

use crate::core::force::{CenterForce, CollideForce, LinkForce, ManyBodyForce};
use crate::core::{ForceSet, ForceSimulation, OrdinalScale, RecordKey, SimNode, Viewport};
use crate::error::ChartResult;
use crate::interaction::DragController;
use crate::render::{Attr, Color, LayerKind, Primitive, RenderFrame, Scene};

use super::config::ForceGraphConfig;
use super::fixtures::GraphFixture;
use super::page::{ChartPage, PageHost, Surface};

const PAGE: &str = "force_graph";

/// Node-link diagram laid out by a force simulation that advances one step
/// per rendered frame. Nodes can be dragged.
#[derive(Debug)]
pub struct ForceGraph {
    config: ForceGraphConfig,
    simulation: Option<ForceSimulation>,
    groups: Vec<String>,
    drag: DragController,
    host: PageHost,
}

impl ForceGraph {
    #[must_use]
    pub fn new(config: ForceGraphConfig) -> Self {
        let drag = DragController::new(config.drag_alpha_target);
        let host = PageHost::new(config.viewport);
        Self {
            config,
            simulation: None,
            groups: Vec::new(),
            drag,
            host,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ForceGraphConfig {
        &self.config
    }

    /// Builds a fresh simulation; fails on duplicate node ids or links to
    /// unknown nodes.
    pub fn set_graph(&mut self, graph: GraphFixture) -> ChartResult<()> {
        let config = &self.config;
        let center = self.host.scene().viewport().center();
        let forces = ForceSet {
            center: Some(CenterForce {
                x: center.0,
                y: center.1,
            }),
            many_body: Some(ManyBodyForce {
                strength: config.charge_strength,
                ..ManyBodyForce::default()
            }),
            collide: Some(CollideForce {
                radius: config.collide_radius,
                strength: config.collide_strength,
            }),
            link: Some(LinkForce {
                distance: config.link_distance,
                strength: None,
            }),
        };
        let nodes = graph.nodes.iter().map(|node| SimNode::new(node.id.clone())).collect();
        let simulation = ForceSimulation::new(nodes, &graph.links, forces)?;
        debug!(
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            "force graph set"
        );
        self.groups = graph.nodes.iter().map(|node| node.group_label()).collect();
        self.simulation = Some(simulation);
        self.drag.cancel();
        Ok(())
    }

    #[must_use]
    pub fn simulation(&self) -> Option<&ForceSimulation> {
        self.simulation.as_ref()
    }

    /// Index of the node being dragged.
    #[must_use]
    pub fn dragged_node(&self) -> Option<usize> {
        self.drag.active_node()
    }

    /// Grabs the node under the pointer, pinning it where it currently is.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> ChartResult<Option<usize>> {
        let Some(simulation) = self.simulation.as_mut() else {
            return Ok(None);
        };
        let Some(RecordKey::Field(id)) = self
            .host
            .scene()
            .layer("nodes")
            .and_then(|layer| layer.hit_test(x, y))
        else {
            return Ok(None);
        };
        let Some(index) = simulation.node_index(id) else {
            return Ok(None);
        };
        let (node_x, node_y) = simulation
            .nodes()
            .get(index)
            .map_or((x, y), |node| (node.x, node.y));
        self.drag.pointer_down(simulation, index, node_x, node_y)?;
        Ok(Some(index))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> ChartResult<bool> {
        match self.simulation.as_mut() {
            Some(simulation) => self.drag.pointer_move(simulation, x, y),
            None => Ok(false),
        }
    }

    pub fn pointer_up(&mut self) -> ChartResult<()> {
        match self.simulation.as_mut() {
            Some(simulation) => self.drag.pointer_up(simulation),
            None => Ok(()),
        }
    }

    fn recenter(&mut self, viewport: Viewport) {
        if let Some(simulation) = self.simulation.as_mut() {
            let (x, y) = viewport.center();
            simulation.forces_mut().center = Some(CenterForce { x, y });
        }
    }

    fn draw(&mut self) -> ChartResult<()> {
        let Some(simulation) = self.simulation.as_mut() else {
            self.host.scene_mut().clear();
            return Ok(());
        };
        simulation.step();

        let config = &self.config;
        let colors = OrdinalScale::new(self.groups.iter().cloned(), config.palette()?);
        let link_color = config.link_color()?;
        let nodes = simulation.nodes();
        let scene = self.host.scene_mut();

        scene
            .layer_mut("links", LayerKind::Series)
            .bind_keyed(simulation.links().iter().enumerate().map(|(index, link)| {
                let (source, target) = (&nodes[link.source], &nodes[link.target]);
                (
                    RecordKey::Index(index),
                    Primitive::line(source.x, source.y, target.x, target.y)
                        .with_color(Attr::Stroke, link_color)
                        .with_number(Attr::StrokeWidth, link.value.max(0.0).sqrt()),
                )
            }));
        scene
            .layer_mut("nodes", LayerKind::Overlay)
            .bind_keyed(nodes.iter().zip(&self.groups).map(|(node, group)| {
                let fill = colors.get(group).copied().unwrap_or(Color::BLACK);
                (
                    RecordKey::Field(node.id.clone()),
                    Primitive::circle(node.x, node.y, config.node_radius)
                        .with_color(Attr::Fill, fill),
                )
            }));
        Ok(())
    }
}

impl ChartPage for ForceGraph {
    fn mount(&mut self, surface: Surface) {
        let viewport = surface.viewport();
        self.host.mount(surface, PAGE);
        self.recenter(viewport);
    }

    fn unmount(&mut self) -> Option<Surface> {
        self.drag.cancel();
        self.host.unmount(PAGE)
    }

    fn is_mounted(&self) -> bool {
        self.host.is_mounted()
    }

    fn resize(&mut self, viewport: Viewport) {
        self.host.resize(viewport);
        self.recenter(viewport);
    }

    fn render(&mut self, _now: Duration) -> ChartResult<()> {
        let Some(viewport) = self.host.viewport() else {
            return Ok(());
        };
        if !viewport.is_valid() {
            self.host.present_cleared();
            return Ok(());
        }
        self.draw()?;
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
