//! Iterative force-directed layout.
//!
//! Each `step` cools `alpha` toward `alpha_target`, applies the configured
//! forces to node velocities and integrates positions. Pinned nodes (`fx`/`fy`)
//! are held in place. The simulation reports convergence once `alpha` drops
//! below `alpha_min`; callers redraw after every step.

use std::collections::HashMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ChartError, ChartResult};

const INITIAL_RADIUS: f64 = 10.0;

/// One graph vertex with position, velocity and optional pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub fx: Option<f64>,
    pub fy: Option<f64>,
}

impl SimNode {
    /// Unplaced node; the simulation seeds its position on a phyllotaxis spiral.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: f64::NAN,
            y: f64::NAN,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
        }
    }

    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

/// Edge between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub source: String,
    pub target: String,
    #[serde(default = "default_link_value")]
    pub value: f64,
}

fn default_link_value() -> f64 {
    1.0
}

/// Edge resolved to node indices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterForce {
    pub x: f64,
    pub y: f64,
}

/// Pairwise charge; negative strength repels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManyBodyForce {
    pub strength: f64,
    pub distance_min: f64,
}

impl Default for ManyBodyForce {
    fn default() -> Self {
        Self {
            strength: -30.0,
            distance_min: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollideForce {
    pub radius: f64,
    pub strength: f64,
}

/// Spring along each link. Strength defaults to `1 / min(degree(source), degree(target))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkForce {
    pub distance: f64,
    pub strength: Option<f64>,
}

impl Default for LinkForce {
    fn default() -> Self {
        Self {
            distance: 30.0,
            strength: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForceSet {
    pub center: Option<CenterForce>,
    pub many_body: Option<ManyBodyForce>,
    pub collide: Option<CollideForce>,
    pub link: Option<LinkForce>,
}

/// Cooling schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooling {
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub velocity_decay: f64,
}

impl Default for Cooling {
    fn default() -> Self {
        let alpha_min = 0.001;
        Self {
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationStatus {
    Running,
    Converged,
}

/// Deterministic linear congruential generator used to break exact overlaps.
#[derive(Debug, Clone, Copy)]
struct Lcg(u64);

impl Lcg {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 4_294_967_296;

    fn next(&mut self) -> f64 {
        self.0 = (Self::A * self.0 + Self::C) % Self::M;
        self.0 as f64 / Self::M as f64
    }

    fn jiggle(&mut self) -> f64 {
        (self.next() - 0.5) * 1e-6
    }
}

#[derive(Debug, Clone)]
pub struct ForceSimulation {
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    index_by_id: HashMap<String, usize>,
    forces: ForceSet,
    cooling: Cooling,
    alpha: f64,
    alpha_target: f64,
    status: SimulationStatus,
    steps: u64,
    random: Lcg,
}

impl ForceSimulation {
    pub fn new(nodes: Vec<SimNode>, links: &[LinkSpec], forces: ForceSet) -> ChartResult<Self> {
        let mut index_by_id = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if index_by_id.insert(node.id.clone(), index).is_some() {
                return Err(ChartError::InvalidData(format!(
                    "duplicate node id `{}`",
                    node.id
                )));
            }
        }

        let links = links
            .iter()
            .map(|link| {
                let resolve = |id: &str| {
                    index_by_id.get(id).copied().ok_or_else(|| {
                        ChartError::InvalidData(format!("link references unknown node `{id}`"))
                    })
                };
                Ok(SimLink {
                    source: resolve(&link.source)?,
                    target: resolve(&link.target)?,
                    value: link.value,
                })
            })
            .collect::<ChartResult<Vec<_>>>()?;

        let mut simulation = Self {
            nodes,
            links,
            index_by_id,
            forces,
            cooling: Cooling::default(),
            alpha: 1.0,
            alpha_target: 0.0,
            status: SimulationStatus::Running,
            steps: 0,
            random: Lcg(1),
        };
        simulation.seed_positions();
        debug!(
            nodes = simulation.nodes.len(),
            links = simulation.links.len(),
            "force simulation created"
        );
        Ok(simulation)
    }

    #[must_use]
    pub fn with_cooling(mut self, cooling: Cooling) -> Self {
        self.cooling = cooling;
        self
    }

    fn seed_positions(&mut self) {
        let initial_angle = PI * (3.0 - 5f64.sqrt());
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if let Some(fx) = node.fx {
                node.x = fx;
            }
            if let Some(fy) = node.fy {
                node.y = fy;
            }
            if !node.x.is_finite() || !node.y.is_finite() {
                let radius = INITIAL_RADIUS * (0.5 + index as f64).sqrt();
                let angle = index as f64 * initial_angle;
                node.x = radius * angle.cos();
                node.y = radius * angle.sin();
            }
            if !node.vx.is_finite() || !node.vy.is_finite() {
                node.vx = 0.0;
                node.vy = 0.0;
            }
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    #[must_use]
    pub fn links(&self) -> &[SimLink] {
        &self.links
    }

    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    #[must_use]
    pub fn forces(&self) -> &ForceSet {
        &self.forces
    }

    pub fn forces_mut(&mut self) -> &mut ForceSet {
        &mut self.forces
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[must_use]
    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    #[must_use]
    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.status == SimulationStatus::Converged
    }

    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn set_alpha_target(&mut self, alpha_target: f64) {
        self.alpha_target = alpha_target.clamp(0.0, 1.0);
    }

    /// Resumes stepping after convergence without resetting `alpha`.
    pub fn restart(&mut self) {
        self.status = SimulationStatus::Running;
    }

    /// Fixes a node at `(x, y)` until `unpin`.
    pub fn pin(&mut self, index: usize, x: f64, y: f64) -> ChartResult<()> {
        let node = self.node_mut(index)?;
        node.fx = Some(x);
        node.fy = Some(y);
        Ok(())
    }

    pub fn unpin(&mut self, index: usize) -> ChartResult<()> {
        let node = self.node_mut(index)?;
        node.fx = None;
        node.fy = None;
        Ok(())
    }

    fn node_mut(&mut self, index: usize) -> ChartResult<&mut SimNode> {
        self.nodes
            .get_mut(index)
            .ok_or_else(|| ChartError::InvalidData(format!("node index {index} out of bounds")))
    }

    /// Advances one tick. A converged simulation stays idle until `restart`.
    pub fn step(&mut self) -> SimulationStatus {
        if self.status == SimulationStatus::Converged {
            return self.status;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.cooling.alpha_decay;
        let alpha = self.alpha;

        if let Some(center) = self.forces.center {
            self.apply_center(center);
        }
        if let Some(many_body) = self.forces.many_body {
            self.apply_many_body(many_body, alpha);
        }
        if let Some(collide) = self.forces.collide {
            self.apply_collide(collide);
        }
        if let Some(link) = self.forces.link {
            self.apply_link(link, alpha);
        }

        let keep = 1.0 - self.cooling.velocity_decay;
        for node in &mut self.nodes {
            match node.fx {
                Some(fx) => {
                    node.x = fx;
                    node.vx = 0.0;
                }
                None => {
                    node.vx *= keep;
                    node.x += node.vx;
                }
            }
            match node.fy {
                Some(fy) => {
                    node.y = fy;
                    node.vy = 0.0;
                }
                None => {
                    node.vy *= keep;
                    node.y += node.vy;
                }
            }
        }

        self.steps += 1;
        trace!(step = self.steps, alpha = self.alpha, "force step");
        if self.alpha < self.cooling.alpha_min {
            self.status = SimulationStatus::Converged;
            debug!(steps = self.steps, "force simulation converged");
        }
        self.status
    }

    /// Steps until convergence or `max_steps`, returning the steps taken.
    pub fn run(&mut self, max_steps: usize) -> usize {
        let mut taken = 0;
        while taken < max_steps && self.step() == SimulationStatus::Running {
            taken += 1;
        }
        taken
    }

    fn apply_center(&mut self, center: CenterForce) {
        if self.nodes.is_empty() {
            return;
        }
        let count = self.nodes.len() as f64;
        let (sum_x, sum_y) = self
            .nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
        let shift_x = sum_x / count - center.x;
        let shift_y = sum_y / count - center.y;
        for node in &mut self.nodes {
            node.x -= shift_x;
            node.y -= shift_y;
        }
    }

    fn apply_many_body(&mut self, force: ManyBodyForce, alpha: f64) {
        let distance_min2 = force.distance_min * force.distance_min;
        let count = self.nodes.len();
        for i in 0..count {
            let (mut dvx, mut dvy) = (0.0, 0.0);
            for j in 0..count {
                if i == j {
                    continue;
                }
                let mut x = self.nodes[j].x - self.nodes[i].x;
                let mut y = self.nodes[j].y - self.nodes[i].y;
                let mut l = x * x + y * y;
                if x == 0.0 {
                    x = self.random.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.random.jiggle();
                    l += y * y;
                }
                if l < distance_min2 {
                    l = (distance_min2 * l).sqrt();
                }
                let w = force.strength * alpha / l;
                dvx += x * w;
                dvy += y * w;
            }
            self.nodes[i].vx += dvx;
            self.nodes[i].vy += dvy;
        }
    }

    fn apply_collide(&mut self, force: CollideForce) {
        let radius = force.radius;
        let radius2 = radius * radius;
        let reach = radius + radius;
        let count = self.nodes.len();
        for i in 0..count {
            let xi = self.nodes[i].x + self.nodes[i].vx;
            let yi = self.nodes[i].y + self.nodes[i].vy;
            for j in (i + 1)..count {
                let mut x = xi - self.nodes[j].x - self.nodes[j].vx;
                let mut y = yi - self.nodes[j].y - self.nodes[j].vy;
                let mut l = x * x + y * y;
                if l >= reach * reach {
                    continue;
                }
                if x == 0.0 {
                    x = self.random.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.random.jiggle();
                    l += y * y;
                }
                let distance = l.sqrt();
                let push = (reach - distance) / distance * force.strength;
                x *= push;
                y *= push;
                let share = radius2 / (radius2 + radius2);
                self.nodes[i].vx += x * share;
                self.nodes[i].vy += y * share;
                self.nodes[j].vx -= x * (1.0 - share);
                self.nodes[j].vy -= y * (1.0 - share);
            }
        }
    }

    fn apply_link(&mut self, force: LinkForce, alpha: f64) {
        let mut degree = vec![0usize; self.nodes.len()];
        for link in &self.links {
            degree[link.source] += 1;
            degree[link.target] += 1;
        }

        for link_index in 0..self.links.len() {
            let SimLink { source, target, .. } = self.links[link_index];
            let (ds, dt) = (degree[source] as f64, degree[target] as f64);
            let strength = force.strength.unwrap_or_else(|| 1.0 / ds.min(dt));
            let bias = ds / (ds + dt);

            let (s, t) = (&self.nodes[source], &self.nodes[target]);
            let mut x = t.x + t.vx - s.x - s.vx;
            let mut y = t.y + t.vy - s.y - s.vy;
            if x == 0.0 {
                x = self.random.jiggle();
            }
            if y == 0.0 {
                y = self.random.jiggle();
            }
            let length = (x * x + y * y).sqrt();
            let pull = (length - force.distance) / length * alpha * strength;
            x *= pull;
            y *= pull;

            self.nodes[target].vx -= x * bias;
            self.nodes[target].vy -= y * bias;
            self.nodes[source].vx += x * (1.0 - bias);
            self.nodes[source].vy += y * (1.0 - bias);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CenterForce, ForceSet, ForceSimulation, LinkSpec, SimNode, SimulationStatus};

    #[test]
    fn nodes_are_seeded_on_a_spiral() {
        let simulation = ForceSimulation::new(
            vec![SimNode::new("a"), SimNode::new("b").at(5.0, 6.0)],
            &[],
            ForceSet::default(),
        )
        .expect("valid simulation");
        let nodes = simulation.nodes();
        assert!((nodes[0].x - 10.0 * 0.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(nodes[0].y, 0.0);
        assert_eq!((nodes[1].x, nodes[1].y), (5.0, 6.0));
    }

    #[test]
    fn unknown_link_ids_are_rejected() {
        let links = [LinkSpec {
            source: "a".to_owned(),
            target: "z".to_owned(),
            value: 1.0,
        }];
        let nodes = vec![SimNode::new("a")];
        assert!(ForceSimulation::new(nodes, &links, ForceSet::default()).is_err());
    }

    #[test]
    fn pinned_node_keeps_its_position() {
        let forces = ForceSet {
            center: Some(CenterForce { x: 100.0, y: 100.0 }),
            ..ForceSet::default()
        };
        let nodes = vec![SimNode::new("a"), SimNode::new("b")];
        let mut simulation =
            ForceSimulation::new(nodes, &[], forces).expect("valid simulation");
        simulation.pin(0, 3.0, 4.0).expect("valid simulation");
        for _ in 0..10 {
            simulation.step();
        }
        assert_eq!((simulation.nodes()[0].x, simulation.nodes()[0].y), (3.0, 4.0));
    }

    #[test]
    fn converged_simulation_is_idle_until_restart() {
        let mut simulation = ForceSimulation::new(vec![SimNode::new("a")], &[], ForceSet::default())
            .expect("valid simulation");
        simulation.run(1_000);
        assert!(simulation.is_converged());
        let steps = simulation.steps();
        assert_eq!(simulation.step(), SimulationStatus::Converged);
        assert_eq!(simulation.steps(), steps);

        simulation.set_alpha_target(0.3);
        simulation.restart();
        assert_eq!(simulation.step(), SimulationStatus::Running);
    }
}
