use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::ForceSimulation;
use crate::error::ChartResult;

/// Alpha target applied while a node is held, keeping the layout warm.
pub const DEFAULT_DRAG_ALPHA_TARGET: f64 = 0.7;

/// Pointer drag over force-layout nodes.
///
/// While a drag is active the held node is pinned to the pointer, so
/// simulation steps never move it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragController {
    alpha_target: f64,
    active: Option<usize>,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_ALPHA_TARGET)
    }
}

impl DragController {
    #[must_use]
    pub fn new(alpha_target: f64) -> Self {
        Self {
            alpha_target,
            active: None,
        }
    }

    #[must_use]
    pub fn active_node(&self) -> Option<usize> {
        self.active
    }

    pub fn pointer_down(
        &mut self,
        simulation: &mut ForceSimulation,
        node: usize,
        x: f64,
        y: f64,
    ) -> ChartResult<()> {
        simulation.pin(node, x, y)?;
        if self.active.is_none() {
            simulation.set_alpha_target(self.alpha_target);
            simulation.restart();
        }
        debug!(node, x, y, "drag started");
        self.active = Some(node);
        Ok(())
    }

    /// Moves the held node; returns `false` when no drag is active.
    pub fn pointer_move(
        &mut self,
        simulation: &mut ForceSimulation,
        x: f64,
        y: f64,
    ) -> ChartResult<bool> {
        match self.active {
            Some(node) => {
                simulation.pin(node, x, y)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn pointer_up(&mut self, simulation: &mut ForceSimulation) -> ChartResult<()> {
        let Some(node) = self.active.take() else {
            return Ok(());
        };
        simulation.set_alpha_target(0.0);
        simulation.unpin(node)?;
        debug!(node, "drag ended");
        Ok(())
    }

    /// Drops drag state without touching a simulation, e.g. on unmount.
    pub fn cancel(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::DragController;
    use crate::core::{ForceSet, ForceSimulation, SimNode};

    fn simulation() -> ForceSimulation {
        ForceSimulation::new(
            vec![SimNode::new("a"), SimNode::new("b")],
            &[],
            ForceSet::default(),
        )
        .expect("valid simulation")
    }

    #[test]
    fn drag_pins_reheats_and_releases() {
        let mut simulation = simulation();
        simulation.run(1_000);
        assert!(simulation.is_converged());

        let mut drag = DragController::default();
        drag.pointer_down(&mut simulation, 1, 40.0, 50.0).expect("pin");
        assert!(!simulation.is_converged());
        assert_eq!(simulation.alpha_target(), 0.7);

        assert!(drag.pointer_move(&mut simulation, 45.0, 55.0).expect("move"));
        simulation.step();
        let held = &simulation.nodes()[1];
        assert_eq!((held.x, held.y), (45.0, 55.0));

        drag.pointer_up(&mut simulation).expect("release");
        assert!(!simulation.nodes()[1].is_pinned());
        assert_eq!(simulation.alpha_target(), 0.0);
        assert!(!drag.pointer_move(&mut simulation, 0.0, 0.0).expect("idle move"));
    }
}
