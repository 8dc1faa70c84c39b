use vizbind::core::force::{CenterForce, LinkForce, ManyBodyForce};
use vizbind::core::{ForceSet, ForceSimulation, LinkSpec, SimNode, SimulationStatus};
use vizbind::interaction::DragController;

fn linked_pair() -> ForceSimulation {
    let forces = ForceSet {
        center: Some(CenterForce { x: 0.0, y: 0.0 }),
        many_body: Some(ManyBodyForce {
            strength: -50.0,
            ..ManyBodyForce::default()
        }),
        collide: None,
        link: Some(LinkForce {
            distance: 30.0,
            strength: None,
        }),
    };
    let links = [LinkSpec {
        source: "a".to_owned(),
        target: "b".to_owned(),
        value: 1.0,
    }];
    ForceSimulation::new(vec![SimNode::new("a"), SimNode::new("b")], &links, forces)
        .expect("valid simulation")
}

fn separation(simulation: &ForceSimulation) -> f64 {
    let nodes = simulation.nodes();
    ((nodes[1].x - nodes[0].x).powi(2) + (nodes[1].y - nodes[0].y).powi(2)).sqrt()
}

#[test]
fn linked_pair_converges_to_a_stable_separation() {
    let mut simulation = linked_pair();
    let steps = simulation.run(400);
    assert!(steps < 400);
    assert!(simulation.is_converged());

    let distance = separation(&simulation);
    assert!((25.0..45.0).contains(&distance), "separation {distance}");

    assert_eq!(simulation.step(), SimulationStatus::Converged);
    assert!((separation(&simulation) - distance).abs() < 1e-12);
}

#[test]
fn center_force_keeps_the_mean_on_the_center() {
    let mut simulation = linked_pair();
    simulation.run(50);
    let nodes = simulation.nodes();
    let mean_x = (nodes[0].x + nodes[1].x) / 2.0;
    let mean_y = (nodes[0].y + nodes[1].y) / 2.0;
    assert!(mean_x.abs() < 1.0 && mean_y.abs() < 1.0);
}

#[test]
fn dragging_reheats_and_releases() {
    let mut simulation = linked_pair();
    simulation.run(400);
    assert!(simulation.is_converged());

    let mut drag = DragController::default();
    drag.pointer_down(&mut simulation, 0, 100.0, 100.0).expect("pin");
    assert_eq!(simulation.step(), SimulationStatus::Running);
    assert!(simulation.alpha_target() > 0.0);
    drag.pointer_move(&mut simulation, 120.0, 80.0).expect("move");
    simulation.step();
    assert_eq!((simulation.nodes()[0].x, simulation.nodes()[0].y), (120.0, 80.0));

    drag.pointer_up(&mut simulation).expect("release");
    assert_eq!(simulation.alpha_target(), 0.0);
    assert!(!simulation.nodes()[0].is_pinned());
}
