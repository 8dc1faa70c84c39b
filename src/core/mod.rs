pub mod binder;
pub mod dataset;
pub mod date;
pub mod force;
pub mod primitives;
pub mod scale;
pub mod types;

pub use binder::{Join, reconcile};
pub use dataset::{Dataset, Record, RecordKey, Value};
pub use force::{ForceSet, ForceSimulation, LinkSpec, SimNode, SimulationStatus};
pub use scale::{BandScale, ContinuousScale, LinearScale, LogScale, OrdinalScale, TimeScale};
pub use types::{Margins, PlotArea, Viewport};
