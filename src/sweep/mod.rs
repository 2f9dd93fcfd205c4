//! Asset sweep subsystem.
//!
//! # Data Flow
//! ```text
//! watcher.rs (block heights, mpsc)
//!     → orchestrator.rs (one serialized cycle per height)
//!         → bundle.rs (plan + sign [funding, transfers...])
//!         → relay (simulate, send)
//!         → resolution.rs (included / passed / nonce too high)
//! ```

pub mod assets;
pub mod bundle;
pub mod error;
pub mod orchestrator;
pub mod resolution;
pub mod watcher;

pub use assets::AssetDescriptor;
pub use bundle::{BundlePlan, Origin, PlannedTransaction, SweepPlan};
pub use error::{SweepError, SweepResult};
pub use orchestrator::{CycleOutcome, Orchestrator, SimulationVerdict, SweepExit};
pub use resolution::{wait_for_resolution, ResolutionOptions};
pub use watcher::BlockWatcher;
