//! N-body simulation specifications
//!
//! Galacticus merger trees are often extracted from N-body simulations. A
//! [Simulation] records the cosmology, volume and particle content of one
//! of these along with its table of snapshot redshifts, so that snapshot
//! numbers and redshifts can be converted back and forth.
//!
//! ```rust
//! # use galtools_simulations::SimulationBox;
//! let cube = SimulationBox::cube(62.5, "Mpc/h");
//! let (x, _, _) = cube.wrap(&[-0.5, 10.0], &[0.0, 0.0], &[0.0, 0.0]);
//! assert_eq!(x, vec![62.0, 10.0]);
//! ```

// Modules
mod error;
mod simulation;
mod simulation_box;

// Flatten
pub use error::{Error, Result};
pub use simulation::{
    Measure, Particles, Simulation, SimulationCosmology, Snapshot, MISSING_SNAPSHOT,
};
pub use simulation_box::SimulationBox;
