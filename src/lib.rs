//! Minimum-time tyre strategy for a fixed-length race.
//!
//! Each compound's lap time grows linearly with tyre age. [`StrategySolver`]
//! runs a memoized search over [`RaceState`]: on every lap it either stays
//! out or pits for a fresh set, and the race must finish having used at
//! least two different compounds. The stored decisions are then walked
//! forward to give the lap-by-lap plan.
//!
//! ```
//! use tyre_strategy::{StrategySolver, TyreLaw};
//!
//! let laws = vec![
//!     TyreLaw::new("SOFT", 0.10, 90.0),
//!     TyreLaw::new("MEDIUM", 0.05, 91.0),
//!     TyreLaw::new("HARD", 0.02, 92.0),
//! ];
//! let mut solver = StrategySolver::from_laws(&laws, 10, 20.0).unwrap();
//! let strategy = solver.optimal_strategy().unwrap();
//! assert_eq!(strategy.decisions.len(), 10);
//! assert_eq!(strategy.pit_stops(), 1);
//! ```

pub mod compound;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod state;
pub mod strategy;

pub use compound::{Compound, CompoundSet};
pub use config::RaceConfig;
pub use error::{Result, StrategyError};
pub use model::{TyreLaw, TyreModel};
pub use state::{Action, Decision, RaceState};
pub use strategy::{Stint, Strategy, StrategySolver};
