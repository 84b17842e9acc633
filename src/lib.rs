//! Fixed-topology feed-forward network used as the decision function of an
//! evolved game agent, with the seeded random source that initializes and
//! mutates it.
//!
//! ```
//! use flap_brain::{Network, RandomSource};
//!
//! let mut rng = RandomSource::new(42);
//! let mut net = Network::new(&mut rng).unwrap();
//! net.set_inputs(&[0.2, -0.4, 0.1, 0.9]);
//! net.process_fast();
//! let flap = net.get_output(0) > 0.5;
//! # let _ = flap;
//! net.mutate(&mut rng);
//! ```

pub mod config;
pub mod error;
pub mod evolution;
pub mod lanes;
pub mod logging;
pub mod network;
pub mod propagate;
pub mod random;
pub mod training;

pub use config::{ConfigError, EvolutionConfig};
pub use error::NetworkError;
pub use evolution::{GenerationStats, Individual, Population};
pub use network::{LayerSizes, Mutation, Network, Parameter};
pub use propagate::{Propagation, Propagator, Reference, Vectorized, sigmoid};
pub use random::RandomSource;
