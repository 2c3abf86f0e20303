pub mod fusion;
pub mod persistence;
pub mod store;
pub mod types;

pub use fusion::{FusionEngine, FusionError};
pub use persistence::{PersistenceConfig, PersistenceError, PersistenceSink};
pub use store::StateStore;
pub use types::*;
