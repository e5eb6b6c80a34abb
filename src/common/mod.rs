pub mod material;
pub mod pool;
pub mod settings;

pub use material::{mix_friction, mix_restitution, Material};
pub use pool::{Scratch, ScratchGuard, ScratchPool};
pub use settings::SolverSettings;
