pub mod island;
pub mod islands;
pub mod physics_world;

pub use island::{IslandReport, IslandSolver};
pub use islands::{build_islands, Island};
pub use physics_world::{PhysicsWorld, StepReport};
