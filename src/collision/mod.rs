//! Input from collision detection. Detection itself happens outside the
//! solver; it hands over one [`Manifold`] per touching body pair.

pub mod manifold;

pub use manifold::{Manifold, ManifoldPoint, MAX_MANIFOLD_POINTS};
