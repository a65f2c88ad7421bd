pub mod clearance;
pub mod roles;
pub mod shape;
pub mod topo;

pub use clearance::*;
pub use roles::*;
pub use shape::*;
pub use topo::*;
