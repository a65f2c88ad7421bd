pub mod boolean;
pub mod chamfer;
pub mod diff;
pub mod extrude;
pub mod fillet;
pub mod kernel_ext;
pub mod sketch;
pub mod types;

pub use boolean::{execute_boolean, BooleanKind};
pub use chamfer::execute_chamfer;
pub use diff::{signature_similarity, snapshot, DiffResult, TopoSnapshot};
pub use extrude::{execute_extrude, execute_extrude_into};
pub use fillet::execute_fillet;
pub use kernel_ext::KernelBundle;
pub use sketch::execute_sketch;
pub use types::*;
