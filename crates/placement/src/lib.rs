//! Parametric placement calculator.
//!
//! Turns named physical measurements into absolute positions of the features
//! (holes, cutouts, pillars) cut into or added onto an enclosure. Everything
//! here is pure arithmetic; solids are built elsewhere from the results.

pub mod clearance;
pub mod error;
pub mod frame;
pub mod frame_tree;
pub mod layout;
pub mod measure;
pub mod placement;

pub use clearance::clearance_adjusted_size;
pub use error::PlacementError;
pub use frame::{frame_compose, ReferenceFrame, FRAME_TOLERANCE};
pub use frame_tree::FrameTree;
pub use layout::{
    board_hole_locations, connector_count, connector_row_2d, linear_connector_row, BoardOutline,
    Corner, CornerHole,
};
pub use measure::Measurement;
pub use placement::FeaturePlacement;
