//! Parametric enclosure model.
//!
//! Turns an [`EnclosureConfig`] into five solids (board, case, lid, HDMI
//! holder and its plank) on any [`KernelBundle`]. Every feature is placed
//! in a named reference frame, and the faces later steps depend on are
//! tagged when they are created and followed through every boolean.

pub mod build;
pub mod config;
pub mod frames;
pub mod layout;
pub mod tags;
pub mod types;

use modeling_ops::KernelBundle;

pub use build::{EnclosureBuilder, EnclosureModel, Part};
pub use config::EnclosureConfig;
pub use frames::EnclosureFrames;
pub use layout::EnclosureLayout;
pub use tags::{FaceTag, TagRegistry};
pub use types::{BuildStep, EngineError, PartName};

/// Validate `config` and build the whole enclosure.
pub fn build_enclosure(
    config: EnclosureConfig,
    kb: &mut dyn KernelBundle,
) -> Result<EnclosureModel, EngineError> {
    EnclosureBuilder::new(config)?.build(kb)
}
