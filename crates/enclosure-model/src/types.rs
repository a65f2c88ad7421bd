use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The separately printed parts of the enclosure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartName {
    /// Stand-in for the circuit board itself, used for fit checks.
    Pcb,
    Case,
    Lid,
    HdmiHolder,
    HdmiHolderPlank,
}

impl PartName {
    /// Build order.
    pub const ALL: [PartName; 5] = [
        PartName::Pcb,
        PartName::Case,
        PartName::Lid,
        PartName::HdmiHolder,
        PartName::HdmiHolderPlank,
    ];
}

/// One entry of the build log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildStep {
    pub id: Uuid,
    pub part: PartName,
    /// What the step made, e.g. `pillar.front_left` or `rca_audio_1`.
    pub name: String,
}

/// Errors from configuring or building the enclosure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error("placement error: {0}")]
    Placement(#[from] placement::PlacementError),

    #[error("kernel error: {0}")]
    KernelError(#[from] enclosure_kernel::KernelError),

    #[error("operation error: {0}")]
    OpError(#[from] modeling_ops::OpError),

    #[error("feature `{label}` does not fit on {face}: {reason}")]
    FeatureOutsideFace {
        label: String,
        face: String,
        reason: String,
    },

    #[error("part {part:?} has no face tagged {tag}")]
    MissingTag { part: PartName, tag: String },

    #[error("build failed at step {step}: {reason}")]
    BuildFailed { step: String, reason: String },
}
