/// Errors from placement arithmetic. Every variant names the measurement or
/// frame that was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlacementError {
    #[error("invalid measurement `{name}` = {value}: {reason}")]
    InvalidMeasurement {
        name: String,
        value: f64,
        reason: String,
    },

    #[error("invalid count for `{name}`: {count}")]
    InvalidCount { name: String, count: i64 },

    #[error("invalid reference frame `{name}`: {reason}")]
    InvalidFrame { name: String, reason: String },

    #[error("unknown reference frame `{name}`")]
    UnknownFrame { name: String },

    #[error("reference frame `{name}` is already defined")]
    DuplicateFrame { name: String },

    #[error("reference frame cycle: {}", chain.join(" -> "))]
    FrameCycle { chain: Vec<String> },
}
