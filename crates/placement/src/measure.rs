use serde::{Deserialize, Serialize};

use crate::error::PlacementError;

/// A named physical scalar in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    pub value: f64,
}

impl Measurement {
    /// A size: must be finite and strictly positive.
    pub fn length(name: impl Into<String>, value: f64) -> Result<Self, PlacementError> {
        let name = name.into();
        check_positive(&name, value)?;
        Ok(Self { name, value })
    }

    /// A signed offset: must be finite.
    pub fn offset(name: impl Into<String>, value: f64) -> Result<Self, PlacementError> {
        let name = name.into();
        check_finite(&name, value)?;
        Ok(Self { name, value })
    }

    pub fn get(&self) -> f64 {
        self.value
    }
}

/// Reject NaN and infinities.
pub fn check_finite(name: &str, value: f64) -> Result<f64, PlacementError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PlacementError::InvalidMeasurement {
            name: name.to_string(),
            value,
            reason: "must be finite".to_string(),
        })
    }
}

/// Reject anything that is not a finite, strictly positive size.
pub fn check_positive(name: &str, value: f64) -> Result<f64, PlacementError> {
    check_finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(PlacementError::InvalidMeasurement {
            name: name.to_string(),
            value,
            reason: "must be positive".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_rejects_zero_and_negative() {
        assert!(Measurement::length("pcb_width", 0.0).is_err());
        let err = Measurement::length("pcb_width", -3.0).unwrap_err();
        match err {
            PlacementError::InvalidMeasurement { name, .. } => assert_eq!(name, "pcb_width"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn offset_accepts_negative_but_not_nan() {
        assert_eq!(Measurement::offset("scart_drop", -25.0).unwrap().get(), -25.0);
        assert!(Measurement::offset("scart_drop", f64::NAN).is_err());
        assert!(Measurement::offset("scart_drop", f64::INFINITY).is_err());
    }
}
