use enclosure_types::ClearanceClass;

use crate::error::PlacementError;
use crate::measure::check_positive;

/// Widen a nominal hole or slot dimension by the allowance of `class`.
pub fn clearance_adjusted_size(nominal: f64, class: ClearanceClass) -> Result<f64, PlacementError> {
    check_positive("nominal_size", nominal)?;
    Ok(nominal + class.allowance())
}
