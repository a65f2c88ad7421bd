use serde::{Deserialize, Serialize};

/// Mechanical fit class for a hole or slot that receives a mating part.
///
/// The allowance is added to the nominal dimension of the mating part so it
/// seats with the intended amount of friction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearanceClass {
    /// Press/friction fit: 0.005 in (0.127 mm).
    Tight,
    /// Slip fit: 0.010 in (0.254 mm).
    #[default]
    Standard,
    /// Free fit: 0.020 in (0.508 mm).
    Loose,
}

impl ClearanceClass {
    /// Allowance in millimetres added to a nominal dimension.
    pub fn allowance(self) -> f64 {
        match self {
            ClearanceClass::Tight => 0.127,
            ClearanceClass::Standard => 0.254,
            ClearanceClass::Loose => 0.508,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ClearanceClass::Tight => "tight",
            ClearanceClass::Standard => "standard",
            ClearanceClass::Loose => "loose",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowances_double_per_class() {
        assert_eq!(ClearanceClass::Tight.allowance(), 0.127);
        assert_eq!(ClearanceClass::Standard.allowance(), 0.254);
        assert_eq!(ClearanceClass::Loose.allowance(), 0.508);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ClearanceClass::Loose).unwrap();
        assert_eq!(json, "\"loose\"");
        let parsed: ClearanceClass = serde_json::from_str("\"tight\"").unwrap();
        assert_eq!(parsed, ClearanceClass::Tight);
    }
}
