//! Enclosure measurements.
//!
//! Every dimension lives in one immutable [`EnclosureConfig`], built once from
//! defaults or JSON and validated before anything is derived from it. All
//! values are millimetres.

use enclosure_types::ClearanceClass;
use placement::{connector_count, Measurement, PlacementError};
use serde::{Deserialize, Serialize};

use crate::types::EngineError;

/// All measurements of the enclosure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnclosureConfig {
    pub board: BoardSpec,
    pub case: CaseSpec,
    pub rca: RcaSpec,
    pub vga: VgaSpec,
    pub scart: ScartSpec,
    pub hdmi_holder: HdmiHolderSpec,
    pub lid: LidSpec,
}

/// The circuit board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSpec {
    /// Along x.
    pub width: f64,
    /// Along y, front edge at -y.
    pub length: f64,
    pub thickness: f64,
    pub hole_diameter: f64,
    /// Distance from each board edge to the mounting-hole centres.
    pub hole_inset: f64,
}

impl Default for BoardSpec {
    fn default() -> Self {
        Self {
            width: 117.0,
            length: 101.0,
            thickness: 1.68,
            hole_diameter: 3.5,
            hole_inset: 3.75,
        }
    }
}

/// The open case box the board sits in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseSpec {
    /// Total gap between board edge and inner wall, split over both sides.
    pub side_gap: f64,
    /// Wall and floor thickness.
    pub shell_thickness: f64,
    /// Gap between floor top and board bottom; also the pillar height.
    pub bottom_gap: f64,
    /// From floor bottom to the rim the lid rests on.
    pub height: f64,
    /// Pillar wall around the board hole radius.
    pub pillar_wall: f64,
}

impl Default for CaseSpec {
    fn default() -> Self {
        Self {
            side_gap: 5.0,
            shell_thickness: 5.0,
            bottom_gap: 5.0,
            height: 50.0,
            pillar_wall: 2.0,
        }
    }
}

/// RCA jacks on the board's front edge: a video row left of the reference
/// jack, an audio row to its right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RcaSpec {
    pub jack_diameter: f64,
    /// Added to the jack diameter for the cutout.
    pub hole_margin: f64,
    /// Centre to centre.
    pub pitch: f64,
    /// From the board's right edge to the reference jack's far side.
    pub right_edge_inset: f64,
    /// Height of the jack tops above the board bottom.
    pub top_height: f64,
    pub video_count: i64,
    pub audio_count: i64,
}

impl Default for RcaSpec {
    fn default() -> Self {
        Self {
            jack_diameter: 8.3,
            hole_margin: 1.0,
            pitch: 22.1 - 8.3,
            right_edge_inset: 39.6,
            top_height: 12.2,
            video_count: 3,
            audio_count: 2,
        }
    }
}

/// VGA socket on the board's front edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VgaSpec {
    pub width: f64,
    /// Height of the socket top above the board bottom.
    pub top_height: f64,
    /// From the board's left edge to the socket's right side.
    pub right_side_from_left_edge: f64,
}

impl Default for VgaSpec {
    fn default() -> Self {
        Self {
            width: 31.0,
            top_height: 14.2,
            right_side_from_left_edge: 44.5,
        }
    }
}

/// SCART socket on the board's left edge.
///
/// The offsets were tuned on printed parts, not derived; re-measure them
/// against the real socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScartSpec {
    pub width: f64,
    pub height: f64,
    /// Along the left face, towards the board front.
    pub horizontal_offset: f64,
    /// Upwards from the middle of the board edge.
    pub vertical_offset: f64,
}

impl Default for ScartSpec {
    fn default() -> Self {
        Self {
            width: 47.2,
            height: 16.5,
            horizontal_offset: 0.0,
            vertical_offset: 25.0,
        }
    }
}

/// Holder block for an HDMI adapter, with its retaining plank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HdmiHolderSpec {
    pub width: f64,
    pub length: f64,
    pub thickness: f64,
    /// Nominal adapter body width.
    pub adapter_width: f64,
    /// Fit of the adapter in the hollow.
    pub fit: ClearanceClass,
    pub hollow_depth: f64,
    /// Width of the adapter's narrow neck.
    pub neck_width: f64,
    /// Extent of the neck along the holder.
    pub neck_length: f64,
    /// Neck centre, measured from the holder's front end. Tuned by fitting.
    pub neck_position: f64,
    /// Height of the neck ledges above the holder bottom.
    pub neck_height: f64,
    pub audio_hole_width: f64,
    pub audio_hole_length: f64,
    /// Gap between the audio screw block and the hollow.
    pub audio_near_pcb_width: f64,
    /// The plank is this much narrower than the adapter.
    pub plank_margin: f64,
}

impl Default for HdmiHolderSpec {
    fn default() -> Self {
        Self {
            width: 36.0,
            length: 52.0,
            thickness: 8.0,
            adapter_width: 31.56,
            fit: ClearanceClass::Standard,
            hollow_depth: 6.0,
            neck_width: 13.1,
            neck_length: 9.0,
            neck_position: 36.9,
            neck_height: 3.4 + 2.0,
            audio_hole_width: 6.6,
            audio_hole_length: 13.0,
            audio_near_pcb_width: 2.76,
            plank_margin: 5.0,
        }
    }
}

/// The lid resting on the case rim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LidSpec {
    /// Defaults to the case shell thickness.
    pub thickness: Option<f64>,
    /// Round the lid's top edges with this radius.
    pub edge_fillet: Option<f64>,
}

impl EnclosureConfig {
    /// Parse a (possibly partial) JSON configuration and validate it.
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EnclosureConfig =
            serde_json::from_str(json).map_err(|e| EngineError::Config {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Config {
            reason: e.to_string(),
        })
    }

    /// Check every measurement, failing on the first bad one by name.
    pub fn validate(&self) -> Result<(), EngineError> {
        let b = &self.board;
        for (name, value) in [
            ("board.width", b.width),
            ("board.length", b.length),
            ("board.thickness", b.thickness),
            ("board.hole_diameter", b.hole_diameter),
            ("board.hole_inset", b.hole_inset),
        ] {
            Measurement::length(name, value)?;
        }
        if b.hole_inset >= b.width.min(b.length) / 2.0 {
            return Err(invalid(
                "board.hole_inset",
                b.hole_inset,
                "holes must sit inside the board",
            ));
        }
        if b.hole_diameter / 2.0 >= b.hole_inset {
            return Err(invalid(
                "board.hole_diameter",
                b.hole_diameter,
                "hole would cut through the board edge",
            ));
        }

        let c = &self.case;
        for (name, value) in [
            ("case.side_gap", c.side_gap),
            ("case.shell_thickness", c.shell_thickness),
            ("case.bottom_gap", c.bottom_gap),
            ("case.height", c.height),
            ("case.pillar_wall", c.pillar_wall),
        ] {
            Measurement::length(name, value)?;
        }
        if c.height <= c.shell_thickness + c.bottom_gap + b.thickness {
            return Err(invalid(
                "case.height",
                c.height,
                "case must be taller than floor, pillars and board",
            ));
        }

        let r = &self.rca;
        for (name, value) in [
            ("rca.jack_diameter", r.jack_diameter),
            ("rca.right_edge_inset", r.right_edge_inset),
            ("rca.top_height", r.top_height),
        ] {
            Measurement::length(name, value)?;
        }
        Measurement::offset("rca.hole_margin", r.hole_margin)?;
        Measurement::offset("rca.pitch", r.pitch)?;
        Measurement::length("rca.hole_diameter", r.jack_diameter + r.hole_margin)?;
        connector_count("rca.video_count", r.video_count)?;
        connector_count("rca.audio_count", r.audio_count)?;

        let v = &self.vga;
        Measurement::length("vga.width", v.width)?;
        Measurement::offset("vga.right_side_from_left_edge", v.right_side_from_left_edge)?;
        Measurement::length("vga.top_height", v.top_height)?;
        if v.top_height <= b.thickness {
            return Err(invalid(
                "vga.top_height",
                v.top_height,
                "socket top must be above the board top",
            ));
        }

        let s = &self.scart;
        Measurement::length("scart.width", s.width)?;
        Measurement::length("scart.height", s.height)?;
        Measurement::offset("scart.horizontal_offset", s.horizontal_offset)?;
        Measurement::offset("scart.vertical_offset", s.vertical_offset)?;

        self.validate_holder()?;

        if let Some(t) = self.lid.thickness {
            Measurement::length("lid.thickness", t)?;
        }
        if let Some(r) = self.lid.edge_fillet {
            Measurement::length("lid.edge_fillet", r)?;
        }
        Ok(())
    }

    fn validate_holder(&self) -> Result<(), EngineError> {
        let h = &self.hdmi_holder;
        for (name, value) in [
            ("hdmi_holder.width", h.width),
            ("hdmi_holder.length", h.length),
            ("hdmi_holder.thickness", h.thickness),
            ("hdmi_holder.adapter_width", h.adapter_width),
            ("hdmi_holder.hollow_depth", h.hollow_depth),
            ("hdmi_holder.neck_width", h.neck_width),
            ("hdmi_holder.neck_length", h.neck_length),
            ("hdmi_holder.neck_height", h.neck_height),
            ("hdmi_holder.audio_hole_width", h.audio_hole_width),
            ("hdmi_holder.audio_hole_length", h.audio_hole_length),
            ("hdmi_holder.audio_near_pcb_width", h.audio_near_pcb_width),
        ] {
            Measurement::length(name, value)?;
        }
        Measurement::offset("hdmi_holder.neck_position", h.neck_position)?;
        Measurement::offset("hdmi_holder.plank_margin", h.plank_margin)?;

        if h.adapter_width + h.fit.allowance() >= h.width {
            return Err(invalid(
                "hdmi_holder.adapter_width",
                h.adapter_width,
                "hollow would split the holder",
            ));
        }
        if h.neck_width >= h.width {
            return Err(invalid(
                "hdmi_holder.neck_width",
                h.neck_width,
                "neck must be narrower than the holder",
            ));
        }
        if h.hollow_depth >= h.thickness {
            return Err(invalid(
                "hdmi_holder.hollow_depth",
                h.hollow_depth,
                "hollow would cut through the holder",
            ));
        }
        if h.neck_height >= h.thickness {
            return Err(invalid(
                "hdmi_holder.neck_height",
                h.neck_height,
                "plank needs room above the neck ledges",
            ));
        }
        Measurement::length("hdmi_holder.plank_width", h.adapter_width - h.plank_margin)?;
        Ok(())
    }

    /// Inner cavity width (x) of the case.
    pub fn case_inner_width(&self) -> f64 {
        self.board.width + self.case.side_gap
    }

    /// Inner cavity length (y) of the case.
    pub fn case_inner_length(&self) -> f64 {
        self.board.length + self.case.side_gap
    }

    pub fn case_outer_width(&self) -> f64 {
        self.case_inner_width() + 2.0 * self.case.shell_thickness
    }

    pub fn case_outer_length(&self) -> f64 {
        self.case_inner_length() + 2.0 * self.case.shell_thickness
    }

    pub fn lid_thickness(&self) -> f64 {
        self.lid.thickness.unwrap_or(self.case.shell_thickness)
    }

    pub fn pillar_radius(&self) -> f64 {
        self.board.hole_diameter / 2.0 + self.case.pillar_wall
    }
}

fn invalid(name: &str, value: f64, reason: &str) -> EngineError {
    EngineError::Placement(PlacementError::InvalidMeasurement {
        name: name.to_string(),
        value,
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_are_valid() {
        EnclosureConfig::default().validate().unwrap();
    }

    #[test]
    fn derived_case_dimensions() {
        let config = EnclosureConfig::default();
        assert_relative_eq!(config.case_inner_width(), 122.0);
        assert_relative_eq!(config.case_outer_width(), 132.0);
        assert_relative_eq!(config.case_outer_length(), 116.0);
        assert_relative_eq!(config.pillar_radius(), 3.75);
        assert_relative_eq!(config.lid_thickness(), 5.0);
        assert_relative_eq!(config.rca.pitch, 13.8, epsilon = 1e-12);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = EnclosureConfig::from_json(r#"{ "case": { "height": 60 } }"#).unwrap();
        assert_eq!(config.case.height, 60.0);
        assert_eq!(config.case.shell_thickness, 5.0);
        assert_eq!(config.board, BoardSpec::default());
    }

    #[test]
    fn json_round_trip() {
        let mut config = EnclosureConfig::default();
        config.hdmi_holder.fit = ClearanceClass::Loose;
        config.lid.edge_fillet = Some(1.5);
        let parsed = EnclosureConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn negative_board_width_is_named() {
        let err = EnclosureConfig::from_json(r#"{ "board": { "width": -1 } }"#).unwrap_err();
        match err {
            EngineError::Placement(PlacementError::InvalidMeasurement { name, .. }) => {
                assert_eq!(name, "board.width")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    fn invalid_name(config: &EnclosureConfig) -> String {
        match config.validate() {
            Err(EngineError::Placement(PlacementError::InvalidMeasurement { name, .. })) => name,
            other => panic!("expected an invalid measurement, got {other:?}"),
        }
    }

    #[test]
    fn nan_socket_height_is_named() {
        let mut config = EnclosureConfig::default();
        config.vga.top_height = f64::NAN;
        assert_eq!(invalid_name(&config), "vga.top_height");
    }

    #[test]
    fn inset_past_board_centre_is_named() {
        let mut config = EnclosureConfig::default();
        config.board.hole_inset = 60.0;
        assert_eq!(invalid_name(&config), "board.hole_inset");
    }

    #[test]
    fn negative_count_is_rejected() {
        let err = EnclosureConfig::from_json(r#"{ "rca": { "audio_count": -2 } }"#).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Placement(PlacementError::InvalidCount { count: -2, .. })
        ));
    }

    #[test]
    fn malformed_json_is_config_error() {
        assert!(matches!(
            EnclosureConfig::from_json("{ board: "),
            Err(EngineError::Config { .. })
        ));
    }

    #[test]
    fn oversized_hollow_is_rejected() {
        let mut config = EnclosureConfig::default();
        config.hdmi_holder.adapter_width = 36.0;
        assert!(config.validate().is_err());
    }
}
